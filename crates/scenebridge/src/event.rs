use crate::tools::invocation::InvocationRecord;

/// Events published on the core bus.
#[derive(Debug, Clone)]
pub enum CoreEvent {
    /// A dispatch completed (in any status) and produced a record.
    ToolInvoked(InvocationRecord),
}
