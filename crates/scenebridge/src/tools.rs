//! The dispatch core: schema model, validation, registry, and execution.
//!
//! Everything an invocation passes through lives here:
//! - `spec`: the typed contract each tool advertises
//! - `validate`: untrusted JSON → [`ValidatedArgs`] or field errors
//! - `registry`: name → (spec, handler), built once at startup
//! - `dispatch`: lookup → validate → gated execution
//! - `outcome`: the closed set of results and the response envelope
//! - `invocation`: per-dispatch metadata records

pub mod dispatch;
pub mod invocation;
pub mod outcome;
pub mod registry;
pub mod spec;
pub mod validate;

pub use dispatch::Dispatcher;
pub use invocation::{InvocationRecord, InvocationStatus};
pub use outcome::{ExecutionOutcome, InvokeResponse, ResponseStatus};
pub use registry::{handler_fn, ToolContext, ToolEntry, ToolHandler, ToolRegistry};
pub use spec::{ParamKind, ParamSpec, ToolSpec};
pub use validate::{validate_args, FieldError, ValidatedArgs};
