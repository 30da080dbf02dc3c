//! Tool registry: the single source of truth for what can be called.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::engine::SharedEngine;
use crate::error::{CoreError, CoreResult};

use super::spec::ToolSpec;
use super::validate::ValidatedArgs;

/// Context passed to tool handlers for the duration of one dispatch.
///
/// The engine reference is borrowed per call; handlers must not stash it or
/// any engine-owned identifiers, since the scene can change between calls.
#[derive(Clone)]
pub struct ToolContext {
    pub engine: SharedEngine,
    pub request_id: Uuid,
}

/// Handler type: validated arguments + context in, JSON result out.
pub type ToolHandler = Arc<
    dyn Fn(ValidatedArgs, ToolContext) -> Pin<Box<dyn Future<Output = CoreResult<Value>> + Send>>
        + Send
        + Sync,
>;

/// Wrap an async fn as a [`ToolHandler`].
pub fn handler_fn<F, Fut>(f: F) -> ToolHandler
where
    F: Fn(ValidatedArgs, ToolContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CoreResult<Value>> + Send + 'static,
{
    Arc::new(move |args, context| Box::pin(f(args, context)))
}

/// A registered tool: its contract plus the handler that fulfills it.
pub struct ToolEntry {
    pub spec: ToolSpec,
    pub handler: ToolHandler,
}

/// Mapping from tool name to [`ToolEntry`].
///
/// Built once during startup on `&mut self`; afterwards it moves behind an
/// `Arc` and only shared lookups remain, so no locking is needed.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolEntry>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails on a duplicate name or a spec that violates
    /// its own invariants.
    pub fn register(&mut self, spec: ToolSpec, handler: ToolHandler) -> CoreResult<()> {
        spec.check_invariants().map_err(CoreError::InvalidInput)?;
        if self.tools.contains_key(&spec.name) {
            return Err(CoreError::InvalidInput(format!(
                "duplicate tool: '{}'",
                spec.name
            )));
        }
        self.order.push(spec.name.clone());
        self.tools.insert(spec.name.clone(), ToolEntry { spec, handler });
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolEntry> {
        self.tools.get(name)
    }

    /// Specs in registration order: the catalog the agent plans from.
    pub fn list(&self) -> Vec<&ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|entry| &entry.spec)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::spec::{ParamKind, ParamSpec};
    use serde_json::json;

    fn noop_handler() -> ToolHandler {
        handler_fn(|_args, _context| async { Ok(json!({ "ok": true })) })
    }

    fn spec(name: &str) -> ToolSpec {
        ToolSpec::new(name, "test tool", vec![])
    }

    #[test]
    fn empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup("anything").is_none());
        assert!(registry.list().is_empty());
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(spec("create_cube"), noop_handler()).unwrap();

        assert_eq!(registry.len(), 1);
        let entry = registry.lookup("create_cube").unwrap();
        assert_eq!(entry.spec.name, "create_cube");
    }

    #[test]
    fn duplicate_name_is_an_error() {
        let mut registry = ToolRegistry::new();
        registry.register(spec("dup"), noop_handler()).unwrap();
        let err = registry.register(spec("dup"), noop_handler()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert!(err.to_string().contains("duplicate tool"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn list_preserves_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(spec("b_tool"), noop_handler()).unwrap();
        registry.register(spec("a_tool"), noop_handler()).unwrap();

        let names: Vec<&str> = registry.list().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b_tool", "a_tool"]);
    }

    #[test]
    fn invariant_violating_spec_rejected() {
        let bad = ToolSpec::new(
            "bad",
            "",
            vec![
                ParamSpec::required("x", "", ParamKind::number()),
                ParamSpec::required("x", "", ParamKind::number()),
            ],
        );
        let mut registry = ToolRegistry::new();
        let err = registry.register(bad, noop_handler()).unwrap_err();
        assert!(err.to_string().contains("duplicate parameter"));
        assert!(registry.is_empty());
    }
}
