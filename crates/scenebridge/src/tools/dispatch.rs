//! Dispatch pipeline: lookup, validate, gated execution, normalization.

use std::sync::Arc;
use std::time::SystemTime;

use serde_json::Value;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::bus::Bus;
use crate::engine::SharedEngine;
use crate::error::CoreError;
use crate::event::CoreEvent;

use super::invocation::InvocationRecord;
use super::outcome::ExecutionOutcome;
use super::registry::{ToolContext, ToolRegistry};
use super::validate::validate_args;

/// Executes tool invocations against one engine instance.
///
/// Lookup and validation run unserialized; only the engine-touching phase
/// goes through the single-permit gate, so queued requests validate
/// concurrently while the engine sees one command at a time, in arrival
/// order.
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    engine: SharedEngine,
    gate: Arc<Semaphore>,
    bus: Bus,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, engine: SharedEngine, bus: Bus) -> Self {
        Self {
            registry,
            engine,
            gate: Arc::new(Semaphore::new(1)),
            bus,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one tool invocation to a single [`ExecutionOutcome`].
    ///
    /// A request that fails lookup or validation never reaches the engine.
    /// Once the gated phase starts it runs to completion; there is no
    /// cancellation path.
    pub async fn invoke(&self, tool: &str, raw: Value) -> ExecutionOutcome {
        let request_id = Uuid::new_v4();
        let started_at = SystemTime::now();
        let outcome = self.run(request_id, tool, raw).await;
        let ended_at = SystemTime::now();

        if let ExecutionOutcome::Internal(diagnostic) = &outcome {
            tracing::error!("tool '{tool}' failed internally: {diagnostic}");
        }

        let mut record = InvocationRecord::new(
            request_id,
            tool.to_string(),
            started_at,
            ended_at,
            outcome.status(),
        );
        record.error_code = outcome.error_code();
        tracing::debug!(
            "dispatched '{}' in {}ms ({:?})",
            record.tool,
            record.duration_ms,
            record.status
        );
        let _ = self.bus.publish(CoreEvent::ToolInvoked(record));

        outcome
    }

    async fn run(&self, request_id: Uuid, tool: &str, raw: Value) -> ExecutionOutcome {
        // 1. Lookup. A miss is terminal; no validation is attempted.
        let entry = match self.registry.lookup(tool) {
            Some(entry) => entry,
            None => return ExecutionOutcome::NotFound(tool.to_string()),
        };

        // 2. Validate. Field errors are terminal; the engine is never
        // invoked with an un-validated bundle.
        let args = match validate_args(&entry.spec, &raw) {
            Ok(args) => args,
            Err(errors) => return ExecutionOutcome::Validation(errors),
        };

        // 3. Gated execution. The permit queue is FIFO, and the handler
        // runs in its own task so a panic surfaces as a join error instead
        // of tearing down the dispatch loop.
        let permit = match self.gate.acquire().await {
            Ok(permit) => permit,
            Err(_) => return ExecutionOutcome::Internal("execution gate closed".to_string()),
        };
        let context = ToolContext {
            engine: self.engine.clone(),
            request_id,
        };
        let joined = tokio::spawn((entry.handler)(args, context)).await;
        let outcome = match joined {
            Ok(Ok(value)) => ExecutionOutcome::Success(value),
            Ok(Err(CoreError::Engine(err))) => ExecutionOutcome::Engine {
                retryable: err.is_transient(),
                message: err.message,
            },
            Ok(Err(other)) => ExecutionOutcome::Internal(other.to_string()),
            Err(join_error) => ExecutionOutcome::Internal(format!("handler aborted: {join_error}")),
        };
        drop(permit);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, EngineError, RecordingEngine, StubEngine};
    use crate::tools::registry::{handler_fn, ToolRegistry};
    use crate::tools::spec::{ParamKind, ParamSpec, ToolSpec};
    use crate::tools::InvocationStatus;
    use futures_util::future::join_all;
    use serde_json::json;
    use std::time::Duration;

    fn sphere_spec() -> ToolSpec {
        ToolSpec::new(
            "create_sphere",
            "Create a UV sphere.",
            vec![
                ParamSpec::required(
                    "radius",
                    "Sphere radius",
                    ParamKind::Number {
                        min: Some(0.0),
                        max: None,
                        exclusive_min: true,
                        exclusive_max: false,
                    },
                ),
                ParamSpec::optional("segments", "Segment count", ParamKind::integer_range(3, 256), json!(32)),
            ],
        )
    }

    fn recording_dispatcher(registry: ToolRegistry) -> (Dispatcher, Arc<RecordingEngine>) {
        let engine = Arc::new(RecordingEngine::new(Arc::new(StubEngine::new())));
        let dispatcher = Dispatcher::new(Arc::new(registry), engine.clone(), Bus::new(16));
        (dispatcher, engine)
    }

    fn sphere_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                sphere_spec(),
                handler_fn(|args, context| async move {
                    let object = context.engine.create_object(args.to_value()).await?;
                    Ok(json!({ "message": "sphere created", "object": object }))
                }),
            )
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn unknown_tool_never_touches_the_engine() {
        let (dispatcher, engine) = recording_dispatcher(sphere_registry());
        let outcome = dispatcher.invoke("warp_spacetime", json!({})).await;

        assert!(matches!(outcome, ExecutionOutcome::NotFound(ref name) if name == "warp_spacetime"));
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn validation_failure_never_touches_the_engine() {
        let (dispatcher, engine) = recording_dispatcher(sphere_registry());
        let outcome = dispatcher.invoke("create_sphere", json!({ "radius": -1 })).await;

        match outcome {
            ExecutionOutcome::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "radius");
                assert_eq!(errors[0].reason, "must be > 0");
            }
            other => panic!("expected validation outcome, got {other:?}"),
        }
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn valid_call_reaches_engine_with_defaults_applied() {
        let (dispatcher, engine) = recording_dispatcher(sphere_registry());
        let outcome = dispatcher.invoke("create_sphere", json!({ "radius": 2 })).await;

        match outcome {
            ExecutionOutcome::Success(data) => {
                assert_eq!(data["object"]["radius"], json!(2.0));
                assert_eq!(data["object"]["segments"], json!(32));
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(engine.call_count(), 1);
    }

    #[tokio::test]
    async fn engine_failure_is_classified() {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolSpec::new("flaky", "always busy", vec![]),
                handler_fn(|_args, _context| async {
                    Err(EngineError::transient("engine busy").into())
                }),
            )
            .unwrap();
        let (dispatcher, engine) = recording_dispatcher(registry);

        let outcome = dispatcher.invoke("flaky", json!({})).await;
        match outcome {
            ExecutionOutcome::Engine { message, retryable } => {
                assert_eq!(message, "engine busy");
                assert!(retryable);
            }
            other => panic!("expected engine outcome, got {other:?}"),
        }
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn handler_panic_becomes_internal_outcome() {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolSpec::new("explode", "panics", vec![]),
                handler_fn(|_args, _context| async { panic!("boom") }),
            )
            .unwrap();
        let (dispatcher, _engine) = recording_dispatcher(registry);

        let outcome = dispatcher.invoke("explode", json!({})).await;
        assert!(matches!(outcome, ExecutionOutcome::Internal(_)));

        // The dispatcher survives and keeps serving.
        let outcome = dispatcher.invoke("explode", json!({})).await;
        assert!(matches!(outcome, ExecutionOutcome::Internal(_)));
    }

    #[tokio::test]
    async fn engine_phases_never_interleave() {
        let mut registry = ToolRegistry::new();
        for name in ["slow_a", "slow_b"] {
            registry
                .register(
                    ToolSpec::new(name, "slow tool", vec![]),
                    handler_fn(|args, context| async move {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        context.engine.list_objects().await?;
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        let _ = args;
                        Ok(json!({}))
                    }),
                )
                .unwrap();
        }
        let (dispatcher, engine) = recording_dispatcher(registry);
        let dispatcher = Arc::new(dispatcher);

        let calls = ["slow_a", "slow_b", "slow_a", "slow_b"];
        let futures: Vec<_> = calls
            .iter()
            .map(|name| {
                let dispatcher = dispatcher.clone();
                async move { dispatcher.invoke(name, json!({})).await }
            })
            .collect();
        let outcomes = join_all(futures).await;

        assert!(outcomes
            .iter()
            .all(|outcome| matches!(outcome, ExecutionOutcome::Success(_))));
        assert_eq!(engine.call_count(), 4);
        assert!(!engine.windows_overlap());
    }

    #[tokio::test]
    async fn every_dispatch_publishes_an_invocation_record() {
        let bus = Bus::new(16);
        let mut receiver = bus.subscribe();
        let engine: SharedEngine = Arc::new(StubEngine::new());
        let dispatcher = Dispatcher::new(Arc::new(sphere_registry()), engine, bus);

        dispatcher.invoke("create_sphere", json!({ "radius": 1 })).await;
        dispatcher.invoke("no_such_tool", json!({})).await;

        let CoreEvent::ToolInvoked(first) = receiver.recv().await.unwrap();
        assert_eq!(first.tool, "create_sphere");
        assert_eq!(first.status, InvocationStatus::Success);

        let CoreEvent::ToolInvoked(second) = receiver.recv().await.unwrap();
        assert_eq!(second.status, InvocationStatus::NotFound);
        assert_eq!(second.error_code.as_deref(), Some("not_found"));
    }
}
