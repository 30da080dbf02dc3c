//! Engine boundary: the narrow surface through which tools reach the scene.
//!
//! The engine itself (Blender behind a JSON bridge, or the in-memory stub) is
//! an opaque stateful service. The adapter translates its native failure
//! signals into [`EngineError`] with a transient/permanent classification so
//! the dispatch layer can tell callers whether a retry is worthwhile without
//! knowing anything about engine internals.

pub mod recording;
pub mod rpc;
pub mod stub;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

pub use recording::RecordingEngine;
pub use rpc::RpcEngine;
pub use stub::StubEngine;

/// Failure classification: transient failures may succeed if the same call is
/// retried; permanent failures require the caller to change arguments or
/// engine state first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    Transient,
    Permanent,
}

/// A classified failure reported by the scene engine.
#[derive(Debug, Clone)]
pub struct EngineError {
    pub message: String,
    pub kind: EngineErrorKind,
}

impl EngineError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: EngineErrorKind::Transient,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: EngineErrorKind::Permanent,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == EngineErrorKind::Transient
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EngineError {}

/// Command surface of the scene engine, one method per tool category.
///
/// Implementations are pure pass-throughs: they carry structured parameters
/// to the engine and classify its failures. They never interpret caller
/// intent and never cache engine-owned state across calls.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn create_object(&self, params: Value) -> Result<Value, EngineError>;
    async fn delete_object(&self, name: &str) -> Result<Value, EngineError>;
    async fn transform_object(&self, name: &str, params: Value) -> Result<Value, EngineError>;
    async fn list_objects(&self) -> Result<Value, EngineError>;
    async fn object_info(&self, name: &str) -> Result<Value, EngineError>;
    async fn set_material(&self, object: &str, params: Value) -> Result<Value, EngineError>;
    async fn create_light(&self, params: Value) -> Result<Value, EngineError>;
    async fn set_camera(&self, params: Value) -> Result<Value, EngineError>;
    async fn start_render(&self, params: Value) -> Result<Value, EngineError>;
    async fn render_status(&self, job_id: &str) -> Result<Value, EngineError>;
}

pub type SharedEngine = Arc<dyn Engine>;
