//! Instrumented engine wrapper.
//!
//! Wraps any [`Engine`] and records one entry/exit window per command. Unit
//! tests use it to assert that rejected requests never touch the engine and
//! that gated execution windows do not overlap.

use std::sync::Mutex;
use std::time::Instant;

use serde_json::Value;

use super::{Engine, EngineError, SharedEngine};

/// One recorded engine call.
#[derive(Debug, Clone)]
pub struct CallWindow {
    pub op: String,
    pub entered: Instant,
    pub exited: Instant,
}

/// Engine wrapper that records every call made through it.
pub struct RecordingEngine {
    inner: SharedEngine,
    calls: Mutex<Vec<CallWindow>>,
}

impl RecordingEngine {
    pub fn new(inner: SharedEngine) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    pub fn calls(&self) -> Vec<CallWindow> {
        self.lock().clone()
    }

    /// True if any two recorded windows overlap in time.
    pub fn windows_overlap(&self) -> bool {
        let calls = self.lock();
        for (i, a) in calls.iter().enumerate() {
            for b in calls.iter().skip(i + 1) {
                if a.entered < b.exited && b.entered < a.exited {
                    return true;
                }
            }
        }
        false
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CallWindow>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn record<F>(&self, op: &str, call: F) -> Result<Value, EngineError>
    where
        F: std::future::Future<Output = Result<Value, EngineError>>,
    {
        let entered = Instant::now();
        let result = call.await;
        let exited = Instant::now();
        self.lock().push(CallWindow {
            op: op.to_string(),
            entered,
            exited,
        });
        result
    }
}

#[async_trait::async_trait]
impl Engine for RecordingEngine {
    async fn create_object(&self, params: Value) -> Result<Value, EngineError> {
        self.record("object.create", self.inner.create_object(params)).await
    }

    async fn delete_object(&self, name: &str) -> Result<Value, EngineError> {
        self.record("object.delete", self.inner.delete_object(name)).await
    }

    async fn transform_object(&self, name: &str, params: Value) -> Result<Value, EngineError> {
        self.record("object.transform", self.inner.transform_object(name, params))
            .await
    }

    async fn list_objects(&self) -> Result<Value, EngineError> {
        self.record("scene.list", self.inner.list_objects()).await
    }

    async fn object_info(&self, name: &str) -> Result<Value, EngineError> {
        self.record("scene.object_info", self.inner.object_info(name)).await
    }

    async fn set_material(&self, object: &str, params: Value) -> Result<Value, EngineError> {
        self.record("material.set", self.inner.set_material(object, params))
            .await
    }

    async fn create_light(&self, params: Value) -> Result<Value, EngineError> {
        self.record("light.create", self.inner.create_light(params)).await
    }

    async fn set_camera(&self, params: Value) -> Result<Value, EngineError> {
        self.record("camera.set", self.inner.set_camera(params)).await
    }

    async fn start_render(&self, params: Value) -> Result<Value, EngineError> {
        self.record("render.start", self.inner.start_render(params)).await
    }

    async fn render_status(&self, job_id: &str) -> Result<Value, EngineError> {
        self.record("render.status", self.inner.render_status(job_id)).await
    }
}
