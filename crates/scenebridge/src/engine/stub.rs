//! In-memory engine stand-in.
//!
//! Keeps a flat object table and fake render jobs so the server can run and
//! be tested without a Blender bridge on the other end. Mirrors the bridge's
//! observable behavior: duplicate names get Blender-style `.001` suffixes,
//! operations on absent objects fail permanently, render jobs advance each
//! time they are polled.

use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Engine, EngineError};

#[derive(Default)]
struct StubState {
    /// Objects in creation order.
    objects: Vec<Map<String, Value>>,
    /// Render job id -> progress percent.
    renders: Vec<(String, u64)>,
}

impl StubState {
    fn find(&self, name: &str) -> Option<usize> {
        self.objects
            .iter()
            .position(|obj| obj.get("name").and_then(Value::as_str) == Some(name))
    }

    /// Resolve a free name, suffixing `.001`, `.002`, ... like Blender does.
    fn unique_name(&self, requested: &str) -> String {
        if self.find(requested).is_none() {
            return requested.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{requested}.{n:03}");
            if self.find(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Engine implementation backed by process-local state.
#[derive(Default)]
pub struct StubEngine {
    state: Mutex<StubState>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(name: &str) -> EngineError {
    EngineError::permanent(format!("object '{name}' not found"))
}

#[async_trait::async_trait]
impl Engine for StubEngine {
    async fn create_object(&self, params: Value) -> Result<Value, EngineError> {
        let mut state = self.state.lock().await;
        let mut record = params
            .as_object()
            .cloned()
            .ok_or_else(|| EngineError::permanent("object parameters must be a map"))?;

        let requested = record
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Object")
            .to_string();
        let name = state.unique_name(&requested);
        record.insert("name".to_string(), Value::String(name.clone()));
        state.objects.push(record.clone());

        Ok(Value::Object(record))
    }

    async fn delete_object(&self, name: &str) -> Result<Value, EngineError> {
        let mut state = self.state.lock().await;
        let index = state.find(name).ok_or_else(|| not_found(name))?;
        state.objects.remove(index);
        Ok(json!({ "deleted": name }))
    }

    async fn transform_object(&self, name: &str, params: Value) -> Result<Value, EngineError> {
        let mut state = self.state.lock().await;
        let index = state.find(name).ok_or_else(|| not_found(name))?;
        if let Some(updates) = params.as_object() {
            for (key, value) in updates {
                state.objects[index].insert(key.clone(), value.clone());
            }
        }
        Ok(Value::Object(state.objects[index].clone()))
    }

    async fn list_objects(&self) -> Result<Value, EngineError> {
        let state = self.state.lock().await;
        let names: Vec<Value> = state
            .objects
            .iter()
            .filter_map(|obj| obj.get("name").cloned())
            .collect();
        Ok(json!({ "objects": names, "count": names.len() }))
    }

    async fn object_info(&self, name: &str) -> Result<Value, EngineError> {
        let state = self.state.lock().await;
        let index = state.find(name).ok_or_else(|| not_found(name))?;
        Ok(Value::Object(state.objects[index].clone()))
    }

    async fn set_material(&self, object: &str, params: Value) -> Result<Value, EngineError> {
        let mut state = self.state.lock().await;
        let index = state.find(object).ok_or_else(|| not_found(object))?;
        state.objects[index].insert("material".to_string(), params);
        Ok(Value::Object(state.objects[index].clone()))
    }

    async fn create_light(&self, params: Value) -> Result<Value, EngineError> {
        let mut light = params;
        if let Some(map) = light.as_object_mut() {
            map.insert("type".to_string(), Value::String("light".to_string()));
        }
        self.create_object(light).await
    }

    async fn set_camera(&self, params: Value) -> Result<Value, EngineError> {
        let mut state = self.state.lock().await;
        let mut record = params
            .as_object()
            .cloned()
            .unwrap_or_default();
        record.insert("name".to_string(), Value::String("Camera".to_string()));
        record.insert("type".to_string(), Value::String("camera".to_string()));

        match state.find("Camera") {
            Some(index) => state.objects[index] = record.clone(),
            None => state.objects.push(record.clone()),
        }
        Ok(Value::Object(record))
    }

    async fn start_render(&self, params: Value) -> Result<Value, EngineError> {
        let mut state = self.state.lock().await;
        let job_id = Uuid::new_v4().to_string();
        let started_at: chrono::DateTime<chrono::Utc> = std::time::SystemTime::now().into();
        state.renders.push((job_id.clone(), 0));
        Ok(json!({
            "job_id": job_id,
            "status": "queued",
            "started_at": started_at.to_rfc3339(),
            "settings": params,
        }))
    }

    async fn render_status(&self, job_id: &str) -> Result<Value, EngineError> {
        let mut state = self.state.lock().await;
        let entry = state
            .renders
            .iter_mut()
            .find(|(id, _)| id == job_id)
            .ok_or_else(|| EngineError::permanent(format!("render job '{job_id}' not found")))?;

        // Fake progress: each poll advances the job.
        entry.1 = (entry.1 + 50).min(100);
        let status = if entry.1 >= 100 { "complete" } else { "rendering" };
        Ok(json!({ "job_id": job_id, "status": status, "progress": entry.1 }))
    }
}
