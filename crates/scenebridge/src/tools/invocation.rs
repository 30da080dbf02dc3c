//! Tool invocation records capturing execution metadata.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Outcome class of a dispatch, as recorded for observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationStatus {
    /// The handler ran and returned a value.
    Success,
    /// No tool with the requested name is registered.
    NotFound,
    /// The argument bundle failed validation; the engine was never touched.
    InvalidArguments,
    /// The engine reported a classified failure.
    EngineFailed,
    /// Something unexpected escaped the handler.
    Internal,
}

/// Record of a single dispatch, published on the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub request_id: Uuid,
    /// Name of the tool that was invoked.
    pub tool: String,
    pub started_at: SystemTime,
    pub ended_at: SystemTime,
    /// Duration of the dispatch in milliseconds.
    pub duration_ms: u64,
    pub status: InvocationStatus,
    /// Short machine-readable code when the dispatch did not succeed.
    pub error_code: Option<String>,
}

impl InvocationRecord {
    /// Create a record from start/end times, computing `duration_ms`.
    pub fn new(
        request_id: Uuid,
        tool: String,
        started_at: SystemTime,
        ended_at: SystemTime,
        status: InvocationStatus,
    ) -> Self {
        let duration_ms = ended_at
            .duration_since(started_at)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            request_id,
            tool,
            started_at,
            ended_at,
            duration_ms,
            status,
            error_code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn new_computes_duration() {
        let start = SystemTime::now();
        let end = start + Duration::from_millis(150);
        let record = InvocationRecord::new(
            Uuid::new_v4(),
            "create_cube".to_string(),
            start,
            end,
            InvocationStatus::Success,
        );
        assert_eq!(record.duration_ms, 150);
        assert_eq!(record.tool, "create_cube");
        assert_eq!(record.error_code, None);
    }

    #[test]
    fn serialize_roundtrip() {
        let start = SystemTime::now();
        let mut record = InvocationRecord::new(
            Uuid::new_v4(),
            "delete_object".to_string(),
            start,
            start + Duration::from_millis(20),
            InvocationStatus::EngineFailed,
        );
        record.error_code = Some("engine_error".to_string());

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: InvocationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.status, InvocationStatus::EngineFailed);
        assert_eq!(deserialized.error_code.as_deref(), Some("engine_error"));
    }
}
