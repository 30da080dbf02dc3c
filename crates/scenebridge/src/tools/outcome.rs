//! Execution outcomes and the caller-facing response envelope.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::invocation::InvocationStatus;
use super::validate::FieldError;

/// Tagged result of one dispatch. Exactly one variant per invocation.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// The handler ran and produced a value.
    Success(Value),
    /// No tool with this name is registered.
    NotFound(String),
    /// One or more field-level constraint violations.
    Validation(Vec<FieldError>),
    /// Classified engine failure. `retryable` means the same call may
    /// succeed if retried; otherwise arguments or scene state must change.
    Engine { message: String, retryable: bool },
    /// Unexpected failure. The diagnostic is logged server-side and never
    /// shown to the caller.
    Internal(String),
}

/// Response status, the closed set callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    NotFound,
    ValidationError,
    EngineError,
    InternalError,
}

/// Uniform caller-facing response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvokeResponse {
    pub status: ResponseStatus,
    /// Human-readable summary, always present.
    pub message: String,
    /// Handler result, present only on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Field-level errors, present only on validation_error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
    /// Present only on engine_error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl ExecutionOutcome {
    pub fn status(&self) -> InvocationStatus {
        match self {
            ExecutionOutcome::Success(_) => InvocationStatus::Success,
            ExecutionOutcome::NotFound(_) => InvocationStatus::NotFound,
            ExecutionOutcome::Validation(_) => InvocationStatus::InvalidArguments,
            ExecutionOutcome::Engine { .. } => InvocationStatus::EngineFailed,
            ExecutionOutcome::Internal(_) => InvocationStatus::Internal,
        }
    }

    pub fn error_code(&self) -> Option<String> {
        match self {
            ExecutionOutcome::Success(_) => None,
            ExecutionOutcome::NotFound(_) => Some("not_found".to_string()),
            ExecutionOutcome::Validation(_) => Some("invalid_arguments".to_string()),
            ExecutionOutcome::Engine { .. } => Some("engine_error".to_string()),
            ExecutionOutcome::Internal(_) => Some("internal".to_string()),
        }
    }

    /// Normalize into the caller-facing envelope.
    ///
    /// Handlers put a human-readable `message` into their payload; it is
    /// lifted into the envelope so agents get prose without digging into
    /// `data`. Internal diagnostics are dropped here; the dispatcher has
    /// already logged them.
    pub fn into_response(self) -> InvokeResponse {
        match self {
            ExecutionOutcome::Success(data) => {
                let message = data
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("ok")
                    .to_string();
                InvokeResponse {
                    status: ResponseStatus::Success,
                    message,
                    data: Some(data),
                    details: None,
                    retryable: None,
                }
            }
            ExecutionOutcome::NotFound(name) => InvokeResponse {
                status: ResponseStatus::NotFound,
                message: format!("unknown tool: '{name}'"),
                data: None,
                details: None,
                retryable: None,
            },
            ExecutionOutcome::Validation(errors) => InvokeResponse {
                status: ResponseStatus::ValidationError,
                message: format!(
                    "invalid arguments: {} field error{}",
                    errors.len(),
                    if errors.len() == 1 { "" } else { "s" }
                ),
                data: None,
                details: Some(errors),
                retryable: None,
            },
            ExecutionOutcome::Engine { message, retryable } => InvokeResponse {
                status: ResponseStatus::EngineError,
                message,
                data: None,
                details: None,
                retryable: Some(retryable),
            },
            ExecutionOutcome::Internal(_) => InvokeResponse {
                status: ResponseStatus::InternalError,
                message: "internal server error".to_string(),
                data: None,
                details: None,
                retryable: None,
            },
        }
    }
}
