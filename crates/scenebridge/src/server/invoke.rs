//! Tool invocation endpoint, the sole call surface.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::server::ServerState;
use crate::tools::{InvokeResponse, ResponseStatus};

/// Invocation request: a tool name plus an untrusted argument bundle.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InvokeRequest {
    pub tool: String,
    /// Key/value arguments; missing means `{}`.
    #[serde(default)]
    pub arguments: Value,
}

/// POST /invoke
#[utoipa::path(
    post,
    path = "/invoke",
    tag = "tools",
    request_body = InvokeRequest,
    responses(
        (status = 200, body = InvokeResponse),
        (status = 400, body = InvokeResponse),
        (status = 404, body = InvokeResponse),
        (status = 502, body = InvokeResponse),
        (status = 500, body = InvokeResponse),
    )
)]
pub(crate) async fn invoke_tool(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<InvokeRequest>,
) -> (StatusCode, Json<InvokeResponse>) {
    let outcome = state.dispatcher.invoke(&request.tool, request.arguments).await;
    let response = outcome.into_response();
    (http_status(response.status), Json(response))
}

fn http_status(status: ResponseStatus) -> StatusCode {
    match status {
        ResponseStatus::Success => StatusCode::OK,
        ResponseStatus::NotFound => StatusCode::NOT_FOUND,
        ResponseStatus::ValidationError => StatusCode::BAD_REQUEST,
        ResponseStatus::EngineError => StatusCode::BAD_GATEWAY,
        ResponseStatus::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;
    use crate::catalog::register_all;
    use crate::engine::StubEngine;
    use crate::tools::{Dispatcher, ToolRegistry};
    use serde_json::json;

    fn state() -> Arc<ServerState> {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry).unwrap();
        let registry = Arc::new(registry);
        let dispatcher =
            Dispatcher::new(registry.clone(), Arc::new(StubEngine::new()), Bus::new(16));
        Arc::new(ServerState { dispatcher, registry })
    }

    async fn call(state: Arc<ServerState>, tool: &str, arguments: Value) -> (StatusCode, InvokeResponse) {
        let request = InvokeRequest {
            tool: tool.to_string(),
            arguments,
        };
        let (code, Json(response)) = invoke_tool(State(state), Json(request)).await;
        (code, response)
    }

    #[tokio::test]
    async fn successful_invoke_returns_200_with_data() {
        let (code, response) = call(state(), "create_sphere", json!({ "radius": 2 })).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(response.status, ResponseStatus::Success);
        assert!(response.data.is_some());
        assert!(response.details.is_none());
    }

    #[tokio::test]
    async fn validation_error_returns_400_with_details() {
        let (code, response) = call(state(), "create_sphere", json!({ "radius": -1 })).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(response.status, ResponseStatus::ValidationError);
        let details = response.details.unwrap();
        assert_eq!(details[0].field, "radius");
        assert_eq!(details[0].reason, "must be > 0");
    }

    #[tokio::test]
    async fn unknown_tool_returns_404() {
        let (code, response) = call(state(), "warp_spacetime", json!({})).await;
        assert_eq!(code, StatusCode::NOT_FOUND);
        assert!(response.message.contains("warp_spacetime"));
    }

    #[tokio::test]
    async fn permanent_engine_failure_returns_502_not_retryable() {
        let (code, response) = call(state(), "delete_object", json!({ "name": "Ghost" })).await;
        assert_eq!(code, StatusCode::BAD_GATEWAY);
        assert_eq!(response.status, ResponseStatus::EngineError);
        assert_eq!(response.retryable, Some(false));
    }

    #[test]
    fn statuses_map_to_http_codes() {
        assert_eq!(http_status(ResponseStatus::Success), StatusCode::OK);
        assert_eq!(http_status(ResponseStatus::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(http_status(ResponseStatus::ValidationError), StatusCode::BAD_REQUEST);
        assert_eq!(http_status(ResponseStatus::EngineError), StatusCode::BAD_GATEWAY);
        assert_eq!(http_status(ResponseStatus::InternalError), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_arguments_default_to_null() {
        let request: InvokeRequest = serde_json::from_str(r#"{ "tool": "list_objects" }"#).unwrap();
        assert_eq!(request.tool, "list_objects");
        assert!(request.arguments.is_null());
    }
}
