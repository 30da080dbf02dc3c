//! Catalog endpoint: what the agent sees as "available tools".

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::server::ServerState;

/// One catalog entry: name, description, and the JSON Schema contract.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToolCatalogEntry {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToolCatalogResponse {
    pub tools: Vec<ToolCatalogEntry>,
}

/// GET /tools
///
/// Serializes the live registry directly, so the listing cannot drift from
/// what is actually invokable.
#[utoipa::path(
    get,
    path = "/tools",
    tag = "catalog",
    responses(
        (status = 200, body = ToolCatalogResponse),
    )
)]
pub(crate) async fn list_tools(State(state): State<Arc<ServerState>>) -> Json<ToolCatalogResponse> {
    let tools = state
        .registry
        .list()
        .into_iter()
        .map(|spec| ToolCatalogEntry {
            name: spec.name.clone(),
            description: spec.description.clone(),
            input_schema: spec.input_schema(),
        })
        .collect();
    Json(ToolCatalogResponse { tools })
}
