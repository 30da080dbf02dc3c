use utoipa::OpenApi;

use crate::server::catalog::{ToolCatalogEntry, ToolCatalogResponse};
use crate::server::invoke::InvokeRequest;
use crate::tools::validate::FieldError;
use crate::tools::{InvokeResponse, ResponseStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "scenebridge API",
        version = "0.1.0",
        description = "Schema-validated tool-calling server for a Blender-style scene engine"
    ),
    paths(
        crate::server::catalog::list_tools,
        crate::server::invoke::invoke_tool,
    ),
    components(schemas(
        ToolCatalogResponse,
        ToolCatalogEntry,
        InvokeRequest,
        InvokeResponse,
        ResponseStatus,
        FieldError,
    ))
)]
pub struct ApiDoc;
