//! Camera tools.

use serde_json::{json, Value};

use crate::engine::Engine;
use crate::error::CoreResult;
use crate::tools::{handler_fn, ParamKind, ParamSpec, ToolContext, ToolRegistry, ToolSpec, ValidatedArgs};

use super::{coordinate_kind, rotation_kind};

pub fn register(registry: &mut ToolRegistry) -> CoreResult<()> {
    registry.register(set_camera_spec(), handler_fn(set_camera))
}

fn set_camera_spec() -> ToolSpec {
    ToolSpec::new(
        "set_camera",
        "Position and configure the scene camera.",
        vec![
            ParamSpec::optional_no_default("location", "Camera placement (x, y, z)", coordinate_kind()),
            ParamSpec::optional_no_default("rotation", "Euler rotation in radians", rotation_kind()),
            ParamSpec::optional(
                "focal_length",
                "Focal length in millimeters",
                ParamKind::number_range(1.0, 5000.0),
                json!(50.0),
            ),
        ],
    )
}

async fn set_camera(args: ValidatedArgs, context: ToolContext) -> CoreResult<Value> {
    let camera = context.engine.set_camera(args.to_value()).await?;
    Ok(json!({
        "message": "Camera updated",
        "object": camera,
    }))
}
