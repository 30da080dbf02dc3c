//! Scene query tools.

use serde_json::{json, Value};

use crate::engine::Engine;
use crate::error::CoreResult;
use crate::tools::{handler_fn, ParamSpec, ToolContext, ToolRegistry, ToolSpec, ValidatedArgs};

use super::object_name_kind;

pub fn register(registry: &mut ToolRegistry) -> CoreResult<()> {
    registry.register(list_objects_spec(), handler_fn(list_objects))?;
    registry.register(object_info_spec(), handler_fn(object_info))?;
    Ok(())
}

fn list_objects_spec() -> ToolSpec {
    ToolSpec::new("list_objects", "List the names of all objects in the scene.", vec![])
}

async fn list_objects(_args: ValidatedArgs, context: ToolContext) -> CoreResult<Value> {
    let data = context.engine.list_objects().await?;
    let message = match data.get("count").and_then(Value::as_u64) {
        Some(count) => format!("Scene contains {count} object{}", if count == 1 { "" } else { "s" }),
        None => "Listed scene objects".to_string(),
    };
    Ok(json!({ "message": message, "scene": data }))
}

fn object_info_spec() -> ToolSpec {
    ToolSpec::new(
        "object_info",
        "Fetch the current properties of one object.",
        vec![ParamSpec::required("name", "Name of the object to inspect", object_name_kind())],
    )
}

async fn object_info(args: ValidatedArgs, context: ToolContext) -> CoreResult<Value> {
    let name = args.require_str("name")?;
    let object = context.engine.object_info(name).await?;
    Ok(json!({
        "message": format!("Object '{name}'"),
        "object": object,
    }))
}
