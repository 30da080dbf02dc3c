//! Object tools: create primitives, delete, transform.

use serde_json::{json, Value};

use crate::engine::Engine;
use crate::error::CoreResult;
use crate::tools::{handler_fn, ParamKind, ParamSpec, ToolContext, ToolRegistry, ToolSpec, ValidatedArgs};

use super::{coordinate_kind, location_param, object_name_kind, rotation_kind};

/// Register the object tools.
pub fn register(registry: &mut ToolRegistry) -> CoreResult<()> {
    registry.register(create_cube_spec(), handler_fn(create_cube))?;
    registry.register(create_sphere_spec(), handler_fn(create_sphere))?;
    registry.register(delete_object_spec(), handler_fn(delete_object))?;
    registry.register(transform_object_spec(), handler_fn(transform_object))?;
    Ok(())
}

fn create_cube_spec() -> ToolSpec {
    ToolSpec::new(
        "create_cube",
        "Create a cube mesh in the scene.",
        vec![
            ParamSpec::required("name", "Name for the cube object", object_name_kind()),
            ParamSpec::optional(
                "size",
                "Edge length of the cube",
                ParamKind::Number {
                    min: Some(0.0),
                    max: Some(1000.0),
                    exclusive_min: true,
                    exclusive_max: false,
                },
                json!(2.0),
            ),
            location_param(),
        ],
    )
}

async fn create_cube(args: ValidatedArgs, context: ToolContext) -> CoreResult<Value> {
    let mut params = args.into_map();
    params.insert("kind".to_string(), json!("cube"));
    let object = context.engine.create_object(Value::Object(params)).await?;
    let name = object.get("name").and_then(Value::as_str).unwrap_or("Cube");
    Ok(json!({
        "message": format!("Created cube '{name}'"),
        "object": object,
    }))
}

fn create_sphere_spec() -> ToolSpec {
    ToolSpec::new(
        "create_sphere",
        "Create a UV sphere mesh in the scene.",
        vec![
            ParamSpec::required(
                "radius",
                "Sphere radius",
                ParamKind::Number {
                    min: Some(0.0),
                    max: Some(1000.0),
                    exclusive_min: true,
                    exclusive_max: false,
                },
            ),
            ParamSpec::optional(
                "segments",
                "Number of horizontal segments",
                ParamKind::integer_range(3, 256),
                json!(32),
            ),
            ParamSpec::optional("name", "Name for the sphere object", object_name_kind(), json!("Sphere")),
            location_param(),
        ],
    )
}

async fn create_sphere(args: ValidatedArgs, context: ToolContext) -> CoreResult<Value> {
    let mut params = args.into_map();
    params.insert("kind".to_string(), json!("sphere"));
    let object = context.engine.create_object(Value::Object(params)).await?;
    let name = object.get("name").and_then(Value::as_str).unwrap_or("Sphere");
    Ok(json!({
        "message": format!("Created sphere '{name}'"),
        "object": object,
    }))
}

fn delete_object_spec() -> ToolSpec {
    ToolSpec::new(
        "delete_object",
        "Delete an object from the scene by name.",
        vec![ParamSpec::required("name", "Name of the object to delete", object_name_kind())],
    )
}

async fn delete_object(args: ValidatedArgs, context: ToolContext) -> CoreResult<Value> {
    let name = args.require_str("name")?;
    let result = context.engine.delete_object(name).await?;
    Ok(json!({
        "message": format!("Deleted object '{name}'"),
        "result": result,
    }))
}

fn transform_object_spec() -> ToolSpec {
    ToolSpec::new(
        "transform_object",
        "Move, rotate, or scale an existing object. Omitted channels are left unchanged.",
        vec![
            ParamSpec::required("name", "Name of the object to transform", object_name_kind()),
            ParamSpec::optional_no_default(
                "location",
                "New placement in world space (x, y, z)",
                coordinate_kind(),
            ),
            ParamSpec::optional_no_default("rotation", "Euler rotation in radians", rotation_kind()),
            ParamSpec::optional_no_default(
                "scale",
                "Per-axis scale factors",
                ParamKind::Sequence {
                    item: Box::new(ParamKind::Number {
                        min: Some(0.0),
                        max: None,
                        exclusive_min: true,
                        exclusive_max: false,
                    }),
                    min_items: Some(3),
                    max_items: Some(3),
                },
            ),
        ],
    )
}

async fn transform_object(args: ValidatedArgs, context: ToolContext) -> CoreResult<Value> {
    let name = args.require_str("name")?.to_string();
    let mut params = args.into_map();
    params.remove("name");
    let object = context
        .engine
        .transform_object(&name, Value::Object(params))
        .await?;
    Ok(json!({
        "message": format!("Transformed object '{name}'"),
        "object": object,
    }))
}
