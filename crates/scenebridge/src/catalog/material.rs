//! Material tools.

use serde_json::{json, Value};

use crate::engine::Engine;
use crate::error::CoreResult;
use crate::tools::{handler_fn, ParamKind, ParamSpec, ToolContext, ToolRegistry, ToolSpec, ValidatedArgs};

use super::{color_kind, object_name_kind};

pub fn register(registry: &mut ToolRegistry) -> CoreResult<()> {
    registry.register(set_material_spec(), handler_fn(set_material))
}

fn set_material_spec() -> ToolSpec {
    ToolSpec::new(
        "set_material",
        "Assign principled material properties to an object.",
        vec![
            ParamSpec::required("object", "Name of the target object", object_name_kind()),
            ParamSpec::optional(
                "base_color",
                "RGBA base color, each channel in [0, 1]",
                color_kind(4),
                json!([0.8, 0.8, 0.8, 1.0]),
            ),
            ParamSpec::optional("metallic", "Metallic factor", ParamKind::number_range(0.0, 1.0), json!(0.0)),
            ParamSpec::optional("roughness", "Roughness factor", ParamKind::number_range(0.0, 1.0), json!(0.5)),
        ],
    )
}

async fn set_material(args: ValidatedArgs, context: ToolContext) -> CoreResult<Value> {
    let object = args.require_str("object")?.to_string();
    let mut params = args.into_map();
    params.remove("object");
    let updated = context
        .engine
        .set_material(&object, Value::Object(params))
        .await?;
    Ok(json!({
        "message": format!("Updated material on '{object}'"),
        "object": updated,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StubEngine;
    use crate::tools::validate_args;
    use std::sync::Arc;
    use uuid::Uuid;

    #[tokio::test]
    async fn material_defaults_reach_the_engine() {
        let context = ToolContext {
            engine: Arc::new(StubEngine::new()),
            request_id: Uuid::new_v4(),
        };
        context
            .engine
            .create_object(json!({ "name": "Cube", "kind": "cube" }))
            .await
            .unwrap();

        let mut registry = ToolRegistry::new();
        register(&mut registry).unwrap();
        let entry = registry.lookup("set_material").unwrap();
        let args = validate_args(&entry.spec, &json!({ "object": "Cube" })).unwrap();
        let result = (entry.handler)(args, context).await.unwrap();

        assert_eq!(result["object"]["material"]["roughness"], json!(0.5));
        assert_eq!(result["object"]["material"]["base_color"], json!([0.8, 0.8, 0.8, 1.0]));
        assert!(result["object"]["material"].get("object").is_none());
    }

    #[test]
    fn color_channels_are_bounded() {
        let mut registry = ToolRegistry::new();
        register(&mut registry).unwrap();
        let entry = registry.lookup("set_material").unwrap();
        let errors = validate_args(
            &entry.spec,
            &json!({ "object": "Cube", "base_color": [1.5, 0.0, 0.0, 1.0] }),
        )
        .unwrap_err();
        assert_eq!(errors[0].field, "base_color[0]");
        assert_eq!(errors[0].reason, "must be <= 1");
    }
}
