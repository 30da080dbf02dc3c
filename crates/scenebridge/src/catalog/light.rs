//! Light tools.

use serde_json::{json, Value};

use crate::engine::Engine;
use crate::error::CoreResult;
use crate::tools::{handler_fn, ParamKind, ParamSpec, ToolContext, ToolRegistry, ToolSpec, ValidatedArgs};

use super::{color_kind, location_param, object_name_kind};

pub fn register(registry: &mut ToolRegistry) -> CoreResult<()> {
    registry.register(create_light_spec(), handler_fn(create_light))
}

fn create_light_spec() -> ToolSpec {
    ToolSpec::new(
        "create_light",
        "Add a light to the scene.",
        vec![
            ParamSpec::required("name", "Name for the light object", object_name_kind()),
            ParamSpec::optional(
                "kind",
                "Light kind",
                ParamKind::enumeration(&["point", "sun", "spot", "area"]),
                json!("point"),
            ),
            ParamSpec::optional(
                "energy",
                "Light power in watts",
                ParamKind::Number {
                    min: Some(0.0),
                    max: Some(1_000_000.0),
                    exclusive_min: true,
                    exclusive_max: false,
                },
                json!(1000.0),
            ),
            ParamSpec::optional("color", "RGB light color, each channel in [0, 1]", color_kind(3), json!([1.0, 1.0, 1.0])),
            location_param(),
        ],
    )
}

async fn create_light(args: ValidatedArgs, context: ToolContext) -> CoreResult<Value> {
    let name = args.require_str("name")?.to_string();
    let kind = args.require_str("kind")?.to_string();
    let light = context.engine.create_light(args.to_value()).await?;
    Ok(json!({
        "message": format!("Created {kind} light '{name}'"),
        "object": light,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StubEngine;
    use crate::tools::validate_args;
    use std::sync::Arc;
    use uuid::Uuid;

    fn entry_args(raw: serde_json::Value) -> Result<ValidatedArgs, Vec<crate::tools::FieldError>> {
        let mut registry = ToolRegistry::new();
        register(&mut registry).unwrap();
        let entry = registry.lookup("create_light").unwrap();
        validate_args(&entry.spec, &raw)
    }

    #[tokio::test]
    async fn light_kind_is_normalized_to_declared_spelling() {
        let mut registry = ToolRegistry::new();
        register(&mut registry).unwrap();
        let entry = registry.lookup("create_light").unwrap();
        let args = validate_args(&entry.spec, &json!({ "name": "Key", "kind": "SUN" })).unwrap();
        let context = ToolContext {
            engine: Arc::new(StubEngine::new()),
            request_id: Uuid::new_v4(),
        };
        let result = (entry.handler)(args, context).await.unwrap();

        assert_eq!(result["message"], "Created sun light 'Key'");
        assert_eq!(result["object"]["kind"], "sun");
        assert_eq!(result["object"]["energy"], json!(1000.0));
    }

    #[test]
    fn unknown_light_kind_rejected() {
        let errors = entry_args(json!({ "name": "Key", "kind": "laser" })).unwrap_err();
        assert_eq!(errors[0].field, "kind");
        assert_eq!(errors[0].reason, "must be one of: point, sun, spot, area");
    }

    #[test]
    fn energy_must_be_positive() {
        let errors = entry_args(json!({ "name": "Key", "energy": 0 })).unwrap_err();
        assert_eq!(errors[0].field, "energy");
        assert_eq!(errors[0].reason, "must be > 0");
    }
}
