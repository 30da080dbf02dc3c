//! Blender tool catalog.
//!
//! Each submodule is one tool pack: it declares [`ToolSpec`]s and the
//! handlers that delegate to the engine, and registers them via its
//! `register` function. `register_all` is the startup registration phase;
//! after it returns the registry is frozen.

pub mod camera;
pub mod light;
pub mod material;
pub mod object;
pub mod render;
pub mod scene;

use serde_json::json;

use crate::error::CoreResult;
use crate::tools::{ParamKind, ParamSpec, ToolRegistry};

/// Characters Blender rejects in object names.
pub(crate) const NAME_FORBIDDEN_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// World-coordinate bound applied to every location channel.
pub(crate) const COORDINATE_LIMIT: f64 = 10_000.0;

/// Register every tool pack.
pub fn register_all(registry: &mut ToolRegistry) -> CoreResult<()> {
    object::register(registry)?;
    scene::register(registry)?;
    material::register(registry)?;
    light::register(registry)?;
    camera::register(registry)?;
    render::register(registry)?;
    Ok(())
}

/// Blender object name: 1–63 characters, no path or wildcard characters.
pub(crate) fn object_name_kind() -> ParamKind {
    ParamKind::String {
        min_len: Some(1),
        max_len: Some(63),
        forbidden_chars: NAME_FORBIDDEN_CHARS.to_vec(),
    }
}

/// Three world coordinates, each within ±[`COORDINATE_LIMIT`].
pub(crate) fn coordinate_kind() -> ParamKind {
    ParamKind::Sequence {
        item: Box::new(ParamKind::number_range(-COORDINATE_LIMIT, COORDINATE_LIMIT)),
        min_items: Some(3),
        max_items: Some(3),
    }
}

/// Euler rotation: three unconstrained radians.
pub(crate) fn rotation_kind() -> ParamKind {
    ParamKind::Sequence {
        item: Box::new(ParamKind::number()),
        min_items: Some(3),
        max_items: Some(3),
    }
}

/// Color with `channels` components, each in [0, 1].
pub(crate) fn color_kind(channels: usize) -> ParamKind {
    ParamKind::Sequence {
        item: Box::new(ParamKind::number_range(0.0, 1.0)),
        min_items: Some(channels),
        max_items: Some(channels),
    }
}

/// The common optional `location` parameter, defaulting to the origin.
pub(crate) fn location_param() -> ParamSpec {
    ParamSpec::optional(
        "location",
        "Placement in world space (x, y, z)",
        coordinate_kind(),
        json!([0.0, 0.0, 0.0]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::validate_args;
    use crate::tools::ToolSpec;

    #[test]
    fn register_all_succeeds_on_a_fresh_registry() {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry).unwrap();
        assert!(registry.len() >= 11);
    }

    #[test]
    fn every_catalog_spec_satisfies_its_invariants() {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry).unwrap();
        for spec in registry.list() {
            assert!(spec.check_invariants().is_ok(), "bad spec: {}", spec.name);
        }
    }

    #[test]
    fn object_names_reject_path_characters() {
        let spec = ToolSpec::new(
            "t",
            "",
            vec![crate::tools::ParamSpec::required("name", "", object_name_kind())],
        );
        assert!(validate_args(&spec, &json!({ "name": "a/b" })).is_err());
        assert!(validate_args(&spec, &json!({ "name": "" })).is_err());
        assert!(validate_args(&spec, &json!({ "name": "Cube" })).is_ok());
    }

    #[test]
    fn coordinates_are_bounded() {
        let spec = ToolSpec::new(
            "t",
            "",
            vec![crate::tools::ParamSpec::required("location", "", coordinate_kind())],
        );
        assert!(validate_args(&spec, &json!({ "location": [0, 0, 10001] })).is_err());
        assert!(validate_args(&spec, &json!({ "location": [0, 0, -10000] })).is_ok());
    }
}
