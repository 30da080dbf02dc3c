//! Request validation.
//!
//! The single site that turns an untrusted argument bundle into
//! [`ValidatedArgs`]. Validation is pure: it never touches the engine and
//! never mutates anything. It walks the declared parameters in order,
//! collects every field error rather than stopping at the first, rejects
//! unknown fields, and fills in defaults for omitted optional parameters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::error::{CoreError, CoreResult};

use super::spec::{ParamKind, ParamSpec, ToolSpec};

/// One field-level constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A constraint-satisfying argument bundle.
///
/// Only [`validate_args`] constructs one; holding a `ValidatedArgs` means
/// every constraint of the corresponding [`ToolSpec`] held and all defaults
/// are filled in.
#[derive(Debug, Clone)]
pub struct ValidatedArgs {
    values: Map<String, Value>,
}

impl ValidatedArgs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    /// Fetch a string the spec guarantees is present. Absence means the
    /// handler and its spec disagree, which is an internal fault.
    pub fn require_str(&self, name: &str) -> CoreResult<&str> {
        self.get_str(name)
            .ok_or_else(|| CoreError::Internal(format!("validated bundle missing '{name}'")))
    }

    pub fn require_f64(&self, name: &str) -> CoreResult<f64> {
        self.get_f64(name)
            .ok_or_else(|| CoreError::Internal(format!("validated bundle missing '{name}'")))
    }

    pub fn require_i64(&self, name: &str) -> CoreResult<i64> {
        self.get_i64(name)
            .ok_or_else(|| CoreError::Internal(format!("validated bundle missing '{name}'")))
    }

    /// The bundle as a JSON object, for pass-through to the engine.
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }
}

/// Validate a raw argument bundle against a tool spec.
///
/// A missing or `null` bundle is treated as `{}` so that required-parameter
/// errors name each absent field. A bundle that is not an object at all is a
/// single error on the synthetic field `arguments`.
pub fn validate_args(spec: &ToolSpec, raw: &Value) -> Result<ValidatedArgs, Vec<FieldError>> {
    let empty = Map::new();
    let raw_map = match raw {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(vec![FieldError::new(
                "arguments",
                format!("expected object, got {}", json_type_name(other)),
            )]);
        }
    };

    let mut errors = Vec::new();
    let mut values = Map::new();

    for param in &spec.params {
        match raw_map.get(&param.name) {
            Some(value) => {
                if let Some(coerced) = coerce(&param.kind, value, &param.name, &mut errors) {
                    values.insert(param.name.clone(), coerced);
                }
            }
            None if param.required => {
                errors.push(FieldError::new(&param.name, "missing required field"));
            }
            None => {
                if let Some(default) = &param.default {
                    values.insert(param.name.clone(), default.clone());
                }
            }
        }
    }

    for key in raw_map.keys() {
        if !spec.params.iter().any(|param| &param.name == key) {
            errors.push(FieldError::new(key, "unknown field"));
        }
    }

    if errors.is_empty() {
        Ok(ValidatedArgs { values })
    } else {
        Err(errors)
    }
}

/// Check `value` against `kind`, appending errors under `field`. Returns the
/// normalized value when every constraint held (enum matches are rewritten to
/// their declared spelling).
pub(crate) fn coerce(
    kind: &ParamKind,
    value: &Value,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    match kind {
        ParamKind::String {
            min_len,
            max_len,
            forbidden_chars,
        } => {
            let text = match value.as_str() {
                Some(text) => text,
                None => {
                    errors.push(type_error(field, "string", value));
                    return None;
                }
            };
            let before = errors.len();
            let len = text.chars().count();
            if let Some(min) = min_len {
                if len < *min {
                    errors.push(FieldError::new(field, format!("must be at least {min} characters")));
                }
            }
            if let Some(max) = max_len {
                if len > *max {
                    errors.push(FieldError::new(field, format!("must be at most {max} characters")));
                }
            }
            if text.chars().any(|c| forbidden_chars.contains(&c)) {
                let listed: String = forbidden_chars
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                errors.push(FieldError::new(field, format!("must not contain any of: {listed}")));
            }
            (errors.len() == before).then(|| value.clone())
        }
        ParamKind::Number {
            min,
            max,
            exclusive_min,
            exclusive_max,
        } => {
            let number = match value.as_f64() {
                Some(number) => number,
                None => {
                    errors.push(type_error(field, "number", value));
                    return None;
                }
            };
            let before = errors.len();
            if let Some(min) = min {
                let ok = if *exclusive_min { number > *min } else { number >= *min };
                if !ok {
                    let op = if *exclusive_min { ">" } else { ">=" };
                    errors.push(FieldError::new(field, format!("must be {op} {min}")));
                }
            }
            if let Some(max) = max {
                let ok = if *exclusive_max { number < *max } else { number <= *max };
                if !ok {
                    let op = if *exclusive_max { "<" } else { "<=" };
                    errors.push(FieldError::new(field, format!("must be {op} {max}")));
                }
            }
            (errors.len() == before).then(|| value.clone())
        }
        ParamKind::Integer { min, max } => {
            let number = match value.as_i64() {
                Some(number) => number,
                None => {
                    errors.push(type_error(field, "integer", value));
                    return None;
                }
            };
            let before = errors.len();
            if let Some(min) = min {
                if number < *min {
                    errors.push(FieldError::new(field, format!("must be >= {min}")));
                }
            }
            if let Some(max) = max {
                if number > *max {
                    errors.push(FieldError::new(field, format!("must be <= {max}")));
                }
            }
            (errors.len() == before).then(|| value.clone())
        }
        ParamKind::Boolean => {
            if value.is_boolean() {
                Some(value.clone())
            } else {
                errors.push(type_error(field, "boolean", value));
                None
            }
        }
        ParamKind::Enum {
            variants,
            case_sensitive,
        } => {
            let text = match value.as_str() {
                Some(text) => text,
                None => {
                    errors.push(type_error(field, "string", value));
                    return None;
                }
            };
            let matched = variants.iter().find(|variant| {
                if *case_sensitive {
                    variant.as_str() == text
                } else {
                    variant.eq_ignore_ascii_case(text)
                }
            });
            match matched {
                Some(variant) => Some(Value::String(variant.clone())),
                None => {
                    errors.push(FieldError::new(
                        field,
                        format!("must be one of: {}", variants.join(", ")),
                    ));
                    None
                }
            }
        }
        ParamKind::Sequence {
            item,
            min_items,
            max_items,
        } => {
            let items = match value.as_array() {
                Some(items) => items,
                None => {
                    errors.push(type_error(field, "array", value));
                    return None;
                }
            };
            let before = errors.len();
            match (min_items, max_items) {
                (Some(min), Some(max)) if min == max && items.len() != *min => {
                    errors.push(FieldError::new(field, format!("must have exactly {min} items")));
                }
                _ => {
                    if let Some(min) = min_items {
                        if items.len() < *min {
                            errors.push(FieldError::new(field, format!("must have at least {min} items")));
                        }
                    }
                    if let Some(max) = max_items {
                        if items.len() > *max {
                            errors.push(FieldError::new(field, format!("must have at most {max} items")));
                        }
                    }
                }
            }
            let mut coerced = Vec::with_capacity(items.len());
            for (i, element) in items.iter().enumerate() {
                if let Some(element) = coerce(item, element, &format!("{field}[{i}]"), errors) {
                    coerced.push(element);
                }
            }
            (errors.len() == before).then(|| Value::Array(coerced))
        }
        ParamKind::Object { fields } => {
            let map = match value.as_object() {
                Some(map) => map,
                None => {
                    errors.push(type_error(field, "object", value));
                    return None;
                }
            };
            let before = errors.len();
            let mut values = Map::new();
            for spec_field in fields {
                let path = format!("{field}.{}", spec_field.name);
                match map.get(&spec_field.name) {
                    Some(value) => {
                        if let Some(coerced) = coerce(&spec_field.kind, value, &path, errors) {
                            values.insert(spec_field.name.clone(), coerced);
                        }
                    }
                    None if spec_field.required => {
                        errors.push(FieldError::new(path, "missing required field"));
                    }
                    None => {
                        if let Some(default) = &spec_field.default {
                            values.insert(spec_field.name.clone(), default.clone());
                        }
                    }
                }
            }
            for key in map.keys() {
                if !fields.iter().any(|spec_field| &spec_field.name == key) {
                    errors.push(FieldError::new(format!("{field}.{key}"), "unknown field"));
                }
            }
            (errors.len() == before).then(|| Value::Object(values))
        }
    }
}

fn type_error(field: &str, expected: &str, value: &Value) -> FieldError {
    FieldError::new(field, format!("expected {expected}, got {}", json_type_name(value)))
}

/// Returns a human-readable name for the JSON type of a value.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
