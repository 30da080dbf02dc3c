//! Tool schema model.
//!
//! A [`ToolSpec`] is the machine-readable contract for one tool: its name,
//! description, and ordered parameter list. The catalog surface serializes
//! specs as JSON Schema via [`ToolSpec::input_schema`]; the validator walks
//! the same typed model, so the advertised contract and the enforced one
//! cannot drift apart.

use serde_json::{json, Map, Value};

use super::validate;

/// Schema description of one tool's accepted arguments.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Unique tool name, the key callers invoke by.
    pub name: String,
    /// Human-readable description shown in the catalog.
    pub description: String,
    /// Parameters in declared order.
    pub params: Vec<ParamSpec>,
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub description: String,
    pub kind: ParamKind,
    pub required: bool,
    /// Applied when an optional parameter is omitted. Required parameters
    /// never carry one.
    pub default: Option<Value>,
}

/// Semantic type and constraint set of a parameter value.
#[derive(Debug, Clone)]
pub enum ParamKind {
    String {
        /// Length bounds in characters, inclusive.
        min_len: Option<usize>,
        max_len: Option<usize>,
        forbidden_chars: Vec<char>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
        /// Whether `min`/`max` are exclusive bounds.
        exclusive_min: bool,
        exclusive_max: bool,
    },
    Integer {
        /// Inclusive bounds.
        min: Option<i64>,
        max: Option<i64>,
    },
    Boolean,
    Enum {
        variants: Vec<String>,
        /// When false, matching ignores ASCII case and the validated value
        /// is normalized to the declared spelling.
        case_sensitive: bool,
    },
    Sequence {
        item: Box<ParamKind>,
        /// Item-count bounds, inclusive.
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    Object {
        fields: Vec<ParamSpec>,
    },
}

impl ParamSpec {
    pub fn required(name: &str, description: &str, kind: ParamKind) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &str, description: &str, kind: ParamKind, default: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            required: false,
            default: Some(default),
        }
    }

    /// Optional parameter that is simply absent when omitted.
    pub fn optional_no_default(name: &str, description: &str, kind: ParamKind) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            required: false,
            default: None,
        }
    }
}

impl ParamKind {
    pub fn free_string() -> Self {
        ParamKind::String {
            min_len: None,
            max_len: None,
            forbidden_chars: Vec::new(),
        }
    }

    pub fn string(min_len: usize, max_len: usize) -> Self {
        ParamKind::String {
            min_len: Some(min_len),
            max_len: Some(max_len),
            forbidden_chars: Vec::new(),
        }
    }

    pub fn number() -> Self {
        ParamKind::Number {
            min: None,
            max: None,
            exclusive_min: false,
            exclusive_max: false,
        }
    }

    /// Inclusive numeric range.
    pub fn number_range(min: f64, max: f64) -> Self {
        ParamKind::Number {
            min: Some(min),
            max: Some(max),
            exclusive_min: false,
            exclusive_max: false,
        }
    }

    /// Inclusive integer range.
    pub fn integer_range(min: i64, max: i64) -> Self {
        ParamKind::Integer {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Case-insensitive enumeration over the declared variants.
    pub fn enumeration(variants: &[&str]) -> Self {
        ParamKind::Enum {
            variants: variants.iter().map(|v| v.to_string()).collect(),
            case_sensitive: false,
        }
    }
}

impl ToolSpec {
    pub fn new(name: &str, description: &str, params: Vec<ParamSpec>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params,
        }
    }

    /// Render the JSON Schema advertised in the catalog.
    ///
    /// Unknown fields are rejected at validation time, so the schema says
    /// `additionalProperties: false`.
    pub fn input_schema(&self) -> Value {
        object_schema(&self.params)
    }

    /// Enforce the schema-model invariants: unique parameter names, no
    /// defaults on required parameters, every default satisfying its own
    /// constraints. Registration refuses specs that fail.
    pub fn check_invariants(&self) -> Result<(), String> {
        check_params(&self.name, &self.params)
    }
}

fn check_params(context: &str, params: &[ParamSpec]) -> Result<(), String> {
    for (i, param) in params.iter().enumerate() {
        if params[..i].iter().any(|other| other.name == param.name) {
            return Err(format!("{context}: duplicate parameter '{}'", param.name));
        }
        if param.required && param.default.is_some() {
            return Err(format!(
                "{context}: required parameter '{}' must not carry a default",
                param.name
            ));
        }
        if let Some(default) = &param.default {
            let mut errors = Vec::new();
            validate::coerce(&param.kind, default, &param.name, &mut errors);
            if let Some(error) = errors.first() {
                return Err(format!(
                    "{context}: default for '{}' violates its own constraints: {}",
                    param.name, error.reason
                ));
            }
        }
        if let ParamKind::Object { fields } = &param.kind {
            check_params(&format!("{context}.{}", param.name), fields)?;
        }
    }
    Ok(())
}

fn object_schema(params: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for param in params {
        properties.insert(param.name.clone(), param_schema(param));
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn param_schema(param: &ParamSpec) -> Value {
    let mut schema = kind_schema(&param.kind);
    if let Some(map) = schema.as_object_mut() {
        if !param.description.is_empty() {
            map.insert("description".to_string(), json!(param.description));
        }
        if let Some(default) = &param.default {
            map.insert("default".to_string(), default.clone());
        }
    }
    schema
}

fn kind_schema(kind: &ParamKind) -> Value {
    match kind {
        ParamKind::String {
            min_len,
            max_len,
            forbidden_chars,
        } => {
            let mut map = Map::new();
            map.insert("type".to_string(), json!("string"));
            if let Some(min) = min_len {
                map.insert("minLength".to_string(), json!(min));
            }
            if let Some(max) = max_len {
                map.insert("maxLength".to_string(), json!(max));
            }
            if !forbidden_chars.is_empty() {
                map.insert("pattern".to_string(), json!(forbidden_pattern(forbidden_chars)));
            }
            Value::Object(map)
        }
        ParamKind::Number {
            min,
            max,
            exclusive_min,
            exclusive_max,
        } => {
            let mut map = Map::new();
            map.insert("type".to_string(), json!("number"));
            if let Some(min) = min {
                let key = if *exclusive_min { "exclusiveMinimum" } else { "minimum" };
                map.insert(key.to_string(), json!(min));
            }
            if let Some(max) = max {
                let key = if *exclusive_max { "exclusiveMaximum" } else { "maximum" };
                map.insert(key.to_string(), json!(max));
            }
            Value::Object(map)
        }
        ParamKind::Integer { min, max } => {
            let mut map = Map::new();
            map.insert("type".to_string(), json!("integer"));
            if let Some(min) = min {
                map.insert("minimum".to_string(), json!(min));
            }
            if let Some(max) = max {
                map.insert("maximum".to_string(), json!(max));
            }
            Value::Object(map)
        }
        ParamKind::Boolean => json!({ "type": "boolean" }),
        ParamKind::Enum { variants, .. } => json!({ "type": "string", "enum": variants }),
        ParamKind::Sequence {
            item,
            min_items,
            max_items,
        } => {
            let mut map = Map::new();
            map.insert("type".to_string(), json!("array"));
            map.insert("items".to_string(), kind_schema(item));
            if let Some(min) = min_items {
                map.insert("minItems".to_string(), json!(min));
            }
            if let Some(max) = max_items {
                map.insert("maxItems".to_string(), json!(max));
            }
            Value::Object(map)
        }
        ParamKind::Object { fields } => object_schema(fields),
    }
}

/// Regex rejecting any of the given characters anywhere in the string.
fn forbidden_pattern(chars: &[char]) -> String {
    let mut class = String::new();
    for c in chars {
        if matches!(c, '\\' | ']' | '^' | '-') {
            class.push('\\');
        }
        class.push(*c);
    }
    format!("^[^{class}]*$")
}
