//! Static preference schema.
//!
//! A [`PreferenceDefinition`] describes one configuration key: its ordered
//! set of allowed scalar values, an optional default, and optional parallel
//! description arrays. Definitions are parsed once from a JSON-Schema-style
//! document and never change afterwards.

use serde_json::{Map, Value};

/// Errors raised while parsing a schema document.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Schema root was not a JSON object.
    #[error("schema root must be an object, got {actual}")]
    RootNotObject { actual: String },

    /// Schema object carries no `properties` map.
    #[error("schema has no `properties` object")]
    MissingProperties,

    /// A field had an unexpected shape.
    #[error("type mismatch at `{path}`: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },
}

/// Static schema for a single configuration key.
///
/// `enum_descriptions` and `markdown_enum_descriptions` are parallel to
/// `enum_values` but may be shorter; entries past their length are simply
/// absent. That is valid, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceDefinition {
    /// Configuration key this definition describes.
    pub key: String,
    /// Human-readable title, if the schema provides one.
    pub title: Option<String>,
    /// Free-form description of the key itself.
    pub description: Option<String>,
    /// Ordered list of allowed scalar values. Empty when the key is not
    /// enumerated.
    pub enum_values: Vec<Value>,
    /// Default value, if declared.
    pub default: Option<Value>,
    /// Plain-text per-option descriptions, parallel to `enum_values`.
    pub enum_descriptions: Vec<String>,
    /// Markdown per-option descriptions, parallel to `enum_values`.
    pub markdown_enum_descriptions: Vec<String>,
}

impl PreferenceDefinition {
    /// Whether this key declares a non-empty enumerated value set.
    pub fn has_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }

    /// Build a definition from one entry of a schema `properties` map.
    ///
    /// Tolerant by design: absent or oddly typed description fields are
    /// dropped rather than rejected. Only an `enum` that is present but not
    /// an array is a hard error.
    pub fn from_schema_object(key: &str, object: &Map<String, Value>) -> Result<Self, SchemaError> {
        let enum_values = match object.get("enum") {
            None => Vec::new(),
            Some(Value::Array(values)) => values.clone(),
            Some(other) => {
                return Err(SchemaError::TypeMismatch {
                    path: format!("{key}.enum"),
                    expected: "array".to_string(),
                    actual: format!("{other}"),
                });
            }
        };

        Ok(PreferenceDefinition {
            key: key.to_string(),
            title: string_field(object, "title"),
            description: string_field(object, "description"),
            enum_values,
            default: object.get("default").cloned(),
            enum_descriptions: string_array_field(object, "enumDescriptions"),
            markdown_enum_descriptions: string_array_field(object, "markdownEnumDescriptions"),
        })
    }
}

fn string_field(object: &Map<String, Value>, field: &str) -> Option<String> {
    object.get(field).and_then(Value::as_str).map(str::to_string)
}

fn string_array_field(object: &Map<String, Value>, field: &str) -> Vec<String> {
    match object.get(field) {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Collect definitions for every top-level property of a schema document.
///
/// Properties that are `$ref`s (directly or through a single-element
/// `allOf`, the shapes `schemars` emits) are resolved against the document's
/// `$defs`/`definitions` before parsing.
pub fn collect_definitions(schema: &Value) -> Result<Vec<PreferenceDefinition>, SchemaError> {
    let root = schema.as_object().ok_or_else(|| SchemaError::RootNotObject {
        actual: type_name(schema).to_string(),
    })?;

    let properties = root
        .get("properties")
        .and_then(Value::as_object)
        .ok_or(SchemaError::MissingProperties)?;

    let mut definitions = Vec::with_capacity(properties.len());
    for (key, property) in properties {
        let resolved = resolve_ref(schema, property);
        let Some(object) = resolved.as_object() else {
            continue;
        };
        definitions.push(PreferenceDefinition::from_schema_object(key, object)?);
    }
    Ok(definitions)
}

/// Follow `$ref` chains within the same document.
fn resolve_ref<'a>(schema: &'a Value, property: &'a Value) -> &'a Value {
    let Some(object) = property.as_object() else {
        return property;
    };

    let reference = object.get("$ref").and_then(Value::as_str).or_else(|| {
        // schemars sometimes wraps the ref in a one-element allOf.
        object
            .get("allOf")
            .and_then(Value::as_array)
            .filter(|entries| entries.len() == 1)
            .and_then(|entries| entries[0].as_object())
            .and_then(|entry| entry.get("$ref"))
            .and_then(Value::as_str)
    });

    let Some(reference) = reference else {
        return property;
    };

    let name = reference
        .strip_prefix("#/$defs/")
        .or_else(|| reference.strip_prefix("#/definitions/"));
    let Some(name) = name else {
        return property;
    };

    let target = schema
        .get("$defs")
        .and_then(|defs| defs.get(name))
        .or_else(|| schema.get("definitions").and_then(|defs| defs.get(name)));

    match target {
        Some(target) => resolve_ref(schema, target),
        None => property,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collects_enum_definition_in_order() {
        let schema = json!({
            "properties": {
                "size": {
                    "title": "Size",
                    "enum": ["small", "medium", "large"],
                    "default": "medium",
                    "enumDescriptions": ["tiny", "regular"]
                }
            }
        });

        let defs = collect_definitions(&schema).unwrap();
        assert_eq!(defs.len(), 1);
        let def = &defs[0];
        assert_eq!(def.key, "size");
        assert_eq!(def.title.as_deref(), Some("Size"));
        assert_eq!(def.enum_values, vec![json!("small"), json!("medium"), json!("large")]);
        assert_eq!(def.default, Some(json!("medium")));
        assert_eq!(def.enum_descriptions, vec!["tiny", "regular"]);
        assert!(def.markdown_enum_descriptions.is_empty());
        assert!(def.has_enum());
    }

    #[test]
    fn non_enum_property_is_kept_without_enum_values() {
        let schema = json!({
            "properties": {
                "threads": { "type": "integer", "default": 4 }
            }
        });

        let defs = collect_definitions(&schema).unwrap();
        assert_eq!(defs[0].default, Some(json!(4)));
        assert!(!defs[0].has_enum());
    }

    #[test]
    fn resolves_refs_through_defs_and_all_of() {
        let schema = json!({
            "properties": {
                "mode": { "$ref": "#/$defs/Mode" },
                "arch": { "allOf": [{ "$ref": "#/definitions/Arch" }] }
            },
            "$defs": {
                "Mode": { "type": "string", "enum": ["debug", "release"] }
            },
            "definitions": {
                "Arch": { "enum": ["x86_64", "aarch64"], "default": "aarch64" }
            }
        });

        let defs = collect_definitions(&schema).unwrap();
        let mode = defs.iter().find(|d| d.key == "mode").unwrap();
        assert_eq!(mode.enum_values, vec![json!("debug"), json!("release")]);
        let arch = defs.iter().find(|d| d.key == "arch").unwrap();
        assert_eq!(arch.default, Some(json!("aarch64")));
    }

    #[test]
    fn rejects_non_object_root() {
        let err = collect_definitions(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, SchemaError::RootNotObject { .. }));
    }

    #[test]
    fn rejects_missing_properties() {
        let err = collect_definitions(&json!({ "type": "object" })).unwrap_err();
        assert!(matches!(err, SchemaError::MissingProperties));
    }

    #[test]
    fn rejects_non_array_enum() {
        let schema = json!({
            "properties": { "mode": { "enum": "debug" } }
        });
        let err = collect_definitions(&schema).unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { .. }));
    }
}
