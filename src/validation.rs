//! Configuration validation against resolved schemas.
//!
//! This module validates a `serde_json::Value` configuration against either a
//! [`ResourceSchema`](crate::schema::ResourceSchema) or a
//! [`DataSourceSchema`](crate::schema::DataSourceSchema), running the
//! attribute validators carried by the schema.
//!
//! # Example
//!
//! ```
//! use provider_superschema::layer::{DataSourceLayer, ResourceLayer};
//! use provider_superschema::superschema::{Attribute, Schema};
//! use provider_superschema::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .with_attribute(
//!         "name",
//!         Attribute::string()
//!             .with_resource(ResourceLayer::new().required())
//!             .with_data_source(DataSourceLayer::new().optional()),
//!     )
//!     .with_attribute(
//!         "count",
//!         Attribute::int64().with_common(ResourceLayer::new().optional()),
//!     );
//!
//! // The name is required by the resource only.
//! let resource = schema.resolve_for_resource();
//! assert_eq!(validate(&resource, &json!({})).len(), 1);
//!
//! let data_source = schema.resolve_for_data_source();
//! assert!(validate(&data_source, &json!({})).is_empty());
//!
//! // Wrong type for count
//! let diagnostics = validate(&data_source, &json!({"count": "not a number"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("count".to_string()));
//! ```

use crate::plugin::ValidatorRequest;
use crate::schema::{
    AttributeType, Diagnostic, DiagnosticSeverity, NestedAttributes, NestingMode,
    ResolvedAttribute, ResolvedSchema,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Validate a JSON configuration against a resolved schema.
///
/// Returns a list of diagnostics for any validation errors found.
/// An empty list means the value is valid.
///
/// # Validation Rules
///
/// - Required attributes must be present and non-null
/// - Optional attributes may be absent or null
/// - Computed-only attributes are skipped (provider sets these)
/// - Attribute types must match the schema
/// - Nested attributes are validated element by element
/// - Attribute validators run once the type check passed
pub fn validate<S: ResolvedSchema>(schema: &S, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut context = Context {
        config: value,
        diagnostics: &mut diagnostics,
    };
    context.validate_object(schema.attributes(), value, "");
    diagnostics
}

/// Validate a configuration, returning Ok if valid or Err with diagnostics.
///
/// This is a convenience wrapper around [`validate`] that returns a Result.
pub fn validate_result<S: ResolvedSchema>(schema: &S, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a configuration is valid against a schema.
///
/// Returns `true` if valid, `false` otherwise.
/// Use [`validate`] to get detailed error information.
pub fn is_valid<S: ResolvedSchema>(schema: &S, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

struct Context<'a> {
    config: &'a Value,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl Context<'_> {
    fn validate_object<A: ResolvedAttribute>(
        &mut self,
        attributes: &BTreeMap<String, A>,
        value: &Value,
        path: &str,
    ) {
        let obj = match value {
            Value::Object(map) => map,
            Value::Null => {
                // Null is valid for optional objects, but we can't validate further
                return;
            },
            _ => {
                self.diagnostics.push(
                    Diagnostic::error("Expected object")
                        .with_detail(format!("Got {}", value_type_name(value)))
                        .with_attribute_if_not_empty(path),
                );
                return;
            },
        };

        for (name, attr) in attributes {
            let attr_path = join_path(path, name);
            self.validate_attribute(attr, obj.get(name), &attr_path);
        }
    }

    fn validate_attribute<A: ResolvedAttribute>(
        &mut self,
        attr: &A,
        value: Option<&Value>,
        path: &str,
    ) {
        // Skip computed-only attributes (provider sets these)
        if attr.flags().is_computed_only() {
            return;
        }

        let before = self.diagnostics.len();
        let value = value.unwrap_or(&NULL);
        match value {
            Value::Null => {
                if attr.flags().required {
                    self.diagnostics.push(
                        Diagnostic::error(format!("Missing required attribute '{}'", path))
                            .with_detail("This attribute is required and must be provided")
                            .with_attribute(path),
                    );
                }
            },
            v => match attr.nested() {
                Some(nested) => self.validate_nested(nested, v, path),
                None => self.validate_attribute_type(attr.attr_type(), v, path),
            },
        }

        if self.diagnostics.len() == before {
            for validator in attr.validators() {
                let found = validator.validate(&ValidatorRequest {
                    path,
                    value,
                    config: self.config,
                });
                self.diagnostics.extend(found);
            }
        }
    }

    fn validate_nested<A: ResolvedAttribute>(
        &mut self,
        nested: &NestedAttributes<A>,
        value: &Value,
        path: &str,
    ) {
        match (nested.nesting_mode, value) {
            (NestingMode::Single, v) => self.validate_object(&nested.attributes, v, path),
            (NestingMode::List | NestingMode::Set, Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}.{}", path, i);
                    self.validate_object(&nested.attributes, item, &item_path);
                }
            },
            (NestingMode::Map, Value::Object(entries)) => {
                for (key, item) in entries {
                    let item_path = format!("{}.{}", path, key);
                    self.validate_object(&nested.attributes, item, &item_path);
                }
            },
            (NestingMode::List, v) => self.diagnostics.push(type_error(path, "list", v)),
            (NestingMode::Set, v) => self.diagnostics.push(type_error(path, "set", v)),
            (NestingMode::Map, v) => self.diagnostics.push(type_error(path, "map", v)),
        }
    }

    fn validate_attribute_type(&mut self, attr_type: &AttributeType, value: &Value, path: &str) {
        match attr_type {
            AttributeType::String => {
                if !value.is_string() {
                    self.diagnostics.push(type_error(path, "string", value));
                }
            },
            AttributeType::Int64 => {
                if !is_int64(value) {
                    self.diagnostics.push(type_error(path, "int64", value));
                }
            },
            AttributeType::Float64 => {
                if !value.is_number() {
                    self.diagnostics.push(type_error(path, "float64", value));
                }
            },
            AttributeType::Number => {
                if !value.is_number() {
                    self.diagnostics.push(type_error(path, "number", value));
                }
            },
            AttributeType::Bool => {
                if !value.is_boolean() {
                    self.diagnostics.push(type_error(path, "bool", value));
                }
            },
            AttributeType::List(element_type) | AttributeType::Set(element_type) => {
                // Sets are represented as arrays in JSON
                if let Some(arr) = value.as_array() {
                    for (i, elem) in arr.iter().enumerate() {
                        let elem_path = format!("{}.{}", path, i);
                        self.validate_attribute_type(element_type, elem, &elem_path);
                    }
                } else {
                    let expected = if matches!(attr_type, AttributeType::Set(_)) {
                        "set"
                    } else {
                        "list"
                    };
                    self.diagnostics.push(type_error(path, expected, value));
                }
            },
            AttributeType::Map(value_type) => {
                if let Some(obj) = value.as_object() {
                    for (key, val) in obj {
                        let key_path = format!("{}.{}", path, key);
                        self.validate_attribute_type(value_type, val, &key_path);
                    }
                } else {
                    self.diagnostics.push(type_error(path, "map", value));
                }
            },
            AttributeType::Object(attrs) => {
                if let Some(obj) = value.as_object() {
                    // Object attributes within a type don't have required/optional flags,
                    // so we don't enforce presence
                    for (name, attr_type) in attrs {
                        if let Some(value) = obj.get(name) {
                            let attr_path = join_path(path, name);
                            self.validate_attribute_type(attr_type, value, &attr_path);
                        }
                    }
                } else {
                    self.diagnostics.push(type_error(path, "object", value));
                }
            },
            AttributeType::Dynamic => {
                // Dynamic accepts any value
            },
        }
    }
}

// Helper functions

static NULL: Value = Value::Null;

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_int64(value: &Value) -> bool {
    as_int64(value).is_some()
}

/// Read a JSON number as an `i64`, accepting whole floats such as `42.0`.
///
/// Values outside the `i64` range give `None`.
pub(crate) fn as_int64(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    // 2^63 itself is out of range, hence the exclusive upper bound.
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic {
        severity: DiagnosticSeverity::Error,
        summary: format!("Invalid type for attribute '{}'", path),
        detail: Some(format!(
            "Expected {}, got {}",
            expected,
            value_type_name(got)
        )),
        attribute: Some(path.to_string()),
    }
}

trait DiagnosticExt {
    fn with_attribute_if_not_empty(self, path: &str) -> Self;
}

impl DiagnosticExt for Diagnostic {
    fn with_attribute_if_not_empty(self, path: &str) -> Self {
        if path.is_empty() {
            self
        } else {
            self.with_attribute(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{DataSourceLayer, ResourceLayer};
    use crate::superschema::{Attribute, Attributes, Schema};
    use crate::validators::{exactly_one_of, int_between, size_at_least};
    use serde_json::json;

    fn required(attr: Attribute) -> Attribute {
        attr.with_common(ResourceLayer::new().required())
    }

    fn optional(attr: Attribute) -> Attribute {
        attr.with_common(ResourceLayer::new().optional())
    }

    #[test]
    fn test_validate_required_string() {
        let schema = Schema::new()
            .with_attribute("name", required(Attribute::string()))
            .resolve_for_resource();

        // Valid
        assert!(validate(&schema, &json!({"name": "test"})).is_empty());

        // Missing required
        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("name".to_string()));

        // Null value
        assert_eq!(validate(&schema, &json!({"name": null})).len(), 1);

        // Wrong type
        let diagnostics = validate(&schema, &json!({"name": 123}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid type"));
    }

    #[test]
    fn test_validate_computed_attribute_skipped() {
        let schema = Schema::new()
            .with_attribute(
                "id",
                Attribute::string().with_resource(ResourceLayer::new().computed()),
            )
            .resolve_for_resource();

        assert!(validate(&schema, &json!({})).is_empty());
        // Even with wrong type, we don't validate computed-only attrs
        assert!(validate(&schema, &json!({"id": 123})).is_empty());
    }

    #[test]
    fn test_validate_int64() {
        let schema = Schema::new()
            .with_attribute("count", required(Attribute::int64()))
            .resolve_for_data_source();

        assert!(validate(&schema, &json!({"count": 42})).is_empty());
        // Float that's actually an integer
        assert!(validate(&schema, &json!({"count": 42.0})).is_empty());
        assert_eq!(validate(&schema, &json!({"count": 42.5})).len(), 1);
        assert_eq!(validate(&schema, &json!({"count": "42"})).len(), 1);
    }

    #[test]
    fn test_validate_int64_range() {
        let schema = Schema::new()
            .with_attribute("count", required(Attribute::int64()))
            .resolve_for_resource();

        assert!(validate(&schema, &json!({"count": i64::MAX})).is_empty());
        assert!(validate(&schema, &json!({"count": i64::MIN})).is_empty());
        assert!(validate(&schema, &json!({"count": -9_223_372_036_854_775_808.0})).is_empty());

        // 2^63 does not fit, whether written as an integer or a float.
        let diagnostics = validate(&schema, &json!({"count": 9_223_372_036_854_775_808u64}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].detail.as_ref().unwrap().contains("Expected int64"));
        assert_eq!(
            validate(&schema, &json!({"count": 9_223_372_036_854_775_808.0})).len(),
            1
        );
    }

    #[test]
    fn test_validate_float64() {
        let schema = Schema::new()
            .with_attribute("ratio", required(Attribute::float64()))
            .resolve_for_data_source();

        assert!(validate(&schema, &json!({"ratio": 0.25})).is_empty());
        assert!(validate(&schema, &json!({"ratio": 2})).is_empty());

        let diagnostics = validate(&schema, &json!({"ratio": "0.25"}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].detail.as_ref().unwrap().contains("Expected float64"));
    }

    #[test]
    fn test_validate_nested_set() {
        let schema = Schema::new()
            .with_attribute(
                "members",
                optional(Attribute::set_nested(
                    Attributes::new().with_attribute("user", required(Attribute::string())),
                )),
            )
            .resolve_for_resource();

        assert!(validate(&schema, &json!({"members": [{"user": "alice"}]})).is_empty());

        let diagnostics = validate(&schema, &json!({"members": [{"user": "alice"}, {}]}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("members.1.user".to_string()));

        let diagnostics = validate(&schema, &json!({"members": {"user": "alice"}}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].detail.as_ref().unwrap().contains("Expected set"));
    }

    #[test]
    fn test_validate_number_and_bool() {
        let schema = Schema::new()
            .with_attribute("ratio", optional(Attribute::number()))
            .with_attribute("enabled", optional(Attribute::bool()))
            .resolve_for_resource();

        assert!(validate(&schema, &json!({"ratio": 0.5, "enabled": false})).is_empty());
        assert_eq!(
            validate(&schema, &json!({"ratio": "half", "enabled": "true"})).len(),
            2
        );
    }

    #[test]
    fn test_validate_list_and_map() {
        let schema = Schema::new()
            .with_attribute("tags", required(Attribute::list(AttributeType::String)))
            .with_attribute("labels", optional(Attribute::map(AttributeType::String)))
            .resolve_for_resource();

        assert!(validate(&schema, &json!({"tags": ["a", "b"]})).is_empty());

        let diagnostics = validate(&schema, &json!({"tags": ["a", 123]}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("tags.1".to_string()));

        let diagnostics = validate(&schema, &json!({"tags": [], "labels": {"env": 1}}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("labels.env".to_string()));

        assert_eq!(validate(&schema, &json!({"tags": "not a list"})).len(), 1);
    }

    #[test]
    fn test_validate_nested_list() {
        let schema = Schema::new()
            .with_attribute(
                "rules",
                Attribute::list_nested(
                    Attributes::new()
                        .with_attribute("port", required(Attribute::int64()))
                        .with_attribute(
                            "id",
                            Attribute::string().with_common(ResourceLayer::new().computed()),
                        ),
                )
                .with_common(ResourceLayer::new().optional().with_validator(size_at_least(1))),
            )
            .resolve_for_resource();

        assert!(validate(&schema, &json!({"rules": [{"port": 80}, {"port": 443}]})).is_empty());
        assert!(validate(&schema, &json!({})).is_empty());

        let diagnostics = validate(&schema, &json!({"rules": [{"port": "eighty"}]}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("rules.0.port".to_string()));

        let diagnostics = validate(&schema, &json!({"rules": [{}]}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Missing required"));

        let diagnostics = validate(&schema, &json!({"rules": []}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].detail.as_ref().unwrap().contains("at least 1"));

        let diagnostics = validate(&schema, &json!({"rules": {"port": 80}}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid type"));
    }

    #[test]
    fn test_validate_nested_map_and_single() {
        let schema = Schema::new()
            .with_attribute(
                "volumes",
                optional(Attribute::map_nested(
                    Attributes::new().with_attribute("mount_path", required(Attribute::string())),
                )),
            )
            .with_attribute(
                "config",
                optional(Attribute::single_nested(
                    Attributes::new().with_attribute("enabled", required(Attribute::bool())),
                )),
            )
            .resolve_for_data_source();

        assert!(validate(
            &schema,
            &json!({"volumes": {"data": {"mount_path": "/data"}}, "config": {"enabled": true}})
        )
        .is_empty());

        let diagnostics = validate(&schema, &json!({"volumes": {"data": {"mount_path": 1}}}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute,
            Some("volumes.data.mount_path".to_string())
        );

        let diagnostics = validate(&schema, &json!({"config": {"enabled": "yes"}}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("config.enabled".to_string()));
    }

    #[test]
    fn test_validators_run_per_context() {
        let schema = Schema::new()
            .with_attribute(
                "id",
                Attribute::string()
                    .with_resource(ResourceLayer::new().computed())
                    .with_data_source(
                        DataSourceLayer::new()
                            .optional()
                            .computed()
                            .with_validator(exactly_one_of(["name", "id"])),
                    ),
            )
            .with_attribute(
                "name",
                Attribute::string()
                    .with_resource(ResourceLayer::new().required())
                    .with_data_source(DataSourceLayer::new().optional().computed()),
            );

        let data_source = schema.resolve_for_data_source();
        assert!(is_valid(&data_source, &json!({"name": "admin"})));
        assert!(is_valid(&data_source, &json!({"id": "urn:role:1"})));

        let diagnostics = validate(&data_source, &json!({}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Invalid Attribute Combination");

        assert!(!is_valid(&data_source, &json!({"id": "x", "name": "y"})));

        // The resource side carries no such validator.
        let resource = schema.resolve_for_resource();
        assert!(is_valid(&resource, &json!({"name": "admin"})));
    }

    #[test]
    fn test_validators_skipped_after_type_error() {
        let schema = Schema::new()
            .with_attribute(
                "port",
                Attribute::int64().with_common(
                    ResourceLayer::new()
                        .required()
                        .with_validator(int_between(1, 65535)),
                ),
            )
            .resolve_for_resource();

        assert_eq!(validate(&schema, &json!({"port": "http"})).len(), 1);
        assert_eq!(validate(&schema, &json!({"port": 0})).len(), 1);
        assert!(validate(&schema, &json!({"port": 443})).is_empty());
    }

    #[test]
    fn test_int_between_sees_whole_floats() {
        let schema = Schema::new()
            .with_attribute(
                "port",
                Attribute::int64().with_common(
                    ResourceLayer::new()
                        .required()
                        .with_validator(int_between(1, 65535)),
                ),
            )
            .resolve_for_resource();

        let diagnostics = validate(&schema, &json!({"port": 0.0}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Invalid Attribute Value");
        assert!(validate(&schema, &json!({"port": 443.0})).is_empty());

        let diagnostics = validate(&schema, &json!({"port": 9_223_372_036_854_775_808u64}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid type"));
    }

    #[test]
    fn test_validate_result_helper() {
        let schema = Schema::new()
            .with_attribute("name", required(Attribute::string()))
            .resolve_for_resource();

        assert!(validate_result(&schema, &json!({"name": "test"})).is_ok());

        let result = validate_result(&schema, &json!({}));
        assert_eq!(result.unwrap_err().len(), 1);
    }

    #[test]
    fn test_validate_root_not_object() {
        let schema = Schema::new()
            .with_attribute("name", required(Attribute::string()))
            .resolve_for_resource();

        let diagnostics = validate(&schema, &json!("not an object"));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Expected object"));
        assert_eq!(diagnostics[0].attribute, None);
    }
}
