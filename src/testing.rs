//! Testing utilities for superschema declarations.
//!
//! This module provides a harness to check how a [`Schema`] resolves in both
//! contexts without wiring it into a provider.
//!
//! # Example
//!
//! ```
//! use provider_superschema::layer::{DataSourceLayer, ResourceLayer};
//! use provider_superschema::superschema::{Attribute, Schema};
//! use provider_superschema::testing::SchemaTester;
//! use serde_json::json;
//!
//! let tester = SchemaTester::new(
//!     Schema::new().with_attribute(
//!         "name",
//!         Attribute::string()
//!             .with_resource(ResourceLayer::new().required())
//!             .with_data_source(DataSourceLayer::new().optional().computed()),
//!     ),
//! );
//!
//! assert!(tester.resource_attribute("name").unwrap().flags.required);
//! assert!(tester.validate_resource_config(json!({})).is_err());
//! assert!(tester.validate_data_source_config(json!({})).is_ok());
//! tester.assert_idempotent().unwrap();
//! ```

use crate::error::SchemaError;
use crate::plugin::{PlanModifier, PlanModifierRequest, PlanModifierResponse};
use crate::schema::{
    DataSourceAttribute, DataSourceSchema, Diagnostic, DiagnosticSeverity, ResolvedAttribute,
    ResourceAttribute, ResourceSchema,
};
use crate::superschema::{ResolveOptions, Schema};
use crate::validation;
use serde_json::Value;
use std::collections::BTreeMap;

/// A test harness for superschema declarations.
///
/// The schema is resolved once per context when the tester is created.
#[derive(Debug, Clone)]
pub struct SchemaTester {
    schema: Schema,
    resource: ResourceSchema,
    data_source: DataSourceSchema,
}

impl SchemaTester {
    /// Create a new tester, resolving `schema` permissively.
    pub fn new(schema: Schema) -> Self {
        let resource = schema.resolve_for_resource();
        let data_source = schema.resolve_for_data_source();
        Self {
            schema,
            resource,
            data_source,
        }
    }

    /// Create a new tester, rejecting declaration mistakes.
    pub fn strict(schema: Schema) -> Result<Self, TestError> {
        let options = ResolveOptions::strict();
        let resource = schema.resolve_for_resource_with(&options)?;
        let data_source = schema.resolve_for_data_source_with(&options)?;
        Ok(Self {
            schema,
            resource,
            data_source,
        })
    }

    // =========================================================================
    // Schemas
    // =========================================================================

    /// Get the declaration under test.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Get the resolved resource schema.
    pub fn resource_schema(&self) -> &ResourceSchema {
        &self.resource
    }

    /// Get the resolved data source schema.
    pub fn data_source_schema(&self) -> &DataSourceSchema {
        &self.data_source
    }

    /// Look up a resource attribute by dotted path, e.g. `"rules.port"`.
    pub fn resource_attribute(&self, path: &str) -> Result<&ResourceAttribute, TestError> {
        lookup(&self.resource.attributes, path)
    }

    /// Look up a data source attribute by dotted path.
    pub fn data_source_attribute(&self, path: &str) -> Result<&DataSourceAttribute, TestError> {
        lookup(&self.data_source.attributes, path)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Validate a resource configuration.
    ///
    /// Returns `Ok(())` if validation passes (no error diagnostics).
    /// Returns `Err` with the diagnostics if there are errors.
    pub fn validate_resource_config(&self, config: Value) -> Result<(), TestError> {
        check_diagnostics(validation::validate(&self.resource, &config))
    }

    /// Validate a data source configuration.
    pub fn validate_data_source_config(&self, config: Value) -> Result<(), TestError> {
        check_diagnostics(validation::validate(&self.data_source, &config))
    }

    // =========================================================================
    // Planning
    // =========================================================================

    /// Run the plan modifiers of the resource attribute at `path`.
    ///
    /// `plan` is the proposed value; `null` stands for unknown.
    pub fn plan_attribute(
        &self,
        path: &str,
        state: Option<&Value>,
        plan: &Value,
        config: &Value,
    ) -> Result<PlanModifierResponse, TestError> {
        let attr = self.resource_attribute(path)?;
        Ok(PlanModifier::apply_all(
            &attr.plan_modifiers,
            &PlanModifierRequest {
                path,
                state,
                plan,
                config,
            },
        ))
    }

    /// The default value of the resource attribute at `path`, if it has one.
    pub fn default_value(&self, path: &str) -> Result<Option<Value>, TestError> {
        let attr = self.resource_attribute(path)?;
        Ok(attr.default.as_ref().map(|default| default.value()))
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Check that resolving the declaration again gives the same schemas.
    pub fn assert_idempotent(&self) -> Result<(), TestError> {
        if self.schema.resolve_for_resource() != self.resource {
            return Err(TestError::NotIdempotent("resource"));
        }
        if self.schema.resolve_for_data_source() != self.data_source {
            return Err(TestError::NotIdempotent("data source"));
        }
        Ok(())
    }
}

/// Error type for test operations.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The declaration was rejected.
    Schema(SchemaError),
    /// No attribute exists at the given path.
    MissingAttribute(String),
    /// Resolving twice gave different schemas for the named context.
    NotIdempotent(&'static str),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Schema(e) => write!(f, "Schema error: {}", e),
            TestError::MissingAttribute(path) => write!(f, "No attribute at '{}'", path),
            TestError::NotIdempotent(context) => {
                write!(f, "Resolving the {} schema twice gave different results", context)
            },
        }
    }
}

impl std::error::Error for TestError {}

impl From<SchemaError> for TestError {
    fn from(e: SchemaError) -> Self {
        TestError::Schema(e)
    }
}

/// Check diagnostics and return an error if there are any errors.
fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics
        .into_iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

fn lookup<'a, A: ResolvedAttribute>(
    attributes: &'a BTreeMap<String, A>,
    path: &str,
) -> Result<&'a A, TestError> {
    let missing = || TestError::MissingAttribute(path.to_string());

    let mut found: Option<&'a A> = None;
    for segment in path.split('.') {
        let attr = match found {
            None => attributes.get(segment),
            Some(parent) => parent
                .nested()
                .and_then(|nested| nested.attributes.get(segment)),
        };
        found = Some(attr.ok_or_else(missing)?);
    }
    found.ok_or_else(missing)
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that `diagnostics` holds an error for the attribute at `path`.
///
/// # Panics
///
/// Panics if no error diagnostic points at `path`.
pub fn assert_error_at(diagnostics: &[Diagnostic], path: &str) {
    assert!(
        diagnostics
            .iter()
            .any(|d| d.is_error() && d.attribute.as_deref() == Some(path)),
        "Expected an error at '{}', got: {:?}",
        path,
        diagnostics
    );
}

/// Assert that `diagnostics` holds no error.
///
/// # Panics
///
/// Panics if any error diagnostic is present.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();
    assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::static_value;
    use crate::layer::{DataSourceLayer, ResourceLayer};
    use crate::planmodifiers::use_state_for_unknown;
    use crate::superschema::{Attribute, Attributes};
    use serde_json::json;

    fn network_schema() -> Schema {
        Schema::new()
            .with_attribute(
                "id",
                Attribute::string()
                    .with_resource(
                        ResourceLayer::new()
                            .computed()
                            .with_plan_modifier(use_state_for_unknown()),
                    )
                    .with_data_source(DataSourceLayer::new().required()),
            )
            .with_attribute(
                "mtu",
                Attribute::int64()
                    .with_resource(ResourceLayer::new().optional().computed().with_default(static_value(1500)))
                    .with_data_source(DataSourceLayer::new().computed()),
            )
            .with_attribute(
                "subnets",
                Attribute::list_nested(Attributes::new().with_attribute(
                    "cidr",
                    Attribute::string()
                        .with_resource(ResourceLayer::new().required())
                        .with_data_source(DataSourceLayer::new().computed()),
                ))
                .with_resource(ResourceLayer::new().optional())
                .with_data_source(DataSourceLayer::new().computed()),
            )
    }

    #[test]
    fn test_attribute_lookup() {
        let tester = SchemaTester::new(network_schema());

        assert!(tester.resource_attribute("id").unwrap().flags.computed);
        assert!(tester.data_source_attribute("id").unwrap().flags.required);
        assert!(tester.resource_attribute("subnets.cidr").unwrap().flags.required);
        assert!(tester.data_source_attribute("subnets.cidr").unwrap().flags.computed);

        let err = tester.resource_attribute("subnets.gateway").unwrap_err();
        assert!(matches!(err, TestError::MissingAttribute(ref path) if path == "subnets.gateway"));
        // Scalars have no children.
        assert!(tester.resource_attribute("id.value").is_err());
        assert!(tester.resource_attribute("").is_err());
    }

    #[test]
    fn test_validate_configs() {
        let tester = SchemaTester::new(network_schema());

        assert!(tester
            .validate_resource_config(json!({"subnets": [{"cidr": "10.0.0.0/24"}]}))
            .is_ok());

        let result = tester.validate_resource_config(json!({"subnets": [{}]}));
        match result {
            Err(TestError::Diagnostics(diags)) => assert_error_at(&diags, "subnets.0.cidr"),
            other => panic!("Expected diagnostics, got {:?}", other),
        }

        assert!(tester.validate_data_source_config(json!({})).is_err());
        assert!(tester.validate_data_source_config(json!({"id": "net-1"})).is_ok());
    }

    #[test]
    fn test_plan_attribute() {
        let tester = SchemaTester::new(network_schema());
        let state = json!("net-1");

        let response = tester
            .plan_attribute("id", Some(&state), &Value::Null, &Value::Null)
            .unwrap();
        assert_eq!(response.plan_value, state);
        assert!(!response.requires_replace);

        assert!(tester
            .plan_attribute("missing", None, &Value::Null, &Value::Null)
            .is_err());
    }

    #[test]
    fn test_default_value() {
        let tester = SchemaTester::new(network_schema());

        assert_eq!(tester.default_value("mtu").unwrap(), Some(json!(1500)));
        assert_eq!(tester.default_value("id").unwrap(), None);
        assert!(tester.data_source_schema().attributes.contains_key("mtu"));
    }

    #[test]
    fn test_strict_tester() {
        assert!(SchemaTester::strict(network_schema()).is_ok());

        let orphan = network_schema().with_attribute("orphan", Attribute::bool());
        let err = SchemaTester::strict(orphan).unwrap_err();
        assert!(matches!(
            err,
            TestError::Schema(SchemaError::UnconfiguredAttribute(ref name)) if name == "orphan"
        ));
    }

    #[test]
    fn test_assert_idempotent() {
        let tester = SchemaTester::new(network_schema());
        assert!(tester.assert_idempotent().is_ok());
        assert_eq!(tester.resource_schema(), &tester.schema().resolve_for_resource());
    }

    #[test]
    fn test_test_error_display() {
        let err = TestError::Diagnostics(vec![Diagnostic::error("Missing")
            .with_detail("Required")
            .with_attribute("name")]);
        let display = err.to_string();
        assert!(display.contains("1 diagnostic(s)"));
        assert!(display.contains("Missing: Required (at name)"));

        let err = TestError::MissingAttribute("rules.port".to_string());
        assert_eq!(err.to_string(), "No attribute at 'rules.port'");

        let err: TestError = SchemaError::DuplicateAttribute("name".to_string()).into();
        assert_eq!(err.to_string(), "Schema error: Duplicate attribute: name");

        let err = TestError::NotIdempotent("resource");
        assert!(err.to_string().contains("resource schema"));
    }

    #[test]
    fn test_check_diagnostics_ignores_warnings() {
        assert!(check_diagnostics(vec![Diagnostic::warning("Deprecated")]).is_ok());
        assert!(check_diagnostics(vec![Diagnostic::error("Broken")]).is_err());
    }

    #[test]
    #[should_panic(expected = "Expected no errors")]
    fn test_assert_no_errors_panics() {
        assert_no_errors(&[Diagnostic::error("Broken")]);
    }
}
