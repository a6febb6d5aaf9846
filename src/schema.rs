//! Resolved schema types handed to the plugin runtime.
//!
//! A [`Schema`](crate::superschema::Schema) declaration is resolved into one of
//! two context-specific shapes:
//!
//! - [`ResourceSchema`] made of [`ResourceAttribute`]s, which carry plan
//!   modifiers and defaults
//! - [`DataSourceSchema`] made of [`DataSourceAttribute`]s, which are
//!   read-only and carry neither
//!
//! Both shapes implement [`ResolvedSchema`] / [`ResolvedAttribute`] so that
//! consumers such as [`validation`](crate::validation) and [`docs`](crate::docs)
//! work on either context.

use crate::error::SchemaError;
use crate::plugin::{DefaultValue, PlanModifier, Validator};
use crate::superschema::{ResolveOptions, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The type of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// A string value.
    String,
    /// A 64-bit integer.
    Int64,
    /// A 64-bit floating point number.
    Float64,
    /// An arbitrary precision number.
    Number,
    /// A boolean value.
    Bool,
    /// A list of values of a single type.
    List(Box<AttributeType>),
    /// A set of unique values of a single type.
    Set(Box<AttributeType>),
    /// A map from string keys to values of a single type.
    Map(Box<AttributeType>),
    /// An object with a fixed set of attributes.
    Object(BTreeMap<String, AttributeType>),
    /// A dynamic type that can hold any value (use sparingly).
    Dynamic,
}

impl AttributeType {
    /// Create a list type.
    pub fn list(element_type: AttributeType) -> Self {
        Self::List(Box::new(element_type))
    }

    /// Create a set type.
    pub fn set(element_type: AttributeType) -> Self {
        Self::Set(Box::new(element_type))
    }

    /// Create a map type.
    pub fn map(element_type: AttributeType) -> Self {
        Self::Map(Box::new(element_type))
    }

    /// Create an object type.
    pub fn object(attributes: BTreeMap<String, AttributeType>) -> Self {
        Self::Object(attributes)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Int64 => f.write_str("Number"),
            Self::Float64 => f.write_str("Number"),
            Self::Number => f.write_str("Number"),
            Self::Bool => f.write_str("Boolean"),
            Self::List(element) => write!(f, "List of {}", element),
            Self::Set(element) => write!(f, "Set of {}", element),
            Self::Map(element) => write!(f, "Map of {}", element),
            Self::Object(_) => f.write_str("Object"),
            Self::Dynamic => f.write_str("Dynamic"),
        }
    }
}

/// Describes how an attribute can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    /// The attribute is required in configuration.
    pub required: bool,
    /// The attribute is optional in configuration.
    pub optional: bool,
    /// The attribute is computed by the provider (read-only).
    pub computed: bool,
    /// The attribute is sensitive and should be hidden in logs/UI.
    pub sensitive: bool,
}

impl AttributeFlags {
    /// Create flags for a required attribute.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }

    /// Create flags for an optional attribute.
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Default::default()
        }
    }

    /// Create flags for a computed attribute (read-only, set by provider).
    pub fn computed() -> Self {
        Self {
            computed: true,
            ..Default::default()
        }
    }

    /// Create flags for an optional+computed attribute (can be set, but has default from provider).
    pub fn optional_computed() -> Self {
        Self {
            optional: true,
            computed: true,
            ..Default::default()
        }
    }

    /// Mark the attribute as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Whether the attribute can only be set by the provider.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// Human-readable text attached to an attribute or a schema.
///
/// Empty strings mean "not set".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Documentation {
    /// Plain text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Markdown description, used for generated documentation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub markdown_description: String,
    /// Set when the attribute or schema is deprecated.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deprecation_message: String,
}

impl Documentation {
    /// Whether no text is set at all.
    pub fn is_empty(&self) -> bool {
        self.description.is_empty()
            && self.markdown_description.is_empty()
            && self.deprecation_message.is_empty()
    }

    /// The markdown description, falling back to the plain description.
    pub fn preferred(&self) -> &str {
        if self.markdown_description.is_empty() {
            &self.description
        } else {
            &self.markdown_description
        }
    }
}

/// How nested attributes are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NestingMode {
    /// A single nested object.
    #[default]
    Single,
    /// A list of nested objects (ordered).
    List,
    /// A set of nested objects (unordered, unique).
    Set,
    /// A map of nested objects keyed by string.
    Map,
}

/// The resolved children of a nested attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedAttributes<A> {
    /// How the nested objects are grouped.
    pub nesting_mode: NestingMode,
    /// The child attributes of each nested object.
    pub attributes: BTreeMap<String, A>,
}

impl<A: ResolvedAttribute> NestedAttributes<A> {
    /// The object type of a single nested element.
    pub fn object_type(&self) -> AttributeType {
        AttributeType::object(
            self.attributes
                .iter()
                .map(|(name, attr)| (name.clone(), attr.attr_type().clone()))
                .collect(),
        )
    }

    /// The value type of the whole nested attribute.
    pub fn value_type(&self) -> AttributeType {
        let object = self.object_type();
        match self.nesting_mode {
            NestingMode::Single => object,
            NestingMode::List => AttributeType::list(object),
            NestingMode::Set => AttributeType::set(object),
            NestingMode::Map => AttributeType::map(object),
        }
    }
}

/// Read access shared by both resolved attribute shapes.
pub trait ResolvedAttribute: Sized {
    /// The value type of the attribute.
    fn attr_type(&self) -> &AttributeType;
    /// Usage flags.
    fn flags(&self) -> &AttributeFlags;
    /// Descriptions and deprecation message.
    fn docs(&self) -> &Documentation;
    /// Validators checked against configured values.
    fn validators(&self) -> &[Validator];
    /// Child attributes, for nested kinds.
    fn nested(&self) -> Option<&NestedAttributes<Self>>;
}

/// An attribute as advertised in a resource schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceAttribute {
    /// The type of the attribute.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Flags describing how the attribute can be used.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// Descriptions and deprecation message.
    #[serde(flatten)]
    pub docs: Documentation,
    /// Validators, in declaration order (common layer first).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
    /// Plan modifiers, in declaration order (common layer first).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<PlanModifier>,
    /// Default value provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    /// Child attributes of nested kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<NestedAttributes<ResourceAttribute>>,
}

impl ResolvedAttribute for ResourceAttribute {
    fn attr_type(&self) -> &AttributeType {
        &self.attr_type
    }

    fn flags(&self) -> &AttributeFlags {
        &self.flags
    }

    fn docs(&self) -> &Documentation {
        &self.docs
    }

    fn validators(&self) -> &[Validator] {
        &self.validators
    }

    fn nested(&self) -> Option<&NestedAttributes<Self>> {
        self.nested.as_ref()
    }
}

/// An attribute as advertised in a data source schema.
///
/// Data sources are read-only: there is no plan modifier or default here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSourceAttribute {
    /// The type of the attribute.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Flags describing how the attribute can be used.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// Descriptions and deprecation message.
    #[serde(flatten)]
    pub docs: Documentation,
    /// Validators, in declaration order (common layer first).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
    /// Child attributes of nested kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<NestedAttributes<DataSourceAttribute>>,
}

impl ResolvedAttribute for DataSourceAttribute {
    fn attr_type(&self) -> &AttributeType {
        &self.attr_type
    }

    fn flags(&self) -> &AttributeFlags {
        &self.flags
    }

    fn docs(&self) -> &Documentation {
        &self.docs
    }

    fn validators(&self) -> &[Validator] {
        &self.validators
    }

    fn nested(&self) -> Option<&NestedAttributes<Self>> {
        self.nested.as_ref()
    }
}

/// Read access shared by both resolved schema shapes.
pub trait ResolvedSchema {
    /// The attribute shape of this context.
    type Attribute: ResolvedAttribute;

    /// The schema version (for state upgrades).
    fn version(&self) -> u64;
    /// Schema-level descriptions and deprecation message.
    fn docs(&self) -> &Documentation;
    /// Top-level attributes, sorted by name.
    fn attributes(&self) -> &BTreeMap<String, Self::Attribute>;
}

/// Schema for a resource type.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ResourceSchema {
    /// The version of this schema (for state upgrades).
    pub version: u64,
    /// Schema-level descriptions and deprecation message.
    #[serde(flatten)]
    pub docs: Documentation,
    /// The attributes of the resource.
    pub attributes: BTreeMap<String, ResourceAttribute>,
}

impl ResolvedSchema for ResourceSchema {
    type Attribute = ResourceAttribute;

    fn version(&self) -> u64 {
        self.version
    }

    fn docs(&self) -> &Documentation {
        &self.docs
    }

    fn attributes(&self) -> &BTreeMap<String, ResourceAttribute> {
        &self.attributes
    }
}

/// Schema for a data source type.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DataSourceSchema {
    /// The version of this schema.
    pub version: u64,
    /// Schema-level descriptions and deprecation message.
    #[serde(flatten)]
    pub docs: Documentation,
    /// The attributes of the data source.
    pub attributes: BTreeMap<String, DataSourceAttribute>,
}

impl ResolvedSchema for DataSourceSchema {
    type Attribute = DataSourceAttribute;

    fn version(&self) -> u64 {
        self.version
    }

    fn docs(&self) -> &Documentation {
        &self.docs
    }

    fn attributes(&self) -> &BTreeMap<String, DataSourceAttribute> {
        &self.attributes
    }
}

/// Every resolved schema a provider advertises.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ProviderSchema {
    /// Schemas for each resource type.
    pub resources: BTreeMap<String, ResourceSchema>,
    /// Schemas for each data source type.
    pub data_sources: BTreeMap<String, DataSourceSchema>,
}

impl ProviderSchema {
    /// Create a new empty provider schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `schema` for the resource context and register it.
    pub fn with_resource(mut self, name: impl Into<String>, schema: &Schema) -> Self {
        self.resources
            .insert(name.into(), schema.resolve_for_resource());
        self
    }

    /// Resolve `schema` for the data source context and register it.
    pub fn with_data_source(mut self, name: impl Into<String>, schema: &Schema) -> Self {
        self.data_sources
            .insert(name.into(), schema.resolve_for_data_source());
        self
    }

    /// Like [`ProviderSchema::with_resource`], honoring `options`.
    pub fn try_with_resource(
        mut self,
        name: impl Into<String>,
        schema: &Schema,
        options: &ResolveOptions,
    ) -> Result<Self, SchemaError> {
        let resolved = schema.resolve_for_resource_with(options)?;
        self.resources.insert(name.into(), resolved);
        Ok(self)
    }

    /// Like [`ProviderSchema::with_data_source`], honoring `options`.
    pub fn try_with_data_source(
        mut self,
        name: impl Into<String>,
        schema: &Schema,
        options: &ResolveOptions,
    ) -> Result<Self, SchemaError> {
        let resolved = schema.resolve_for_data_source_with(options)?;
        self.data_sources.insert(name.into(), resolved);
        Ok(self)
    }

    /// Resource and data source type names, sorted.
    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            resources: self.resources.keys().cloned().collect(),
            data_sources: self.data_sources.keys().cloned().collect(),
        }
    }
}

/// The type names a provider serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// List of resource type names.
    pub resources: Vec<String>,
    /// List of data source type names.
    pub data_sources: Vec<String>,
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// An error that prevents the operation from completing.
    Error,
    /// A warning that doesn't prevent the operation but should be addressed.
    Warning,
}

/// A diagnostic message reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: DiagnosticSeverity,
    /// A short summary of the issue.
    pub summary: String,
    /// A detailed description of the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The attribute path where the issue occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Add detail to this diagnostic.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the attribute path for this diagnostic.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{DataSourceLayer, ResourceLayer};
    use crate::superschema::Attribute;
    use serde_json::json;

    #[test]
    fn test_attribute_type_constructors() {
        let list = AttributeType::list(AttributeType::String);
        assert!(matches!(list, AttributeType::List(_)));

        let map = AttributeType::map(AttributeType::Int64);
        assert!(matches!(map, AttributeType::Map(_)));
    }

    #[test]
    fn test_attribute_type_display() {
        assert_eq!(AttributeType::String.to_string(), "String");
        assert_eq!(AttributeType::Bool.to_string(), "Boolean");
        assert_eq!(
            AttributeType::set(AttributeType::String).to_string(),
            "Set of String"
        );
        assert_eq!(
            AttributeType::list(AttributeType::map(AttributeType::Int64)).to_string(),
            "List of Map of Number"
        );
    }

    #[test]
    fn test_attribute_flags() {
        let required = AttributeFlags::required();
        assert!(required.required);
        assert!(!required.optional);
        assert!(!required.computed);

        let computed = AttributeFlags::computed();
        assert!(computed.is_computed_only());

        let optional_computed = AttributeFlags::optional_computed();
        assert!(optional_computed.optional);
        assert!(optional_computed.computed);
        assert!(!optional_computed.is_computed_only());

        let sensitive = AttributeFlags::required().sensitive();
        assert!(sensitive.sensitive);
    }

    #[test]
    fn test_documentation_preferred() {
        let docs = Documentation {
            description: "plain".to_string(),
            ..Default::default()
        };
        assert_eq!(docs.preferred(), "plain");

        let docs = Documentation {
            description: "plain".to_string(),
            markdown_description: "**rich**".to_string(),
            ..Default::default()
        };
        assert_eq!(docs.preferred(), "**rich**");
        assert!(Documentation::default().is_empty());
    }

    #[test]
    fn test_resource_attribute_serialization() {
        let attr = Attribute::string()
            .with_common(ResourceLayer::new().with_markdown_description("The name."))
            .with_resource(ResourceLayer::new().required())
            .resolve_for_resource();

        let json = serde_json::to_value(&attr).unwrap();
        assert_eq!(json["type"], "string");
        assert_eq!(json["required"], true);
        assert_eq!(json["markdown_description"], "The name.");
        assert!(json.get("description").is_none());
        assert!(json.get("plan_modifiers").is_none());
        assert!(json.get("nested").is_none());
    }

    #[test]
    fn test_provider_schema() {
        let role = Schema::new()
            .with_attribute(
                "name",
                Attribute::string()
                    .with_resource(ResourceLayer::new().required())
                    .with_data_source(DataSourceLayer::new().optional()),
            )
            .with_attribute(
                "read_only",
                Attribute::bool().with_data_source(DataSourceLayer::new().computed()),
            );

        let provider_schema = ProviderSchema::new()
            .with_resource("example_role", &role)
            .with_data_source("example_role", &role);

        let resource = &provider_schema.resources["example_role"];
        assert!(resource.attributes.contains_key("name"));
        assert!(!resource.attributes.contains_key("read_only"));

        let data_source = &provider_schema.data_sources["example_role"];
        assert!(data_source.attributes.contains_key("read_only"));

        let metadata = provider_schema.metadata();
        assert_eq!(metadata.resources, vec!["example_role".to_string()]);
        assert_eq!(metadata.data_sources, vec!["example_role".to_string()]);
    }

    #[test]
    fn test_provider_schema_strict_rejects_duplicates() {
        let schema = Schema::new()
            .with_attribute("id", Attribute::string().with_common(ResourceLayer::new()))
            .with_attribute("id", Attribute::int64().with_common(ResourceLayer::new()));

        let result =
            ProviderSchema::new().try_with_resource("example", &schema, &ResolveOptions::strict());
        assert_eq!(
            result.unwrap_err(),
            SchemaError::DuplicateAttribute("id".to_string())
        );

        let permissive = ProviderSchema::new()
            .try_with_resource("example", &schema, &ResolveOptions::new())
            .unwrap();
        assert_eq!(
            permissive.resources["example"].attributes["id"].attr_type,
            AttributeType::Int64
        );
    }

    #[test]
    fn test_diagnostic() {
        let err = Diagnostic::error("Invalid configuration")
            .with_detail("The value must be positive")
            .with_attribute("count");

        assert_eq!(err.severity, DiagnosticSeverity::Error);
        assert!(err.is_error());
        assert_eq!(err.summary, "Invalid configuration");
        assert_eq!(err.detail, Some("The value must be positive".to_string()));
        assert_eq!(err.attribute, Some("count".to_string()));
        assert!(!Diagnostic::warning("heads up").is_error());
    }

    #[test]
    fn test_host_payloads_deserialize() {
        // Diagnostics and metadata coming back from a host.
        let diagnostics: Vec<Diagnostic> = serde_json::from_value(json!([
            {"severity": "error", "summary": "Invalid port", "attribute": "rules.0.port"},
            {"severity": "warning", "summary": "Deprecated"}
        ]))
        .unwrap();
        assert_eq!(
            diagnostics[0],
            Diagnostic::error("Invalid port").with_attribute("rules.0.port")
        );
        assert_eq!(diagnostics[1], Diagnostic::warning("Deprecated"));

        let metadata: ProviderMetadata =
            serde_json::from_value(json!({"resources": ["vcd_role"], "data_sources": []})).unwrap();
        assert_eq!(metadata.resources, vec!["vcd_role".to_string()]);

        let docs: Documentation =
            serde_json::from_value(json!({"markdown_description": "The role."})).unwrap();
        assert_eq!(docs.preferred(), "The role.");
        assert!(docs.description.is_empty());
    }

    #[test]
    fn test_type_and_flags_serde_round_trip() {
        let attr_type = AttributeType::map(AttributeType::object(BTreeMap::from([(
            "port".to_string(),
            AttributeType::Int64,
        )])));
        let json = serde_json::to_value(&attr_type).unwrap();
        assert_eq!(json, json!({"map": {"object": {"port": "int64"}}}));
        assert_eq!(serde_json::from_value::<AttributeType>(json).unwrap(), attr_type);

        let flags = AttributeFlags::optional_computed().sensitive();
        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(serde_json::from_value::<AttributeFlags>(json).unwrap(), flags);

        assert_eq!(
            serde_json::from_value::<NestingMode>(json!("set")).unwrap(),
            NestingMode::Set
        );
    }
}
