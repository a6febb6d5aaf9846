//! Superschema declarations and their resolution.
//!
//! A [`Schema`] is declared once per resource/data source pair and resolved
//! on demand into a [`ResourceSchema`] or a [`DataSourceSchema`]. Resolution
//! is a pure function of the declaration: nothing is cached, and resolving
//! the same schema twice gives equal results.
//!
//! # Example
//!
//! ```
//! use provider_superschema::layer::{DataSourceLayer, ResourceLayer};
//! use provider_superschema::planmodifiers::use_state_for_unknown;
//! use provider_superschema::superschema::{Attribute, Details, Schema, SchemaDetails};
//! use provider_superschema::validators::exactly_one_of;
//!
//! let schema = Schema::new()
//!     .with_details(
//!         SchemaDetails::new()
//!             .with_common(Details::new().with_markdown_description("The role "))
//!             .with_resource(Details::new().with_markdown_description("resource."))
//!             .with_data_source(Details::new().with_markdown_description("data source.")),
//!     )
//!     .with_attribute(
//!         "id",
//!         Attribute::string()
//!             .with_common(ResourceLayer::new().with_markdown_description("The ID of the role."))
//!             .with_resource(
//!                 ResourceLayer::new()
//!                     .computed()
//!                     .with_plan_modifier(use_state_for_unknown()),
//!             )
//!             .with_data_source(
//!                 DataSourceLayer::new()
//!                     .optional()
//!                     .computed()
//!                     .with_validator(exactly_one_of(["name", "id"])),
//!             ),
//!     )
//!     .with_attribute(
//!         "read_only",
//!         Attribute::bool().with_data_source(DataSourceLayer::new().computed()),
//!     );
//!
//! let resource = schema.resolve_for_resource();
//! assert_eq!(resource.docs.markdown_description, "The role resource.");
//! assert!(resource.attributes["id"].flags.computed);
//! assert!(!resource.attributes.contains_key("read_only"));
//!
//! let data_source = schema.resolve_for_data_source();
//! assert!(data_source.attributes["id"].flags.optional);
//! assert!(data_source.attributes.contains_key("read_only"));
//! ```

use crate::error::SchemaError;
use crate::schema::{DataSourceSchema, ResourceSchema};
use tracing::{debug, warn};

pub use crate::attribute::{Attribute, AttributeKind, Attributes};
pub use crate::details::{Details, SchemaDetails};

/// How declaration mistakes are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Duplicate names keep the last declaration; attributes without any
    /// layer resolve to zero values.
    #[default]
    Permissive,
    /// Duplicate names and attributes without any layer are errors.
    Strict,
}

/// Options for resolving a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveOptions {
    /// How declaration mistakes are handled.
    pub strictness: Strictness,
}

impl ResolveOptions {
    /// Create permissive options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict options.
    pub fn strict() -> Self {
        Self::new().with_strictness(Strictness::Strict)
    }

    /// Set the strictness.
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }
}

/// A declaration serving both a resource schema and a data source schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Schema-level metadata.
    pub details: SchemaDetails,
    /// Attribute declarations.
    pub attributes: Attributes,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the schema-level metadata.
    pub fn with_details(mut self, details: SchemaDetails) -> Self {
        self.details = details;
        self
    }

    /// Add an attribute; a repeated name replaces the earlier declaration.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name, attr);
        self
    }

    /// Check the declaration under `strictness`.
    pub fn check(&self, strictness: Strictness) -> Result<(), SchemaError> {
        self.attributes.check(strictness, "").inspect_err(|err| {
            warn!(error = %err, "Schema declaration rejected");
        })
    }

    /// Resolve the resource schema.
    pub fn resolve_for_resource(&self) -> ResourceSchema {
        let details = self.details.resolve_for_resource();
        let resolved = ResourceSchema {
            version: details.version.unwrap_or_default(),
            docs: details.docs,
            attributes: self.attributes.resolve_for_resource(),
        };
        debug!(
            attributes = resolved.attributes.len(),
            version = resolved.version,
            "Resolved resource schema"
        );
        resolved
    }

    /// Resolve the data source schema.
    pub fn resolve_for_data_source(&self) -> DataSourceSchema {
        let details = self.details.resolve_for_data_source();
        let resolved = DataSourceSchema {
            version: details.version.unwrap_or_default(),
            docs: details.docs,
            attributes: self.attributes.resolve_for_data_source(),
        };
        debug!(
            attributes = resolved.attributes.len(),
            version = resolved.version,
            "Resolved data source schema"
        );
        resolved
    }

    /// Check the declaration with `options`, then resolve the resource schema.
    pub fn resolve_for_resource_with(
        &self,
        options: &ResolveOptions,
    ) -> Result<ResourceSchema, SchemaError> {
        self.check(options.strictness)?;
        Ok(self.resolve_for_resource())
    }

    /// Check the declaration with `options`, then resolve the data source schema.
    pub fn resolve_for_data_source_with(
        &self,
        options: &ResolveOptions,
    ) -> Result<DataSourceSchema, SchemaError> {
        self.check(options.strictness)?;
        Ok(self.resolve_for_data_source())
    }
}
