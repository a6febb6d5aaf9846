//! Schema-level metadata with the same three layers as attributes.

use crate::merge::{self, Merge};
use crate::schema::Documentation;

/// Schema-level settings contributed by one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Details {
    /// Descriptions and deprecation message.
    pub docs: Documentation,
    /// Schema version; the context layer replaces the common one when set.
    pub version: Option<u64>,
}

impl Details {
    /// Create empty details.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the plain text description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.docs.description = description.into();
        self
    }

    /// Set the markdown description.
    pub fn with_markdown_description(mut self, description: impl Into<String>) -> Self {
        self.docs.markdown_description = description.into();
        self
    }

    /// Set the deprecation message.
    pub fn with_deprecation_message(mut self, message: impl Into<String>) -> Self {
        self.docs.deprecation_message = message.into();
        self
    }

    /// Set the schema version.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }
}

impl Merge for Details {
    fn merge(&mut self, overlay: &Self) {
        self.docs.merge(&overlay.docs);
        self.version.merge(&overlay.version);
    }
}

/// Common, resource-only and data-source-only schema details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDetails {
    /// Details shared by both contexts.
    pub common: Option<Details>,
    /// Details applied only to the resource schema.
    pub resource: Option<Details>,
    /// Details applied only to the data source schema.
    pub data_source: Option<Details>,
}

impl SchemaDetails {
    /// Create details without any layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shared layer.
    pub fn with_common(mut self, details: Details) -> Self {
        self.common = Some(details);
        self
    }

    /// Set the resource-only layer.
    pub fn with_resource(mut self, details: Details) -> Self {
        self.resource = Some(details);
        self
    }

    /// Set the data-source-only layer.
    pub fn with_data_source(mut self, details: Details) -> Self {
        self.data_source = Some(details);
        self
    }

    /// Merge the common and resource layers.
    pub fn resolve_for_resource(&self) -> Details {
        merge::resolve(self.common.clone(), self.resource.as_ref())
    }

    /// Merge the common and data source layers.
    pub fn resolve_for_data_source(&self) -> Details {
        merge::resolve(self.common.clone(), self.data_source.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_details() -> SchemaDetails {
        SchemaDetails::new()
            .with_common(Details::new().with_markdown_description("The role "))
            .with_resource(
                Details::new()
                    .with_markdown_description("resource allows you to manage roles.")
                    .with_version(1),
            )
            .with_data_source(
                Details::new().with_markdown_description("data source allows you to read roles."),
            )
    }

    #[test]
    fn test_descriptions_concatenate_per_context() {
        let details = role_details();

        let resource = details.resolve_for_resource();
        assert_eq!(
            resource.docs.markdown_description,
            "The role resource allows you to manage roles."
        );

        let data_source = details.resolve_for_data_source();
        assert_eq!(
            data_source.docs.markdown_description,
            "The role data source allows you to read roles."
        );
    }

    #[test]
    fn test_version_replaced_if_set() {
        let details = role_details().with_common(Details::new().with_version(3));
        assert_eq!(details.resolve_for_resource().version, Some(1));
        assert_eq!(details.resolve_for_data_source().version, Some(3));
    }

    #[test]
    fn test_deprecation_message_concatenates() {
        let details = SchemaDetails::new()
            .with_common(
                Details::new()
                    .with_description("Roles.")
                    .with_deprecation_message("Deprecated: "),
            )
            .with_resource(Details::new().with_deprecation_message("use vcd_role_v2."));

        let resource = details.resolve_for_resource();
        assert_eq!(resource.docs.deprecation_message, "Deprecated: use vcd_role_v2.");
        assert_eq!(resource.docs.description, "Roles.");

        // No data source layer: the common text is kept as is.
        let data_source = details.resolve_for_data_source();
        assert_eq!(data_source.docs.deprecation_message, "Deprecated: ");
    }

    #[test]
    fn test_empty_details() {
        let details = SchemaDetails::new();
        assert_eq!(details.resolve_for_resource(), Details::default());
        assert_eq!(details.resolve_for_data_source(), Details::default());
    }
}
