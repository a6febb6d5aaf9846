//! Error types for schema composition.
//!
//! Resolution itself never fails. Errors only come from the strict mode of
//! [`ResolveOptions`](crate::superschema::ResolveOptions), which rejects
//! declarations the permissive mode silently accepts.

use crate::schema::Diagnostic;
use thiserror::Error;

/// Errors reported when checking a schema declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The same attribute name was declared more than once in one mapping.
    #[error("Duplicate attribute: {0}")]
    DuplicateAttribute(String),

    /// The attribute has no common, resource or data source layer.
    #[error("Unconfigured attribute: {0}")]
    UnconfiguredAttribute(String),
}

impl SchemaError {
    /// The dotted path of the offending attribute.
    pub fn attribute(&self) -> &str {
        match self {
            Self::DuplicateAttribute(path) => path,
            Self::UnconfiguredAttribute(path) => path,
        }
    }

    /// A longer explanation, suitable for a diagnostic detail.
    pub fn message(&self) -> &str {
        match self {
            Self::DuplicateAttribute(_) => {
                "the attribute name was declared more than once; only the last declaration is kept"
            },
            Self::UnconfiguredAttribute(_) => {
                "the attribute declares no common, resource or data source layer"
            },
        }
    }
}

impl From<SchemaError> for Diagnostic {
    fn from(err: SchemaError) -> Self {
        Diagnostic::error(err.to_string())
            .with_detail(err.message())
            .with_attribute(err.attribute())
    }
}
