//! Superschema attribute declarations.
//!
//! An [`Attribute`] pairs a value kind with up to three layers and resolves
//! itself into a [`ResourceAttribute`] or a [`DataSourceAttribute`]. Every
//! kind resolves through the same [`merge::resolve`] routine; nested kinds
//! additionally resolve their children first and derive their value type
//! from them.

use crate::error::SchemaError;
use crate::layer::{DataSourceLayer, Presence, ResourceLayer};
use crate::merge;
use crate::schema::{
    AttributeType, DataSourceAttribute, NestedAttributes, NestingMode, ResourceAttribute,
};
use crate::superschema::Strictness;
use std::collections::{btree_map, BTreeMap, BTreeSet};
use tracing::{trace, warn};

/// The value kind of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKind {
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
    /// A list of primitive values.
    List(AttributeType),
    /// A set of primitive values.
    Set(AttributeType),
    /// A map of primitive values.
    Map(AttributeType),
    /// A list of nested objects.
    ListNested(Attributes),
    /// A set of nested objects.
    SetNested(Attributes),
    /// A map of nested objects.
    MapNested(Attributes),
    /// A single nested object.
    SingleNested(Attributes),
}

impl AttributeKind {
    /// The nesting mode and children of nested kinds.
    pub fn nested(&self) -> Option<(NestingMode, &Attributes)> {
        match self {
            Self::ListNested(children) => Some((NestingMode::List, children)),
            Self::SetNested(children) => Some((NestingMode::Set, children)),
            Self::MapNested(children) => Some((NestingMode::Map, children)),
            Self::SingleNested(children) => Some((NestingMode::Single, children)),
            _ => None,
        }
    }

    fn shape(&self) -> Shape<'_> {
        match self {
            Self::String => Shape::Scalar(AttributeType::String),
            Self::Int64 => Shape::Scalar(AttributeType::Int64),
            Self::Float64 => Shape::Scalar(AttributeType::Float64),
            Self::Number => Shape::Scalar(AttributeType::Number),
            Self::Bool => Shape::Scalar(AttributeType::Bool),
            Self::List(element) => Shape::Scalar(AttributeType::list(element.clone())),
            Self::Set(element) => Shape::Scalar(AttributeType::set(element.clone())),
            Self::Map(element) => Shape::Scalar(AttributeType::map(element.clone())),
            Self::ListNested(children) => Shape::Nested(NestingMode::List, children),
            Self::SetNested(children) => Shape::Nested(NestingMode::Set, children),
            Self::MapNested(children) => Shape::Nested(NestingMode::Map, children),
            Self::SingleNested(children) => Shape::Nested(NestingMode::Single, children),
        }
    }
}

// Nested kinds take their type from the resolved children.
enum Shape<'a> {
    Scalar(AttributeType),
    Nested(NestingMode, &'a Attributes),
}

/// One attribute declaration serving both the resource and the data source schema.
///
/// # Example
///
/// ```
/// use provider_superschema::layer::{DataSourceLayer, ResourceLayer};
/// use provider_superschema::superschema::Attribute;
///
/// let id = Attribute::string()
///     .with_common(ResourceLayer::new().with_markdown_description("The ID."))
///     .with_resource(ResourceLayer::new().computed())
///     .with_data_source(DataSourceLayer::new().optional().computed());
///
/// let resource = id.resolve_for_resource();
/// assert!(resource.flags.computed);
/// assert!(!resource.flags.optional);
///
/// let data_source = id.resolve_for_data_source();
/// assert!(data_source.flags.optional);
/// assert_eq!(data_source.docs.markdown_description, "The ID.");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// The value kind.
    pub kind: AttributeKind,
    /// Settings shared by both contexts.
    pub common: Option<ResourceLayer>,
    /// Settings applied only to the resource schema.
    pub resource: Option<ResourceLayer>,
    /// Settings applied only to the data source schema.
    pub data_source: Option<DataSourceLayer>,
}

impl Attribute {
    /// Create an attribute of `kind` without any layer.
    pub fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            common: None,
            resource: None,
            data_source: None,
        }
    }

    /// Create a string attribute.
    pub fn string() -> Self {
        Self::new(AttributeKind::String)
    }

    /// Create an int64 attribute.
    pub fn int64() -> Self {
        Self::new(AttributeKind::Int64)
    }

    /// Create a float64 attribute.
    pub fn float64() -> Self {
        Self::new(AttributeKind::Float64)
    }

    /// Create a number attribute.
    pub fn number() -> Self {
        Self::new(AttributeKind::Number)
    }

    /// Create a bool attribute.
    pub fn bool() -> Self {
        Self::new(AttributeKind::Bool)
    }

    /// Create a list attribute with primitive elements.
    pub fn list(element_type: AttributeType) -> Self {
        Self::new(AttributeKind::List(element_type))
    }

    /// Create a set attribute with primitive elements.
    pub fn set(element_type: AttributeType) -> Self {
        Self::new(AttributeKind::Set(element_type))
    }

    /// Create a map attribute with primitive values.
    pub fn map(element_type: AttributeType) -> Self {
        Self::new(AttributeKind::Map(element_type))
    }

    /// Create a list of nested objects.
    pub fn list_nested(attributes: Attributes) -> Self {
        Self::new(AttributeKind::ListNested(attributes))
    }

    /// Create a set of nested objects.
    pub fn set_nested(attributes: Attributes) -> Self {
        Self::new(AttributeKind::SetNested(attributes))
    }

    /// Create a map of nested objects.
    pub fn map_nested(attributes: Attributes) -> Self {
        Self::new(AttributeKind::MapNested(attributes))
    }

    /// Create a single nested object.
    pub fn single_nested(attributes: Attributes) -> Self {
        Self::new(AttributeKind::SingleNested(attributes))
    }

    /// Set the layer shared by both contexts.
    pub fn with_common(mut self, layer: ResourceLayer) -> Self {
        self.common = Some(layer);
        self
    }

    /// Set the resource-only layer.
    pub fn with_resource(mut self, layer: ResourceLayer) -> Self {
        self.resource = Some(layer);
        self
    }

    /// Set the data-source-only layer.
    pub fn with_data_source(mut self, layer: DataSourceLayer) -> Self {
        self.data_source = Some(layer);
        self
    }

    /// Whether the attribute belongs to the resource schema.
    pub fn is_resource(&self) -> bool {
        self.resource.is_some() || self.common.is_some()
    }

    /// Whether the attribute belongs to the data source schema.
    pub fn is_data_source(&self) -> bool {
        self.data_source.is_some() || self.common.is_some()
    }

    /// Presence of the common layer.
    pub fn common_presence(&self) -> Presence {
        Presence::of(self.common.as_ref())
    }

    /// Presence of the resource layer.
    pub fn resource_presence(&self) -> Presence {
        Presence::of(self.resource.as_ref())
    }

    /// Presence of the data source layer.
    pub fn data_source_presence(&self) -> Presence {
        Presence::of(self.data_source.as_ref())
    }

    /// Whether no layer at all was declared.
    pub fn is_unconfigured(&self) -> bool {
        !self.is_resource() && !self.is_data_source()
    }

    /// Merge the common and resource layers into a resource attribute.
    ///
    /// An attribute without either layer resolves to the zero value.
    pub fn resolve_for_resource(&self) -> ResourceAttribute {
        let (attr_type, nested) = match self.kind.shape() {
            Shape::Scalar(attr_type) => (attr_type, None),
            Shape::Nested(nesting_mode, children) => {
                let nested = NestedAttributes {
                    nesting_mode,
                    attributes: children.resolve_for_resource(),
                };
                (nested.value_type(), Some(nested))
            },
        };

        let layer = merge::resolve(self.common.clone(), self.resource.as_ref());

        ResourceAttribute {
            attr_type,
            flags: layer.flags,
            docs: layer.docs,
            validators: layer.validators,
            plan_modifiers: layer.plan_modifiers,
            default: layer.default,
            nested,
        }
    }

    /// Merge the common and data source layers into a data source attribute.
    ///
    /// Plan modifiers and the default of the common layer are dropped.
    pub fn resolve_for_data_source(&self) -> DataSourceAttribute {
        let (attr_type, nested) = match self.kind.shape() {
            Shape::Scalar(attr_type) => (attr_type, None),
            Shape::Nested(nesting_mode, children) => {
                let nested = NestedAttributes {
                    nesting_mode,
                    attributes: children.resolve_for_data_source(),
                };
                (nested.value_type(), Some(nested))
            },
        };

        let seed = self.common.as_ref().map(DataSourceLayer::from);
        let layer = merge::resolve(seed, self.data_source.as_ref());

        DataSourceAttribute {
            attr_type,
            flags: layer.flags,
            docs: layer.docs,
            validators: layer.validators,
            nested,
        }
    }
}

/// A mapping of attribute name to declaration.
///
/// Inserting a name twice keeps the last declaration. The overwritten names
/// are remembered so that [`Strictness::Strict`] can reject them later.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: BTreeMap<String, Attribute>,
    duplicates: BTreeSet<String>,
}

impl Attributes {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.insert(name, attr);
        self
    }

    /// Add an attribute, returning the declaration it replaced.
    pub fn insert(&mut self, name: impl Into<String>, attr: Attribute) -> Option<Attribute> {
        let name = name.into();
        let previous = self.entries.insert(name.clone(), attr);
        if previous.is_some() {
            warn!(attribute = %name, "Duplicate attribute declaration, keeping the last one");
            self.duplicates.insert(name);
        }
        previous
    }

    /// Look up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.entries.get(name)
    }

    /// Whether an attribute with this name exists.
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over attributes sorted by name.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Attribute> {
        self.entries.iter()
    }

    /// Names that were declared more than once, sorted.
    pub fn duplicates(&self) -> impl Iterator<Item = &str> {
        self.duplicates.iter().map(String::as_str)
    }

    /// Resolve every attribute that belongs to the resource schema.
    pub fn resolve_for_resource(&self) -> BTreeMap<String, ResourceAttribute> {
        self.entries
            .iter()
            .filter_map(|(name, attr)| {
                if attr.is_resource() {
                    Some((name.clone(), attr.resolve_for_resource()))
                } else {
                    trace!(attribute = %name, "Skipping attribute without resource layer");
                    None
                }
            })
            .collect()
    }

    /// Resolve every attribute that belongs to the data source schema.
    pub fn resolve_for_data_source(&self) -> BTreeMap<String, DataSourceAttribute> {
        self.entries
            .iter()
            .filter_map(|(name, attr)| {
                if attr.is_data_source() {
                    Some((name.clone(), attr.resolve_for_data_source()))
                } else {
                    trace!(attribute = %name, "Skipping attribute without data source layer");
                    None
                }
            })
            .collect()
    }

    /// Check the declarations under `strictness`.
    ///
    /// Paths are visited sorted by name, parents before children, and the
    /// first offending one is reported.
    pub(crate) fn check(&self, strictness: Strictness, prefix: &str) -> Result<(), SchemaError> {
        if strictness == Strictness::Permissive {
            return Ok(());
        }

        for (name, attr) in &self.entries {
            let path = join_path(prefix, name);
            if self.duplicates.contains(name) {
                return Err(SchemaError::DuplicateAttribute(path));
            }
            if attr.is_unconfigured() {
                return Err(SchemaError::UnconfiguredAttribute(path));
            }
            if let Some((_, children)) = attr.kind.nested() {
                children.check(strictness, &path)?;
            }
        }
        Ok(())
    }
}

impl<N: Into<String>> FromIterator<(N, Attribute)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (N, Attribute)>>(iter: T) -> Self {
        let mut attributes = Self::new();
        for (name, attr) in iter {
            attributes.insert(name, attr);
        }
        attributes
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a Attribute);
    type IntoIter = btree_map::Iter<'a, String, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}
