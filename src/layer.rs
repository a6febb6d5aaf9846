//! The configuration layers of a superschema attribute.
//!
//! An attribute carries up to three layers:
//!
//! - `common`: a [`ResourceLayer`] applied in both contexts
//! - `resource`: a [`ResourceLayer`] applied only to the resource schema
//! - `data_source`: a [`DataSourceLayer`] applied only to the data source schema
//!
//! The data source layer has no plan modifiers and no default, so the common
//! layer is projected onto it (see `From<&ResourceLayer>`) before merging.

use crate::merge::Merge;
use crate::plugin::{DefaultValue, PlanModifier, Validator};
use crate::schema::{AttributeFlags, Documentation};

/// Whether a layer was declared, and whether it holds anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// The layer was not declared.
    Absent,
    /// The layer was declared without any value.
    Empty,
    /// The layer was declared with at least one value.
    Populated,
}

impl Presence {
    /// Classify an optional layer.
    pub fn of<L: LayerContent>(layer: Option<&L>) -> Self {
        match layer {
            None => Self::Absent,
            Some(layer) if layer.is_empty() => Self::Empty,
            Some(_) => Self::Populated,
        }
    }

    /// Whether the layer was declared at all.
    pub fn is_present(self) -> bool {
        self != Self::Absent
    }
}

/// A layer that can tell whether it holds any value.
pub trait LayerContent {
    /// True when no field of the layer is set.
    fn is_empty(&self) -> bool;
}

/// Fields available in the common and resource layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceLayer {
    /// Usage flags.
    pub flags: AttributeFlags,
    /// Descriptions and deprecation message.
    pub docs: Documentation,
    /// Validators checked against configured values.
    pub validators: Vec<Validator>,
    /// Plan-time transformations.
    pub plan_modifiers: Vec<PlanModifier>,
    /// Default value provider.
    pub default: Option<DefaultValue>,
}

impl ResourceLayer {
    /// Create an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the attribute as required.
    pub fn required(mut self) -> Self {
        self.flags.required = true;
        self
    }

    /// Mark the attribute as optional.
    pub fn optional(mut self) -> Self {
        self.flags.optional = true;
        self
    }

    /// Mark the attribute as computed.
    pub fn computed(mut self) -> Self {
        self.flags.computed = true;
        self
    }

    /// Mark the attribute as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.flags.sensitive = true;
        self
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

    /// Add a validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Add a plan modifier.
    pub fn with_plan_modifier(mut self, modifier: PlanModifier) -> Self {
        self.plan_modifiers.push(modifier);
        self
    }

    /// Set the default value provider.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }
}

impl LayerContent for ResourceLayer {
    fn is_empty(&self) -> bool {
        self.flags == AttributeFlags::default()
            && self.docs.is_empty()
            && self.validators.is_empty()
            && self.plan_modifiers.is_empty()
            && self.default.is_none()
    }
}

impl Merge for ResourceLayer {
    fn merge(&mut self, overlay: &Self) {
        self.flags.merge(&overlay.flags);
        self.docs.merge(&overlay.docs);
        self.validators.merge(&overlay.validators);
        self.plan_modifiers.merge(&overlay.plan_modifiers);
        self.default.merge(&overlay.default);
    }
}

/// Fields available in the data source layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSourceLayer {
    /// Usage flags.
    pub flags: AttributeFlags,
    /// Descriptions and deprecation message.
    pub docs: Documentation,
    /// Validators checked against configured values.
    pub validators: Vec<Validator>,
}

impl DataSourceLayer {
    /// Create an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the attribute as required.
    pub fn required(mut self) -> Self {
        self.flags.required = true;
        self
    }

    /// Mark the attribute as optional.
    pub fn optional(mut self) -> Self {
        self.flags.optional = true;
        self
    }

    /// Mark the attribute as computed.
    pub fn computed(mut self) -> Self {
        self.flags.computed = true;
        self
    }

    /// Mark the attribute as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.flags.sensitive = true;
        self
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

    /// Add a validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }
}

impl LayerContent for DataSourceLayer {
    fn is_empty(&self) -> bool {
        self.flags == AttributeFlags::default()
            && self.docs.is_empty()
            && self.validators.is_empty()
    }
}

impl Merge for DataSourceLayer {
    fn merge(&mut self, overlay: &Self) {
        self.flags.merge(&overlay.flags);
        self.docs.merge(&overlay.docs);
        self.validators.merge(&overlay.validators);
    }
}

/// Project a common layer onto the data source shape, dropping plan data.
impl From<&ResourceLayer> for DataSourceLayer {
    fn from(layer: &ResourceLayer) -> Self {
        Self {
            flags: layer.flags,
            docs: layer.docs.clone(),
            validators: layer.validators.clone(),
        }
    }
}
