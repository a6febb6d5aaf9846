//! Provider Superschema
//!
//! This crate lets a provider declare a resource and its companion data source
//! once, as a single *superschema*, and derive both concrete schemas from it.
//!
//! # Overview
//!
//! Every attribute carries up to three layers of settings:
//!
//! - **common**: shared by both contexts
//! - **resource**: applied only when building the resource schema
//! - **data source**: applied only when building the data source schema
//!
//! Resolving for a context merges the common layer with that context's layer:
//! booleans are OR'ed, descriptions concatenated, validators and plan
//! modifiers accumulated (common first) and defaults replaced when set.
//! Data sources are read-only, so their layer has neither plan modifiers nor
//! a default, and the common layer's are dropped.
//!
//! The crate provides:
//!
//! - **Superschema types**: [`Schema`], [`Attribute`] and the layer types in [`layer`]
//! - **Resolved schemas**: [`ResourceSchema`], [`DataSourceSchema`] and [`ProviderSchema`]
//! - **Plug-ins**: [`Validator`], [`PlanModifier`] and [`DefaultValue`] handles, with
//!   ready-made ones in [`validators`], [`planmodifiers`] and [`defaults`]
//! - **Validation**: checking a configuration against a resolved schema
//! - **Documentation**: markdown pages for resolved schemas
//! - **Logging**: Integration with `tracing` for structured logging
//!
//! # Quick Start
//!
//! ```
//! use provider_superschema::layer::{DataSourceLayer, ResourceLayer};
//! use provider_superschema::planmodifiers::use_state_for_unknown;
//! use provider_superschema::validators::exactly_one_of;
//! use provider_superschema::{Attribute, ProviderSchema, Schema};
//!
//! let role = Schema::new()
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
//!         "name",
//!         Attribute::string()
//!             .with_common(ResourceLayer::new().with_markdown_description("The name of the role."))
//!             .with_resource(ResourceLayer::new().required())
//!             .with_data_source(DataSourceLayer::new().optional().computed()),
//!     );
//!
//! let provider = ProviderSchema::new()
//!     .with_resource("vcd_role", &role)
//!     .with_data_source("vcd_role", &role);
//!
//! let id = &provider.resources["vcd_role"].attributes["id"];
//! assert!(id.flags.computed && !id.flags.optional);
//! assert_eq!(id.plan_modifiers.len(), 1);
//!
//! let id = &provider.data_sources["vcd_role"].attributes["id"];
//! assert!(id.flags.computed && id.flags.optional);
//! assert_eq!(id.validators.len(), 1);
//! ```
//!
//! # Strictness
//!
//! Resolution is infallible by default: a repeated attribute name keeps the
//! last declaration and an attribute without any layer resolves to zero
//! values. [`ResolveOptions::strict`] turns both into a [`SchemaError`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod attribute;
mod details;

pub mod defaults;
pub mod docs;
pub mod error;
pub mod layer;
pub mod logging;
pub mod merge;
pub mod planmodifiers;
pub mod plugin;
pub mod schema;
pub mod superschema;
pub mod testing;
pub mod validation;
pub mod validators;

// Re-export main types at crate root
pub use error::SchemaError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use plugin::{DefaultValue, PlanModifier, Validator};
pub use schema::{DataSourceSchema, Diagnostic, ProviderSchema, ResourceSchema};
pub use superschema::{Attribute, Attributes, ResolveOptions, Schema, Strictness};
pub use validation::{is_valid, validate, validate_result};

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
