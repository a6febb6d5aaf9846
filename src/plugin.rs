//! Opaque plug-in values carried by attributes.
//!
//! Validators, plan modifiers and defaults are supplied by provider authors
//! and consumed by the plugin runtime. The composition engine never looks
//! inside them: it only clones the handles and accumulates them into lists.
//!
//! Each kind is a trait ([`ValueValidator`], [`ValuePlanModifier`],
//! [`ValueDefault`]) plus a cheap, reference-counted handle ([`Validator`],
//! [`PlanModifier`], [`DefaultValue`]). Handles compare by identity, so two
//! resolutions of the same declaration compare equal.
//!
//! Ready-made implementations live in [`validators`](crate::validators),
//! [`planmodifiers`](crate::planmodifiers) and [`defaults`](crate::defaults).

use crate::schema::Diagnostic;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A predicate checked against a configured attribute value.
pub trait ValueValidator: Send + Sync + 'static {
    /// Plain text description of what is checked.
    fn description(&self) -> String;

    /// Markdown description of what is checked.
    fn markdown_description(&self) -> String {
        self.description()
    }

    /// Check the value, returning diagnostics for any violation.
    fn validate(&self, request: &ValidatorRequest<'_>) -> Vec<Diagnostic>;
}

/// The value under validation and its surroundings.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorRequest<'a> {
    /// Dotted path of the attribute (`rules.0.port`).
    pub path: &'a str,
    /// The configured value, `null` when absent.
    pub value: &'a Value,
    /// The whole configuration object, for cross-attribute checks.
    pub config: &'a Value,
}

/// A transformation applied to an attribute's planned value.
pub trait ValuePlanModifier: Send + Sync + 'static {
    /// Plain text description of the modification.
    fn description(&self) -> String;

    /// Adjust `response` for the attribute described by `request`.
    fn modify(&self, request: &PlanModifierRequest<'_>, response: &mut PlanModifierResponse);
}

/// The attribute values seen while planning.
///
/// An unknown planned value is represented as `null`.
#[derive(Debug, Clone, Copy)]
pub struct PlanModifierRequest<'a> {
    /// Dotted path of the attribute.
    pub path: &'a str,
    /// The prior state value, `None` when the resource is being created.
    pub state: Option<&'a Value>,
    /// The proposed planned value.
    pub plan: &'a Value,
    /// The configured value.
    pub config: &'a Value,
}

/// The outcome of running plan modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanModifierResponse {
    /// The planned value after modification.
    pub plan_value: Value,
    /// Whether a change of this attribute forces resource replacement.
    pub requires_replace: bool,
    /// Problems found while planning.
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanModifierResponse {
    /// Start from the proposed planned value.
    pub fn new(plan_value: Value) -> Self {
        Self {
            plan_value,
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }
}

/// Provides the value of an attribute left unset in configuration.
pub trait ValueDefault: Send + Sync + 'static {
    /// Plain text description of the default.
    fn description(&self) -> String;

    /// The default value.
    fn default_value(&self) -> Value;
}

macro_rules! plugin_handle {
    ($(#[$meta:meta])* $handle:ident => $inner:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $handle(Arc<dyn $inner>);

        impl $handle {
            /// Wrap an implementation into a shareable handle.
            pub fn new(inner: impl $inner) -> Self {
                Self(Arc::new(inner))
            }

            /// Plain text description of the behavior.
            pub fn description(&self) -> String {
                self.0.description()
            }

            /// Whether both handles share the same implementation.
            pub fn ptr_eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0)
            }
        }

        impl fmt::Debug for $handle {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($handle))
                    .field(&self.0.description())
                    .finish()
            }
        }

        impl PartialEq for $handle {
            fn eq(&self, other: &Self) -> bool {
                self.ptr_eq(other)
            }
        }
    };
}

plugin_handle!(
    /// A shareable [`ValueValidator`].
    Validator => ValueValidator
);

plugin_handle!(
    /// A shareable [`ValuePlanModifier`].
    PlanModifier => ValuePlanModifier
);

plugin_handle!(
    /// A shareable [`ValueDefault`].
    DefaultValue => ValueDefault
);

struct FnValidator<F> {
    description: String,
    check: F,
}

impl<F> ValueValidator for FnValidator<F>
where
    F: Fn(&ValidatorRequest<'_>) -> Vec<Diagnostic> + Send + Sync + 'static,
{
    fn description(&self) -> String {
        self.description.clone()
    }

    fn validate(&self, request: &ValidatorRequest<'_>) -> Vec<Diagnostic> {
        (self.check)(request)
    }
}

impl Validator {
    /// Build a validator from a closure.
    pub fn from_fn<F>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&ValidatorRequest<'_>) -> Vec<Diagnostic> + Send + Sync + 'static,
    {
        Self::new(FnValidator {
            description: description.into(),
            check,
        })
    }

    /// Markdown description of what is checked.
    pub fn markdown_description(&self) -> String {
        self.0.markdown_description()
    }

    /// Run the validator.
    pub fn validate(&self, request: &ValidatorRequest<'_>) -> Vec<Diagnostic> {
        self.0.validate(request)
    }
}

impl PlanModifier {
    /// Run the plan modifier.
    pub fn modify(&self, request: &PlanModifierRequest<'_>, response: &mut PlanModifierResponse) {
        self.0.modify(request, response)
    }

    /// Run `modifiers` in order; each one sees the plan left by the previous.
    ///
    /// `requires_replace` is OR'ed across modifiers and diagnostics are
    /// accumulated, so no modifier can undo a replacement asked for earlier.
    pub fn apply_all(
        modifiers: &[PlanModifier],
        request: &PlanModifierRequest<'_>,
    ) -> PlanModifierResponse {
        let mut response = PlanModifierResponse::new(request.plan.clone());
        for modifier in modifiers {
            let step = PlanModifierRequest {
                path: request.path,
                state: request.state,
                plan: &response.plan_value,
                config: request.config,
            };
            let mut step_response = PlanModifierResponse::new(response.plan_value.clone());
            modifier.modify(&step, &mut step_response);

            response.plan_value = step_response.plan_value;
            response.requires_replace |= step_response.requires_replace;
            response.diagnostics.extend(step_response.diagnostics);
        }
        response
    }
}

impl DefaultValue {
    /// The default value.
    pub fn value(&self) -> Value {
        self.0.default_value()
    }
}

impl Serialize for Validator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.description())
    }
}

impl Serialize for PlanModifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.description())
    }
}

impl Serialize for DefaultValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}
