//! Ready-made plan modifiers.
//!
//! Planned values that are not yet known are represented as `null`.

use crate::plugin::{PlanModifier, PlanModifierRequest, PlanModifierResponse, ValuePlanModifier};
use serde_json::Value;

/// Keep the prior state value when the planned value is unknown.
///
/// Typical for computed identifiers that never change after creation.
pub fn use_state_for_unknown() -> PlanModifier {
    PlanModifier::new(UseStateForUnknown)
}

/// Any change to the attribute forces resource replacement.
pub fn requires_replace() -> PlanModifier {
    PlanModifier::new(RequiresReplace { when: None })
}

/// A change forces replacement only when `when(state, plan)` holds.
pub fn requires_replace_if<F>(description: impl Into<String>, when: F) -> PlanModifier
where
    F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
{
    let when: ReplaceCondition = Box::new(when);
    PlanModifier::new(RequiresReplace {
        when: Some((description.into(), when)),
    })
}

struct UseStateForUnknown;

impl ValuePlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "Once set, the value of this attribute in state will not change.".to_string()
    }

    fn modify(&self, request: &PlanModifierRequest<'_>, response: &mut PlanModifierResponse) {
        // Creating, or the practitioner set a value.
        let Some(state) = request.state else {
            return;
        };
        if !request.config.is_null() || state.is_null() || !request.plan.is_null() {
            return;
        }
        response.plan_value = state.clone();
    }
}

type ReplaceCondition = Box<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

struct RequiresReplace {
    when: Option<(String, ReplaceCondition)>,
}

impl ValuePlanModifier for RequiresReplace {
    fn description(&self) -> String {
        match &self.when {
            Some((description, _)) => description.clone(),
            None => "If the value of this attribute changes, Terraform will destroy and recreate the resource."
                .to_string(),
        }
    }

    fn modify(&self, request: &PlanModifierRequest<'_>, response: &mut PlanModifierResponse) {
        let Some(state) = request.state else {
            return;
        };
        if state == request.plan {
            return;
        }
        let replace = match &self.when {
            Some((_, when)) => when(state, request.plan),
            None => true,
        };
        if replace {
            response.requires_replace = true;
        }
    }
}
