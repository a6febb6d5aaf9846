//! Ready-made default value providers.

use crate::plugin::{DefaultValue, ValueDefault};
use serde_json::Value;

/// Always default to `value`.
pub fn static_value(value: impl Into<Value>) -> DefaultValue {
    DefaultValue::new(Static(value.into()))
}

struct Static(Value);

impl ValueDefault for Static {
    fn description(&self) -> String {
        format!("value defaults to {}", self.0)
    }

    fn default_value(&self) -> Value {
        self.0.clone()
    }
}
