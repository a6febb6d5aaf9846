//! Ready-made validators.
//!
//! Cross-attribute validators (`exactly_one_of`, `at_least_one_of`,
//! `conflicts_with`) take dotted paths from the configuration root, e.g.
//! `"name"` or `"network.0.cidr"`. Like the plugin framework's path
//! expressions, the attribute the validator is attached to always belongs to
//! the checked set.
//!
//! Value validators skip `null` values and values of an unexpected type;
//! type mismatches are reported by [`validation`](crate::validation).

use crate::plugin::{Validator, ValidatorRequest, ValueValidator};
use crate::schema::Diagnostic;
use crate::validation::as_int64;
use serde_json::Value;
use std::collections::BTreeSet;

/// Exactly one of `paths` (and the validated attribute) must be set.
pub fn exactly_one_of<I, S>(paths: I) -> Validator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Validator::new(Combination {
        paths: paths.into_iter().map(Into::into).collect(),
        rule: CombinationRule::ExactlyOne,
    })
}

/// At least one of `paths` (and the validated attribute) must be set.
pub fn at_least_one_of<I, S>(paths: I) -> Validator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Validator::new(Combination {
        paths: paths.into_iter().map(Into::into).collect(),
        rule: CombinationRule::AtLeastOne,
    })
}

/// The validated attribute cannot be set together with any of `paths`.
pub fn conflicts_with<I, S>(paths: I) -> Validator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Validator::new(Combination {
        paths: paths.into_iter().map(Into::into).collect(),
        rule: CombinationRule::Conflicts,
    })
}

/// A string value must be one of `values`.
pub fn one_of<I, S>(values: I) -> Validator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Validator::new(OneOf {
        values: values.into_iter().map(Into::into).collect(),
    })
}

/// A string value must have between `min` and `max` characters, inclusive.
pub fn length_between(min: usize, max: usize) -> Validator {
    Validator::new(LengthBetween { min, max })
}

/// An integer value must lie between `min` and `max`, inclusive.
pub fn int_between(min: i64, max: i64) -> Validator {
    Validator::new(IntBetween { min, max })
}

/// A list, set or map value must hold at least `min` elements.
pub fn size_at_least(min: usize) -> Validator {
    Validator::new(SizeAtLeast { min })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CombinationRule {
    ExactlyOne,
    AtLeastOne,
    Conflicts,
}

struct Combination {
    paths: Vec<String>,
    rule: CombinationRule,
}

impl Combination {
    fn path_list(&self, own: Option<&str>) -> String {
        let mut paths: BTreeSet<&str> = self.paths.iter().map(String::as_str).collect();
        if let Some(own) = own {
            paths.insert(own);
        }
        format!(
            "[{}]",
            paths.into_iter().collect::<Vec<_>>().join(",")
        )
    }
}

impl ValueValidator for Combination {
    fn description(&self) -> String {
        let paths = self.path_list(None);
        match self.rule {
            CombinationRule::ExactlyOne => format!(
                "Ensure that one and only one attribute from this collection is set: {}",
                paths
            ),
            CombinationRule::AtLeastOne => format!(
                "Ensure that at least one attribute from this collection is set: {}",
                paths
            ),
            CombinationRule::Conflicts => format!(
                "Ensure that if an attribute is set, these are not set: {}",
                paths
            ),
        }
    }

    fn validate(&self, request: &ValidatorRequest<'_>) -> Vec<Diagnostic> {
        let others: BTreeSet<&str> = self
            .paths
            .iter()
            .map(String::as_str)
            .filter(|path| *path != request.path)
            .collect();
        let own_set = !request.value.is_null();
        let others_set: Vec<&str> = others
            .iter()
            .copied()
            .filter(|path| !lookup(request.config, path).is_null())
            .collect();
        let count = others_set.len() + usize::from(own_set);
        let paths = self.path_list(Some(request.path));

        let detail = match self.rule {
            CombinationRule::ExactlyOne if count == 0 => Some(format!(
                "No attribute specified when one (and only one) of {} is required",
                paths
            )),
            CombinationRule::ExactlyOne if count > 1 => Some(format!(
                "{} attributes specified when one (and only one) of {} is required",
                count, paths
            )),
            CombinationRule::AtLeastOne if count == 0 => Some(format!(
                "At least one attribute out of {} must be specified",
                paths
            )),
            CombinationRule::Conflicts if own_set && !others_set.is_empty() => Some(format!(
                "Attribute \"{}\" cannot be specified when \"{}\" is specified",
                others_set[0], request.path
            )),
            _ => None,
        };

        detail
            .map(|detail| {
                vec![Diagnostic::error("Invalid Attribute Combination")
                    .with_detail(detail)
                    .with_attribute(request.path)]
            })
            .unwrap_or_default()
    }
}

struct OneOf {
    values: Vec<String>,
}

impl OneOf {
    fn quoted(&self) -> String {
        let quoted: Vec<String> = self.values.iter().map(|v| format!("{:?}", v)).collect();
        format!("[{}]", quoted.join(" "))
    }
}

impl ValueValidator for OneOf {
    fn description(&self) -> String {
        format!("value must be one of: {}", self.quoted())
    }

    fn markdown_description(&self) -> String {
        let quoted: Vec<String> = self.values.iter().map(|v| format!("`{}`", v)).collect();
        format!("Value must be one of: {}", quoted.join(", "))
    }

    fn validate(&self, request: &ValidatorRequest<'_>) -> Vec<Diagnostic> {
        match request.value.as_str() {
            Some(value) if !self.values.iter().any(|v| v == value) => {
                vec![Diagnostic::error("Invalid Attribute Value Match")
                    .with_detail(format!(
                        "Attribute {} {}, got: {:?}",
                        request.path,
                        self.description(),
                        value
                    ))
                    .with_attribute(request.path)]
            },
            _ => Vec::new(),
        }
    }
}

struct LengthBetween {
    min: usize,
    max: usize,
}

impl ValueValidator for LengthBetween {
    fn description(&self) -> String {
        format!(
            "string length must be between {} and {}",
            self.min, self.max
        )
    }

    fn validate(&self, request: &ValidatorRequest<'_>) -> Vec<Diagnostic> {
        match request.value.as_str() {
            Some(value) => {
                let len = value.chars().count();
                if len < self.min || len > self.max {
                    vec![Diagnostic::error("Invalid Attribute Value Length")
                        .with_detail(format!(
                            "Attribute {} {}, got: {}",
                            request.path,
                            self.description(),
                            len
                        ))
                        .with_attribute(request.path)]
                } else {
                    Vec::new()
                }
            },
            None => Vec::new(),
        }
    }
}

struct IntBetween {
    min: i64,
    max: i64,
}

impl ValueValidator for IntBetween {
    fn description(&self) -> String {
        format!("value must be between {} and {}", self.min, self.max)
    }

    fn validate(&self, request: &ValidatorRequest<'_>) -> Vec<Diagnostic> {
        if !request.value.is_number() {
            return Vec::new();
        }
        // Numbers without an i64 form are out of any i64 range.
        match as_int64(request.value) {
            Some(value) if value >= self.min && value <= self.max => Vec::new(),
            _ => vec![Diagnostic::error("Invalid Attribute Value")
                .with_detail(format!(
                    "Attribute {} {}, got: {}",
                    request.path,
                    self.description(),
                    request.value
                ))
                .with_attribute(request.path)],
        }
    }
}

struct SizeAtLeast {
    min: usize,
}

impl ValueValidator for SizeAtLeast {
    fn description(&self) -> String {
        format!("must contain at least {} elements", self.min)
    }

    fn validate(&self, request: &ValidatorRequest<'_>) -> Vec<Diagnostic> {
        let size = match request.value {
            Value::Array(items) => items.len(),
            Value::Object(entries) => entries.len(),
            _ => return Vec::new(),
        };

        if size < self.min {
            vec![Diagnostic::error("Invalid Attribute Value")
                .with_detail(format!(
                    "Attribute {} {}, got: {}",
                    request.path,
                    self.description(),
                    size
                ))
                .with_attribute(request.path)]
        } else {
            Vec::new()
        }
    }
}

static NULL: Value = Value::Null;

/// Follow a dotted path from the configuration root; missing segments yield `null`.
fn lookup<'a>(config: &'a Value, path: &str) -> &'a Value {
    path.split('.').fold(config, |current, segment| match current {
        Value::Object(map) => map.get(segment).unwrap_or(&NULL),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index))
            .unwrap_or(&NULL),
        _ => &NULL,
    })
}
