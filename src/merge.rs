//! Layer merge rules.
//!
//! Every attribute kind and the schema details resolve the same way: seed the
//! result with the common layer, then merge the context layer on top. The
//! rules per field type are:
//!
//! | Field type | Rule |
//! |------------|------|
//! | `bool` | logical OR, a `true` can never be unset |
//! | `String` | overlay appended when non-empty |
//! | `Vec<T>` | overlay items appended, seed items first |
//! | `Option<T>` | replaced when the overlay is `Some` |

use crate::schema::{AttributeFlags, Documentation};

/// A value that can absorb an overlay of the same shape.
pub trait Merge {
    /// Apply `overlay` on top of `self`.
    fn merge(&mut self, overlay: &Self);
}

impl Merge for bool {
    fn merge(&mut self, overlay: &Self) {
        *self |= *overlay;
    }
}

impl Merge for String {
    fn merge(&mut self, overlay: &Self) {
        if !overlay.is_empty() {
            self.push_str(overlay);
        }
    }
}

impl<T: Clone> Merge for Vec<T> {
    fn merge(&mut self, overlay: &Self) {
        if !overlay.is_empty() {
            self.extend(overlay.iter().cloned());
        }
    }
}

impl<T: Clone> Merge for Option<T> {
    fn merge(&mut self, overlay: &Self) {
        if let Some(value) = overlay {
            *self = Some(value.clone());
        }
    }
}

impl Merge for AttributeFlags {
    fn merge(&mut self, overlay: &Self) {
        self.required.merge(&overlay.required);
        self.optional.merge(&overlay.optional);
        self.computed.merge(&overlay.computed);
        self.sensitive.merge(&overlay.sensitive);
    }
}

impl Merge for Documentation {
    fn merge(&mut self, overlay: &Self) {
        self.description.merge(&overlay.description);
        self.markdown_description
            .merge(&overlay.markdown_description);
        self.deprecation_message.merge(&overlay.deprecation_message);
    }
}

/// Resolve a layer stack: `seed` (or the zero value) with `overlay` merged on top.
pub fn resolve<L: Merge + Default>(seed: Option<L>, overlay: Option<&L>) -> L {
    let mut resolved = seed.unwrap_or_default();
    if let Some(overlay) = overlay {
        resolved.merge(overlay);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_is_monotonic() {
        let mut value = true;
        value.merge(&false);
        assert!(value);

        let mut value = false;
        value.merge(&true);
        assert!(value);
    }

    #[test]
    fn test_string_concatenates_non_empty() {
        let mut text = "The ID.".to_string();
        text.merge(&String::new());
        assert_eq!(text, "The ID.");

        text.merge(&" Read-only.".to_string());
        assert_eq!(text, "The ID. Read-only.");
    }

    #[test]
    fn test_vec_appends_after_seed() {
        let mut items = vec![1, 2];
        items.merge(&vec![3]);
        assert_eq!(items, vec![1, 2, 3]);

        items.merge(&Vec::new());
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_option_replaced_if_set() {
        let mut value = Some(1);
        value.merge(&None);
        assert_eq!(value, Some(1));

        value.merge(&Some(2));
        assert_eq!(value, Some(2));
    }

    #[test]
    fn test_flags_merge() {
        let mut flags = AttributeFlags::optional();
        flags.merge(&AttributeFlags::computed().sensitive());
        assert_eq!(
            flags,
            AttributeFlags {
                required: false,
                optional: true,
                computed: true,
                sensitive: true,
            }
        );
    }

    #[test]
    fn test_resolve_without_layers_is_zero() {
        let flags: AttributeFlags = resolve(None, None);
        assert_eq!(flags, AttributeFlags::default());

        let docs = resolve(
            None,
            Some(&Documentation {
                description: "only overlay".to_string(),
                ..Default::default()
            }),
        );
        assert_eq!(docs.description, "only overlay");
    }
}
