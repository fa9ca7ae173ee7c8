//! Merge operations for structured documents
//!
//! This module provides the merge engine used by document handles and
//! the free [`merge_deep`] fold. The plain-value functions here are the
//! algorithm's logical model; the format submodules add the
//! format-preservation hooks:
//!
//! - TOML (toml.rs) - format-preserving merge into `toml_edit` tables
//! - YAML (yaml.rs) - merge on `serde_yaml` values, insertion-ordered
//!
//! JSON documents merge directly through the plain-value engine.
//!
//! ## Merge policy
//!
//! The deep strategy is recursive by key: mappings merge, sequences and
//! scalars are replaced whole, and type conflicts resolve in the patch's
//! favor. Element-wise sequence merging is deliberately absent - merging
//! lists by index or by key is ambiguous, so the engine opts for
//! deterministic full replacement.

pub mod toml;
pub mod yaml;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// How a patch is combined with a base document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Recursive by key: mappings merge, sequences and scalars replace.
    #[default]
    Deep,
    /// Top-level keys only, replace-on-conflict. A non-mapping base
    /// degenerates to full replace.
    Shallow,
    /// The patch entirely replaces the base, at any depth.
    Override,
}

impl FromStr for MergeStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "deep" => Ok(MergeStrategy::Deep),
            "shallow" => Ok(MergeStrategy::Shallow),
            "override" => Ok(MergeStrategy::Override),
            other => Err(Error::Config {
                message: format!("unknown merge strategy: {}", other),
            }),
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::Deep => write!(f, "deep"),
            MergeStrategy::Shallow => write!(f, "shallow"),
            MergeStrategy::Override => write!(f, "override"),
        }
    }
}

/// Recursively merge a patch value into a base value
///
/// Mappings merge key by key; any other pairing (sequence, scalar, or a
/// type conflict) replaces the base value with a clone of the patch.
/// There is no numeric coercion across type conflicts.
pub fn deep_merge_values(base: &mut JsonValue, patch: &JsonValue) {
    if let (JsonValue::Object(base_map), JsonValue::Object(patch_map)) = (&mut *base, patch) {
        for (key, patch_value) in patch_map {
            if let Some(existing) = base_map.get_mut(key) {
                if existing.is_object() && patch_value.is_object() {
                    deep_merge_values(existing, patch_value);
                    continue;
                }
            }
            base_map.insert(key.clone(), patch_value.clone());
        }
    } else {
        *base = patch.clone();
    }
}

/// Merge only top-level keys, replacing on conflict
pub fn shallow_merge_values(base: &mut JsonValue, patch: &JsonValue) {
    if let (JsonValue::Object(base_map), JsonValue::Object(patch_map)) = (&mut *base, patch) {
        for (key, patch_value) in patch_map {
            base_map.insert(key.clone(), patch_value.clone());
        }
    } else {
        *base = patch.clone();
    }
}

/// Deep-merge an arbitrary number of plain documents, left to right
///
/// Later documents take precedence. Zero documents yield an empty
/// mapping. This operates on plain mappings with no format-preservation
/// hooks, for ad hoc combination outside a handle:
///
/// ```
/// use serde_json::json;
///
/// let merged = consign::merge::merge_deep([
///     json!({"server": {"host": "h", "port": 1}}),
///     json!({"server": {"port": 2}}),
/// ]);
/// assert_eq!(merged, json!({"server": {"host": "h", "port": 2}}));
/// ```
pub fn merge_deep<I>(docs: I) -> JsonValue
where
    I: IntoIterator<Item = JsonValue>,
{
    let mut iter = docs.into_iter();
    let mut result = match iter.next() {
        Some(doc) => doc,
        None => JsonValue::Object(Default::default()),
    };
    for doc in iter {
        deep_merge_values(&mut result, &doc);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod strategy_tests {
        use super::*;

        #[test]
        fn test_strategy_from_str() {
            assert_eq!("deep".parse::<MergeStrategy>().unwrap(), MergeStrategy::Deep);
            assert_eq!(
                "shallow".parse::<MergeStrategy>().unwrap(),
                MergeStrategy::Shallow
            );
            assert_eq!(
                "override".parse::<MergeStrategy>().unwrap(),
                MergeStrategy::Override
            );
        }

        #[test]
        fn test_unknown_strategy_is_config_error() {
            let result = "sideways".parse::<MergeStrategy>();
            assert!(matches!(result, Err(Error::Config { .. })));
            let message = result.unwrap_err().to_string();
            assert!(message.contains("unknown merge strategy"));
            assert!(message.contains("sideways"));
        }

        #[test]
        fn test_strategy_names_are_case_sensitive() {
            assert!("Deep".parse::<MergeStrategy>().is_err());
            assert!("DEEP".parse::<MergeStrategy>().is_err());
        }

        #[test]
        fn test_strategy_default_is_deep() {
            assert_eq!(MergeStrategy::default(), MergeStrategy::Deep);
        }

        #[test]
        fn test_strategy_display_roundtrip() {
            for strategy in [
                MergeStrategy::Deep,
                MergeStrategy::Shallow,
                MergeStrategy::Override,
            ] {
                let parsed: MergeStrategy = strategy.to_string().parse().unwrap();
                assert_eq!(parsed, strategy);
            }
        }
    }

    mod deep_merge_tests {
        use super::*;

        #[test]
        fn test_scalar_and_list_replace() {
            let mut base = json!({"a": 1, "b": [1, 2, 3]});
            deep_merge_values(&mut base, &json!({"a": 2, "b": [9]}));
            assert_eq!(base, json!({"a": 2, "b": [9]}));
        }

        #[test]
        fn test_nested_mapping_recursion() {
            let mut base = json!({"server": {"host": "h", "port": 1}});
            deep_merge_values(&mut base, &json!({"server": {"port": 2}}));
            assert_eq!(base, json!({"server": {"host": "h", "port": 2}}));
        }

        #[test]
        fn test_new_keys_inserted() {
            let mut base = json!({"a": 1});
            deep_merge_values(&mut base, &json!({"b": {"c": 2}}));
            assert_eq!(base, json!({"a": 1, "b": {"c": 2}}));
        }

        #[test]
        fn test_type_conflict_replaces() {
            let mut base = json!({"a": {"nested": true}});
            deep_merge_values(&mut base, &json!({"a": 42}));
            assert_eq!(base, json!({"a": 42}));

            let mut base = json!({"a": 42});
            deep_merge_values(&mut base, &json!({"a": {"nested": true}}));
            assert_eq!(base, json!({"a": {"nested": true}}));
        }

        #[test]
        fn test_non_mapping_base_replaced() {
            let mut base = json!([1, 2, 3]);
            deep_merge_values(&mut base, &json!({"a": 1}));
            assert_eq!(base, json!({"a": 1}));
        }
    }

    mod shallow_merge_tests {
        use super::*;

        #[test]
        fn test_shallow_does_not_recurse() {
            let mut base = json!({"server": {"host": "h", "port": 1}});
            shallow_merge_values(&mut base, &json!({"server": {"port": 2}}));
            // The whole nested mapping is replaced, not merged
            assert_eq!(base, json!({"server": {"port": 2}}));
        }

        #[test]
        fn test_shallow_keeps_unrelated_keys() {
            let mut base = json!({"a": 1, "b": 2});
            shallow_merge_values(&mut base, &json!({"b": 3}));
            assert_eq!(base, json!({"a": 1, "b": 3}));
        }

        #[test]
        fn test_shallow_non_mapping_base_degenerates_to_replace() {
            let mut base = json!("scalar");
            shallow_merge_values(&mut base, &json!({"a": 1}));
            assert_eq!(base, json!({"a": 1}));
        }
    }

    mod merge_deep_fold_tests {
        use super::*;

        #[test]
        fn test_zero_docs_yields_empty_mapping() {
            assert_eq!(merge_deep(Vec::new()), json!({}));
        }

        #[test]
        fn test_single_doc_is_identity() {
            let doc = json!({"a": {"b": 1}});
            assert_eq!(merge_deep([doc.clone()]), doc);
        }

        #[test]
        fn test_left_to_right_precedence() {
            let merged = merge_deep([
                json!({"a": 1, "b": 1}),
                json!({"b": 2, "c": 2}),
                json!({"c": 3}),
            ]);
            assert_eq!(merged, json!({"a": 1, "b": 2, "c": 3}));
        }

        #[test]
        fn test_merge_is_deterministic_and_idempotent() {
            let a = json!({"server": {"host": "h", "port": 1}, "list": [1, 2]});
            let b = json!({"server": {"port": 2}});

            let once = merge_deep([a.clone(), b.clone()]);
            let again = merge_deep([a, b.clone()]);
            assert_eq!(once, again);

            // Re-applying an already-merged patch changes nothing
            let twice = merge_deep([once.clone(), b]);
            assert_eq!(once, twice);
        }

        #[test]
        fn test_end_to_end_port_override() {
            let base = json!({"server": {"port": 8080}});
            let local = json!({"server": {"port": 3000}});
            assert_eq!(merge_deep([base, local]), json!({"server": {"port": 3000}}));
        }
    }
}
