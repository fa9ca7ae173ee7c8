//! Property-based tests for the merge engine.
//!
//! These tests use proptest to generate random document trees and verify
//! that merge invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::merge::{deep_merge_values, merge_deep};
    use proptest::prelude::*;
    use serde_json::{Map, Value};

    /// Arbitrary JSON-like document trees. Floats are excluded so value
    /// equality stays well-defined under comparison.
    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z0-9]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::vec(("[a-z]{1,5}", inner), 0..4).prop_map(|pairs| {
                    let mut map = Map::new();
                    for (key, value) in pairs {
                        map.insert(key, value);
                    }
                    Value::Object(map)
                }),
            ]
        })
    }

    fn arb_mapping() -> impl Strategy<Value = Value> {
        prop::collection::vec(("[a-z]{1,5}", arb_value()), 0..5).prop_map(|pairs| {
            let mut map = Map::new();
            for (key, value) in pairs {
                map.insert(key, value);
            }
            Value::Object(map)
        })
    }

    proptest! {
        /// Property: merging the same documents twice yields the same result
        #[test]
        fn merge_is_deterministic(a in arb_mapping(), b in arb_mapping()) {
            let first = merge_deep([a.clone(), b.clone()]);
            let second = merge_deep([a, b]);
            prop_assert_eq!(first, second);
        }

        /// Property: re-applying an already-merged patch changes nothing
        #[test]
        fn merge_is_idempotent_over_applied_patch(a in arb_mapping(), b in arb_mapping()) {
            let merged = merge_deep([a, b.clone()]);
            let again = merge_deep([merged.clone(), b]);
            prop_assert_eq!(merged, again);
        }

        /// Property: the empty patch is a right identity for mappings
        #[test]
        fn empty_patch_is_identity(a in arb_mapping()) {
            let merged = merge_deep([a.clone(), Value::Object(Map::new())]);
            prop_assert_eq!(merged, a);
        }

        /// Property: a single document folds to itself
        #[test]
        fn single_document_is_identity(a in arb_value()) {
            prop_assert_eq!(merge_deep([a.clone()]), a);
        }

        /// Property: every key of the patch ends up in the result with a
        /// value derived from the patch
        #[test]
        fn patch_keys_always_present(a in arb_mapping(), b in arb_mapping()) {
            let merged = merge_deep([a, b.clone()]);
            let merged_map = merged.as_object().unwrap();
            for key in b.as_object().unwrap().keys() {
                prop_assert!(merged_map.contains_key(key), "missing patch key '{}'", key);
            }
        }

        /// Property: base keys absent from the patch survive unchanged
        #[test]
        fn base_keys_survive(a in arb_mapping(), b in arb_mapping()) {
            let mut merged = a.clone();
            deep_merge_values(&mut merged, &b);
            let a_map = a.as_object().unwrap();
            let b_map = b.as_object().unwrap();
            let merged_map = merged.as_object().unwrap();
            for (key, value) in a_map {
                if !b_map.contains_key(key) {
                    prop_assert_eq!(merged_map.get(key), Some(value));
                }
            }
        }

        /// Property: non-mapping patch values replace the base value whole
        #[test]
        fn sequences_replace_entirely(
            base_items in prop::collection::vec(any::<i64>(), 0..5),
            patch_items in prop::collection::vec(any::<i64>(), 0..5),
        ) {
            let mut base = serde_json::json!({ "list": base_items });
            let patch = serde_json::json!({ "list": patch_items.clone() });
            deep_merge_values(&mut base, &patch);
            prop_assert_eq!(&base["list"], &serde_json::json!(patch_items));
        }
    }
}
