//! YAML merge operations
//!
//! Deep merge on `serde_yaml` values, plus the conversions between the
//! plain `serde_json::Value` model and YAML values. Mappings recurse,
//! sequences and scalars replace. `serde_yaml`'s mapping type is
//! insertion-ordered, so existing keys keep their position and new keys
//! append at the end.

use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

/// Recursively merge a patch into a base YAML value
///
/// Mapping/mapping pairs merge key by key; any other pairing replaces
/// the base value with a clone of the patch.
pub(crate) fn deep_merge(base: &mut YamlValue, patch: &YamlValue) {
    if let (YamlValue::Mapping(base_map), YamlValue::Mapping(patch_map)) = (&mut *base, patch) {
        for (key, patch_value) in patch_map {
            if let Some(existing) = base_map.get_mut(key) {
                if existing.is_mapping() && patch_value.is_mapping() {
                    deep_merge(existing, patch_value);
                    continue;
                }
            }
            base_map.insert(key.clone(), patch_value.clone());
        }
    } else {
        *base = patch.clone();
    }
}

/// Convert a plain value to a YAML value
pub(crate) fn json_to_yaml(value: &JsonValue) -> YamlValue {
    match value {
        JsonValue::Null => YamlValue::Null,
        JsonValue::Bool(b) => YamlValue::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                YamlValue::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                YamlValue::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                YamlValue::Number(f.into())
            } else {
                YamlValue::Null
            }
        }
        JsonValue::String(s) => YamlValue::String(s.clone()),
        JsonValue::Array(items) => YamlValue::Sequence(items.iter().map(json_to_yaml).collect()),
        JsonValue::Object(map) => {
            let mut mapping = serde_yaml::Mapping::new();
            for (key, value) in map {
                mapping.insert(YamlValue::String(key.clone()), json_to_yaml(value));
            }
            YamlValue::Mapping(mapping)
        }
    }
}

/// Convert a YAML value to the plain format-agnostic model
///
/// Scalar mapping keys that are not strings (numbers, booleans) are
/// stringified; exotic keys (sequences, mappings) are skipped.
pub(crate) fn yaml_to_json(value: &YamlValue) -> JsonValue {
    match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(JsonValue::Number)
                    .unwrap_or(JsonValue::Null)
            } else {
                JsonValue::Null
            }
        }
        YamlValue::String(s) => JsonValue::String(s.clone()),
        YamlValue::Sequence(items) => JsonValue::Array(items.iter().map(yaml_to_json).collect()),
        YamlValue::Mapping(mapping) => {
            let mut map = serde_json::Map::new();
            for (key, value) in mapping {
                let key = match key {
                    YamlValue::String(s) => s.clone(),
                    YamlValue::Bool(b) => b.to_string(),
                    YamlValue::Number(n) => n.to_string(),
                    _ => continue,
                };
                map.insert(key, yaml_to_json(value));
            }
            JsonValue::Object(map)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}
