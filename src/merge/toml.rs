//! TOML merge operations
//!
//! Format-preserving deep merge into `toml_edit` containers. Keys that
//! already exist in the base document keep their lexical form (comments,
//! key order, quote style); only injected content is newly formatted.
//!
//! ## Behavior
//!
//! - Keys absent from the base are inserted using the container's native
//!   item type, so nested patch mappings become real sub-tables.
//! - Table/table pairs recurse; inline tables recurse among themselves.
//! - A patch sequence longer than [`MULTILINE_ARRAY_THRESHOLD`] that
//!   replaces a key of a (non-inline) table is rebuilt as a multiline
//!   array, one element per line. Shorter sequences keep the default
//!   inline layout.
//! - Everything else replaces the base value entirely.
//!
//! JSON `null` has no TOML representation and is rejected with a merge
//! error rather than being dropped silently.

use log::{debug, warn};
use serde_json::{Map, Value as JsonValue};
use toml_edit::{Array, InlineTable, Item, Table, Value as TomlValue};

use crate::error::{Error, Result};

/// Patch arrays longer than this are reformatted one element per line
/// when they replace an existing key of a TOML table. Tunable; the value
/// is a readability choice, not a semantic guarantee.
pub(crate) const MULTILINE_ARRAY_THRESHOLD: usize = 2;

/// Recursively merge a plain patch mapping into a `toml_edit` table
pub(crate) fn deep_merge_table(table: &mut Table, patch: &Map<String, JsonValue>) -> Result<()> {
    for (key, patch_value) in patch {
        if !table.contains_key(key) {
            table.insert(key.as_str(), json_to_item(patch_value)?);
            continue;
        }
        if let Some(existing) = table.get_mut(key) {
            merge_into_item(existing, patch_value, key)?;
        }
    }
    Ok(())
}

fn merge_into_item(item: &mut Item, patch_value: &JsonValue, key: &str) -> Result<()> {
    if let (Item::Table(sub), JsonValue::Object(object)) = (&mut *item, patch_value) {
        return deep_merge_table(sub, object);
    }
    if let (Item::Value(TomlValue::InlineTable(sub)), JsonValue::Object(object)) =
        (&mut *item, patch_value)
    {
        return deep_merge_inline(sub, object);
    }
    if let JsonValue::Array(items) = patch_value {
        if items.len() > MULTILINE_ARRAY_THRESHOLD {
            debug!(
                "replacing '{}' with a {}-element multiline array",
                key,
                items.len()
            );
            *item = Item::Value(TomlValue::Array(multiline_array(items)?));
            return Ok(());
        }
    }
    let existing_type = item_type_name(item);
    let patch_type = json_type_name(patch_value);
    if existing_type != patch_type {
        warn!(
            "type mismatch at key '{}': replacing {} with {}",
            key, existing_type, patch_type
        );
    }
    *item = json_to_item(patch_value)?;
    Ok(())
}

fn deep_merge_inline(table: &mut InlineTable, patch: &Map<String, JsonValue>) -> Result<()> {
    for (key, patch_value) in patch {
        if !table.contains_key(key) {
            table.insert(key.as_str(), json_to_value(patch_value)?);
            continue;
        }
        if let Some(existing) = table.get_mut(key) {
            if let (TomlValue::InlineTable(sub), JsonValue::Object(object)) =
                (&mut *existing, patch_value)
            {
                deep_merge_inline(sub, object)?;
                continue;
            }
            *existing = json_to_value(patch_value)?;
        }
    }
    Ok(())
}

/// Build a multiline array from plain values, one element per line
fn multiline_array(items: &[JsonValue]) -> Result<Array> {
    let mut array = Array::new();
    for item in items {
        array.push(json_to_value(item)?);
    }
    for value in array.iter_mut() {
        value.decor_mut().set_prefix("\n    ");
        value.decor_mut().set_suffix("");
    }
    array.set_trailing("\n");
    array.set_trailing_comma(true);
    Ok(array)
}

/// Convert a plain value into a table-position TOML item
///
/// Mappings become real sub-tables; everything else becomes a value
/// item. Used both for merge insertion and for `replace`.
pub(crate) fn json_to_item(value: &JsonValue) -> Result<Item> {
    match value {
        JsonValue::Object(map) => {
            let mut table = Table::new();
            for (key, value) in map {
                table.insert(key.as_str(), json_to_item(value)?);
            }
            Ok(Item::Table(table))
        }
        other => Ok(Item::Value(json_to_value(other)?)),
    }
}

/// Convert a plain value into a value-position TOML value
///
/// Mappings in value position (inside arrays or inline tables) become
/// inline tables.
pub(crate) fn json_to_value(value: &JsonValue) -> Result<TomlValue> {
    match value {
        JsonValue::Null => Err(Error::Merge {
            operation: "toml merge".to_string(),
            message: "null is not representable in TOML".to_string(),
        }),
        JsonValue::Bool(b) => Ok(TomlValue::from(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(TomlValue::from(i))
            } else if let Some(f) = n.as_f64() {
                Ok(TomlValue::from(f))
            } else {
                Err(Error::Merge {
                    operation: "toml merge".to_string(),
                    message: format!("number {} is not representable in TOML", n),
                })
            }
        }
        JsonValue::String(s) => Ok(TomlValue::from(s.as_str())),
        JsonValue::Array(items) => {
            let mut array = Array::new();
            for item in items {
                array.push(json_to_value(item)?);
            }
            Ok(TomlValue::Array(array))
        }
        JsonValue::Object(map) => {
            let mut table = InlineTable::new();
            for (key, value) in map {
                table.insert(key.as_str(), json_to_value(value)?);
            }
            Ok(TomlValue::InlineTable(table))
        }
    }
}

/// Convert a `toml_edit` table to a plain mapping, insertion-ordered
pub(crate) fn table_to_json(table: &Table) -> JsonValue {
    let mut map = Map::new();
    for (key, item) in table.iter() {
        map.insert(key.to_string(), item_to_json(item));
    }
    JsonValue::Object(map)
}

/// Convert a `toml_edit` item to a plain value
pub(crate) fn item_to_json(item: &Item) -> JsonValue {
    match item {
        Item::None => JsonValue::Null,
        Item::Value(value) => value_to_json(value),
        Item::Table(table) => table_to_json(table),
        Item::ArrayOfTables(tables) => {
            JsonValue::Array(tables.iter().map(|t| table_to_json(t)).collect())
        }
    }
}

fn value_to_json(value: &TomlValue) -> JsonValue {
    match value {
        TomlValue::String(s) => JsonValue::String(s.value().to_string()),
        TomlValue::Integer(i) => JsonValue::from(*i.value()),
        TomlValue::Float(f) => serde_json::Number::from_f64(*f.value())
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        TomlValue::Boolean(b) => JsonValue::Bool(*b.value()),
        TomlValue::Datetime(d) => JsonValue::String(d.to_string()),
        TomlValue::Array(array) => JsonValue::Array(array.iter().map(value_to_json).collect()),
        TomlValue::InlineTable(table) => {
            let mut map = Map::new();
            for (key, value) in table.iter() {
                map.insert(key.to_string(), value_to_json(value));
            }
            JsonValue::Object(map)
        }
    }
}

fn item_type_name(item: &Item) -> &'static str {
    match item {
        Item::None => "None",
        Item::Table(_) | Item::ArrayOfTables(_) => "Table",
        Item::Value(TomlValue::String(_)) => "String",
        Item::Value(TomlValue::Integer(_)) => "Integer",
        Item::Value(TomlValue::Float(_)) => "Float",
        Item::Value(TomlValue::Boolean(_)) => "Boolean",
        Item::Value(TomlValue::Datetime(_)) => "Datetime",
        Item::Value(TomlValue::Array(_)) => "Array",
        Item::Value(TomlValue::InlineTable(_)) => "Table",
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "Null",
        JsonValue::Bool(_) => "Boolean",
        JsonValue::Number(n) if n.is_f64() => "Float",
        JsonValue::Number(_) => "Integer",
        JsonValue::String(_) => "String",
        JsonValue::Array(_) => "Array",
        JsonValue::Object(_) => "Table",
    }
}
