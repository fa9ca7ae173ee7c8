//! Structured document model with format-aware representation
//!
//! A [`Document`] holds one structured file's content in memory, in a
//! container appropriate to its [`Format`]:
//!
//! - TOML rides [`toml_edit::DocumentMut`], so comments, key order,
//!   quote style, and array layout survive a read-merge-write cycle for
//!   every key the merge does not touch.
//! - YAML keeps its parsed [`serde_yaml::Value`] next to a raw-bytes
//!   cache. An unmodified document serializes back to its original
//!   bytes; once content changes, output is re-rendered with insertion
//!   order preserved (comments are not retained across mutation).
//! - JSON keeps a plain [`serde_json::Value`]. Output is always
//!   pretty-printed with a 2-space indent, UTF-8 without ASCII
//!   escaping, and a trailing newline.
//!
//! All formats share the same contract at the edges: parsing empty or
//! whitespace-only input yields an empty mapping (a YAML `null` document
//! also normalizes to an empty mapping, never null), and `to_plain`
//! returns a detached, format-agnostic `serde_json::Value` view.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use toml_edit::{DocumentMut, InlineTable, Item, Table, Value as TomlValue};

use crate::error::{Error, Result};
use crate::merge::toml::{deep_merge_table, json_to_item, table_to_json};
use crate::merge::yaml::{deep_merge, json_to_yaml, yaml_to_json};
use crate::merge::{deep_merge_values, shallow_merge_values, MergeStrategy};

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Toml,
    Yaml,
    Json,
}

impl Format {
    /// Infer the format from a path's extension.
    ///
    /// Recognizes `.toml`, `.yaml`, `.yml`, and `.json` (case-insensitive).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "toml" => Some(Format::Toml),
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Toml => write!(f, "TOML"),
            Format::Yaml => write!(f, "YAML"),
            Format::Json => write!(f, "JSON"),
        }
    }
}

/// One structured file's content in memory
#[derive(Debug, Clone)]
pub enum Document {
    Toml(TomlDocument),
    Yaml(YamlDocument),
    Json(JsonDocument),
}

impl Document {
    /// Parse raw text into a document of the given format.
    ///
    /// Empty input yields an empty mapping for every format.
    pub fn parse(raw: &str, format: Format) -> Result<Document> {
        match format {
            Format::Toml => TomlDocument::parse(raw).map(Document::Toml),
            Format::Yaml => YamlDocument::parse(raw).map(Document::Yaml),
            Format::Json => JsonDocument::parse(raw).map(Document::Json),
        }
    }

    /// Create an empty document of the given format.
    pub fn empty(format: Format) -> Document {
        match format {
            Format::Toml => Document::Toml(TomlDocument::default()),
            Format::Yaml => Document::Yaml(YamlDocument::default()),
            Format::Json => Document::Json(JsonDocument::default()),
        }
    }

    pub fn format(&self) -> Format {
        match self {
            Document::Toml(_) => Format::Toml,
            Document::Yaml(_) => Format::Yaml,
            Document::Json(_) => Format::Json,
        }
    }

    /// Return a format-agnostic view of the content, discarding lexical
    /// metadata. The returned value is a detached copy; mutating it does
    /// not affect the document.
    pub fn to_plain(&self) -> JsonValue {
        match self {
            Document::Toml(doc) => doc.to_plain(),
            Document::Yaml(doc) => doc.to_plain(),
            Document::Json(doc) => doc.to_plain(),
        }
    }

    /// Replace the entire content with a new mapping.
    ///
    /// For TOML the existing document container is cleared and
    /// repopulated in place; replaced keys lose their prior formatting.
    pub fn replace(&mut self, content: &JsonValue) -> Result<()> {
        match self {
            Document::Toml(doc) => doc.replace(content),
            Document::Yaml(doc) => doc.replace(content),
            Document::Json(doc) => doc.replace(content),
        }
    }

    /// Merge a patch into the document under the given strategy.
    pub fn merge(&mut self, patch: &JsonValue, strategy: MergeStrategy) -> Result<()> {
        match strategy {
            MergeStrategy::Deep => match self {
                Document::Toml(doc) => doc.merge_deep(patch),
                Document::Yaml(doc) => doc.merge_deep(patch),
                Document::Json(doc) => doc.merge_deep(patch),
            },
            MergeStrategy::Shallow => match self {
                Document::Toml(doc) => doc.merge_shallow(patch),
                Document::Yaml(doc) => doc.merge_shallow(patch),
                Document::Json(doc) => doc.merge_shallow(patch),
            },
            MergeStrategy::Override => self.replace(patch),
        }
    }

    /// Delete a dot-separated path from the document.
    ///
    /// Silently no-ops when an intermediate segment is missing or not a
    /// mapping. Returns whether anything was removed.
    pub fn delete_path(&mut self, dotted: &str) -> bool {
        let parts: Vec<&str> = dotted.split('.').collect();
        match self {
            Document::Toml(doc) => doc.delete_path(&parts),
            Document::Yaml(doc) => doc.delete_path(&parts),
            Document::Json(doc) => doc.delete_path(&parts),
        }
    }

    /// Dump the document back to text.
    pub fn serialize(&self) -> Result<String> {
        match self {
            Document::Toml(doc) => doc.serialize(),
            Document::Yaml(doc) => doc.serialize(),
            Document::Json(doc) => doc.serialize(),
        }
    }
}

/// TOML document backed by a format-preserving `toml_edit` container
#[derive(Debug, Clone, Default)]
pub struct TomlDocument {
    inner: DocumentMut,
}

impl TomlDocument {
    fn parse(raw: &str) -> Result<TomlDocument> {
        let inner: DocumentMut = raw.parse().map_err(|e: toml_edit::TomlError| Error::Parse {
            format: Format::Toml,
            message: e.to_string(),
        })?;
        Ok(TomlDocument { inner })
    }

    fn to_plain(&self) -> JsonValue {
        table_to_json(self.inner.as_table())
    }

    fn replace(&mut self, content: &JsonValue) -> Result<()> {
        let mapping = expect_toml_mapping(content, "toml replace")?;
        let table = self.inner.as_table_mut();
        table.clear();
        for (key, value) in mapping {
            table.insert(key.as_str(), json_to_item(value)?);
        }
        Ok(())
    }

    fn merge_deep(&mut self, patch: &JsonValue) -> Result<()> {
        let mapping = expect_toml_mapping(patch, "toml merge")?;
        deep_merge_table(self.inner.as_table_mut(), mapping)
    }

    fn merge_shallow(&mut self, patch: &JsonValue) -> Result<()> {
        let mapping = expect_toml_mapping(patch, "toml merge")?;
        let table = self.inner.as_table_mut();
        for (key, value) in mapping {
            table.insert(key.as_str(), json_to_item(value)?);
        }
        Ok(())
    }

    fn delete_path(&mut self, parts: &[&str]) -> bool {
        remove_from_table(self.inner.as_table_mut(), parts)
    }

    fn serialize(&self) -> Result<String> {
        Ok(self.inner.to_string())
    }
}

fn expect_toml_mapping<'a>(
    value: &'a JsonValue,
    operation: &str,
) -> Result<&'a serde_json::Map<String, JsonValue>> {
    value.as_object().ok_or_else(|| Error::Merge {
        operation: operation.to_string(),
        message: "a TOML document root can only hold a mapping".to_string(),
    })
}

fn remove_from_table(table: &mut Table, parts: &[&str]) -> bool {
    match parts {
        [] => false,
        [last] => table.remove(last).is_some(),
        [head, rest @ ..] => match table.get_mut(head) {
            Some(Item::Table(sub)) => remove_from_table(sub, rest),
            Some(Item::Value(TomlValue::InlineTable(sub))) => remove_from_inline(sub, rest),
            _ => false,
        },
    }
}

fn remove_from_inline(table: &mut InlineTable, parts: &[&str]) -> bool {
    match parts {
        [] => false,
        [last] => table.remove(last).is_some(),
        [head, rest @ ..] => match table.get_mut(head) {
            Some(TomlValue::InlineTable(sub)) => remove_from_inline(sub, rest),
            _ => false,
        },
    }
}

/// YAML document with a raw-bytes cache for unmodified round trips
#[derive(Debug, Clone)]
pub struct YamlDocument {
    value: YamlValue,
    /// Original source text, kept until the first content mutation so an
    /// untouched document serializes back byte-for-byte.
    raw: Option<String>,
}

impl Default for YamlDocument {
    fn default() -> Self {
        YamlDocument {
            value: YamlValue::Mapping(Default::default()),
            raw: None,
        }
    }
}

impl YamlDocument {
    fn parse(raw: &str) -> Result<YamlDocument> {
        let value = if raw.trim().is_empty() {
            YamlValue::Mapping(Default::default())
        } else {
            let parsed: YamlValue = serde_yaml::from_str(raw).map_err(|e| Error::Parse {
                format: Format::Yaml,
                message: e.to_string(),
            })?;
            // An explicit null document keeps the mapping contract uniform
            // across formats.
            if parsed.is_null() {
                YamlValue::Mapping(Default::default())
            } else {
                parsed
            }
        };
        Ok(YamlDocument {
            value,
            raw: Some(raw.to_string()),
        })
    }

    fn to_plain(&self) -> JsonValue {
        yaml_to_json(&self.value)
    }

    fn replace(&mut self, content: &JsonValue) -> Result<()> {
        self.value = json_to_yaml(content);
        self.raw = None;
        Ok(())
    }

    fn merge_deep(&mut self, patch: &JsonValue) -> Result<()> {
        let patch = json_to_yaml(patch);
        deep_merge(&mut self.value, &patch);
        self.raw = None;
        Ok(())
    }

    fn merge_shallow(&mut self, patch: &JsonValue) -> Result<()> {
        match (&mut self.value, patch) {
            (YamlValue::Mapping(mapping), JsonValue::Object(object)) => {
                for (key, value) in object {
                    mapping.insert(YamlValue::String(key.clone()), json_to_yaml(value));
                }
            }
            (value, patch) => *value = json_to_yaml(patch),
        }
        self.raw = None;
        Ok(())
    }

    fn delete_path(&mut self, parts: &[&str]) -> bool {
        let removed = match &mut self.value {
            YamlValue::Mapping(mapping) => remove_from_mapping(mapping, parts),
            _ => false,
        };
        // No-op deletes leave the lexical cache (and the original bytes)
        // intact.
        if removed {
            self.raw = None;
        }
        removed
    }

    fn serialize(&self) -> Result<String> {
        if let Some(raw) = &self.raw {
            return Ok(raw.clone());
        }
        serde_yaml::to_string(&self.value).map_err(|e| Error::Serialization {
            message: format!("failed to dump YAML: {}", e),
        })
    }
}

fn remove_from_mapping(mapping: &mut serde_yaml::Mapping, parts: &[&str]) -> bool {
    match parts {
        [] => false,
        [last] => mapping
            .remove(&YamlValue::String((*last).to_string()))
            .is_some(),
        [head, rest @ ..] => {
            match mapping.get_mut(&YamlValue::String((*head).to_string())) {
                Some(YamlValue::Mapping(sub)) => remove_from_mapping(sub, rest),
                _ => false,
            }
        }
    }
}

/// JSON document
#[derive(Debug, Clone)]
pub struct JsonDocument {
    value: JsonValue,
}

impl Default for JsonDocument {
    fn default() -> Self {
        JsonDocument {
            value: JsonValue::Object(Default::default()),
        }
    }
}

impl JsonDocument {
    fn parse(raw: &str) -> Result<JsonDocument> {
        let value = if raw.trim().is_empty() {
            JsonValue::Object(Default::default())
        } else {
            serde_json::from_str(raw).map_err(|e| Error::Parse {
                format: Format::Json,
                message: e.to_string(),
            })?
        };
        Ok(JsonDocument { value })
    }

    fn to_plain(&self) -> JsonValue {
        self.value.clone()
    }

    fn replace(&mut self, content: &JsonValue) -> Result<()> {
        self.value = content.clone();
        Ok(())
    }

    fn merge_deep(&mut self, patch: &JsonValue) -> Result<()> {
        deep_merge_values(&mut self.value, patch);
        Ok(())
    }

    fn merge_shallow(&mut self, patch: &JsonValue) -> Result<()> {
        shallow_merge_values(&mut self.value, patch);
        Ok(())
    }

    fn delete_path(&mut self, parts: &[&str]) -> bool {
        match &mut self.value {
            JsonValue::Object(map) => remove_from_object(map, parts),
            _ => false,
        }
    }

    fn serialize(&self) -> Result<String> {
        let mut output =
            serde_json::to_string_pretty(&self.value).map_err(|e| Error::Serialization {
                message: format!("failed to dump JSON: {}", e),
            })?;
        output.push('\n');
        Ok(output)
    }
}

fn remove_from_object(map: &mut serde_json::Map<String, JsonValue>, parts: &[&str]) -> bool {
    match parts {
        [] => false,
        [last] => map.remove(*last).is_some(),
        [head, rest @ ..] => match map.get_mut(*head) {
            Some(JsonValue::Object(sub)) => remove_from_object(sub, rest),
            _ => false,
        },
    }
}
