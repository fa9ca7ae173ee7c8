//! Per-file session handles
//!
//! A [`Handle`] binds exactly one [`Document`] to a target path on a
//! [`Storage`] backend and exposes the read/merge/replace/delete surface
//! on top of it. Mutating operations return `&mut Self` so calls chain.
//!
//! ## Loading
//!
//! Handles load lazily: the first read or mutating operation triggers
//! exactly one load, and a missing target initializes an empty document
//! of the declared format. Calling [`Handle::load`] explicitly re-reads
//! from the backend and **discards unsaved in-memory changes** - call
//! order matters.
//!
//! ## Saving
//!
//! Saving to the handle's own target defaults to staging into a
//! [`Plan`] so the change can be previewed before anything touches real
//! storage; saving to an explicit other path defaults to a direct
//! write. The four combinations are explicit methods:
//!
//! | target        | staged              | direct          |
//! |---------------|---------------------|-----------------|
//! | own path      | [`Handle::save`]    | [`Handle::save_direct`] |
//! | explicit path | [`Handle::stage_to`]| [`Handle::save_to`]     |

use std::path::{Path, PathBuf};

use log::debug;
use serde_json::Value as JsonValue;

use crate::document::{Document, Format};
use crate::error::{Error, Result};
use crate::merge::MergeStrategy;
use crate::plan::Plan;
use crate::storage::Storage;

/// A session object binding one document to one target path
pub struct Handle<'fs> {
    storage: &'fs dyn Storage,
    target: PathBuf,
    format: Format,
    document: Document,
    loaded: bool,
}

impl<'fs> Handle<'fs> {
    /// Create a handle for `path` with an explicit format.
    ///
    /// Nothing is read until the first operation.
    pub fn new<P: Into<PathBuf>>(storage: &'fs dyn Storage, path: P, format: Format) -> Self {
        Handle {
            storage,
            target: path.into(),
            format,
            document: Document::empty(format),
            loaded: false,
        }
    }

    /// Create a handle, inferring the format from the path's extension.
    pub fn from_path<P: Into<PathBuf>>(storage: &'fs dyn Storage, path: P) -> Result<Self> {
        let path = path.into();
        let format = Format::from_path(&path).ok_or_else(|| Error::Config {
            message: format!("cannot infer document format from '{}'", path.display()),
        })?;
        Ok(Handle::new(storage, path, format))
    }

    /// Shorthand for a TOML handle.
    pub fn toml<P: Into<PathBuf>>(storage: &'fs dyn Storage, path: P) -> Self {
        Handle::new(storage, path, Format::Toml)
    }

    /// Shorthand for a YAML handle.
    pub fn yaml<P: Into<PathBuf>>(storage: &'fs dyn Storage, path: P) -> Self {
        Handle::new(storage, path, Format::Yaml)
    }

    /// Shorthand for a JSON handle.
    pub fn json<P: Into<PathBuf>>(storage: &'fs dyn Storage, path: P) -> Self {
        Handle::new(storage, path, Format::Json)
    }

    pub fn path(&self) -> &Path {
        &self.target
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Load the document from the backend.
    ///
    /// Reads and parses the target if it exists; otherwise installs an
    /// empty document of the handle's format. Implicit ensure-loaded
    /// calls are no-ops after the first load, but calling `load` again
    /// explicitly re-reads from the backend and discards any unsaved
    /// in-memory changes.
    pub fn load(&mut self) -> Result<&mut Self> {
        if self.storage.exists(&self.target) {
            let content = self.storage.read_text(&self.target)?;
            self.document = Document::parse(&content, self.format)?;
        } else {
            debug!("target '{}' does not exist, starting empty", self.target.display());
            self.document = Document::empty(self.format);
        }
        self.loaded = true;
        Ok(self)
    }

    fn ensure_loaded(&mut self) -> Result<()> {
        if !self.loaded {
            self.load()?;
        }
        Ok(())
    }

    /// Return the plain-mapping view of the current content.
    ///
    /// The returned value is a detached copy; mutating it does not
    /// affect the handle. Feed it back through [`Handle::replace`] to
    /// apply edits.
    pub fn read(&mut self) -> Result<JsonValue> {
        self.ensure_loaded()?;
        Ok(self.document.to_plain())
    }

    /// Replace the entire content with a new mapping.
    pub fn replace(&mut self, content: &JsonValue) -> Result<&mut Self> {
        self.ensure_loaded()?;
        self.document.replace(content)?;
        Ok(self)
    }

    /// Deep-merge a patch into the document.
    pub fn merge(&mut self, patch: &JsonValue) -> Result<&mut Self> {
        self.merge_with(patch, MergeStrategy::Deep)
    }

    /// Merge a patch under an explicit strategy.
    pub fn merge_with(&mut self, patch: &JsonValue, strategy: MergeStrategy) -> Result<&mut Self> {
        self.ensure_loaded()?;
        self.document.merge(patch, strategy)?;
        Ok(self)
    }

    /// Delete dot-separated paths from the document.
    ///
    /// Each path is applied independently; a path whose intermediate
    /// segments are missing or not mappings silently no-ops.
    pub fn delete(&mut self, paths: &[&str]) -> Result<&mut Self> {
        self.ensure_loaded()?;
        for path in paths {
            self.document.delete_path(path);
        }
        Ok(self)
    }

    /// Stage the serialized content at the handle's own target.
    ///
    /// This is the default save path: nothing touches real storage
    /// until the plan commits.
    pub fn save(&mut self, plan: &mut Plan) -> Result<()> {
        self.ensure_loaded()?;
        let content = self.document.serialize()?;
        plan.stage(self.storage, &self.target, content)
    }

    /// Write the serialized content directly to the handle's own target,
    /// bypassing any plan.
    pub fn save_direct(&mut self) -> Result<()> {
        self.ensure_loaded()?;
        let content = self.document.serialize()?;
        self.storage.write_text(&self.target, &content)
    }

    /// Write the serialized content directly to an explicit path.
    ///
    /// Saving to a different location defaults to a direct write; use
    /// [`Handle::stage_to`] to preview it through a plan instead.
    pub fn save_to<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.ensure_loaded()?;
        let content = self.document.serialize()?;
        self.storage.write_text(path.as_ref(), &content)
    }

    /// Stage the serialized content at an explicit path.
    pub fn stage_to<P: AsRef<Path>>(&mut self, path: P, plan: &mut Plan) -> Result<()> {
        self.ensure_loaded()?;
        let content = self.document.serialize()?;
        plan.stage(self.storage, path.as_ref(), content)
    }
}
