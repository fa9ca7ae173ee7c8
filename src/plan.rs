//! Staged-write transactions
//!
//! A [`Plan`] buffers intended file writes in memory so a whole batch of
//! changes - across many handles and many files - can be previewed as a
//! unified diff and then committed or rolled back as one all-or-nothing
//! transaction boundary.
//!
//! The plan is an explicitly constructed value owned by the run context
//! and passed by reference into `stage`/`commit`; there is no global
//! state. One plan per run is the intended shape: independent tasks
//! staging into the same plan batch into a single reviewable diff.
//!
//! ## Semantics
//!
//! - **Last write wins** per path within one transaction; no history is
//!   retained.
//! - The **original** content of a path is snapshotted from storage the
//!   first time that path is staged, and never overwritten by later
//!   stages, so the diff always runs from the pre-transaction state to
//!   the latest staged content.
//! - `commit` writes every staged entry and then resets the plan. It is
//!   not crash-safe across paths: if one write fails, earlier writes
//!   stay on disk, the error propagates, and the plan's state should be
//!   considered indeterminate (accepted limitation - there is no
//!   cross-file atomicity and no on-disk journal).
//! - `rollback`/`clear` discard everything without touching storage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;
use similar::TextDiff;

use crate::error::Result;
use crate::storage::Storage;

/// An in-memory staging transaction for a batch of file writes
#[derive(Debug, Default)]
pub struct Plan {
    /// Target path -> latest staged content
    staged: BTreeMap<PathBuf, String>,
    /// Target path -> content observed in storage at first staging,
    /// `None` when the path did not exist
    original: BTreeMap<PathBuf, Option<String>>,
}

impl Plan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage content for a target path.
    ///
    /// On the first occurrence of `path` in this transaction the current
    /// storage content is snapshotted for diffing; later stages to the
    /// same path overwrite the staged content but never the snapshot.
    pub fn stage<P: AsRef<Path>>(
        &mut self,
        storage: &dyn Storage,
        path: P,
        content: String,
    ) -> Result<()> {
        let path = path.as_ref();
        if !self.original.contains_key(path) {
            let snapshot = if storage.exists(path) {
                Some(storage.read_text(path)?)
            } else {
                None
            };
            self.original.insert(path.to_path_buf(), snapshot);
        }
        self.staged.insert(path.to_path_buf(), content);
        Ok(())
    }

    /// Render a unified diff of every effective change.
    ///
    /// One block per staged path whose latest content differs from the
    /// original snapshot (a missing file diffs as empty). Paths with no
    /// effective change are omitted, so an empty summary means there is
    /// nothing to apply.
    pub fn diff_summary(&self) -> String {
        let mut blocks = Vec::new();
        for (path, staged) in &self.staged {
            let original = self
                .original
                .get(path)
                .and_then(|snapshot| snapshot.as_deref())
                .unwrap_or("");
            if original == staged {
                continue;
            }
            let label = path.display().to_string();
            let diff = TextDiff::from_lines(original, staged.as_str());
            let mut unified = diff.unified_diff();
            unified.context_radius(3).header(&label, &label);
            blocks.push(unified.to_string());
        }
        blocks.join("\n")
    }

    /// The full staged content per path, unfiltered.
    ///
    /// Unlike [`Plan::diff_summary`] this includes paths whose staged
    /// content equals the original.
    pub fn preview(&self) -> &BTreeMap<PathBuf, String> {
        &self.staged
    }

    /// Write every staged entry to storage, then reset the plan.
    ///
    /// Paths are written in deterministic (sorted) order. A failed write
    /// propagates immediately; already-written paths stay written.
    pub fn commit(&mut self, storage: &dyn Storage) -> Result<()> {
        for (path, content) in &self.staged {
            storage.write_text(path, content)?;
        }
        debug!("committed {} staged file(s)", self.staged.len());
        self.staged.clear();
        self.original.clear();
        Ok(())
    }

    /// Discard all staged state without touching storage.
    pub fn rollback(&mut self) {
        self.clear();
    }

    /// Discard all staged state without touching storage.
    pub fn clear(&mut self) {
        self.staged.clear();
        self.original.clear();
    }

    /// Number of staged paths
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    /// Whether nothing is staged
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }
}
