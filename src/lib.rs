//! # Consign
//!
//! Consign synchronizes configuration fragments across structured files.
//! It deep-merges TOML/YAML/JSON documents while preserving the source
//! formatting of everything a merge does not touch, and defers writes
//! into an in-memory plan that can be previewed as a unified diff before
//! being committed - or rolled back without touching a single real file.
//!
//! ## Quick Example
//!
//! ```
//! use consign::handle::Handle;
//! use consign::plan::Plan;
//! use consign::storage::MemoryFs;
//! use serde_json::json;
//!
//! let fs = MemoryFs::new();
//! fs.insert("config.toml", "# tuning\n[server]\nport = 8080\n");
//!
//! let mut plan = Plan::new();
//! let mut handle = Handle::toml(&fs, "config.toml");
//! handle.merge(&json!({"server": {"port": 3000}})).unwrap();
//! handle.save(&mut plan).unwrap();
//!
//! // Nothing has touched storage yet; review the diff, then commit.
//! assert!(plan.diff_summary().contains("+port = 3000"));
//! plan.commit(&fs).unwrap();
//!
//! let synced = fs.get("config.toml").unwrap();
//! assert!(synced.contains("# tuning"));
//! assert!(synced.contains("port = 3000"));
//! ```
//!
//! ## Core Concepts
//!
//! The library is built around a few key pieces:
//!
//! - **Document (`document`)**: one structured file's content in memory,
//!   in a format-aware container. TOML documents keep their full lexical
//!   form; YAML documents keep their original bytes until first
//!   modified; JSON is always re-rendered pretty-printed.
//! - **Merge Engine (`merge`)**: recursive deep merge with
//!   type-dispatched strategies - mappings merge, sequences and scalars
//!   replace - plus format-preservation hooks for TOML and the free
//!   [`merge::merge_deep`] fold for combining plain documents.
//! - **Handle (`handle`)**: the per-file session object. Lazy loading,
//!   chainable merge/replace/delete, and a save surface that stages by
//!   default and writes directly on request.
//! - **Plan (`plan`)**: the staging transaction. Accumulates writes from
//!   any number of handles, diffs them against the pre-existing file
//!   content, and commits or rolls back as a unit.
//! - **Storage (`storage`)**: the backend boundary. Local filesystem and
//!   in-memory implementations ship with the crate; remote/cached
//!   backends plug in through the same trait.
//!
//! ## Execution Flow
//!
//! A driver constructs handles over target paths, applies
//! `load`/`merge`/`replace`/`delete`, and calls `save` - which by
//! default stages into the run's plan. After all tasks have run, the
//! driver shows [`plan::Plan::diff_summary`] to the user and either
//! commits or rolls back. A failure mid-batch should roll back the
//! whole plan so partially-staged state is never committed later.

pub mod document;
pub mod error;
pub mod handle;
pub mod merge;
pub mod plan;
pub mod storage;

#[cfg(test)]
mod merge_proptest;
