//! Storage backends for reading and writing target files
//!
//! The core never touches `std::fs` directly; every read and write goes
//! through the [`Storage`] trait so handles and the plan can run against
//! the real filesystem, an in-memory store, or a remote/cached backend
//! supplied by the caller.
//!
//! Two implementations ship with the crate:
//!
//! - [`LocalFs`] - the real filesystem, creating parent directories as
//!   needed on write.
//! - [`MemoryFs`] - an in-memory text store for tests and dry runs.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Backend interface consumed by `Handle` and `Plan`.
///
/// Methods take `&self` so a single backend instance can serve many
/// handles within one run; implementations with mutable state use
/// interior mutability.
pub trait Storage {
    /// Whether a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Read the full content of `path` as UTF-8 text.
    fn read_text(&self, path: &Path) -> Result<String>;

    /// Write `content` to `path`, replacing any existing file. Local
    /// backends create missing parent directories; backends without a
    /// directory concept need not.
    fn write_text(&self, path: &Path, content: &str) -> Result<()>;

    /// Whether `path` refers to a remote location. Remote support is
    /// optional; the default is a purely local backend.
    fn is_remote(&self, _path: &Path) -> bool {
        false
    }
}

/// Local filesystem backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| Error::Storage {
            path: path.to_path_buf(),
            message: format!("failed to read: {}", e),
        })
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::Storage {
                    path: path.to_path_buf(),
                    message: format!("failed to create directory '{}': {}", parent.display(), e),
                })?;
            }
        }
        fs::write(path, content).map_err(|e| Error::Storage {
            path: path.to_path_buf(),
            message: format!("failed to write: {}", e),
        })
    }
}

/// In-memory storage backend for fast file manipulation
///
/// Files are stored as a path -> content mapping. Useful as a test
/// double and as a substrate for dry runs that must not touch disk.
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RefCell<HashMap<PathBuf, String>>,
}

impl MemoryFs {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a file
    pub fn insert<P: AsRef<Path>>(&self, path: P, content: &str) {
        self.files
            .borrow_mut()
            .insert(path.as_ref().to_path_buf(), content.to_string());
    }

    /// Get a file's content by path
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    /// Remove a file, returning its content if it existed
    pub fn remove<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.files.borrow_mut().remove(path.as_ref())
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    /// Check whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }

    /// Clear all files
    pub fn clear(&self) {
        self.files.borrow_mut().clear();
    }
}

impl Storage for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Storage {
                path: path.to_path_buf(),
                message: "file not found".to_string(),
            })
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        self.insert(path, content);
        Ok(())
    }
}
