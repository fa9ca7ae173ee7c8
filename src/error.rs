//! # Error Handling
//!
//! Centralized error handling for `consign`, built on `thiserror`. The
//! `Error` enum covers all anticipated failure modes with contextual
//! fields, and the `Result<T>` alias is used throughout the crate.
//!
//! Two deliberate absences shape the taxonomy:
//!
//! - There is no `NotFound` variant for delete-path navigation: deleting
//!   a path whose intermediate segments are missing (or not mappings) is
//!   a documented silent no-op, not an error.
//! - Nothing is retried internally. Storage failures surface as
//!   `Error::Storage` with path context and propagate to the caller,
//!   which owns any user-facing messaging.

use std::path::PathBuf;

use thiserror::Error;

use crate::document::Format;

/// Main error type for consign operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input for the declared document format.
    ///
    /// Surfaced immediately from `parse`/`load`, never swallowed.
    #[error("{format} parse error: {message}")]
    Parse { format: Format, message: String },

    /// Structurally invalid operation, e.g. an unknown merge strategy
    /// name or a path whose format cannot be inferred.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A merge or value-conversion failure, e.g. patching a JSON `null`
    /// into a TOML document.
    #[error("Merge operation error: {operation} - {message}")]
    Merge { operation: String, message: String },

    /// An I/O failure during a direct write, a staging snapshot, or a
    /// commit. Carries the path it happened on.
    #[error("Storage operation error: {}: {message}", path.display())]
    Storage { path: PathBuf, message: String },

    /// A document could not be dumped back to text.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A raw I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_parse() {
        let error = Error::Parse {
            format: Format::Toml,
            message: "unexpected character".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("TOML parse error"));
        assert!(display.contains("unexpected character"));
    }

    #[test]
    fn test_error_display_config() {
        let error = Error::Config {
            message: "unknown merge strategy: sideways".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration error"));
        assert!(display.contains("sideways"));
    }

    #[test]
    fn test_error_display_merge() {
        let error = Error::Merge {
            operation: "toml merge".to_string(),
            message: "null is not representable in TOML".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Merge operation error"));
        assert!(display.contains("toml merge"));
        assert!(display.contains("null is not representable"));
    }

    #[test]
    fn test_error_display_storage() {
        let error = Error::Storage {
            path: PathBuf::from("/etc/app/config.toml"),
            message: "permission denied".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Storage operation error"));
        assert!(display.contains("/etc/app/config.toml"));
        assert!(display.contains("permission denied"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("file not found"));
    }
}
