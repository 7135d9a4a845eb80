//! # Store Error Types
//!
//! Error types for file-backed collection operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds path / collection context                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UserError::PersistenceFailure (roster-core) ← Adds user id            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  HTTP layer maps it to a 500                                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

/// File store errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Reading, writing, or renaming a collection file failed.
    ///
    /// ## When This Occurs
    /// - Data directory cannot be created
    /// - File permissions issue
    /// - Disk full
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The collection file is not valid JSON.
    #[error("corrupt collection file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The collection file exists but holds nothing.
    ///
    /// Writes always leave at least `[]`, so a blank file means its content
    /// was lost outside the store. Reading it as empty would let the next
    /// write overwrite whatever is recovered.
    #[error("collection file {} is empty", path.display())]
    EmptyFile { path: PathBuf },

    /// The collection file holds JSON that is not an array.
    #[error("collection file {} does not contain a JSON array", path.display())]
    NotAnArray { path: PathBuf },

    /// An element of the collection array is not an object.
    #[error("record {index} in {} is not a JSON object", path.display())]
    InvalidRecord { path: PathBuf, index: usize },

    /// A record passed to upsert has no string `id`.
    #[error("record without id in collection '{collection}'")]
    MissingId { collection: String },

    /// The collection name cannot be mapped to a file.
    #[error("invalid collection name '{name}': {reason}")]
    InvalidCollection { name: String, reason: String },

    /// Records could not be serialized.
    #[error("failed to encode collection: {0}")]
    Encode(#[source] serde_json::Error),
}

impl DbError {
    /// Creates an Io error for a path.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        DbError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates an InvalidCollection error.
    pub fn invalid_collection(name: impl Into<String>, reason: impl Into<String>) -> Self {
        DbError::InvalidCollection {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for store operations.
pub type DbResult<T> = Result<T, DbError>;
