//! # Collection Files
//!
//! Mapping of collection names to files, and whole-file read/write.
//!
//! ## File Layout
//! ```text
//! <data_dir>/
//! ├── users.json          ← pretty-printed JSON array of flat objects
//! └── .users.json.<uuid>.tmp   (only while a write is in flight)
//! ```
//!
//! Writes go to a temp file in the same directory, are fsynced, and are then
//! renamed over the target, so readers see either the old or the new
//! collection. A present but blank file is reported as [`DbError::EmptyFile`]
//! rather than read as empty, so the next write cannot silently replace a
//! collection whose content was lost.

use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use roster_core::store::Document;
use serde_json::Value;

/// Longest accepted collection name.
pub const MAX_COLLECTION_NAME_LEN: usize = 64;

/// Checks that a collection name maps to a single file inside the data dir.
///
/// ## Rules
/// - Not empty, at most 64 characters
/// - Only ASCII letters, digits, `-` and `_`
pub fn validate_collection_name(name: &str) -> DbResult<()> {
    if name.is_empty() {
        return Err(DbError::invalid_collection(name, "must not be empty"));
    }

    if name.len() > MAX_COLLECTION_NAME_LEN {
        return Err(DbError::invalid_collection(
            name,
            format!("must be at most {MAX_COLLECTION_NAME_LEN} characters"),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(DbError::invalid_collection(
            name,
            "must contain only letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(())
}

/// Path of the file backing `collection`.
pub fn collection_path(data_dir: &Path, collection: &str) -> PathBuf {
    data_dir.join(format!("{collection}.json"))
}

/// Reads every record of a collection file.
///
/// A missing file is an empty collection. A file that exists but holds only
/// whitespace is an error: our own writes always produce at least `[]`.
pub async fn read_collection(path: &Path) -> DbResult<Vec<Document>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Collection file missing, treating as empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(DbError::io(path, e)),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        warn!(path = %path.display(), "Collection file exists but is empty");
        return Err(DbError::EmptyFile {
            path: path.to_path_buf(),
        });
    }

    let value: Value = serde_json::from_slice(&bytes).map_err(|source| DbError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;

    let Value::Array(items) = value else {
        return Err(DbError::NotAnArray {
            path: path.to_path_buf(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(document) => Ok(document),
            _ => Err(DbError::InvalidRecord {
                path: path.to_path_buf(),
                index,
            }),
        })
        .collect()
}

/// Replaces a collection file with `documents`.
///
/// ## What This Does
/// 1. Creates the data directory if it does not exist
/// 2. Serializes the records as a pretty-printed array (2-space indent)
/// 3. Writes a temp file next to the target and fsyncs it
/// 4. Renames the temp file over the target
/// 5. Fsyncs the data directory so the rename itself is durable
///
/// The temp file is removed when any step after its creation fails.
pub async fn write_collection(path: &Path, documents: &[Document]) -> DbResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| DbError::io(parent, e))?;
    }

    let bytes = serde_json::to_vec_pretty(documents).map_err(DbError::Encode)?;

    let temp_path = temp_path_for(path);
    if let Err(e) = write_synced(&temp_path, &bytes).await {
        discard_temp(&temp_path).await;
        return Err(DbError::io(&temp_path, e));
    }

    if let Err(e) = fs::rename(&temp_path, path).await {
        discard_temp(&temp_path).await;
        return Err(DbError::io(path, e));
    }

    if let Some(parent) = path.parent() {
        fsync_dir(parent)
            .await
            .map_err(|e| DbError::io(parent, e))?;
    }

    debug!(path = %path.display(), records = documents.len(), "Collection written");
    Ok(())
}

/// Writes `bytes` to a fresh file and fsyncs it before returning.
async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(bytes).await?;
    // fsync is mandatory before the rename publishes the file
    file.sync_all().await
}

/// Best-effort removal of a temp file after a failed write.
async fn discard_temp(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove temp file");
        }
    }
}

/// fsync a directory so a rename inside it survives a crash.
#[cfg(unix)]
async fn fsync_dir(path: &Path) -> std::io::Result<()> {
    File::open(path).await?.sync_all().await
}

#[cfg(not(unix))]
async fn fsync_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()))
}

// =============================================================================
// Unit Tests
// =============================================================================
