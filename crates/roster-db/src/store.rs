//! # JSON File Store
//!
//! Configuration and the [`JsonFileStore`] handle.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      JSON File Store                                    │
//! │                                                                         │
//! │  Startup                                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreConfig::from_env() / StoreConfig::new(dir)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  JsonFileStore::new(config) ← No I/O yet, dir is created lazily        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │   per-collection write locks            │                           │
//! │  │   "users" ──► Mutex<()>                 │                           │
//! │  │   "audit" ──► Mutex<()>                 │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       │ read-modify-write cycles on one collection run one at a time   │
//! │       ▼                                                                 │
//! │  <data_dir>/users.json                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Clones of a `JsonFileStore` share their locks, so every task holding a
//! clone is serialized per collection. Separate processes writing the same
//! file are not coordinated: the last full-file write wins.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::collection::{self, collection_path, validate_collection_name};
use crate::error::{DbError, DbResult};
use roster_core::store::{
    document_id, remove_document, update_document, upsert_documents, CollectionStore, Document,
};

// =============================================================================
// Configuration
// =============================================================================

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "ROSTER_DATA_DIR";

/// Environment variable toggling per-collection write serialization.
pub const SERIALIZE_WRITES_ENV: &str = "ROSTER_SERIALIZE_WRITES";

/// Data directory used when nothing is configured.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Store configuration.
///
/// ## Example
/// ```rust
/// use roster_db::StoreConfig;
///
/// let config = StoreConfig::new("/var/lib/roster").serialize_writes(false);
/// assert!(!config.serialize_writes);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding one `<collection>.json` per collection.
    /// Created on first write.
    pub data_dir: PathBuf,

    /// Whether read-modify-write cycles on a collection are serialized.
    /// Default: true
    pub serialize_writes: bool,
}

impl StoreConfig {
    /// Creates a configuration for `data_dir` with default settings.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        StoreConfig {
            data_dir: data_dir.into(),
            serialize_writes: true,
        }
    }

    /// Sets whether writes are serialized per collection.
    pub fn serialize_writes(mut self, serialize: bool) -> Self {
        self.serialize_writes = serialize;
        self
    }

    /// Loads configuration from the process environment.
    ///
    /// ## Environment Variables
    /// - `ROSTER_DATA_DIR`: data directory (default `./data`)
    /// - `ROSTER_SERIALIZE_WRITES`: `true` / `false` (default `true`)
    pub fn from_env() -> Self {
        StoreConfig::from_vars(|key| std::env::var(key).ok())
    }

    /// Loads configuration through a variable lookup function.
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = StoreConfig::default();

        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|dir| !dir.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(flag) = lookup(SERIALIZE_WRITES_ENV) {
            if let Ok(serialize) = flag.trim().parse::<bool>() {
                config.serialize_writes = serialize;
            }
        }

        config
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::new(DEFAULT_DATA_DIR)
    }
}

// =============================================================================
// Store
// =============================================================================

/// File-backed [`CollectionStore`]: one pretty-printed JSON array per
/// collection.
///
/// ## Usage
/// ```rust,ignore
/// let store = JsonFileStore::new(StoreConfig::from_env());
/// let service = UserService::new(store, DefaultUserRules);
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: StoreConfig,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl JsonFileStore {
    /// Creates a store. Performs no I/O.
    pub fn new(config: StoreConfig) -> Self {
        info!(
            data_dir = %config.data_dir.display(),
            serialize_writes = config.serialize_writes,
            "Initializing JSON file store"
        );

        JsonFileStore {
            inner: Arc::new(Inner {
                config,
                locks: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Returns the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.inner.config.data_dir
    }

    /// Returns the path of the file backing `collection`.
    pub fn path_of(&self, collection: &str) -> DbResult<PathBuf> {
        validate_collection_name(collection)?;
        Ok(collection_path(self.data_dir(), collection))
    }

    /// Number of records in a collection (for diagnostics).
    pub async fn count(&self, collection: &str) -> DbResult<usize> {
        Ok(self.get_all(collection).await?.len())
    }

    /// Acquires the write lock of `collection` when serialization is on.
    async fn write_guard(&self, collection: &str) -> Option<OwnedMutexGuard<()>> {
        if !self.inner.config.serialize_writes {
            return None;
        }

        let lock = {
            let mut locks = self.inner.locks.lock().await;
            locks
                .entry(collection.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        Some(lock.lock_owned().await)
    }
}

#[async_trait]
impl CollectionStore for JsonFileStore {
    type Error = DbError;

    async fn get_all(&self, collection: &str) -> DbResult<Vec<Document>> {
        let path = self.path_of(collection)?;
        debug!(collection = %collection, "Reading collection");
        collection::read_collection(&path).await
    }

    async fn upsert(&self, collection: &str, documents: Vec<Document>) -> DbResult<()> {
        let path = self.path_of(collection)?;

        if documents.iter().any(|document| document_id(document).is_none()) {
            return Err(DbError::MissingId {
                collection: collection.to_string(),
            });
        }

        debug!(collection = %collection, records = documents.len(), "Upserting records");

        let _guard = self.write_guard(collection).await;
        let existing = collection::read_collection(&path).await?;
        let merged = upsert_documents(existing, documents);
        collection::write_collection(&path, &merged).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> DbResult<Option<Document>> {
        let path = self.path_of(collection)?;
        debug!(collection = %collection, id = %id, "Updating record");

        let _guard = self.write_guard(collection).await;
        let mut documents = collection::read_collection(&path).await?;

        let Some(updated) = update_document(&mut documents, id, patch) else {
            debug!(collection = %collection, id = %id, "Record not found, nothing written");
            return Ok(None);
        };

        collection::write_collection(&path, &documents).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, collection: &str, id: &str) -> DbResult<Option<Document>> {
        let path = self.path_of(collection)?;
        debug!(collection = %collection, id = %id, "Deleting record");

        let _guard = self.write_guard(collection).await;
        let mut documents = collection::read_collection(&path).await?;

        let Some(removed) = remove_document(&mut documents, id) else {
            debug!(collection = %collection, id = %id, "Record not found, nothing written");
            return Ok(None);
        };

        collection::write_collection(&path, &documents).await?;
        Ok(Some(removed))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{DefaultUserRules, NewUser, UserError, UserPatch, UserService};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    fn store_in(temp: &TempDir) -> JsonFileStore {
        JsonFileStore::new(StoreConfig::new(temp.path().join("datos")))
    }

    async fn seed_juan_maria(store: &JsonFileStore) {
        store
            .upsert(
                "users",
                vec![
                    doc(json!({"id": "1", "name": "Juan Pérez", "email": "juan@example.com"})),
                    doc(json!({"id": "2", "name": "María García", "email": "maria@example.com"})),
                ],
            )
            .await
            .unwrap();
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new("/tmp/roster").serialize_writes(false);

        assert_eq!(config.data_dir, PathBuf::from("/tmp/roster"));
        assert!(!config.serialize_writes);
        assert!(StoreConfig::default().serialize_writes);
    }

    #[test]
    fn test_config_from_vars() {
        let config = StoreConfig::from_vars(|key| match key {
            DATA_DIR_ENV => Some("/srv/roster".to_string()),
            SERIALIZE_WRITES_ENV => Some("false".to_string()),
            _ => None,
        });
        assert_eq!(config.data_dir, PathBuf::from("/srv/roster"));
        assert!(!config.serialize_writes);

        let config = StoreConfig::from_vars(|key| match key {
            SERIALIZE_WRITES_ENV => Some("maybe".to_string()),
            _ => None,
        });
        assert_eq!(config, StoreConfig::default());
    }

    // -------------------------------------------------------------------------
    // CollectionStore
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_never_written_collection_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        assert!(store.get_all("users").await.unwrap().is_empty());
        assert!(store.get_by_id("users", "1").await.unwrap().is_none());
        assert!(!store.data_dir().exists());
    }

    #[tokio::test]
    async fn test_upsert_creates_file_and_get_by_id() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        seed_juan_maria(&store).await;

        assert!(store.path_of("users").unwrap().exists());

        let juan = store.get_by_id("users", "1").await.unwrap().unwrap();
        assert_eq!(juan["name"], "Juan Pérez");
        assert!(store.get_by_id("users", "999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place_and_appends() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        seed_juan_maria(&store).await;

        store
            .upsert(
                "users",
                vec![
                    doc(json!({"id": "3", "name": "Pedro", "email": "pedro@example.com"})),
                    doc(json!({"id": "1", "name": "Juan P.", "email": "juan@example.com"})),
                ],
            )
            .await
            .unwrap();

        let all = store.get_all("users").await.unwrap();
        let ids: Vec<_> = all.iter().filter_map(document_id).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(all[0]["name"], "Juan P.");
    }

    #[tokio::test]
    async fn test_upsert_twice_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let record = doc(json!({"id": "1", "name": "Juan", "email": "juan@example.com"}));

        store.upsert_one("users", record.clone()).await.unwrap();
        let first = std::fs::read(store.path_of("users").unwrap()).unwrap();

        store.upsert_one("users", record).await.unwrap();
        let second = std::fs::read(store.path_of("users").unwrap()).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_upsert_rejects_missing_id() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let err = store
            .upsert_one("users", doc(json!({"name": "sin id"})))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::MissingId { .. }));
        assert!(!store.data_dir().exists());
    }

    #[tokio::test]
    async fn test_update_shallow_merges() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        seed_juan_maria(&store).await;

        let updated = store
            .update("users", "2", doc(json!({"id": "nope", "status": "Activo"})))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated["id"], "2");
        assert_eq!(updated["name"], "María García");
        assert_eq!(updated["status"], "Activo");

        let stored = store.get_by_id("users", "2").await.unwrap().unwrap();
        assert_eq!(stored, updated);

        assert!(store
            .update("users", "999", Document::new())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        seed_juan_maria(&store).await;

        assert!(store.delete("users", "999").await.unwrap().is_none());
        assert_eq!(store.count("users").await.unwrap(), 2);

        let removed = store.delete("users", "1").await.unwrap().unwrap();
        assert_eq!(removed["name"], "Juan Pérez");
        assert_eq!(store.count("users").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalid_collection_name() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let err = store.get_all("../escape").await.unwrap_err();
        assert!(matches!(err, DbError::InvalidCollection { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        std::fs::create_dir_all(store.data_dir()).unwrap();
        std::fs::write(store.path_of("users").unwrap(), "[{").unwrap();

        let err = store.get_all("users").await.unwrap_err();
        assert!(matches!(err, DbError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_unusable_data_dir_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        // A regular file where the data directory should be
        let blocker = temp.path().join("datos");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = JsonFileStore::new(StoreConfig::new(&blocker));

        let record = doc(json!({"id": "1", "name": "Juan", "email": "juan@example.com"}));
        let err = store.upsert_one("users", record).await.unwrap_err();
        assert!(matches!(err, DbError::Io { .. }));

        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "not a directory");
        let entries = std::fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_truncated_file_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        seed_juan_maria(&store).await;

        let path = store.path_of("users").unwrap();
        std::fs::write(&path, "").unwrap();

        assert!(matches!(
            store.get_all("users").await,
            Err(DbError::EmptyFile { .. })
        ));

        let record = doc(json!({"id": "3", "name": "Pedro", "email": "pedro@example.com"}));
        assert!(matches!(
            store.upsert_one("users", record).await,
            Err(DbError::EmptyFile { .. })
        ));
        assert!(matches!(
            store.delete("users", "1").await,
            Err(DbError::EmptyFile { .. })
        ));

        // Still blank, so whatever gets restored there is not clobbered
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_are_not_lost() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let record = doc(json!({"id": i.to_string(), "name": "n", "email": "e"}));
                store.upsert_one("users", record).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.count("users").await.unwrap(), 16);
    }

    // -------------------------------------------------------------------------
    // UserService over the file store
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_service_round_trip_on_disk() {
        let temp = TempDir::new().unwrap();
        let service = UserService::new(store_in(&temp), DefaultUserRules);

        let pedro = service
            .create(NewUser::new("Pedro López", "pedro@example.com"))
            .await
            .unwrap();
        assert_eq!(service.get_by_id(&pedro.id).await.unwrap(), pedro);

        // A fresh store over the same directory sees the same data
        let reopened = UserService::new(store_in(&temp), DefaultUserRules);
        assert_eq!(reopened.list_all().await.unwrap(), vec![pedro.clone()]);

        let patch = UserPatch {
            status: Some(Some("Activo".to_string())),
            ..Default::default()
        };
        let updated = reopened.update(&pedro.id, patch).await.unwrap();
        assert!(reopened.is_authorized(&updated.id).await.unwrap());

        let removed = reopened.delete(&pedro.id).await.unwrap();
        assert_eq!(removed, updated);
        assert!(matches!(
            reopened.get_by_id(&pedro.id).await,
            Err(UserError::UserNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_service_wraps_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        std::fs::create_dir_all(store.data_dir()).unwrap();
        std::fs::write(store.path_of("users").unwrap(), "\"users\"").unwrap();

        let service = UserService::new(store, DefaultUserRules);
        match service.list_all().await.unwrap_err() {
            UserError::PersistenceFailure { collection, source, .. } => {
                assert_eq!(collection, "users");
                assert!(matches!(
                    source.downcast_ref::<DbError>(),
                    Some(DbError::NotAnArray { .. })
                ));
            }
            other => panic!("expected PersistenceFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_service_reports_unusable_data_dir() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("datos");
        std::fs::write(&blocker, "not a directory").unwrap();

        let service = UserService::new(
            JsonFileStore::new(StoreConfig::new(&blocker)),
            DefaultUserRules,
        );
        match service
            .create(NewUser::new("Juan Pérez", "juan@example.com"))
            .await
            .unwrap_err()
        {
            UserError::PersistenceFailure { collection, source, .. } => {
                assert_eq!(collection, "users");
                assert!(matches!(
                    source.downcast_ref::<DbError>(),
                    Some(DbError::Io { .. })
                ));
            }
            other => panic!("expected PersistenceFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_service_refuses_to_create_over_truncated_file() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        seed_juan_maria(&store).await;
        let path = store.path_of("users").unwrap();
        std::fs::write(&path, "").unwrap();

        let service = UserService::new(store, DefaultUserRules);
        assert!(matches!(
            service.list_all().await,
            Err(UserError::PersistenceFailure { .. })
        ));
        assert!(matches!(
            service
                .create(NewUser::new("Pedro López", "pedro@example.com"))
                .await,
            Err(UserError::PersistenceFailure { .. })
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
