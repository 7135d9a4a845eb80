//! # In-Memory Store
//!
//! A [`CollectionStore`] that keeps collections in a map. Same merge
//! semantics as the file store, plus a write counter and write-failure
//! injection for service tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use super::{document_id, remove_document, update_document, upsert_documents};
use super::{CollectionStore, Document};

/// Failures reported by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryStoreError {
    /// Writes were disabled with [`MemoryStore::fail_writes`].
    #[error("write rejected for collection '{collection}'")]
    WriteRejected { collection: String },

    /// An upserted document had no string `id`.
    #[error("document without id in collection '{collection}'")]
    MissingId { collection: String },
}

/// In-memory collection store.
///
/// ## Usage
/// ```rust
/// use roster_core::store::{CollectionStore, MemoryStore};
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let store = MemoryStore::new();
/// assert!(store.get_all("users").await.unwrap().is_empty());
/// assert_eq!(store.write_count(), 0);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Seeds a collection. Seeding does not count as a write.
    pub fn with_collection(self, collection: impl Into<String>, documents: Vec<Document>) -> Self {
        self.lock().insert(collection.into(), documents);
        self
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes every following write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Document>>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self, collection: &str) -> Result<(), MemoryStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MemoryStoreError::WriteRejected {
                collection: collection.to_string(),
            });
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    type Error = MemoryStoreError;

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, Self::Error> {
        Ok(self.lock().get(collection).cloned().unwrap_or_default())
    }

    async fn upsert(&self, collection: &str, documents: Vec<Document>) -> Result<(), Self::Error> {
        if documents.iter().any(|document| document_id(document).is_none()) {
            return Err(MemoryStoreError::MissingId {
                collection: collection.to_string(),
            });
        }
        self.check_writable(collection)?;

        let mut collections = self.lock();
        let existing = collections.remove(collection).unwrap_or_default();
        collections.insert(collection.to_string(), upsert_documents(existing, documents));
        drop(collections);

        self.record_write();
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<Option<Document>, Self::Error> {
        self.check_writable(collection)?;

        let mut collections = self.lock();
        let updated = match collections.get_mut(collection) {
            Some(documents) => update_document(documents, id, patch),
            None => None,
        };
        drop(collections);

        if updated.is_some() {
            self.record_write();
        }
        Ok(updated)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<Option<Document>, Self::Error> {
        self.check_writable(collection)?;

        let mut collections = self.lock();
        let removed = match collections.get_mut(collection) {
            Some(documents) => remove_document(documents, id),
            None => None,
        };
        drop(collections);

        if removed.is_some() {
            self.record_write();
        }
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
