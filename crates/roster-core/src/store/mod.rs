//! # Store Module
//!
//! The storage seam between `UserService` and whatever persists collections.
//!
//! ## Collection Store Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Collection Store Explained                           │
//! │                                                                         │
//! │  UserService                                                           │
//! │       │                                                                 │
//! │       │  store.upsert_one("users", document)                           │
//! │       ▼                                                                 │
//! │  CollectionStore (trait, this module)                                  │
//! │  ├── get_all(collection)                                               │
//! │  ├── get_by_id(collection, id)                                         │
//! │  ├── upsert(collection, documents)                                     │
//! │  ├── update(collection, id, patch)                                     │
//! │  └── delete(collection, id)                                            │
//! │       │                                                                 │
//! │       ├──► MemoryStore     (tests, this crate)                         │
//! │       └──► JsonFileStore   (roster-db, one JSON file per collection)   │
//! │                                                                         │
//! │  Every implementation shares the merge helpers below, so upsert and   │
//! │  update behave the same in memory and on disk.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records cross the seam as [`Document`]s: flat JSON objects with at least a
//! string `id`. Keeping the seam untyped lets one store hold any collection.

pub mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub use memory::{MemoryStore, MemoryStoreError};

/// A stored record: a flat JSON object with a string `id` field.
pub type Document = Map<String, Value>;

/// Name of the identifier field in every document.
pub const ID_FIELD: &str = "id";

// =============================================================================
// Trait
// =============================================================================

/// Whole-collection persistence addressed by collection name.
///
/// ## Semantics
/// - Reading a collection that was never written yields an empty sequence.
/// - `upsert` replaces matching records in place and appends the rest.
/// - `update` shallow-merges a patch; `id` in the patch is ignored.
/// - `update` and `delete` return `Ok(None)` when no record matches.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Infrastructure failure type of this store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns every record of the collection in stored order.
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, Self::Error>;

    /// Returns the first record whose `id` equals `id`.
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, Self::Error> {
        let documents = self.get_all(collection).await?;
        Ok(documents
            .into_iter()
            .find(|document| document_id(document) == Some(id)))
    }

    /// Inserts or replaces a batch of records.
    async fn upsert(&self, collection: &str, documents: Vec<Document>) -> Result<(), Self::Error>;

    /// Inserts or replaces a single record.
    async fn upsert_one(&self, collection: &str, document: Document) -> Result<(), Self::Error> {
        self.upsert(collection, vec![document]).await
    }

    /// Shallow-merges `patch` over the record with `id` and returns the result.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<Option<Document>, Self::Error>;

    /// Removes the record with `id` and returns it.
    async fn delete(&self, collection: &str, id: &str) -> Result<Option<Document>, Self::Error>;
}

// =============================================================================
// Merge Helpers
// =============================================================================

/// Returns the document's `id` when it is a string.
pub fn document_id(document: &Document) -> Option<&str> {
    document.get(ID_FIELD).and_then(Value::as_str)
}

/// Upsert merge over a whole collection.
///
/// ## Algorithm
/// ```text
/// existing: [A1, B1, C1]        incoming: [B2, D1, A2]
///
/// 1. Replace in place:  [A2, B2, C1]
/// 2. Append unmatched:  [A2, B2, C1, D1]
/// ```
///
/// Replacement is whole-record, with no field-level merge. When the batch
/// repeats an id, the last occurrence wins and keeps the position of the first.
/// Callers must reject documents without an `id` beforehand.
pub fn upsert_documents(existing: Vec<Document>, incoming: Vec<Document>) -> Vec<Document> {
    let mut batch: Vec<Document> = Vec::with_capacity(incoming.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for document in incoming {
        let id = document_id(&document).unwrap_or_default().to_string();
        match positions.get(&id) {
            Some(&index) => batch[index] = document,
            None => {
                positions.insert(id, batch.len());
                batch.push(document);
            }
        }
    }

    let mut matched = vec![false; batch.len()];
    let mut merged: Vec<Document> = existing
        .into_iter()
        .map(|document| {
            let hit = document_id(&document).and_then(|id| positions.get(id).copied());
            match hit {
                Some(index) => {
                    matched[index] = true;
                    batch[index].clone()
                }
                None => document,
            }
        })
        .collect();

    merged.extend(
        batch
            .into_iter()
            .zip(matched)
            .filter(|(_, was_matched)| !was_matched)
            .map(|(document, _)| document),
    );

    merged
}

/// Shallow-merges `patch` into `target`. Incoming fields win; `id` is skipped.
pub fn merge_document(target: &mut Document, patch: Document) {
    for (key, value) in patch {
        if key == ID_FIELD {
            continue;
        }
        target.insert(key, value);
    }
}

/// Applies `patch` to the first record with `id`, returning the merged copy.
pub fn update_document(documents: &mut [Document], id: &str, patch: Document) -> Option<Document> {
    let target = documents
        .iter_mut()
        .find(|document| document_id(document) == Some(id))?;
    merge_document(target, patch);
    Some(target.clone())
}

/// Removes and returns the first record with `id`.
pub fn remove_document(documents: &mut Vec<Document>, id: &str) -> Option<Document> {
    let index = documents
        .iter()
        .position(|document| document_id(document) == Some(id))?;
    Some(documents.remove(index))
}

// =============================================================================
// Unit Tests
// =============================================================================
