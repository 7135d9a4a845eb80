//! # User Service
//!
//! Orchestrates business rules and storage for users. This is the only place
//! user ids are minted and the only caller of both [`UserRules`] and
//! [`CollectionStore`].
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(NewUser)                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rules.is_valid_user() ──✗──► UserError::InvalidUser (nothing written) │
//! │       │ ✓                                                               │
//! │       ▼                                                                 │
//! │  generate_user_id()                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.upsert_one("users") ──✗──► UserError::PersistenceFailure        │
//! │       │ ✓                                                               │
//! │       ▼                                                                 │
//! │  Ok(User { id, .. })                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service holds no state besides its two dependencies: nothing is
//! cached between calls.

use tracing::{debug, info, warn};

use crate::error::{UserError, UserResult};
use crate::store::{CollectionStore, Document};
use crate::types::{generate_user_id, NewUser, User, UserPatch};
use crate::validation::UserRules;
use crate::USERS_COLLECTION;

/// User operations over an injected store and rule set.
///
/// ## Usage
/// ```rust,ignore
/// let store = JsonFileStore::new(StoreConfig::new("./data"))?;
/// let service = UserService::new(store, DefaultUserRules);
///
/// let user = service.create(NewUser::new("Ana", "ana@example.com")).await?;
/// let same = service.get_by_id(&user.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct UserService<S, R> {
    store: S,
    rules: R,
}

impl<S, R> UserService<S, R>
where
    S: CollectionStore,
    R: UserRules,
{
    /// Creates a service over `store` using `rules`.
    pub fn new(store: S, rules: R) -> Self {
        UserService { store, rules }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lists every stored user in stored order.
    pub async fn list_all(&self) -> UserResult<Vec<User>> {
        let documents = self
            .store
            .get_all(USERS_COLLECTION)
            .await
            .map_err(|e| persistence_failure(None, e))?;

        debug!(count = documents.len(), "Listing users");

        documents
            .into_iter()
            .map(|document| decode(document, None))
            .collect()
    }

    /// Gets a user by id.
    ///
    /// ## Returns
    /// * `Ok(User)` - User found
    /// * `Err(UserError::MissingIdentifier)` - `id` is empty
    /// * `Err(UserError::UserNotFound)` - No user has this id
    pub async fn get_by_id(&self, id: &str) -> UserResult<User> {
        require_id(id)?;
        debug!(id = %id, "Getting user");

        let document = self
            .store
            .get_by_id(USERS_COLLECTION, id)
            .await
            .map_err(|e| persistence_failure(Some(id), e))?
            .ok_or_else(|| UserError::not_found(id))?;

        decode(document, Some(id))
    }

    /// Creates a user from a validated candidate.
    ///
    /// ## What This Does
    /// 1. Runs the rules; a rejected candidate is never written
    /// 2. Mints a fresh UUID v4
    /// 3. Upserts the record into the users collection
    /// 4. Returns the record as stored
    pub async fn create(&self, candidate: NewUser) -> UserResult<User> {
        self.rules.is_valid_user(&candidate)?;

        let user = candidate.into_user(generate_user_id());
        let document = encode(&user)?;

        self.store
            .upsert_one(USERS_COLLECTION, document)
            .await
            .map_err(|e| persistence_failure(Some(&user.id), e))?;

        info!(id = %user.id, "User created");
        Ok(user)
    }

    /// Updates the present fields of a user.
    ///
    /// The merged record goes through the same rules as `create`, so a patch
    /// cannot blank out a required field. `status` can be cleared with
    /// [`UserPatch::clear_status`]. An empty patch writes nothing.
    pub async fn update(&self, id: &str, patch: UserPatch) -> UserResult<User> {
        let current = self.get_by_id(id).await?;

        let merged = patch.apply_to(&current);
        self.rules.is_valid_user(&NewUser::from(&merged))?;

        if patch.is_empty() {
            debug!(id = %id, "Empty patch, nothing to update");
            return Ok(current);
        }

        let document = self
            .store
            .update(USERS_COLLECTION, id, patch.to_document())
            .await
            .map_err(|e| persistence_failure(Some(id), e))?
            // Removed between the read and the write
            .ok_or_else(|| UserError::not_found(id))?;

        info!(id = %id, "User updated");
        decode(document, Some(id))
    }

    /// Deletes a user and returns the removed record.
    pub async fn delete(&self, id: &str) -> UserResult<User> {
        require_id(id)?;

        let document = self
            .store
            .delete(USERS_COLLECTION, id)
            .await
            .map_err(|e| persistence_failure(Some(id), e))?
            .ok_or_else(|| UserError::not_found(id))?;

        info!(id = %id, "User deleted");
        decode(document, Some(id))
    }

    /// Checks whether the stored user's status grants access.
    pub async fn is_authorized(&self, id: &str) -> UserResult<bool> {
        let user = self.get_by_id(id).await?;
        Ok(self.rules.is_authorized(user.status.as_deref()))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn require_id(id: &str) -> UserResult<()> {
    if id.trim().is_empty() {
        return Err(UserError::MissingIdentifier);
    }
    Ok(())
}

fn persistence_failure<E>(id: Option<&str>, err: E) -> UserError
where
    E: std::error::Error + Send + Sync + 'static,
{
    warn!(collection = USERS_COLLECTION, id = ?id, error = %err, "Store operation failed");
    UserError::persistence(USERS_COLLECTION, id, err)
}

fn decode(document: Document, id: Option<&str>) -> UserResult<User> {
    User::from_document(document).map_err(|e| persistence_failure(id, e))
}

fn encode(user: &User) -> UserResult<Document> {
    user.to_document()
        .map_err(|e| persistence_failure(Some(&user.id), e))
}

// =============================================================================
// Unit Tests
// =============================================================================
