//! # Error Types
//!
//! Domain-specific error types for roster-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  roster-core errors (this file)                                        │
//! │  ├── UserError        - The taxonomy every service call returns        │
//! │  └── ValidationError  - Business rule rejections                       │
//! │                                                                         │
//! │  roster-db errors (separate crate)                                     │
//! │  └── DbError          - File store failures                            │
//! │                                                                         │
//! │  Flow: ValidationError ──► UserError::InvalidUser                      │
//! │        DbError ──────────► UserError::PersistenceFailure               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers switch on the variant, never on the message. Mapping a variant to
//! a transport status (404, 400, 500) is the HTTP layer's job.

use thiserror::Error;

/// Boxed storage error carried by [`UserError::PersistenceFailure`].
pub type StoreFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// User Error
// =============================================================================

/// Errors returned by `UserService`.
#[derive(Debug, Error)]
pub enum UserError {
    /// An operation that needs an id was called with an empty one.
    #[error("user id is required")]
    MissingIdentifier,

    /// No stored user has the requested id.
    #[error("user not found: {id}")]
    UserNotFound { id: String },

    /// The candidate failed the business rules.
    #[error("invalid user: {0}")]
    InvalidUser(#[from] ValidationError),

    /// The store failed for an infrastructure reason (disk, permissions,
    /// corrupt JSON, undecodable record).
    ///
    /// ## Context
    /// - `collection`: which collection was being read or written
    /// - `id`: the user involved, when the operation targets one
    #[error("persistence failure in '{collection}'{}: {source}", id_suffix(.id))]
    PersistenceFailure {
        collection: String,
        id: Option<String>,
        #[source]
        source: StoreFailure,
    },
}

fn id_suffix(id: &Option<String>) -> String {
    match id {
        Some(id) => format!(" (id {id})"),
        None => String::new(),
    }
}

impl UserError {
    /// Creates a UserNotFound error for the given id.
    pub fn not_found(id: impl Into<String>) -> Self {
        UserError::UserNotFound { id: id.into() }
    }

    /// Wraps a storage error with collection and id context.
    pub fn persistence(
        collection: impl Into<String>,
        id: Option<&str>,
        source: impl Into<StoreFailure>,
    ) -> Self {
        UserError::PersistenceFailure {
            collection: collection.into(),
            id: id.map(str::to_string),
            source: source.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Business rule rejections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name or email is absent, empty, or whitespace-only.
    ///
    /// One undifferentiated condition: the message does not say which field.
    #[error("name and email are required")]
    MissingRequired,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with UserError.
pub type UserResult<T> = Result<T, UserError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
