//! # roster-core: Pure Business Logic for Roster
//!
//! This crate is the **heart** of Roster. It holds the user model, the
//! business rules, and the service that ties rules to storage. It never
//! touches the file system itself; storage is reached through the
//! [`CollectionStore`] trait.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Roster Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                HTTP layer (external collaborator)               │   │
//! │  │        GET /usuarios, POST /usuarios, PUT, DELETE, ...          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ plain function calls                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ roster-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ validation│  │  service  │  │   store   │  │   │
//! │  │   │   User    │  │ UserRules │  │UserService│  │ trait +   │  │   │
//! │  │   │  NewUser  │  │  status   │  │           │  │ MemoryStore│ │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO FILE I/O • NO NETWORK • NO TRANSPORT CODES                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 roster-db (JsonFileStore)                        │   │
//! │  │            one pretty-printed JSON array per collection          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, NewUser, UserPatch)
//! - [`error`] - The user error taxonomy
//! - [`validation`] - Business rule validation
//! - [`store`] - Storage seam and merge semantics
//! - [`service`] - `UserService`, the only place ids are minted
//!
//! ## Example Usage
//!
//! ```rust
//! use roster_core::store::MemoryStore;
//! use roster_core::{DefaultUserRules, NewUser, UserService};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let service = UserService::new(MemoryStore::new(), DefaultUserRules);
//!
//! let user = service
//!     .create(NewUser::new("Pedro López", "pedro@example.com"))
//!     .await
//!     .unwrap();
//!
//! assert!(!user.id.is_empty());
//! assert_eq!(service.list_all().await.unwrap(), vec![user]);
//! # });
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{UserError, UserResult, ValidationError};
pub use service::UserService;
pub use store::{CollectionStore, Document};
pub use types::*;
pub use validation::{DefaultUserRules, UserRules};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Collection name under which users are stored.
pub const USERS_COLLECTION: &str = "users";

/// Status of a user that signed up but has not been activated yet.
pub const STATUS_PENDING: &str = "Pendiente";

/// Status of an active user.
pub const STATUS_ACTIVE: &str = "Activo";
