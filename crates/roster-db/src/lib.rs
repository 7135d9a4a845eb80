//! # roster-db: JSON File Storage for Roster
//!
//! This crate persists collections as JSON files. It implements the
//! [`CollectionStore`](roster_core::CollectionStore) trait from roster-core,
//! so `UserService` runs unchanged over it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Roster Data Flow                                 │
//! │                                                                         │
//! │  UserService::create(candidate)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     roster-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  StoreConfig  │    │ JsonFileStore │    │  collection  │  │   │
//! │  │   │  (store.rs)   │───►│  (store.rs)   │───►│ read / write │  │   │
//! │  │   │ data_dir, env │    │ write locks   │    │ temp+rename  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ./data/users.json                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - `StoreConfig` and the `JsonFileStore` handle
//! - [`collection`] - Collection name rules and whole-file read/write
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roster_core::{DefaultUserRules, NewUser, UserService};
//! use roster_db::{JsonFileStore, StoreConfig};
//!
//! let store = JsonFileStore::new(StoreConfig::from_env());
//! let service = UserService::new(store, DefaultUserRules);
//!
//! let user = service.create(NewUser::new("Ana", "ana@example.com")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod collection;
pub mod error;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use store::{JsonFileStore, StoreConfig};
