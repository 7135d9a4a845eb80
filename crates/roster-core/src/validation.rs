//! # Validation Module
//!
//! Business rules for users.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP layer (external)                                        │
//! │  └── JSON deserialization into NewUser / UserPatch                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: UserService                                                  │
//! │  └── THIS MODULE: required fields, status authorization                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: CollectionStore                                              │
//! │  └── every record must carry a string `id`                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rules are pure functions. [`UserRules`] wraps them so a service can be
//! built with a different rule set (e.g. in tests).
//!
//! ## Usage
//! ```rust
//! use roster_core::validation::{is_authorized, validate_user};
//! use roster_core::NewUser;
//!
//! assert!(validate_user(&NewUser::new("Juan Pérez", "juan@example.com")).is_ok());
//! assert!(is_authorized(Some("Activo")));
//! assert!(!is_authorized(Some("activo")));
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::NewUser;
use crate::{STATUS_ACTIVE, STATUS_PENDING};

// =============================================================================
// Rule Set
// =============================================================================

/// Rule set injected into `UserService`.
pub trait UserRules: Send + Sync {
    /// Fails with [`ValidationError::MissingRequired`] when the candidate
    /// lacks a name or an email.
    fn is_valid_user(&self, candidate: &NewUser) -> ValidationResult<()>;

    /// Returns true when `status` grants access.
    fn is_authorized(&self, status: Option<&str>) -> bool;
}

/// The production rule set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUserRules;

impl UserRules for DefaultUserRules {
    fn is_valid_user(&self, candidate: &NewUser) -> ValidationResult<()> {
        validate_user(candidate)
    }

    fn is_authorized(&self, status: Option<&str>) -> bool {
        is_authorized(status)
    }
}

// =============================================================================
// Rules
// =============================================================================

/// Validates that a candidate has both a name and an email.
///
/// ## Rules
/// - `name` must be present and not blank after trimming
/// - `email` must be present and not blank after trimming
/// - Email format is not checked
///
/// Either failure produces the same error; there is no per-field detail.
///
/// ## Example
/// ```rust
/// use roster_core::validation::validate_user;
/// use roster_core::NewUser;
///
/// assert!(validate_user(&NewUser::new("Ana", "ana@example.com")).is_ok());
/// assert!(validate_user(&NewUser::new("", "ana@example.com")).is_err());
/// assert!(validate_user(&NewUser::new("Ana", "   ")).is_err());
/// ```
pub fn validate_user(candidate: &NewUser) -> ValidationResult<()> {
    if is_blank(candidate.name.as_deref()) || is_blank(candidate.email.as_deref()) {
        return Err(ValidationError::MissingRequired);
    }

    Ok(())
}

/// Checks whether a status grants access.
///
/// ## Rules
/// - `"Pendiente"` and `"Activo"` are authorized
/// - Matching is exact and case-sensitive
/// - Anything else, including `None` and `""`, is not authorized
pub fn is_authorized(status: Option<&str>) -> bool {
    matches!(status, Some(STATUS_PENDING) | Some(STATUS_ACTIVE))
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================
