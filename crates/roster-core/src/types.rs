//! # Domain Types
//!
//! Core domain types used throughout Roster.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    NewUser      │   │      User       │   │   UserPatch     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name?          │──►│  id (UUID)      │◄──│  name?          │       │
//! │  │  email?         │   │  name           │   │  email?         │       │
//! │  │  status?        │   │  email          │   │  status?        │       │
//! │  └─────────────────┘   │  status?        │   └─────────────────┘       │
//! │      create()          └─────────────────┘        update()             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `NewUser` and `UserPatch` keep every field optional so that payloads with
//! missing fields still deserialize and reach the business rules, which then
//! reject them with a typed error instead of a serde failure.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;
use uuid::Uuid;

use crate::store::Document;

// =============================================================================
// User
// =============================================================================

/// A persisted user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    /// Unique identifier (UUID v4), minted by `UserService::create`.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Contact email. Format is not checked.
    pub email: String,

    /// Account status; `"Pendiente"` and `"Activo"` are authorized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub status: Option<String>,
}

impl User {
    /// Converts the user into its storage document.
    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            // A struct always serializes to an object
            other => Err(serde::ser::Error::custom(format!(
                "user serialized to non-object: {other}"
            ))),
        }
    }

    /// Decodes a user from a storage document.
    pub fn from_document(document: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(document))
    }
}

// =============================================================================
// NewUser
// =============================================================================

/// Candidate for `UserService::create`.
///
/// There is no `id` field: ids are never supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewUser {
    #[serde(default)]
    #[ts(optional)]
    pub name: Option<String>,

    #[serde(default)]
    #[ts(optional)]
    pub email: Option<String>,

    #[serde(default)]
    #[ts(optional)]
    pub status: Option<String>,
}

impl NewUser {
    /// Creates a candidate with name and email and no status.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        NewUser {
            name: Some(name.into()),
            email: Some(email.into()),
            status: None,
        }
    }

    /// Sets the status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Turns the candidate into a `User` carrying `id`.
    ///
    /// Absent fields become empty strings; callers validate first.
    pub fn into_user(self, id: String) -> User {
        User {
            id,
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            status: self.status,
        }
    }
}

impl From<&User> for NewUser {
    fn from(user: &User) -> Self {
        NewUser {
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            status: user.status.clone(),
        }
    }
}

// =============================================================================
// UserPatch
// =============================================================================

/// Partial update for `UserService::update`.
///
/// `name` and `email` are merged when `Some`. `status` has three states:
/// absent leaves it unchanged, `null` clears it, a string replaces it.
///
/// ```rust
/// use roster_core::UserPatch;
///
/// let patch: UserPatch = serde_json::from_str(r#"{"status": null}"#).unwrap();
/// assert_eq!(patch.status, Some(None));
///
/// let patch: UserPatch = serde_json::from_str("{}").unwrap();
/// assert!(patch.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub email: Option<String>,

    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(optional)]
    pub status: Option<Option<String>>,
}

impl UserPatch {
    /// Patch that sets the status.
    pub fn set_status(status: impl Into<String>) -> Self {
        Self {
            status: Some(Some(status.into())),
            ..Default::default()
        }
    }

    /// Patch that removes the status.
    pub fn clear_status() -> Self {
        Self {
            status: Some(None),
            ..Default::default()
        }
    }

    /// Returns true when the patch carries no field.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.status.is_none()
    }

    /// Applies the patch to a user, returning the merged copy.
    pub fn apply_to(&self, user: &User) -> User {
        User {
            id: user.id.clone(),
            name: self.name.clone().unwrap_or_else(|| user.name.clone()),
            email: self.email.clone().unwrap_or_else(|| user.email.clone()),
            status: match &self.status {
                Some(status) => status.clone(),
                None => user.status.clone(),
            },
        }
    }

    /// Converts the patch into a document holding only the present fields.
    ///
    /// A cleared status is written as `null`.
    pub fn to_document(&self) -> Document {
        let mut document = Map::new();
        if let Some(name) = &self.name {
            document.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(email) = &self.email {
            document.insert("email".to_string(), Value::String(email.clone()));
        }
        if let Some(status) = &self.status {
            let value = status.clone().map_or(Value::Null, Value::String);
            document.insert("status".to_string(), value);
        }
        document
    }
}

/// Deserializes a field that is present, so `null` becomes `Some(None)`.
/// Absent fields fall back to `None` through `#[serde(default)]`.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Identifiers
// =============================================================================

/// Generates a new user id.
///
/// ## Usage
/// ```rust
/// let a = roster_core::generate_user_id();
/// let b = roster_core::generate_user_id();
/// assert_ne!(a, b);
/// ```
pub fn generate_user_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn juan() -> User {
        User {
            id: "1".to_string(),
            name: "Juan Pérez".to_string(),
            email: "juan@example.com".to_string(),
            status: None,
        }
    }

    #[test]
    fn test_user_document_omits_missing_status() {
        let document = juan().to_document().unwrap();

        assert_eq!(document.len(), 3);
        assert_eq!(document["id"], "1");
        assert!(!document.contains_key("status"));
    }

    #[test]
    fn test_user_from_document() {
        let document = serde_json::json!({
            "id": "2",
            "name": "María García",
            "email": "maria@example.com",
            "status": "Activo"
        });
        let Value::Object(map) = document else {
            unreachable!()
        };

        let user = User::from_document(map).unwrap();
        assert_eq!(user.name, "María García");
        assert_eq!(user.status.as_deref(), Some("Activo"));
    }

    #[test]
    fn test_new_user_deserializes_with_missing_fields() {
        let candidate: NewUser = serde_json::from_str(r#"{"email":"test@example.com"}"#).unwrap();
        assert_eq!(candidate.name, None);
        assert_eq!(candidate.email.as_deref(), Some("test@example.com"));
    }

    #[test]
    fn test_patch_apply_keeps_unspecified_fields() {
        let patch = UserPatch {
            status: Some(Some("Activo".to_string())),
            ..Default::default()
        };

        let merged = patch.apply_to(&juan());
        assert_eq!(merged.id, "1");
        assert_eq!(merged.name, "Juan Pérez");
        assert_eq!(merged.status.as_deref(), Some("Activo"));
    }

    #[test]
    fn test_patch_document_only_has_present_fields() {
        let patch = UserPatch {
            email: Some("nuevo@example.com".to_string()),
            ..Default::default()
        };

        let document = patch.to_document();
        assert_eq!(document.len(), 1);
        assert_eq!(document["email"], "nuevo@example.com");
        assert!(UserPatch::default().is_empty());
    }

    #[test]
    fn test_patch_status_absent_null_or_set() {
        let absent: UserPatch = serde_json::from_str(r#"{"name": "Juan"}"#).unwrap();
        assert_eq!(absent.status, None);

        let cleared: UserPatch = serde_json::from_str(r#"{"status": null}"#).unwrap();
        assert_eq!(cleared, UserPatch::clear_status());
        assert!(!cleared.is_empty());
        assert_eq!(cleared.to_document()["status"], Value::Null);

        let set: UserPatch = serde_json::from_str(r#"{"status": "Activo"}"#).unwrap();
        assert_eq!(set, UserPatch::set_status("Activo"));
    }

    #[test]
    fn test_patch_clear_status_drops_stored_status() {
        let mut user = juan();
        user.status = Some("Pendiente".to_string());

        let merged = UserPatch::clear_status().apply_to(&user);
        assert_eq!(merged.status, None);
        assert_eq!(merged.name, "Juan Pérez");

        let kept = UserPatch::default().apply_to(&user);
        assert_eq!(kept.status.as_deref(), Some("Pendiente"));
    }
}
