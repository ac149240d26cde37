//! User entity model and DTOs.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use stockroom_core::entity::Entity;
use stockroom_core::normalize;
use stockroom_core::types::{DocId, Pk, Timestamp};
use stockroom_core::value::FieldValue;

use crate::model::Document;

/// A user's bearer credential, embedded in the user document.
///
/// Only the SHA-256 digest of the key is stored; the plaintext key exists
/// solely in the login response. `updated_at` anchors the sliding expiry
/// window and moves forward on every successful validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub key_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AuthToken {
    pub fn new(key_hash: String) -> Self {
        let now = Utc::now();
        AuthToken {
            key_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the token's age since `updated_at` exceeds `max_age`.
    pub fn expired_at(&self, max_age: Duration, now: Timestamp) -> bool {
        now - self.updated_at > max_age
    }

    pub fn expired(&self, max_age: Duration) -> bool {
        self.expired_at(max_age, Utc::now())
    }

    /// Slide the expiry window forward.
    pub fn refresh(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Full user document.
///
/// Contains the password hash -- never serialize this to API responses
/// directly; use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    #[serde(default)]
    pub pk: Option<Pk>,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub is_superuser: bool,
    pub password_hash: String,
    #[serde(default)]
    pub auth_token: Option<AuthToken>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl User {
    /// Build a new, not-yet-persisted user. The email doubles as the
    /// username; names are stored title-cased and the email lowercased.
    pub fn new(email: &str, password_hash: String, first_name: &str, last_name: &str) -> Self {
        let email = normalize::normalize_email(email);
        User {
            id: None,
            pk: None,
            username: email.clone(),
            email,
            first_name: normalize::title_case(first_name),
            last_name: normalize::title_case(last_name),
            is_superuser: false,
            password_hash,
            auth_token: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Replace any existing token with a fresh one. The previous token is
    /// discarded -- there is exactly one live token per user.
    pub fn issue_token(&mut self, key_hash: String) {
        self.auth_token = Some(AuthToken::new(key_hash));
    }

    pub fn clear_token(&mut self) {
        self.auth_token = None;
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Option<DocId> {
        self.id
    }

    fn pk(&self) -> Option<Pk> {
        self.pk
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "pk" | "id" => Some(self.pk.into()),
            "email" => Some(self.email.as_str().into()),
            "username" => Some(self.username.as_str().into()),
            "first_name" => Some(self.first_name.as_str().into()),
            "last_name" => Some(self.last_name.as_str().into()),
            "is_superuser" => Some(self.is_superuser.into()),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

impl Document for User {
    fn set_id(&mut self, id: DocId) {
        self.id = Some(id);
    }

    fn assign_pk(&mut self, pk: Pk) {
        self.pk = Some(pk);
    }

    fn touch_updated(&mut self, at: Timestamp) {
        self.updated_at = Some(at);
    }
}

/// Safe user representation for API responses (no password hash, no token).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    /// Application-visible sequence number, surfaced as `id`.
    pub id: Pk,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.pk.unwrap_or_default(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Partial update for a user. Only present fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserPatch {
    /// Deterministic merge: each present field overwrites its counterpart,
    /// normalized the same way as at creation.
    pub fn apply(&self, user: &mut User) {
        if let Some(first_name) = &self.first_name {
            user.first_name = normalize::title_case(first_name);
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = normalize::title_case(last_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_normalizes_names_and_email() {
        let user = User::new("Jane.Doe@Example.COM", "hash".into(), "jane", "doe");
        assert_eq!(user.email, "jane.doe@example.com");
        assert_eq!(user.username, "jane.doe@example.com");
        assert_eq!(user.first_name, "Jane");
        assert_eq!(user.last_name, "Doe");
        assert_eq!(user.full_name(), "Jane Doe");
        assert!(!user.is_superuser);
    }

    #[test]
    fn token_is_expired_once_older_than_max_age() {
        let mut token = AuthToken::new("digest".into());
        let max_age = Duration::seconds(14_400);

        let now = token.updated_at;
        assert!(!token.expired_at(max_age, now));
        assert!(!token.expired_at(max_age, now + Duration::seconds(14_399)));
        assert!(token.expired_at(max_age, now + Duration::seconds(14_401)));

        // Refresh slides the window forward.
        token.updated_at = now - Duration::seconds(20_000);
        assert!(token.expired(max_age));
        token.refresh();
        assert!(!token.expired(max_age));
    }

    #[test]
    fn issue_token_replaces_the_previous_one() {
        let mut user = User::new("a@b.com", "hash".into(), "a", "b");
        user.issue_token("first".into());
        user.issue_token("second".into());
        assert_eq!(user.auth_token.as_ref().unwrap().key_hash, "second");

        user.clear_token();
        assert!(user.auth_token.is_none());
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut user = User::new("a@b.com", "hash".into(), "jane", "doe");
        let patch = UserPatch {
            first_name: Some("joan".into()),
            last_name: None,
        };
        patch.apply(&mut user);
        assert_eq!(user.first_name, "Joan");
        assert_eq!(user.last_name, "Doe");
    }

    #[test]
    fn document_round_trip_drops_id_and_keeps_token() {
        let mut user = User::new("a@b.com", "hash".into(), "jane", "doe");
        user.issue_token("digest".into());

        let doc = crate::model::to_document(&user).unwrap();
        assert!(doc.get("id").is_none());
        assert_eq!(doc["email"], "a@b.com");
        assert_eq!(doc["auth_token"]["key_hash"], "digest");

        let id = uuid::Uuid::new_v4();
        let restored: User = crate::model::from_document(id, doc).unwrap();
        assert_eq!(restored.id, Some(id));
        assert_eq!(restored.email, user.email);
    }
}
