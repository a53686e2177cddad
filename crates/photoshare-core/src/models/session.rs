//! Refresh-token session domain model.
//!
//! A session is the server-side record of one opaque refresh token. The
//! raw token never touches the database; only its SHA-256 hash is stored.
//! Rotation consumes the session with a single atomic check-and-mark in
//! the backing store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Tenant the token was issued under; `None` for platform principals
    /// and users mid-signup.
    pub tenant_id: Option<Uuid>,
    /// SHA-256 hex of the raw refresh token.
    pub token_hash: String,
    /// Set when the session is consumed by rotation or revoked by logout.
    pub revoked_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub user_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}
