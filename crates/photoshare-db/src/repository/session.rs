//! SurrealDB implementation of [`SessionRepository`].
//!
//! Single-use rotation rides on one conditional update: `consume` marks
//! the session revoked only if it is not already, and returns the row it
//! matched. Two concurrent rotations of the same token therefore cannot
//! both succeed — the statement is atomic in the store, never a
//! read-then-write in this process.

use chrono::{DateTime, Utc};
use photoshare_core::error::{CoreError, CoreResult};
use photoshare_core::models::session::{CreateSession, Session};
use photoshare_core::repository::SessionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SessionRow {
    user_id: String,
    tenant_id: Option<String>,
    token_hash: String,
    revoked_at: Option<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct SessionRowWithId {
    record_id: String,
    user_id: String,
    tenant_id: Option<String>,
    token_hash: String,
    revoked_at: Option<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

fn parse_tenant(tenant_id: Option<String>) -> Result<Option<Uuid>, DbError> {
    tenant_id
        .map(|t| {
            Uuid::parse_str(&t).map_err(|e| DbError::Migration(format!("invalid tenant UUID: {e}")))
        })
        .transpose()
}

fn row_to_session(row: SessionRow, id: Uuid) -> Result<Session, DbError> {
    let user_id = Uuid::parse_str(&row.user_id)
        .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
    Ok(Session {
        id,
        user_id,
        tenant_id: parse_tenant(row.tenant_id)?,
        token_hash: row.token_hash,
        revoked_at: row.revoked_at,
        expires_at: row.expires_at,
        created_at: row.created_at,
    })
}

impl SessionRowWithId {
    fn try_into_session(self) -> Result<Session, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Session {
            id,
            user_id,
            tenant_id: parse_tenant(self.tenant_id)?,
            token_hash: self.token_hash,
            revoked_at: self.revoked_at,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Session repository.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> CoreResult<Session> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('session', $id) SET \
                 user_id = $user_id, \
                 tenant_id = $tenant_id, \
                 token_hash = $token_hash, \
                 revoked_at = NONE, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("tenant_id", input.tenant_id.map(|t| t.to_string())))
            .bind(("token_hash", input.token_hash))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        row_to_session(row, id).map_err(Into::into)
    }

    async fn consume(&self, token_hash: &str) -> CoreResult<Session> {
        let token_hash_owned = token_hash.to_string();

        // Atomic check-and-mark: only an unrevoked session matches, and
        // the winning statement returns it.
        let mut result = self
            .db
            .query(
                "UPDATE session SET revoked_at = time::now() \
                 WHERE token_hash = $token_hash AND revoked_at IS NONE \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("token_hash", token_hash_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        if let Some(row) = rows.into_iter().next() {
            return Ok(row.try_into_session()?);
        }

        // No match: either the token was never issued, or it has already
        // been rotated/revoked. The losing side of a concurrent rotation
        // lands here and must see a revocation error, not a retryable one.
        let mut probe = self
            .db
            .query("SELECT count() AS total FROM session WHERE token_hash = $token_hash GROUP ALL")
            .bind(("token_hash", token_hash_owned))
            .await
            .map_err(DbError::from)?;
        let counts: Vec<CountRow> = probe.take(0).map_err(DbError::from)?;
        let exists = counts.first().map(|r| r.total).unwrap_or(0) > 0;

        if exists {
            Err(CoreError::TokenRevoked)
        } else {
            Err(CoreError::AuthenticationFailed {
                reason: "refresh token not found".into(),
            })
        }
    }

    async fn revoke(&self, token_hash: &str) -> CoreResult<()> {
        // Idempotent: matching zero rows (unknown or already revoked) is
        // success.
        self.db
            .query(
                "UPDATE session SET revoked_at = time::now() \
                 WHERE token_hash = $token_hash AND revoked_at IS NONE",
            )
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn revoke_user_sessions(&self, user_id: Uuid) -> CoreResult<u64> {
        let user_id_str = user_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM session \
                 WHERE user_id = $user_id AND revoked_at IS NONE \
                 GROUP ALL",
            )
            .bind(("user_id", user_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query(
                "UPDATE session SET revoked_at = time::now() \
                 WHERE user_id = $user_id AND revoked_at IS NONE",
            )
            .bind(("user_id", user_id_str))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }

    async fn cleanup_expired(&self) -> CoreResult<u64> {
        // Count expired sessions first, then delete.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM session \
                 WHERE expires_at < time::now() GROUP ALL",
            )
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE session WHERE expires_at < time::now()")
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }
}
