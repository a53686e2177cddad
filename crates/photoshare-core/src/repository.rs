//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories take a
//! `tenant_id` parameter on every collection accessor so the filter is
//! part of the query from construction; object-level `get` calls return
//! [`Unverified`] records that must pass the enforcement gate before use.

use uuid::Uuid;

use crate::error::CoreResult;
use crate::models::{
    album::{Album, CreateAlbum, UpdateAlbum},
    audit::{AuditLogEntry, CreateAuditLogEntry},
    photo::{CreatePhoto, Photo, UpdatePhoto},
    session::{CreateSession, Session},
    tenant::{CreateTenant, Tenant, UpdateTenant},
    user::{CreateUser, UpdateUser, User},
};
use crate::scoped::Unverified;

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Tenant registry (global scope, platform-managed)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = CoreResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CoreResult<Tenant>> + Send;
    /// Lookup by join code. Callers must normalize the code first.
    fn get_by_code(&self, code: &str) -> impl Future<Output = CoreResult<Tenant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = CoreResult<Tenant>> + Send;
    /// Toggle the soft activation flag.
    fn set_active(
        &self,
        id: Uuid,
        is_active: bool,
    ) -> impl Future<Output = CoreResult<Tenant>> + Send;
    /// Replace the join code. The new code must already be normalized and
    /// globally unique.
    fn rotate_code(
        &self,
        id: Uuid,
        new_code: &str,
    ) -> impl Future<Output = CoreResult<Tenant>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<PaginatedResult<Tenant>>> + Send;
}

// ---------------------------------------------------------------------------
// Users (global identity, optional tenant binding)
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = CoreResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CoreResult<User>> + Send;
    /// Lookup by normalized email.
    fn get_by_email(&self, email: &str) -> impl Future<Output = CoreResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = CoreResult<User>> + Send;
    /// One-shot tenant binding. Fails with `AlreadyAssigned` when the user
    /// already has a tenant, unless `admin_override` is set (the explicit
    /// privileged reassignment path). The check-and-set is atomic in the
    /// backing store.
    fn assign_tenant(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
        admin_override: bool,
    ) -> impl Future<Output = CoreResult<User>> + Send;
    fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<PaginatedResult<User>>> + Send;
    fn count_by_tenant(&self, tenant_id: Uuid) -> impl Future<Output = CoreResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Refresh sessions (revocation store)
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = CoreResult<Session>> + Send;
    /// Atomically mark the session identified by `token_hash` as revoked
    /// and return it. Exactly one of any number of concurrent callers
    /// succeeds; the rest observe `TokenRevoked`. Unknown hashes fail with
    /// `AuthenticationFailed`.
    fn consume(&self, token_hash: &str) -> impl Future<Output = CoreResult<Session>> + Send;
    /// Revoke without consuming semantics (logout). Idempotent: revoking
    /// an already-revoked or unknown token is not an error.
    fn revoke(&self, token_hash: &str) -> impl Future<Output = CoreResult<()>> + Send;
    /// Revoke all live sessions for a user (e.g. on password change).
    fn revoke_user_sessions(&self, user_id: Uuid) -> impl Future<Output = CoreResult<u64>> + Send;
    /// Remove expired sessions; returns how many were deleted.
    fn cleanup_expired(&self) -> impl Future<Output = CoreResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped media collections
// ---------------------------------------------------------------------------

pub trait AlbumRepository: Send + Sync {
    /// The owning tenant and creator come from the request context, never
    /// from client input.
    fn create(
        &self,
        tenant_id: Uuid,
        created_by: Uuid,
        input: CreateAlbum,
    ) -> impl Future<Output = CoreResult<Album>> + Send;
    /// Object-level fetch by primary key. The result is sealed until the
    /// enforcement gate verifies ownership.
    fn get(&self, id: Uuid) -> impl Future<Output = CoreResult<Unverified<Album>>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateAlbum,
    ) -> impl Future<Output = CoreResult<Album>> + Send;
    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = CoreResult<()>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<PaginatedResult<Album>>> + Send;
}

pub trait PhotoRepository: Send + Sync {
    fn create(
        &self,
        tenant_id: Uuid,
        uploaded_by: Uuid,
        input: CreatePhoto,
    ) -> impl Future<Output = CoreResult<Photo>> + Send;
    fn get(&self, id: Uuid) -> impl Future<Output = CoreResult<Unverified<Photo>>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdatePhoto,
    ) -> impl Future<Output = CoreResult<Photo>> + Send;
    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = CoreResult<()>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<PaginatedResult<Photo>>> + Send;
    fn list_by_album(
        &self,
        tenant_id: Uuid,
        album_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<PaginatedResult<Photo>>> + Send;
}

// ---------------------------------------------------------------------------
// Audit (append-only)
// ---------------------------------------------------------------------------

pub trait AuditLogRepository: Send + Sync {
    /// Append a new audit log entry. No update or delete operations exist.
    fn append(
        &self,
        input: CreateAuditLogEntry,
    ) -> impl Future<Output = CoreResult<AuditLogEntry>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<PaginatedResult<AuditLogEntry>>> + Send;
}
