//! Error types for the PhotoShare system.
//!
//! Security-relevant variants are kept distinct internally so that logging
//! and metrics can tell them apart; the HTTP layer is responsible for
//! collapsing them into the generic client-facing messages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    /// A refresh token that was already rotated or explicitly revoked.
    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// An access attempt on an entity owned by a different tenant.
    /// Surfaced to clients as a plain not-found; never as "forbidden".
    #[error("Cross-tenant access denied: {entity} with id {id}")]
    CrossTenantDenied { entity: String, id: String },

    /// The tenant referenced by a token claim does not exist.
    #[error("Tenant not found or invalid")]
    InvalidTenant,

    #[error("Tenant is deactivated")]
    TenantInactive,

    /// A tenant-scoped operation was reached without a resolved context.
    /// This indicates a wiring problem, not a client error.
    #[error("Tenant context missing")]
    TenantContextMissing,

    /// The principal already has a permanent tenant assignment.
    #[error("User is already assigned to a tenant")]
    AlreadyAssigned,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage backend error: {0}")]
    Storage(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
