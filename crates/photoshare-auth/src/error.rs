//! Authentication error types.

use photoshare_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is inactive")]
    AccountInactive,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("token has been revoked")]
    TokenRevoked,

    /// Covers unknown, malformed, and deactivated tenant codes alike so
    /// the response cannot be used to probe which codes exist.
    #[error("invalid tenant code")]
    InvalidTenantCode,

    #[error("user is already assigned to a tenant")]
    AlreadyAssigned,

    #[error("tenant is deactivated")]
    TenantInactive,

    #[error("too many attempts")]
    RateLimited { retry_after_secs: u64 },

    #[error("password policy violation: {0}")]
    PasswordPolicy(String),

    #[error("auth configuration error: {0}")]
    Config(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for CoreError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => CoreError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::TokenRevoked => CoreError::TokenRevoked,
            AuthError::InvalidTenantCode => CoreError::InvalidTenant,
            AuthError::AlreadyAssigned => CoreError::AlreadyAssigned,
            AuthError::TenantInactive => CoreError::TenantInactive,
            AuthError::RateLimited { retry_after_secs } => {
                CoreError::RateLimited { retry_after_secs }
            }
            AuthError::PasswordPolicy(message) => CoreError::Validation { message },
            AuthError::Config(msg) => CoreError::Configuration(msg),
            AuthError::Crypto(msg) => CoreError::Crypto(msg),
        }
    }
}
