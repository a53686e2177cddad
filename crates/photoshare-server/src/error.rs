//! Central mapping from internal errors to client-facing responses.
//!
//! Security-relevant denials keep their full detail in the logs and
//! collapse to deliberately uninformative responses here: cross-tenant
//! access looks like a plain not-found, every authentication failure
//! reads the same, and backend failures never leak store error codes.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use photoshare_auth::AuthError;
use photoshare_core::error::CoreError;
use photoshare_storage::StorageError;
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            // Cross-tenant denials are indistinguishable from a missing
            // record: existence is never confirmed across tenants.
            CoreError::NotFound { .. } | CoreError::CrossTenantDenied { .. } => {
                (StatusCode::NOT_FOUND, "not found".to_string())
            }

            // One generic message for every credential problem; the
            // reason (expired vs malformed vs revoked) stays internal.
            CoreError::AuthenticationFailed { .. } | CoreError::TokenRevoked => {
                (StatusCode::UNAUTHORIZED, "please sign in again".to_string())
            }

            CoreError::InvalidTenant | CoreError::TenantInactive => (
                StatusCode::FORBIDDEN,
                "this workspace is not available".to_string(),
            ),

            CoreError::PermissionDenied { .. } => {
                (StatusCode::FORBIDDEN, "permission denied".to_string())
            }

            CoreError::TenantContextMissing => {
                error!("request reached a tenant-scoped handler without context");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }

            CoreError::AlreadyAssigned => (
                StatusCode::CONFLICT,
                "account already belongs to a workspace".to_string(),
            ),

            CoreError::AlreadyExists { entity } => {
                (StatusCode::CONFLICT, format!("{entity} already exists"))
            }

            // Validation problems are not security-sensitive; return the
            // specific reason.
            CoreError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),

            CoreError::RateLimited { retry_after_secs } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({ "error": "too many attempts, please try again later" })),
                )
                    .into_response();
                if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
                return response;
            }

            CoreError::Storage(detail) => {
                error!(detail = %detail, "storage backend failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "temporary problem, please try again".to_string(),
                )
            }

            CoreError::Database(detail) => {
                error!(detail = %detail, "database failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "temporary problem, please try again".to_string(),
                )
            }

            CoreError::Crypto(detail)
            | CoreError::Configuration(detail)
            | CoreError::Internal(detail) => {
                error!(detail = %detail, "internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: CoreError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn cross_tenant_denial_looks_like_not_found() {
        let not_found = status_of(CoreError::NotFound {
            entity: "photo".into(),
            id: "42".into(),
        });
        let cross_tenant = status_of(CoreError::CrossTenantDenied {
            entity: "photo".into(),
            id: "42".into(),
        });
        assert_eq!(not_found, StatusCode::NOT_FOUND);
        assert_eq!(cross_tenant, StatusCode::NOT_FOUND);
    }

    #[test]
    fn auth_failures_are_uniform_401() {
        assert_eq!(
            status_of(CoreError::AuthenticationFailed {
                reason: "expired".into()
            }),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(CoreError::TokenRevoked), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn tenant_problems_are_unified_403() {
        assert_eq!(status_of(CoreError::InvalidTenant), StatusCode::FORBIDDEN);
        assert_eq!(status_of(CoreError::TenantInactive), StatusCode::FORBIDDEN);
    }

    #[test]
    fn rate_limit_carries_retry_after() {
        let response = ApiError(CoreError::RateLimited {
            retry_after_secs: 3_600,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "3600"
        );
    }
}
