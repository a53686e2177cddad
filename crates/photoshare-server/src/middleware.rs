//! Request pipeline stages: cookie authentication and mandatory tenant
//! context resolution.
//!
//! These are ordered tower layers applied to whole routers, not opt-in
//! per-handler annotations — a handler on the tenant-scoped router
//! cannot be reached without both stages having run.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use photoshare_auth::token::{self, AccessTokenClaims};
use photoshare_core::context::{self, TenantContext};
use photoshare_core::error::CoreError;
use photoshare_core::models::user::User;
use photoshare_core::repository::UserRepository;

use crate::cookies::{self, ACCESS_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;

/// Attached to the request after cookie authentication.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub claims: AccessTokenClaims,
}

/// Attached to the request after tenant context resolution. Every
/// tenant-scoped handler takes this as its entry ticket.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub principal: User,
    pub context: TenantContext,
}

/// Validate the access-token cookie and load the current principal.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = cookies::cookie_value(req.headers(), ACCESS_COOKIE).ok_or_else(|| {
        CoreError::AuthenticationFailed {
            reason: "missing access token".into(),
        }
    })?;

    let claims = token::validate_access_token(&raw, state.auth.config())
        .map_err(CoreError::from)?
        .0;

    // The principal is re-read on every request; claims are identity
    // proof, not a cache of user state.
    let user = match state.users.get_by_id(claims.user_id()?).await {
        Ok(user) => user,
        Err(CoreError::NotFound { .. }) => {
            return Err(CoreError::AuthenticationFailed {
                reason: "user no longer exists".into(),
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    if !user.is_active {
        return Err(CoreError::AuthenticationFailed {
            reason: "account is inactive".into(),
        }
        .into());
    }

    req.extensions_mut().insert(Authenticated { user, claims });
    Ok(next.run(req).await)
}

/// Resolve the tenant context from the validated claims and attach it.
/// Must run after [`authenticate`].
pub async fn tenant_context(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<Authenticated>()
        .cloned()
        .ok_or(CoreError::TenantContextMissing)?;

    let claimed = auth.claims.tenant_uuid().map_err(CoreError::from)?;
    let context = context::resolve_tenant_context(claimed, &state.tenants).await?;

    req.extensions_mut().insert(RequestContext {
        principal: auth.user,
        context,
    });
    Ok(next.run(req).await)
}
