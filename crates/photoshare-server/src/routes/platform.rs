//! Platform console endpoints: tenant provisioning, activation, code
//! rotation, and privileged user reassignment.
//!
//! These operations are tenant-exempt by declaration and restricted to
//! superadmins via the platform gate. They administer tenants as
//! records; they never read tenant-scoped data.

use std::sync::Arc;

use axum::extract::{Extension, Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use photoshare_auth::service::AssignTenantInput;
use photoshare_core::error::CoreError;
use photoshare_core::guard;
use photoshare_core::models::tenant::{CreateTenant, TENANT_CODE_LEN};
use photoshare_core::repository::{TenantRepository, UserRepository};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::Authenticated;
use crate::routes::albums::PageQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct AssignUserRequest {
    pub tenant_code: String,
}

/// Random join code: uppercase alphanumeric, fixed length.
fn generate_code() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::rng();
    (0..TENANT_CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Generate a code that is not currently in use. The unique index on the
/// code column is the final arbiter against races.
async fn unique_code(state: &AppState) -> Result<String, ApiError> {
    for _ in 0..16 {
        let code = generate_code();
        match state.tenants.get_by_code(&code).await {
            Err(CoreError::NotFound { .. }) => return Ok(code),
            Ok(_) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(CoreError::Internal("could not generate a unique tenant code".into()).into())
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Authenticated>,
    Json(body): Json<CreateTenantRequest>,
) -> Result<Response, ApiError> {
    guard::platform_gate(&auth.user)?;

    if body.name.trim().is_empty() {
        return Err(CoreError::Validation {
            message: "tenant name is required".into(),
        }
        .into());
    }

    let code = unique_code(&state).await?;
    let tenant = state
        .tenants
        .create(CreateTenant {
            code,
            name: body.name.trim().to_string(),
        })
        .await?;

    tracing::info!(
        actor = %auth.user.id,
        tenant = %tenant.id,
        code = %tenant.code,
        "tenant created"
    );
    Ok((StatusCode::CREATED, Json(tenant)).into_response())
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Authenticated>,
    Query(page): Query<PageQuery>,
) -> Result<Response, ApiError> {
    guard::platform_gate(&auth.user)?;
    let tenants = state.tenants.list(page.pagination()).await?;
    Ok(Json(json!({
        "items": tenants.items,
        "total": tenants.total,
        "offset": tenants.offset,
        "limit": tenants.limit,
    }))
    .into_response())
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Authenticated>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    guard::platform_gate(&auth.user)?;
    let tenant = state.tenants.get_by_id(id).await?;
    let user_count = state.users.count_by_tenant(id).await?;
    Ok(Json(json!({
        "tenant": tenant,
        "user_count": user_count,
    }))
    .into_response())
}

/// Toggle the activation flag. Deactivation blocks new sign-ups and
/// credential issuance immediately; outstanding access tokens age out on
/// their own.
pub async fn set_active(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Authenticated>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetActiveRequest>,
) -> Result<Response, ApiError> {
    guard::platform_gate(&auth.user)?;
    let tenant = state.tenants.set_active(id, body.is_active).await?;
    tracing::info!(
        actor = %auth.user.id,
        tenant = %tenant.id,
        is_active = tenant.is_active,
        "tenant activation toggled"
    );
    Ok(Json(tenant).into_response())
}

/// Rotate the join code. Outstanding invitations die with the old code;
/// the tenant id and all existing memberships are untouched.
pub async fn rotate_code(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Authenticated>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    guard::platform_gate(&auth.user)?;
    let code = unique_code(&state).await?;
    let tenant = state.tenants.rotate_code(id, &code).await?;
    tracing::info!(
        actor = %auth.user.id,
        tenant = %tenant.id,
        "tenant code rotated"
    );
    Ok(Json(json!({ "code": tenant.code })).into_response())
}

/// Privileged reassignment: move a user into the tenant named by code,
/// overriding the one-shot rule. This is the only reassignment path.
pub async fn assign_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Authenticated>,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignUserRequest>,
) -> Result<Response, ApiError> {
    guard::platform_gate(&auth.user)?;

    let user = state
        .auth
        .assign_tenant(AssignTenantInput {
            user_id: id,
            tenant_code: body.tenant_code,
            identifier: None,
            admin_override: true,
        })
        .await?;

    tracing::info!(
        actor = %auth.user.id,
        user = %user.id,
        tenant = ?user.tenant_id,
        "user reassigned by platform operator"
    );
    Ok(Json(json!({ "user": user })).into_response())
}
