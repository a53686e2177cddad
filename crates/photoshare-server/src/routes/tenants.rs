//! Tenant branding endpoints: members read, admins write, and a public
//! lookup by tenant code for the login page.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Extension, Json, Multipart, Path, State};
use axum::response::{IntoResponse, Response};
use photoshare_core::error::CoreError;
use photoshare_core::guard;
use photoshare_core::models::tenant::{self, Tenant, UpdateTenant};
use photoshare_core::repository::TenantRepository;
use photoshare_storage::service::CATEGORY_BRANDING;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::RequestContext;
use crate::state::AppState;

const BRANDING_URL_TTL: Duration = Duration::from_secs(600);

async fn branding_view(state: &AppState, tenant: &Tenant) -> Result<serde_json::Value, ApiError> {
    let mut logo_url = None;
    if let Some(key) = tenant.logo_path.as_deref() {
        logo_url = Some(state.storage.signed_url(key, tenant, BRANDING_URL_TTL).await?);
    }
    let mut cover_url = None;
    if let Some(key) = tenant.cover_image_path.as_deref() {
        cover_url = Some(state.storage.signed_url(key, tenant, BRANDING_URL_TTL).await?);
    }
    Ok(json!({
        "name": tenant.name,
        "logo_url": logo_url,
        "cover_image_url": cover_url,
    }))
}

pub async fn branding(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, ApiError> {
    let tenant = guard::tenant_gate(&ctx.principal, &ctx.context)?;
    let view = branding_view(&state, tenant).await?;
    Ok(Json(view).into_response())
}

/// Upload a branding asset (`logo` or `cover` part). Tenant admins only.
pub async fn upload_branding(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let tenant = guard::tenant_gate(&ctx.principal, &ctx.context)?;
    guard::require_tenant_admin(&ctx.principal)?;

    let mut update = UpdateTenant::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        CoreError::Validation {
            message: format!("malformed multipart body: {e}"),
        }
    })? {
        let slot = match field.name().unwrap_or_default() {
            "logo" => "logo",
            "cover" => "cover",
            _ => continue,
        };

        let filename = field.file_name().unwrap_or("asset.png").to_string();
        let content_type = field.content_type().unwrap_or("image/png").to_string();
        let data = field.bytes().await.map_err(|e| CoreError::Validation {
            message: format!("failed to read upload: {e}"),
        })?;

        if !content_type.starts_with("image/") {
            return Err(CoreError::Validation {
                message: format!("unsupported content type: {content_type}"),
            }
            .into());
        }

        let (key, _) = state
            .storage
            .upload(tenant, data, &filename, &content_type, CATEGORY_BRANDING)
            .await?;

        // Replace the previous asset after the new one is in place.
        let old = match slot {
            "logo" => {
                let old = tenant.logo_path.clone();
                update.logo_path = Some(Some(key));
                old
            }
            _ => {
                let old = tenant.cover_image_path.clone();
                update.cover_image_path = Some(Some(key));
                old
            }
        };
        if let Some(old_key) = old {
            state.storage.delete(&old_key, tenant).await?;
        }
    }

    let updated = state.tenants.update(tenant.id, update).await?;
    let view = branding_view(&state, &updated).await?;
    Ok(Json(view).into_response())
}

/// Unauthenticated branding lookup by tenant code, for the login page.
/// Deactivated and unknown tenants are indistinguishable.
pub async fn public_branding(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let code = tenant::normalize_code(&code);
    let tenant = match state.tenants.get_by_code(&code).await {
        Ok(t) if t.is_active => t,
        Ok(_) | Err(CoreError::NotFound { .. }) => {
            return Err(CoreError::InvalidTenant.into());
        }
        Err(e) => return Err(e.into()),
    };
    let view = branding_view(&state, &tenant).await?;
    Ok(Json(view).into_response())
}
