//! Route handlers and router assembly.

pub mod albums;
pub mod auth;
pub mod photos;
pub mod platform;
pub mod tenants;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use photoshare_core::error::CoreError;
use photoshare_core::models::album::Album;
use photoshare_core::models::photo::Photo;
use photoshare_core::models::tenant::Tenant;
use photoshare_core::models::user::User;
use photoshare_core::repository::{AlbumRepository, PhotoRepository};
use photoshare_core::{TenantScopedRecord, guard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{authenticate, tenant_context};
use crate::state::AppState;

/// Assemble the full application router.
///
/// The tenant-scoped router is wrapped in the authenticate → context
/// pipeline as a whole; adding a handler there automatically puts it
/// behind both stages.
pub fn router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/public/branding/:code", get(tenants::public_branding));

    // Authenticated but tenant-exempt: account-level operations that run
    // before (or without) a tenant binding.
    let account = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/assign-tenant", post(auth::assign_tenant))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let tenant_scoped = Router::new()
        .route("/api/albums", get(albums::list).post(albums::create))
        .route(
            "/api/albums/:id",
            get(albums::get).patch(albums::update).delete(albums::delete),
        )
        .route("/api/albums/:id/photos", get(albums::photos))
        .route("/api/photos", get(photos::list).post(photos::upload))
        .route(
            "/api/photos/:id",
            get(photos::get).patch(photos::update).delete(photos::delete),
        )
        .route(
            "/api/tenant/branding",
            get(tenants::branding).post(tenants::upload_branding),
        )
        .layer(DefaultBodyLimit::max(
            state.config.storage.max_upload_size + 1024 * 1024,
        ))
        .route_layer(from_fn_with_state(state.clone(), tenant_context))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    // Platform console: authenticated, tenant-exempt, superadmin-gated
    // inside each handler.
    let platform = Router::new()
        .route(
            "/api/platform/tenants",
            get(platform::list).post(platform::create),
        )
        .route("/api/platform/tenants/:id/stats", get(platform::stats))
        .route(
            "/api/platform/tenants/:id/activate",
            post(platform::set_active),
        )
        .route(
            "/api/platform/tenants/:id/rotate-code",
            post(platform::rotate_code),
        )
        .route(
            "/api/platform/users/:id/assign-tenant",
            post(platform::assign_user),
        )
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .merge(public)
        .merge(account)
        .merge(tenant_scoped)
        .merge(platform)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Fetch an album by id and prove ownership against the context tenant.
/// A cross-tenant hit is audited and surfaces as not-found.
pub(crate) async fn fetch_verified_album(
    state: &AppState,
    principal: &User,
    tenant: &Tenant,
    id: Uuid,
) -> Result<Album, ApiError> {
    let sealed = state.albums.get(id).await?;
    unseal(state, principal, tenant, sealed, "album.read").await
}

/// Fetch a photo by id and prove ownership against the context tenant.
pub(crate) async fn fetch_verified_photo(
    state: &AppState,
    principal: &User,
    tenant: &Tenant,
    id: Uuid,
) -> Result<Photo, ApiError> {
    let sealed = state.photos.get(id).await?;
    unseal(state, principal, tenant, sealed, "photo.read").await
}

async fn unseal<T: TenantScopedRecord>(
    state: &AppState,
    principal: &User,
    tenant: &Tenant,
    sealed: photoshare_core::Unverified<T>,
    action: &str,
) -> Result<T, ApiError> {
    match guard::verify_object(principal, tenant, sealed) {
        Ok(record) => Ok(record),
        Err(CoreError::CrossTenantDenied { entity, id }) => {
            state
                .audit_denied(
                    principal,
                    Some(tenant.id),
                    action,
                    Some(format!("{entity}:{id}")),
                )
                .await;
            Err(CoreError::CrossTenantDenied { entity, id }.into())
        }
        Err(other) => Err(other.into()),
    }
}
