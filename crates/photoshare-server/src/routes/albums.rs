//! Album endpoints. Every handler passes the tenant gate first; object
//! handlers additionally prove ownership through the sealed fetch.

use std::sync::Arc;

use axum::extract::{Extension, Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use photoshare_core::error::CoreError;
use photoshare_core::guard;
use photoshare_core::models::album::{CreateAlbum, UpdateAlbum};
use photoshare_core::repository::{AlbumRepository, Pagination, PhotoRepository};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::RequestContext;
use crate::routes::fetch_verified_album;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub offset: u64,
    pub limit: Option<u64>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            offset: self.offset,
            limit: self.limit.unwrap_or(50).min(200),
        }
    }
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Query(page): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let tenant = guard::tenant_gate(&ctx.principal, &ctx.context)?;
    let albums = state.albums.list(tenant.id, page.pagination()).await?;
    Ok(Json(json!({
        "items": albums.items,
        "total": albums.total,
        "offset": albums.offset,
        "limit": albums.limit,
    }))
    .into_response())
}

/// Create an album. The owning tenant comes from the request context;
/// any tenant value in the payload is simply not part of the accepted
/// schema and is discarded.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<CreateAlbum>,
) -> Result<Response, ApiError> {
    let tenant = guard::tenant_gate(&ctx.principal, &ctx.context)?;
    if body.title.trim().is_empty() {
        return Err(CoreError::Validation {
            message: "album title is required".into(),
        }
        .into());
    }
    let album = state
        .albums
        .create(tenant.id, ctx.principal.id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(album)).into_response())
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let tenant = guard::tenant_gate(&ctx.principal, &ctx.context)?;
    let album = fetch_verified_album(&state, &ctx.principal, tenant, id).await?;
    Ok(Json(album).into_response())
}

/// Update an album. A tenant field in the payload is stripped and
/// logged; the rest of the update still applies.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
    Json(mut body): Json<Value>,
) -> Result<Response, ApiError> {
    let tenant = guard::tenant_gate(&ctx.principal, &ctx.context)?;

    guard::scrub_tenant_field(&mut body, &ctx.principal, "album");
    let input: UpdateAlbum = serde_json::from_value(body).map_err(|e| CoreError::Validation {
        message: format!("invalid album update: {e}"),
    })?;

    // Ownership first; the scoped update is the second line of defense.
    fetch_verified_album(&state, &ctx.principal, tenant, id).await?;
    let album = state.albums.update(tenant.id, id, input).await?;
    Ok(Json(album).into_response())
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let tenant = guard::tenant_gate(&ctx.principal, &ctx.context)?;
    fetch_verified_album(&state, &ctx.principal, tenant, id).await?;
    state.albums.delete(tenant.id, id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn photos(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let tenant = guard::tenant_gate(&ctx.principal, &ctx.context)?;
    fetch_verified_album(&state, &ctx.principal, tenant, id).await?;
    let photos = state
        .photos
        .list_by_album(tenant.id, id, page.pagination())
        .await?;
    Ok(Json(json!({
        "items": photos.items,
        "total": photos.total,
        "offset": photos.offset,
        "limit": photos.limit,
    }))
    .into_response())
}
