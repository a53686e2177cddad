//! Photo endpoints: multipart upload, signed-URL reads, updates, and
//! deletes. The photo record is created only after the object store has
//! confirmed the write, so a cancelled upload leaves no dangling row.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Extension, Json, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use photoshare_core::error::CoreError;
use photoshare_core::guard;
use photoshare_core::models::photo::{CreatePhoto, Photo, UpdatePhoto};
use photoshare_core::repository::PhotoRepository;
use photoshare_storage::service::CATEGORY_PHOTOS;
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::RequestContext;
use crate::routes::albums::PageQuery;
use crate::routes::{fetch_verified_album, fetch_verified_photo};
use crate::state::AppState;

/// Default signed-URL lifetime requested for reads; the storage service
/// clamps it regardless.
const SIGNED_URL_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Serialize)]
struct PhotoView {
    #[serde(flatten)]
    photo: Photo,
    /// Short-lived signed URL for the bytes.
    url: Option<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Query(page): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let tenant = guard::tenant_gate(&ctx.principal, &ctx.context)?;
    let photos = state.photos.list(tenant.id, page.pagination()).await?;
    Ok(Json(json!({
        "items": photos.items,
        "total": photos.total,
        "offset": photos.offset,
        "limit": photos.limit,
    }))
    .into_response())
}

/// Multipart upload: a `file` part plus optional `title`, `description`,
/// `album_id`, and `is_public` fields.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let tenant = guard::tenant_gate(&ctx.principal, &ctx.context)?;

    let mut file: Option<(String, String, bytes::Bytes)> = None;
    let mut title = String::new();
    let mut description = String::new();
    let mut album_id: Option<Uuid> = None;
    let mut is_public = false;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        CoreError::Validation {
            message: format!("malformed multipart body: {e}"),
        }
    })? {
        match field.name().unwrap_or_default() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.jpg").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| CoreError::Validation {
                    message: format!("failed to read upload: {e}"),
                })?;
                file = Some((filename, content_type, data));
            }
            "title" => {
                title = read_text(field).await?;
            }
            "description" => {
                description = read_text(field).await?;
            }
            "album_id" => {
                let raw = read_text(field).await?;
                album_id = Some(raw.parse().map_err(|_| CoreError::Validation {
                    message: "invalid album_id".into(),
                })?);
            }
            "is_public" => {
                is_public = read_text(field).await? == "true";
            }
            _ => {}
        }
    }

    let (filename, content_type, data) = file.ok_or_else(|| CoreError::Validation {
        message: "a file part is required".into(),
    })?;

    if !content_type.starts_with("image/") {
        return Err(CoreError::Validation {
            message: format!("unsupported content type: {content_type}"),
        }
        .into());
    }

    // A target album must belong to this tenant before anything is
    // written.
    if let Some(album) = album_id {
        fetch_verified_album(&state, &ctx.principal, tenant, album).await?;
    }

    let size = data.len() as u64;
    let (storage_key, _metadata) = state
        .storage
        .upload(tenant, data, &filename, &content_type, CATEGORY_PHOTOS)
        .await?;

    // Metadata record only after the store confirmed the write.
    let photo = state
        .photos
        .create(
            tenant.id,
            ctx.principal.id,
            CreatePhoto {
                album_id,
                title: if title.is_empty() {
                    filename.clone()
                } else {
                    title
                },
                description,
                filename,
                storage_key,
                file_size: size,
                content_type,
                is_public,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(photo)).into_response())
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(|e| {
        ApiError::from(CoreError::Validation {
            message: format!("malformed multipart field: {e}"),
        })
    })
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let tenant = guard::tenant_gate(&ctx.principal, &ctx.context)?;
    let photo = fetch_verified_photo(&state, &ctx.principal, tenant, id).await?;

    let url = state
        .storage
        .signed_url(&photo.storage_key, tenant, SIGNED_URL_TTL)
        .await?;

    Ok(Json(PhotoView {
        photo,
        url: Some(url),
    })
    .into_response())
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
    Json(mut body): Json<Value>,
) -> Result<Response, ApiError> {
    let tenant = guard::tenant_gate(&ctx.principal, &ctx.context)?;

    guard::scrub_tenant_field(&mut body, &ctx.principal, "photo");
    let input: UpdatePhoto = serde_json::from_value(body).map_err(|e| CoreError::Validation {
        message: format!("invalid photo update: {e}"),
    })?;

    fetch_verified_photo(&state, &ctx.principal, tenant, id).await?;

    // Moving into an album requires that album to be ours too.
    if let Some(Some(album)) = input.album_id {
        fetch_verified_album(&state, &ctx.principal, tenant, album).await?;
    }

    let photo = state.photos.update(tenant.id, id, input).await?;
    Ok(Json(photo).into_response())
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let tenant = guard::tenant_gate(&ctx.principal, &ctx.context)?;
    let photo = fetch_verified_photo(&state, &ctx.principal, tenant, id).await?;

    // Bytes first (dual-checked again inside the service), then the row.
    state.storage.delete(&photo.storage_key, tenant).await?;
    state.photos.delete(tenant.id, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
