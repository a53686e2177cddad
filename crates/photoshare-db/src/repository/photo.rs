//! SurrealDB implementation of [`PhotoRepository`].

use chrono::{DateTime, Utc};
use photoshare_core::error::CoreResult;
use photoshare_core::models::photo::{CreatePhoto, Photo, UpdatePhoto};
use photoshare_core::repository::{PaginatedResult, Pagination, PhotoRepository};
use photoshare_core::scoped::Unverified;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::scoped;

#[derive(Debug, SurrealValue)]
struct PhotoRow {
    tenant_id: String,
    album_id: Option<String>,
    title: String,
    description: String,
    filename: String,
    storage_key: String,
    file_size: u64,
    content_type: String,
    uploaded_by: String,
    is_public: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct PhotoRowWithId {
    record_id: String,
    tenant_id: String,
    album_id: Option<String>,
    title: String,
    description: String,
    filename: String,
    storage_key: String,
    file_size: u64,
    content_type: String,
    uploaded_by: String,
    is_public: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_optional_uuid(raw: Option<String>, what: &str) -> Result<Option<Uuid>, DbError> {
    raw.map(|s| {
        Uuid::parse_str(&s).map_err(|e| DbError::Migration(format!("invalid {what} UUID: {e}")))
    })
    .transpose()
}

impl PhotoRow {
    fn into_photo(self, id: Uuid) -> Result<Photo, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Migration(format!("invalid tenant UUID: {e}")))?;
        let uploaded_by = Uuid::parse_str(&self.uploaded_by)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Photo {
            id,
            tenant_id,
            album_id: parse_optional_uuid(self.album_id, "album")?,
            title: self.title,
            description: self.description,
            filename: self.filename,
            storage_key: self.storage_key,
            file_size: self.file_size,
            content_type: self.content_type,
            uploaded_by,
            is_public: self.is_public,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl PhotoRowWithId {
    fn try_into_photo(self) -> Result<Photo, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let row = PhotoRow {
            tenant_id: self.tenant_id,
            album_id: self.album_id,
            title: self.title,
            description: self.description,
            filename: self.filename,
            storage_key: self.storage_key,
            file_size: self.file_size,
            content_type: self.content_type,
            uploaded_by: self.uploaded_by,
            is_public: self.is_public,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        row.into_photo(id)
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Photo repository.
#[derive(Clone)]
pub struct SurrealPhotoRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPhotoRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn list_filtered(
        &self,
        tenant_id: Uuid,
        album_id: Option<Uuid>,
        pagination: Pagination,
    ) -> CoreResult<PaginatedResult<Photo>> {
        let tenant_id_str = tenant_id.to_string();
        let filter = album_id.map(|_| "album_id = $album_id");

        let mut count_builder = self
            .db
            .query(scoped::count_scoped::<Photo>(filter))
            .bind(("tenant_id", tenant_id_str.clone()));
        if let Some(album_id) = album_id {
            count_builder = count_builder.bind(("album_id", album_id.to_string()));
        }
        let mut count_result = count_builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut builder = self
            .db
            .query(scoped::select_scoped::<Photo>(filter))
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(album_id) = album_id {
            builder = builder.bind(("album_id", album_id.to_string()));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<PhotoRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_photo())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

impl<C: Connection> PhotoRepository for SurrealPhotoRepository<C> {
    async fn create(
        &self,
        tenant_id: Uuid,
        uploaded_by: Uuid,
        input: CreatePhoto,
    ) -> CoreResult<Photo> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('photo', $id) SET \
                 tenant_id = $tenant_id, \
                 album_id = $album_id, \
                 title = $title, description = $description, \
                 filename = $filename, storage_key = $storage_key, \
                 file_size = $file_size, content_type = $content_type, \
                 uploaded_by = $uploaded_by, \
                 is_public = $is_public",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("album_id", input.album_id.map(|a| a.to_string())))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("filename", input.filename))
            .bind(("storage_key", input.storage_key))
            .bind(("file_size", input.file_size))
            .bind(("content_type", input.content_type))
            .bind(("uploaded_by", uploaded_by.to_string()))
            .bind(("is_public", input.is_public))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PhotoRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "photo".into(),
            id: id_str,
        })?;

        Ok(row.into_photo(id)?)
    }

    async fn get(&self, id: Uuid) -> CoreResult<Unverified<Photo>> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('photo', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PhotoRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "photo".into(),
            id: id_str,
        })?;

        Ok(Unverified::new(row.into_photo(id)?))
    }

    async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdatePhoto) -> CoreResult<Photo> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.is_public.is_some() {
            sets.push("is_public = $is_public");
        }
        if input.album_id.is_some() {
            sets.push("album_id = $album_id");
        }
        sets.push("updated_at = time::now()");

        let query = scoped::update_scoped::<Photo>(&sets.join(", "));

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(is_public) = input.is_public {
            builder = builder.bind(("is_public", is_public));
        }
        if let Some(album_id) = input.album_id {
            builder = builder.bind(("album_id", album_id.map(|a| a.to_string())));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PhotoRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "photo".into(),
            id: id_str,
        })?;

        Ok(row.try_into_photo()?)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<()> {
        self.db
            .query(scoped::delete_scoped::<Photo>())
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> CoreResult<PaginatedResult<Photo>> {
        self.list_filtered(tenant_id, None, pagination).await
    }

    async fn list_by_album(
        &self,
        tenant_id: Uuid,
        album_id: Uuid,
        pagination: Pagination,
    ) -> CoreResult<PaginatedResult<Photo>> {
        self.list_filtered(tenant_id, Some(album_id), pagination)
            .await
    }
}
