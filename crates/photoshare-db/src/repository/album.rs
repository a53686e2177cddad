//! SurrealDB implementation of [`AlbumRepository`].
//!
//! Collection accessors go through the scoped query builders; the
//! object-level `get` fetches by primary key and hands back a sealed
//! [`Unverified`] record for the enforcement gate to unseal.

use chrono::{DateTime, NaiveDate, Utc};
use photoshare_core::error::CoreResult;
use photoshare_core::models::album::{Album, CreateAlbum, UpdateAlbum};
use photoshare_core::repository::{AlbumRepository, PaginatedResult, Pagination};
use photoshare_core::scoped::Unverified;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::scoped;

#[derive(Debug, SurrealValue)]
struct AlbumRow {
    tenant_id: String,
    title: String,
    description: String,
    created_by: String,
    is_public: bool,
    is_featured: bool,
    event_date: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AlbumRowWithId {
    record_id: String,
    tenant_id: String,
    title: String,
    description: String,
    created_by: String,
    is_public: bool,
    is_featured: bool,
    event_date: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_event_date(raw: Option<String>) -> Result<Option<NaiveDate>, DbError> {
    raw.map(|s| {
        NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|e| DbError::Migration(format!("invalid event date: {e}")))
    })
    .transpose()
}

impl AlbumRow {
    fn into_album(self, id: Uuid) -> Result<Album, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Migration(format!("invalid tenant UUID: {e}")))?;
        let created_by = Uuid::parse_str(&self.created_by)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Album {
            id,
            tenant_id,
            title: self.title,
            description: self.description,
            created_by,
            is_public: self.is_public,
            is_featured: self.is_featured,
            event_date: parse_event_date(self.event_date)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl AlbumRowWithId {
    fn try_into_album(self) -> Result<Album, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let row = AlbumRow {
            tenant_id: self.tenant_id,
            title: self.title,
            description: self.description,
            created_by: self.created_by,
            is_public: self.is_public,
            is_featured: self.is_featured,
            event_date: self.event_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        row.into_album(id)
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Album repository.
#[derive(Clone)]
pub struct SurrealAlbumRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAlbumRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AlbumRepository for SurrealAlbumRepository<C> {
    async fn create(
        &self,
        tenant_id: Uuid,
        created_by: Uuid,
        input: CreateAlbum,
    ) -> CoreResult<Album> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('album', $id) SET \
                 tenant_id = $tenant_id, \
                 title = $title, description = $description, \
                 created_by = $created_by, \
                 is_public = $is_public, is_featured = $is_featured, \
                 event_date = $event_date",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("created_by", created_by.to_string()))
            .bind(("is_public", input.is_public))
            .bind(("is_featured", input.is_featured))
            .bind(("event_date", input.event_date.map(|d| d.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AlbumRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "album".into(),
            id: id_str,
        })?;

        Ok(row.into_album(id)?)
    }

    async fn get(&self, id: Uuid) -> CoreResult<Unverified<Album>> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('album', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AlbumRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "album".into(),
            id: id_str,
        })?;

        Ok(Unverified::new(row.into_album(id)?))
    }

    async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateAlbum) -> CoreResult<Album> {
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
        if input.is_featured.is_some() {
            sets.push("is_featured = $is_featured");
        }
        if input.event_date.is_some() {
            sets.push("event_date = $event_date");
        }
        sets.push("updated_at = time::now()");

        let query = scoped::update_scoped::<Album>(&sets.join(", "));

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
        if let Some(is_featured) = input.is_featured {
            builder = builder.bind(("is_featured", is_featured));
        }
        if let Some(event_date) = input.event_date {
            builder = builder.bind(("event_date", event_date.map(|d| d.to_string())));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AlbumRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "album".into(),
            id: id_str,
        })?;

        Ok(row.try_into_album()?)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<()> {
        self.db
            .query(scoped::delete_scoped::<Album>())
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
    ) -> CoreResult<PaginatedResult<Album>> {
        let tenant_id_str = tenant_id.to_string();

        let mut count_result = self
            .db
            .query(scoped::count_scoped::<Album>(None))
            .bind(("tenant_id", tenant_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(scoped::select_scoped::<Album>(None))
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AlbumRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_album())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
