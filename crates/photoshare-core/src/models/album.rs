//! Album domain model — a tenant-scoped photo collection.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoped::{TenantOwned, TenantScopedRecord};

/// A tenant-scoped collection grouping related photos (an event, a
/// ministry, a season).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: Uuid,
    /// Owning tenant. Set from the request context at creation and never
    /// reassignable afterwards.
    pub tenant_id: Uuid,
    pub title: String,
    pub description: String,
    pub created_by: Uuid,
    pub is_public: bool,
    pub is_featured: bool,
    pub event_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantOwned for Album {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

impl TenantScopedRecord for Album {
    const TABLE: &'static str = "album";

    fn record_id(&self) -> Uuid {
        self.id
    }
}

/// Client-supplied album fields. The owning tenant and creator are taken
/// from the request context, never from the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAlbum {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub event_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAlbum {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub is_featured: Option<bool>,
    /// `Some(Some(d))` = set, `Some(None)` = clear, `None` = no change.
    pub event_date: Option<Option<NaiveDate>>,
}
