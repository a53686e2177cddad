//! Photo domain model — tenant-scoped media metadata.
//!
//! The photo record holds metadata only; the bytes live in the shared
//! object store under a tenant-namespaced key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoped::{TenantOwned, TenantScopedRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: Uuid,
    /// Owning tenant. Set from the request context at creation and never
    /// reassignable afterwards.
    pub tenant_id: Uuid,
    pub album_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    /// Original filename as uploaded.
    pub filename: String,
    /// Derived object-store key (`tenants/{tenant_id}/photos/...`).
    pub storage_key: String,
    pub file_size: u64,
    pub content_type: String,
    pub uploaded_by: Uuid,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantOwned for Photo {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

impl TenantScopedRecord for Photo {
    const TABLE: &'static str = "photo";

    fn record_id(&self) -> Uuid {
        self.id
    }
}

/// Photo fields assembled by the upload handler after the object store
/// has confirmed the write. The owning tenant and uploader come from the
/// request context.
#[derive(Debug, Clone)]
pub struct CreatePhoto {
    pub album_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub filename: String,
    pub storage_key: String,
    pub file_size: u64,
    pub content_type: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePhoto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    /// `Some(Some(id))` = move into album, `Some(None)` = detach.
    pub album_id: Option<Option<Uuid>>,
}
