//! The object store collaborator interface.
//!
//! The store is an opaque key/value blob service with a presigned-URL
//! capability. It knows nothing about tenants; every scoping decision is
//! made by [`crate::service::MediaStorage`] before a call reaches this
//! trait.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by store implementations, classified for retry.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transient network-class failure; safe to retry once.
    #[error("transient store error: {0}")]
    Transient(String),

    #[error("store error: {0}")]
    Other(String),
}

/// Object metadata as returned by `head`.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub size: u64,
    pub content_type: String,
    pub metadata: HashMap<String, String>,
    pub last_modified: DateTime<Utc>,
}

/// Options attached to an upload.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub content_type: String,
    pub metadata: HashMap<String, String>,
    /// Request encryption at rest from the backing store.
    pub server_side_encryption: bool,
}

pub trait ObjectStore: Send + Sync {
    fn put(
        &self,
        key: &str,
        data: Bytes,
        opts: PutOptions,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Produce a time-limited URL granting read access to `key`. The TTL
    /// has already been clamped by the service layer.
    fn presign(
        &self,
        key: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Fetch object metadata, or `None` if the object does not exist.
    fn head(&self, key: &str)
    -> impl Future<Output = Result<Option<ObjectInfo>, StoreError>> + Send;

    /// Delete an object. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}
