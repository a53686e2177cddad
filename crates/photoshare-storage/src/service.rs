//! Tenant-scoped media storage service.
//!
//! Mediates every access to the shared object store. Ownership is proven
//! by two independent signals on each call: the tenant-id prefix of the
//! key, and the tenant-id recorded in the object's own metadata. The
//! prefix alone is never trusted — a key string could be constructed
//! without this service's involvement, but the metadata written at upload
//! time cannot.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use photoshare_core::models::tenant::Tenant;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::path;
use crate::store::{ObjectInfo, ObjectStore, PutOptions, StoreError};

/// Metadata key recording the owning tenant on every stored object.
pub const META_TENANT_ID: &str = "tenant-id";
pub const META_ORIGINAL_FILENAME: &str = "original-filename";
pub const META_UPLOAD_TIMESTAMP: &str = "upload-timestamp";
pub const META_CONTENT_TYPE: &str = "content-type";

/// Object category for photo uploads.
pub const CATEGORY_PHOTOS: &str = "photos";
/// Object category for tenant branding assets.
pub const CATEGORY_BRANDING: &str = "branding";

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Maximum upload size in bytes (default: 50 MiB).
    pub max_upload_size: usize,
    /// Lower bound on signed-URL lifetime (default: 5 minutes).
    pub min_url_ttl: Duration,
    /// Upper bound on signed-URL lifetime (default: 10 minutes).
    pub max_url_ttl: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_upload_size: 50 * 1024 * 1024,
            min_url_ttl: Duration::from_secs(300),
            max_url_ttl: Duration::from_secs(600),
        }
    }
}

/// The scoped storage access service.
///
/// Explicitly constructed and passed to handlers; holds no state beyond
/// the store handle and configuration.
pub struct MediaStorage<S: ObjectStore> {
    store: S,
    config: StorageConfig,
}

impl<S: ObjectStore> MediaStorage<S> {
    pub fn new(store: S, config: StorageConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Upload tenant-owned bytes under a freshly derived key.
    ///
    /// Returns the key and the metadata written alongside the object.
    /// The size check runs before any store traffic, so an oversized
    /// payload never reaches the backend.
    pub async fn upload(
        &self,
        tenant: &Tenant,
        data: Bytes,
        filename: &str,
        content_type: &str,
        category: &str,
    ) -> Result<(String, HashMap<String, String>), StorageError> {
        require_active(tenant)?;

        if data.len() > self.config.max_upload_size {
            return Err(StorageError::Validation(format!(
                "file size exceeds maximum allowed size of {}MB",
                self.config.max_upload_size / (1024 * 1024)
            )));
        }
        if data.is_empty() {
            return Err(StorageError::Validation("empty upload".into()));
        }

        let key = path::derive_key(tenant.id, category, filename)?;

        let mut metadata = HashMap::new();
        metadata.insert(META_TENANT_ID.into(), tenant.id.to_string());
        metadata.insert(META_ORIGINAL_FILENAME.into(), filename.to_string());
        metadata.insert(
            META_UPLOAD_TIMESTAMP.into(),
            chrono::Utc::now().to_rfc3339(),
        );
        metadata.insert(META_CONTENT_TYPE.into(), content_type.to_string());

        let opts = PutOptions {
            content_type: content_type.to_string(),
            metadata: metadata.clone(),
            server_side_encryption: true,
        };

        self.retrying(|| self.store.put(&key, data.clone(), opts.clone()))
            .await?;

        debug!(tenant = %tenant.id, key, size = data.len(), "uploaded object");
        Ok((key, metadata))
    }

    /// Issue a time-limited signed URL for a tenant-owned object.
    ///
    /// The requested TTL is clamped into the configured bounds regardless
    /// of what the caller asked for.
    pub async fn signed_url(
        &self,
        key: &str,
        tenant: &Tenant,
        requested_ttl: Duration,
    ) -> Result<String, StorageError> {
        require_active(tenant)?;

        match self.verify_owner(key, tenant).await? {
            Some(_) => {}
            None => {
                return Err(StorageError::PermissionDenied(
                    "object does not exist or does not belong to this tenant".into(),
                ));
            }
        }

        let ttl = self.clamp_ttl(requested_ttl);
        self.retrying(|| self.store.presign(key, ttl))
            .await
    }

    /// Delete a tenant-owned object. Absent objects are a quiet no-op.
    pub async fn delete(&self, key: &str, tenant: &Tenant) -> Result<(), StorageError> {
        require_active(tenant)?;

        if self.verify_owner(key, tenant).await?.is_none() {
            return Ok(());
        }

        self.retrying(|| self.store.delete(key)).await?;
        debug!(tenant = %tenant.id, key, "deleted object");
        Ok(())
    }

    /// Fetch object info for a tenant-owned object, or `None` if absent.
    pub async fn file_info(
        &self,
        key: &str,
        tenant: &Tenant,
    ) -> Result<Option<ObjectInfo>, StorageError> {
        require_active(tenant)?;
        self.verify_owner(key, tenant).await
    }

    /// Dual-signal ownership check.
    ///
    /// Both checks must pass: the key prefix AND the stored metadata must
    /// name the requesting tenant. Objects without a readable tenant-id
    /// metadata entry are denied — an unverifiable object is treated as
    /// foreign.
    async fn verify_owner(
        &self,
        key: &str,
        tenant: &Tenant,
    ) -> Result<Option<ObjectInfo>, StorageError> {
        if !path::key_matches_tenant(key, tenant.id) {
            warn!(
                target: "security",
                tenant = %tenant.id,
                key,
                "storage access outside tenant namespace"
            );
            return Err(StorageError::PermissionDenied(
                "object does not belong to this tenant".into(),
            ));
        }

        let Some(info) = self.retrying(|| self.store.head(key)).await? else {
            return Ok(None);
        };

        match info.metadata.get(META_TENANT_ID) {
            Some(owner) if *owner == tenant.id.to_string() => Ok(Some(info)),
            recorded => {
                warn!(
                    target: "security",
                    tenant = %tenant.id,
                    key,
                    recorded_owner = ?recorded,
                    "object metadata does not confirm tenant ownership"
                );
                Err(StorageError::PermissionDenied(
                    "object ownership could not be verified".into(),
                ))
            }
        }
    }

    fn clamp_ttl(&self, requested: Duration) -> Duration {
        requested
            .max(self.config.min_url_ttl)
            .min(self.config.max_url_ttl)
    }

    /// Run a store call, retrying once on a transient failure. Anything
    /// else (or a second transient failure) becomes a generic backend
    /// error; store-specific details stay in the logs.
    async fn retrying<F, Fut, O>(&self, mut call: F) -> Result<O, StorageError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<O, StoreError>>,
    {
        match call().await {
            Ok(out) => Ok(out),
            Err(StoreError::Transient(first)) => {
                warn!(error = %first, "transient store error; retrying once");
                call().await.map_err(|e| StorageError::Backend(e.to_string()))
            }
            Err(other) => Err(StorageError::Backend(other.to_string())),
        }
    }
}

fn require_active(tenant: &Tenant) -> Result<(), StorageError> {
    if !tenant.is_active {
        return Err(StorageError::PermissionDenied(
            "tenant is deactivated".into(),
        ));
    }
    Ok(())
}
