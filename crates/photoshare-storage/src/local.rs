//! Filesystem-backed object store.
//!
//! Objects live under a base directory mirroring their keys; metadata is
//! kept in a JSON sidecar next to each object. Presigned URLs are
//! self-contained: the expiry and a SHA-256 token over
//! `secret | key | expiry` are embedded as query parameters, so any
//! front-end that shares the secret can serve the bytes without a
//! database round trip.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info};

use crate::store::{ObjectInfo, ObjectStore, PutOptions, StoreError};

#[derive(Debug, Serialize, Deserialize)]
struct Sidecar {
    content_type: String,
    metadata: std::collections::HashMap<String, String>,
    last_modified: DateTime<Utc>,
    size: u64,
}

#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    base_path: PathBuf,
    /// Base URL prepended to presigned paths.
    public_base_url: String,
    /// Secret mixed into presign tokens.
    url_secret: String,
}

/// Resolve `key` under `base`, rejecting any traversal out of the base
/// directory.
fn safe_object_path(base: &Path, key: &str) -> Result<PathBuf, StoreError> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StoreError::Other(format!("unsafe object key: {key}")));
    }
    let mut resolved = base.to_path_buf();
    for component in key.split('/') {
        if component.is_empty() || component == "." {
            return Err(StoreError::Other(format!("unsafe object key: {key}")));
        }
        resolved.push(component);
    }
    Ok(resolved)
}

impl LocalObjectStore {
    pub async fn new(
        base_path: PathBuf,
        public_base_url: String,
        url_secret: String,
    ) -> Result<Self, StoreError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            StoreError::Other(format!(
                "failed to create media directory '{}': {e}",
                base_path.display()
            ))
        })?;

        info!(path = %base_path.display(), "local object store initialized");

        Ok(Self {
            base_path,
            public_base_url,
            url_secret,
        })
    }

    fn sidecar_path(&self, object_path: &Path) -> PathBuf {
        let mut p = object_path.as_os_str().to_owned();
        p.push(".meta.json");
        PathBuf::from(p)
    }

    fn sign(&self, key: &str, expires: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url_secret.as_bytes());
        hasher.update(b"|");
        hasher.update(key.as_bytes());
        hasher.update(b"|");
        hasher.update(expires.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Validate a presigned token (used by whatever front-end serves the
    /// bytes).
    pub fn verify_url_token(&self, key: &str, expires: i64, token: &str) -> bool {
        expires > Utc::now().timestamp() && self.sign(key, expires) == token
    }
}

impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, data: Bytes, opts: PutOptions) -> Result<(), StoreError> {
        let path = safe_object_path(&self.base_path, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Transient(format!("mkdir failed: {e}")))?;
        }

        fs::write(&path, &data)
            .await
            .map_err(|e| StoreError::Transient(format!("write failed for {key}: {e}")))?;

        let sidecar = Sidecar {
            content_type: opts.content_type,
            metadata: opts.metadata,
            last_modified: Utc::now(),
            size: data.len() as u64,
        };
        let encoded = serde_json::to_vec(&sidecar)
            .map_err(|e| StoreError::Other(format!("sidecar encode: {e}")))?;
        fs::write(self.sidecar_path(&path), encoded)
            .await
            .map_err(|e| StoreError::Transient(format!("sidecar write failed: {e}")))?;

        debug!(key, size = data.len(), "stored object");
        Ok(())
    }

    async fn presign(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        // Key shape is validated even though the bytes are not touched.
        safe_object_path(&self.base_path, key)?;
        let expires = Utc::now().timestamp() + ttl.as_secs() as i64;
        let token = self.sign(key, expires);
        Ok(format!(
            "{}/media/{key}?expires={expires}&token={token}",
            self.public_base_url.trim_end_matches('/')
        ))
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectInfo>, StoreError> {
        let path = safe_object_path(&self.base_path, key)?;
        let raw = match fs::read(self.sidecar_path(&path)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Transient(format!("head failed for {key}: {e}"))),
        };
        let sidecar: Sidecar = serde_json::from_slice(&raw)
            .map_err(|e| StoreError::Other(format!("sidecar decode for {key}: {e}")))?;
        Ok(Some(ObjectInfo {
            size: sidecar.size,
            content_type: sidecar.content_type,
            metadata: sidecar.metadata,
            last_modified: sidecar.last_modified,
        }))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = safe_object_path(&self.base_path, key)?;
        for target in [self.sidecar_path(&path), path] {
            match fs::remove_file(&target).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(StoreError::Transient(format!(
                        "delete failed for {key}: {e}"
                    )));
                }
            }
        }
        debug!(key, "deleted object");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (LocalObjectStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(
            dir.path().to_path_buf(),
            "http://localhost:8080".into(),
            "test-secret".into(),
        )
        .await
        .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn put_and_head() {
        let (store, _dir) = test_store().await;
        let mut metadata = std::collections::HashMap::new();
        metadata.insert("tenant-id".into(), "abc".into());

        store
            .put(
                "tenants/abc/photos/x_pic.jpg",
                Bytes::from_static(b"jpeg-bytes"),
                PutOptions {
                    content_type: "image/jpeg".into(),
                    metadata,
                    server_side_encryption: false,
                },
            )
            .await
            .unwrap();

        let info = store
            .head("tenants/abc/photos/x_pic.jpg")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.size, 10);
        assert_eq!(info.metadata.get("tenant-id").unwrap(), "abc");
    }

    #[tokio::test]
    async fn traversal_keys_rejected() {
        let (store, _dir) = test_store().await;
        let err = store
            .put(
                "tenants/../../etc/shadow",
                Bytes::from_static(b"x"),
                PutOptions::default(),
            )
            .await;
        assert!(err.is_err());
        assert!(store.head("../outside").await.is_err());
    }

    #[tokio::test]
    async fn delete_absent_is_ok() {
        let (store, _dir) = test_store().await;
        store.delete("tenants/abc/photos/none.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn presigned_token_verifies_until_expiry() {
        let (store, _dir) = test_store().await;
        let url = store
            .presign("tenants/abc/photos/p.jpg", Duration::from_secs(300))
            .await
            .unwrap();
        let query = url.split_once('?').unwrap().1;
        let mut expires = 0;
        let mut token = String::new();
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("expires", v)) => expires = v.parse().unwrap(),
                Some(("token", v)) => token = v.to_string(),
                _ => {}
            }
        }
        assert!(store.verify_url_token("tenants/abc/photos/p.jpg", expires, &token));
        assert!(!store.verify_url_token("tenants/other/photos/p.jpg", expires, &token));
        assert!(!store.verify_url_token("tenants/abc/photos/p.jpg", expires - 1_000_000, &token));
    }
}
