//! In-memory object store for tests and local development.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use parking_lot::RwLock;

use crate::store::{ObjectInfo, ObjectStore, PutOptions, StoreError};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    info: ObjectInfo,
}

/// Map-backed store. Presigned URLs are synthetic `memory://` URLs that
/// embed the expiry so tests can assert on the effective TTL.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects (test helper).
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Raw bytes for a key (test helper).
    pub fn get_bytes(&self, key: &str) -> Option<Bytes> {
        self.objects.read().get(key).map(|o| o.data.clone())
    }

    /// Overwrite an object's recorded metadata (test helper for
    /// simulating a mismatch between key prefix and stored ownership).
    pub fn set_metadata(&self, key: &str, metadata: HashMap<String, String>) {
        if let Some(obj) = self.objects.write().get_mut(key) {
            obj.info.metadata = metadata;
        }
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, data: Bytes, opts: PutOptions) -> Result<(), StoreError> {
        let info = ObjectInfo {
            size: data.len() as u64,
            content_type: opts.content_type,
            metadata: opts.metadata,
            last_modified: Utc::now(),
        };
        self.objects
            .write()
            .insert(key.to_string(), StoredObject { data, info });
        Ok(())
    }

    async fn presign(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        if !self.objects.read().contains_key(key) {
            return Err(StoreError::Other(format!("no such object: {key}")));
        }
        let expires = Utc::now().timestamp() + ttl.as_secs() as i64;
        Ok(format!("memory://{key}?expires={expires}"))
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectInfo>, StoreError> {
        Ok(self.objects.read().get(key).map(|o| o.info.clone()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.objects.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_head_round_trip() {
        let store = MemoryObjectStore::new();
        let mut metadata = HashMap::new();
        metadata.insert("tenant-id".into(), "t-1".into());

        store
            .put(
                "tenants/t-1/photos/a.jpg",
                Bytes::from_static(b"bytes"),
                PutOptions {
                    content_type: "image/jpeg".into(),
                    metadata,
                    server_side_encryption: true,
                },
            )
            .await
            .unwrap();

        let info = store
            .head("tenants/t-1/photos/a.jpg")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.size, 5);
        assert_eq!(info.content_type, "image/jpeg");
        assert_eq!(info.metadata.get("tenant-id").unwrap(), "t-1");
    }

    #[tokio::test]
    async fn head_absent_is_none() {
        let store = MemoryObjectStore::new();
        assert!(store.head("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryObjectStore::new();
        store.delete("missing").await.unwrap();
    }

    #[tokio::test]
    async fn presign_embeds_expiry() {
        let store = MemoryObjectStore::new();
        store
            .put("k", Bytes::from_static(b"x"), PutOptions::default())
            .await
            .unwrap();
        let url = store.presign("k", Duration::from_secs(300)).await.unwrap();
        assert!(url.starts_with("memory://k?expires="));
    }
}
