//! Integration tests for the scoped storage access service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use photoshare_core::models::tenant::Tenant;
use photoshare_storage::service::{CATEGORY_PHOTOS, META_TENANT_ID};
use photoshare_storage::{
    MediaStorage, MemoryObjectStore, ObjectInfo, ObjectStore, PutOptions, StorageConfig,
    StorageError, StoreError,
};
use uuid::Uuid;

fn tenant(active: bool) -> Tenant {
    Tenant {
        id: Uuid::new_v4(),
        code: "ABC12XYZ".into(),
        name: "First Church".into(),
        is_active: active,
        logo_path: None,
        cover_image_path: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn service() -> MediaStorage<MemoryObjectStore> {
    MediaStorage::new(MemoryObjectStore::new(), StorageConfig::default())
}

#[tokio::test]
async fn upload_writes_tenant_metadata() {
    let svc = service();
    let t = tenant(true);

    let (key, metadata) = svc
        .upload(
            &t,
            Bytes::from_static(b"jpeg-bytes"),
            "sunday service.jpg",
            "image/jpeg",
            CATEGORY_PHOTOS,
        )
        .await
        .unwrap();

    assert!(key.starts_with(&format!("tenants/{}/photos/", t.id)));
    assert!(key.ends_with("_sunday_service.jpg"));
    assert_eq!(metadata.get(META_TENANT_ID).unwrap(), &t.id.to_string());

    let info = svc.file_info(&key, &t).await.unwrap().unwrap();
    assert_eq!(info.size, 10);
    assert_eq!(info.content_type, "image/jpeg");
}

#[tokio::test]
async fn oversized_upload_never_reaches_store() {
    let store = MemoryObjectStore::new();
    let svc = MediaStorage::new(
        store,
        StorageConfig {
            max_upload_size: 16,
            ..Default::default()
        },
    );
    let t = tenant(true);

    let err = svc
        .upload(
            &t,
            Bytes::from(vec![0u8; 17]),
            "big.jpg",
            "image/jpeg",
            CATEGORY_PHOTOS,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));
    assert!(svc.store().is_empty(), "no object-store write must occur");
}

#[tokio::test]
async fn inactive_tenant_cannot_upload_or_read() {
    let svc = service();
    let t = tenant(false);

    let err = svc
        .upload(
            &t,
            Bytes::from_static(b"x"),
            "a.jpg",
            "image/jpeg",
            CATEGORY_PHOTOS,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::PermissionDenied(_)));

    let err = svc
        .signed_url("tenants/whatever/photos/a.jpg", &t, Duration::from_secs(300))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::PermissionDenied(_)));
}

#[tokio::test]
async fn foreign_prefix_denied_without_store_lookup() {
    let svc = service();
    let a = tenant(true);
    let b = tenant(true);

    let (key, _) = svc
        .upload(
            &b,
            Bytes::from_static(b"x"),
            "b.jpg",
            "image/jpeg",
            CATEGORY_PHOTOS,
        )
        .await
        .unwrap();

    let err = svc
        .signed_url(&key, &a, Duration::from_secs(300))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::PermissionDenied(_)));
}

#[tokio::test]
async fn metadata_mismatch_denied_despite_matching_prefix() {
    // The defense-in-depth property: a key whose prefix names tenant A
    // but whose stored metadata records tenant B must be denied.
    let svc = service();
    let a = tenant(true);

    let (key, _) = svc
        .upload(
            &a,
            Bytes::from_static(b"x"),
            "a.jpg",
            "image/jpeg",
            CATEGORY_PHOTOS,
        )
        .await
        .unwrap();

    let mut forged = HashMap::new();
    forged.insert(META_TENANT_ID.to_string(), Uuid::new_v4().to_string());
    svc.store().set_metadata(&key, forged);

    let err = svc
        .signed_url(&key, &a, Duration::from_secs(300))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::PermissionDenied(_)));
}

#[tokio::test]
async fn missing_metadata_is_denied() {
    let svc = service();
    let a = tenant(true);

    let (key, _) = svc
        .upload(
            &a,
            Bytes::from_static(b"x"),
            "a.jpg",
            "image/jpeg",
            CATEGORY_PHOTOS,
        )
        .await
        .unwrap();

    svc.store().set_metadata(&key, HashMap::new());

    let err = svc
        .signed_url(&key, &a, Duration::from_secs(300))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::PermissionDenied(_)));
}

#[tokio::test]
async fn signed_url_ttl_is_clamped_both_ways() {
    let svc = service();
    let t = tenant(true);
    let (key, _) = svc
        .upload(
            &t,
            Bytes::from_static(b"x"),
            "a.jpg",
            "image/jpeg",
            CATEGORY_PHOTOS,
        )
        .await
        .unwrap();

    let parse_expiry = |url: &str| -> i64 {
        url.split_once("expires=").unwrap().1.parse().unwrap()
    };

    // 1 second requested → at least the 5-minute floor.
    let url = svc
        .signed_url(&key, &t, Duration::from_secs(1))
        .await
        .unwrap();
    let lifetime = parse_expiry(&url) - Utc::now().timestamp();
    assert!((295..=305).contains(&lifetime), "floor clamp, got {lifetime}");

    // 10 hours requested → at most the 10-minute ceiling.
    let url = svc
        .signed_url(&key, &t, Duration::from_secs(36_000))
        .await
        .unwrap();
    let lifetime = parse_expiry(&url) - Utc::now().timestamp();
    assert!((595..=605).contains(&lifetime), "ceiling clamp, got {lifetime}");
}

#[tokio::test]
async fn delete_validates_ownership_and_is_idempotent() {
    let svc = service();
    let a = tenant(true);
    let b = tenant(true);

    let (key, _) = svc
        .upload(
            &a,
            Bytes::from_static(b"x"),
            "a.jpg",
            "image/jpeg",
            CATEGORY_PHOTOS,
        )
        .await
        .unwrap();

    // Foreign tenant cannot delete.
    let err = svc.delete(&key, &b).await.unwrap_err();
    assert!(matches!(err, StorageError::PermissionDenied(_)));
    assert!(svc.file_info(&key, &a).await.unwrap().is_some());

    // Owner deletes; a second delete of the now-absent key succeeds.
    svc.delete(&key, &a).await.unwrap();
    svc.delete(&key, &a).await.unwrap();
    assert!(svc.file_info(&key, &a).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Retry behavior
// ---------------------------------------------------------------------------

/// Store that fails the first `failures` calls with a transient error.
struct FlakyStore {
    inner: MemoryObjectStore,
    failures: AtomicU32,
}

impl FlakyStore {
    fn new(failures: u32) -> Self {
        Self {
            inner: MemoryObjectStore::new(),
            failures: AtomicU32::new(failures),
        }
    }

    fn trip(&self) -> Result<(), StoreError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Transient("connection reset".into()));
        }
        Ok(())
    }
}

impl ObjectStore for FlakyStore {
    async fn put(&self, key: &str, data: Bytes, opts: PutOptions) -> Result<(), StoreError> {
        self.trip()?;
        self.inner.put(key, data, opts).await
    }

    async fn presign(&self, key: &str, ttl: Duration) -> Result<String, StoreError> {
        self.trip()?;
        self.inner.presign(key, ttl).await
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectInfo>, StoreError> {
        self.trip()?;
        self.inner.head(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.trip()?;
        self.inner.delete(key).await
    }
}

#[tokio::test]
async fn single_transient_failure_is_retried() {
    let svc = MediaStorage::new(FlakyStore::new(1), StorageConfig::default());
    let t = tenant(true);

    let (key, _) = svc
        .upload(
            &t,
            Bytes::from_static(b"x"),
            "a.jpg",
            "image/jpeg",
            CATEGORY_PHOTOS,
        )
        .await
        .unwrap();
    assert!(key.starts_with("tenants/"));
}

#[tokio::test]
async fn repeated_transient_failures_become_backend_error() {
    let svc = MediaStorage::new(FlakyStore::new(10), StorageConfig::default());
    let t = tenant(true);

    let err = svc
        .upload(
            &t,
            Bytes::from_static(b"x"),
            "a.jpg",
            "image/jpeg",
            CATEGORY_PHOTOS,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Backend(_)));
}
