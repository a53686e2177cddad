//! PhotoShare Storage — tenant-scoped access to a shared object store.
//!
//! All tenants share one physical bucket; the only isolation mechanism is
//! the pair of independent ownership signals checked on every access: the
//! tenant-id prefix of the derived key, and the tenant-id recorded in the
//! object's own metadata. Both must match before a signed URL is issued
//! or an object is deleted.

pub mod error;
pub mod local;
pub mod memory;
pub mod path;
pub mod service;
pub mod store;

pub use error::StorageError;
pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;
pub use service::{MediaStorage, StorageConfig};
pub use store::{ObjectInfo, ObjectStore, PutOptions, StoreError};
