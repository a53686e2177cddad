//! PhotoShare Core — domain models, repository traits, tenant context
//! resolution, and the isolation enforcement gate.
//!
//! This crate has no I/O of its own. Database access, token signing, and
//! object storage live in sibling crates that implement the traits defined
//! here; the enforcement gate is pure and can be exercised with plain
//! values in tests.

pub mod context;
pub mod error;
pub mod guard;
pub mod models;
pub mod repository;
pub mod scoped;

pub use context::TenantContext;
pub use error::{CoreError, CoreResult};
pub use scoped::{TenantOwned, TenantScopedRecord, Unverified};
