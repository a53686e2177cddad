//! PhotoShare Database — SurrealDB connection management, schema
//! migrations, and repository implementations for the traits defined in
//! `photoshare-core`.

mod connection;
mod error;
mod schema;
mod scoped;

pub mod repository;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
