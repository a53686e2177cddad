//! SurrealDB repository implementations.

mod album;
mod audit;
mod photo;
mod session;
mod tenant;
mod user;

pub use album::SurrealAlbumRepository;
pub use audit::SurrealAuditLogRepository;
pub use photo::SurrealPhotoRepository;
pub use session::SurrealSessionRepository;
pub use tenant::SurrealTenantRepository;
pub use user::SurrealUserRepository;
