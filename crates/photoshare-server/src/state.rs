//! Shared application state: explicitly constructed services injected
//! into request handlers. No process-wide singletons.

use photoshare_auth::{AuthService, MemoryRateLimitStore, RateLimitConfig, RateLimiter};
use photoshare_core::models::audit::{AuditOutcome, CreateAuditLogEntry};
use photoshare_core::models::user::User;
use photoshare_core::repository::AuditLogRepository;
use photoshare_db::DbManager;
use photoshare_db::repository::{
    SurrealAlbumRepository, SurrealAuditLogRepository, SurrealPhotoRepository,
    SurrealSessionRepository, SurrealTenantRepository, SurrealUserRepository,
};
use photoshare_storage::{LocalObjectStore, MediaStorage};
use surrealdb::engine::remote::ws::Client;
use tracing::error;
use uuid::Uuid;

use crate::config::ServerConfig;

pub type Tenants = SurrealTenantRepository<Client>;
pub type Users = SurrealUserRepository<Client>;
pub type Sessions = SurrealSessionRepository<Client>;
pub type Albums = SurrealAlbumRepository<Client>;
pub type Photos = SurrealPhotoRepository<Client>;
pub type Audit = SurrealAuditLogRepository<Client>;
pub type Auth = AuthService<Users, Tenants, Sessions, MemoryRateLimitStore>;
pub type Storage = MediaStorage<LocalObjectStore>;

pub struct AppState {
    pub tenants: Tenants,
    pub users: Users,
    pub albums: Albums,
    pub photos: Photos,
    pub audit: Audit,
    pub auth: Auth,
    pub storage: Storage,
    pub config: ServerConfig,
}

impl AppState {
    pub async fn build(config: ServerConfig, db: DbManager) -> Result<Self, String> {
        let client = db.client().clone();

        let store = LocalObjectStore::new(
            config.media_root.clone(),
            config.public_base_url.clone(),
            config.media_url_secret.clone(),
        )
        .await
        .map_err(|e| e.to_string())?;

        let auth = AuthService::new(
            SurrealUserRepository::new(client.clone()),
            SurrealTenantRepository::new(client.clone()),
            SurrealSessionRepository::new(client.clone()),
            RateLimiter::new(MemoryRateLimitStore::new(), RateLimitConfig::default()),
            config.auth.clone(),
        );

        Ok(Self {
            tenants: SurrealTenantRepository::new(client.clone()),
            users: SurrealUserRepository::new(client.clone()),
            albums: SurrealAlbumRepository::new(client.clone()),
            photos: SurrealPhotoRepository::new(client.clone()),
            audit: SurrealAuditLogRepository::new(client),
            auth,
            storage: MediaStorage::new(store, config.storage.clone()),
            config,
        })
    }

    /// Record a denied access in the audit log. Audit failures are
    /// logged and swallowed: the denial itself must still reach the
    /// client.
    pub async fn audit_denied(
        &self,
        principal: &User,
        tenant_id: Option<Uuid>,
        action: &str,
        resource: Option<String>,
    ) {
        let entry = CreateAuditLogEntry {
            tenant_id,
            actor_id: Some(principal.id),
            action: action.to_string(),
            resource,
            outcome: AuditOutcome::Denied,
            ip_address: None,
            detail: serde_json::json!({ "email": principal.email }),
        };
        if let Err(e) = self.audit.append(entry).await {
            error!(error = %e, "failed to append audit entry");
        }
    }
}
