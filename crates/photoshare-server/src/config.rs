//! Server configuration, loaded from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use photoshare_auth::AuthConfig;
use photoshare_db::DbConfig;
use photoshare_storage::StorageConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Base URL clients reach this deployment under; used for presigned
    /// media URLs.
    pub public_base_url: String,
    /// Root directory of the local object store.
    pub media_root: PathBuf,
    /// Secret mixed into presigned URL tokens.
    pub media_url_secret: String,
    /// Mark auth cookies `Secure` (set in production behind HTTPS).
    pub cookie_secure: bool,
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl ServerConfig {
    /// Assemble configuration from environment variables, falling back
    /// to development defaults. JWT keys are read from the files named by
    /// `PHOTOSHARE_JWT_PRIVATE_KEY_FILE` / `PHOTOSHARE_JWT_PUBLIC_KEY_FILE`.
    pub fn from_env() -> Result<Self, String> {
        let bind_addr = env_or("PHOTOSHARE_BIND_ADDR", "127.0.0.1:8080")
            .parse()
            .map_err(|e| format!("invalid PHOTOSHARE_BIND_ADDR: {e}"))?;

        let read_key = |var: &str| -> Result<String, String> {
            match std::env::var(var) {
                Ok(path) => std::fs::read_to_string(&path)
                    .map_err(|e| format!("cannot read {var}={path}: {e}")),
                Err(_) => Ok(String::new()),
            }
        };

        let auth = AuthConfig {
            jwt_private_key_pem: read_key("PHOTOSHARE_JWT_PRIVATE_KEY_FILE")?,
            jwt_public_key_pem: read_key("PHOTOSHARE_JWT_PUBLIC_KEY_FILE")?,
            jwt_issuer: env_or("PHOTOSHARE_JWT_ISSUER", "photoshare"),
            pepper: std::env::var("PHOTOSHARE_PASSWORD_PEPPER").ok(),
            ..Default::default()
        };

        let db = DbConfig {
            url: env_or("PHOTOSHARE_DB_URL", "127.0.0.1:8000"),
            namespace: env_or("PHOTOSHARE_DB_NAMESPACE", "photoshare"),
            database: env_or("PHOTOSHARE_DB_NAME", "main"),
            username: env_or("PHOTOSHARE_DB_USER", "root"),
            password: env_or("PHOTOSHARE_DB_PASSWORD", "root"),
        };

        Ok(Self {
            bind_addr,
            public_base_url: env_or("PHOTOSHARE_PUBLIC_BASE_URL", "http://127.0.0.1:8080"),
            media_root: env_or("PHOTOSHARE_MEDIA_ROOT", "./media").into(),
            media_url_secret: env_or("PHOTOSHARE_MEDIA_URL_SECRET", "dev-only-secret"),
            cookie_secure: env_or("PHOTOSHARE_COOKIE_SECURE", "false") == "true",
            db,
            auth,
            storage: StorageConfig::default(),
        })
    }
}
