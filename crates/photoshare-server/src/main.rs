//! PhotoShare Server — application entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod config;
mod cookies;
mod error;
mod middleware;
mod routes;
mod state;

use config::ServerConfig;
use photoshare_db::DbManager;
use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("photoshare=info".parse().unwrap()),
        )
        .json()
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = ServerConfig::from_env()?;

    let db = DbManager::connect(&config.db)
        .await
        .map_err(|e| format!("database connection failed: {e}"))?;
    photoshare_db::run_migrations(db.client())
        .await
        .map_err(|e| format!("migrations failed: {e}"))?;

    let bind_addr = config.bind_addr;
    let state = Arc::new(AppState::build(config, db).await?);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|e| format!("cannot bind {bind_addr}: {e}"))?;

    tracing::info!(addr = %bind_addr, "PhotoShare server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| format!("server error: {e}"))
}
