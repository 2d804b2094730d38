#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use flexcrow::{
    api::{self, AppState},
    config::{database, settings},
    core::user,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file first so RUST_LOG and DATABASE_URL can come from it
    dotenv().ok(); // Make it non-fatal, env vars can be set externally

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 3. Load settings (config.toml plus environment overrides)
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Critical error loading settings: {}", e))?;
    info!(ledger = ?settings.ledger.mode, "Settings loaded.");

    // 4. Connect and ensure the schema
    let db = database::create_connection(settings.server.request_timeout())
        .await
        .inspect(|_| info!("Database connected."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Seed the bootstrap admin when configured
    if let Some(admin) = &settings.bootstrap_admin {
        match user::ensure_bootstrap_admin(&db, admin).await? {
            Some(created) => info!(user_id = %created.user_id, "Bootstrap admin created."),
            None => info!(username = %admin.username, "Bootstrap admin already present."),
        }
    }

    // 6. Serve until ctrl-c
    let bind = settings.server.bind.clone();
    let router = api::create_router(AppState::new(db, settings));
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", bind, e))?;
    info!("flexcrow API listening on {}", bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received, draining connections.");
}
