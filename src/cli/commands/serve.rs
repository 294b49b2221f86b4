use anyhow::{bail, Result};
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace, warn};

use crate::config::{build_app_state, connect, AppConfig};
use crate::router::create_router;

pub async fn serve(config: AppConfig) -> Result<()> {
    trace!("Entering serve function");
    info!("Vault-X application starting up");
    debug!("Database URL: {}", config.database_url);
    debug!("Bind address: {}", config.bind_address);

    let db = connect(&config).await?;

    trace!("Checking for pending migrations");
    let pending = match Migrator::get_pending_migrations(&db).await {
        Ok(pending) => pending,
        Err(e) => {
            error!("Failed to read migration status: {}", e);
            return Err(e.into());
        }
    };
    if !pending.is_empty() {
        let names: Vec<&str> = pending.iter().map(|m| m.name()).collect();
        error!("Database has {} pending migrations: {:?}", names.len(), names);
        bail!("database schema is out of date; run `init-db` or `migrate-and-serve` first");
    }
    debug!("Database schema is up to date");

    run_server(db, config).await
}

/// Serves the API on an already migrated store until shutdown.
pub(crate) async fn run_server(db: DatabaseConnection, config: AppConfig) -> Result<()> {
    match ledger::sessions::purge_expired(&db, Utc::now()).await {
        Ok(purged) => debug!("Purged {} expired refresh tokens", purged),
        Err(e) => warn!("Failed to purge expired refresh tokens: {}", e),
    }

    trace!("Initializing application state");
    let state = build_app_state(db, &config)?;
    debug!("Application state initialized successfully");

    let app = create_router(state);
    debug!("Router created successfully");

    let bind_address = config.bind_address.as_str();
    info!("Starting server on {}", bind_address);
    let listener = match TcpListener::bind(bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", bind_address, e);
            return Err(e.into());
        }
    };

    info!("Vault-X API server running on http://{}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
