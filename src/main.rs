//! bank_ledger - Banking ledger HTTP service
//!
//! Client onboarding, accounts, and deposit / withdrawal / transfer
//! operations over a transactional ledger store.

use std::net::SocketAddr;

use bank_ledger::api::{self, AppState};
use bank_ledger::store::{MemoryLedgerStore, PgLedgerStore};
use bank_ledger::{db, Config};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bank_ledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(environment = %config.environment, "Starting bank_ledger server");
    if config.valid_account_types.is_empty() {
        tracing::warn!("VALID_ACCOUNT_TYPES is empty; account creation will fail until it is configured");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;

    match config.database_url.as_deref() {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;

            db::verify_connection(&pool).await?;
            if !db::check_schema(&pool).await? {
                tracing::error!("Database schema is not complete. Please run migrations.");
                return Err(anyhow::anyhow!("Database schema incomplete"));
            }
            tracing::info!("Database connected successfully");

            let state = AppState::new(PgLedgerStore::new(pool.clone()), config.valid_account_types);
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, api::build_router(state))
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tracing::info!("Server shutting down...");
            pool.close().await;
            tracing::info!("Database connections closed. Goodbye!");
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store, data will not survive a restart");

            let state = AppState::new(MemoryLedgerStore::new(), config.valid_account_types);
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, api::build_router(state))
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tracing::info!("Server shutting down... Goodbye!");
        }
    }

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
