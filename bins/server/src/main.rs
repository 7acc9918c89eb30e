//! Logisco API Server
//!
//! Main entry point for the trip ledger backend.

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logisco_api::{AppState, create_router};
use logisco_core::storage::{StorageConfig, StorageService};
use logisco_db::connect;
use logisco_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logisco=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect(&config.database).await?;
    info!("Connected to database");

    let storage = StorageService::from_config(StorageConfig::from_settings(&config.storage)?)?;
    info!(
        provider = %config.storage.provider,
        max_file_size = config.storage.max_file_size,
        "Bill storage configured"
    );

    let state = AppState::new(db, storage, config.company.default_name.as_str())
        .with_bill_url_ttl(config.storage.bill_url_ttl_secs);

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
