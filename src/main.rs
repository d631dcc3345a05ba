use clap::Parser;
use sea_orm::{ConnectOptions, Database};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use tsundoku_backend::db::schema;
use tsundoku_backend::db::store::{BacklogStore, MemoryStore, SeaOrmStore};
use tsundoku_backend::logging::init_logging;
use tsundoku_backend::server::config::ServerConfig;
use tsundoku_backend::services::LineClient;
use tsundoku_backend::web;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal.");
    }
    info!("Shutdown signal received.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let server_config = Arc::new(ServerConfig::load(args.config.as_deref())?);
    init_logging(&server_config.log_dir);
    info!("Starting server, version: {}", env!("CARGO_PKG_VERSION"));

    // --- Storage Setup ---
    let store: Arc<dyn BacklogStore> = match &server_config.database_url {
        Some(database_url) => {
            let mut opt = ConnectOptions::new(database_url.to_owned());
            opt.max_connections(10)
                .connect_timeout(Duration::from_secs(10))
                .sqlx_logging(false);
            let db_pool = Database::connect(opt).await.map_err(|e| {
                error!(error = %e, "Failed to create database connection.");
                e
            })?;
            schema::ensure_schema(&db_pool).await?;
            Arc::new(SeaOrmStore::new(db_pool))
        }
        None => {
            warn!("DATABASE_URL is not set; data is kept in memory and lost on exit.");
            Arc::new(MemoryStore::new())
        }
    };

    // --- LINE Client Setup ---
    let line_client = Arc::new(LineClient::from_config(&server_config)?);

    // --- Axum HTTP Server Setup ---
    let app = web::create_axum_router(store, line_client, server_config.clone());
    let listener = tokio::net::TcpListener::bind(&server_config.listen_addr).await?;
    info!(address = %server_config.listen_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
