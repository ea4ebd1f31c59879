//! zrviz-web - wordcloud and audio server for discovered-term corpora

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use zrviz_common::config::{load_config, RootFolderInitializer, RootFolderResolver};
use zrviz_common::db::init_database;
use zrviz_web::{build_router, log_filter, AppState};

#[derive(Debug, Parser)]
#[command(version, about = "Serve zrviz corpora over HTTP")]
struct Args {
    /// Bootstrap config file (defaults to ~/.config/zrviz/config.toml)
    #[arg(short, long, env = "ZRVIZ_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder holding zrviz.db
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Override the configured bind address
    #[arg(long, env = "ZRVIZ_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// Override the configured port
    #[arg(short, long, env = "ZRVIZ_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Loaded before the subscriber so [logging] level can apply
    let config = load_config(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&config.logging))
        .init();

    info!(
        "Starting zrviz-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new("zrviz-web")
        .with_cli_arg(args.root_folder)
        .with_toml_config(&config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let pool = init_database(&db_path).await?;

    if config.server.access_token.is_none() {
        info!("No access token configured; protected corpora will be refused");
    }

    let state = AppState::new(pool, &config, initializer.scratch_path());
    let app = build_router(state);

    let bind_address = args.bind_address.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_address, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind_address, port))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("zrviz-web stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
