//! veripress-api - Claim and media verification service
//!
//! Gathers evidence from fact-check, search, language-model, image
//! classification and web-archive providers and fuses it into one
//! credibility score per claim, image or document.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use veripress_api::config::ServiceConfig;
use veripress_api::providers::Providers;
use veripress_api::services::ServiceContext;
use veripress_api::{build_router, AppState};
use veripress_common::config::{resolve_root_folder, RootFolderInitializer};

/// Command-line arguments for veripress-api
#[derive(Parser, Debug)]
#[command(name = "veripress-api")]
#[command(about = "Claim and media verification service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "VERIPRESS_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the claim database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Listen address (overrides server.bind_addr)
    #[arg(short, long, env = "VERIPRESS_BIND")]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServiceConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "veripress_api={level},veripress_common={level},tower_http={level}",
                    level = config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting Veripress API (veripress-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // CLI → ENV → TOML → OS default
    let root_folder = resolve_root_folder(
        args.root_folder.as_deref(),
        "VERIPRESS_ROOT_FOLDER",
        config.root_folder.as_deref(),
    );
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = veripress_api::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    let providers = Providers::from_config(&config.provider_config())
        .context("Failed to build provider clients")?;
    let services = ServiceContext::new(
        providers,
        config.policy.clone(),
        config.server.provider_timeout(),
    );

    let state = AppState::new(db_pool, services, config.rate_limit.claims_per_minute)
        .with_body_limit(config.server.max_upload_bytes);
    let _pruner = state.spawn_rate_limit_pruner(config.rate_limit.prune_interval());
    let app = build_router(state);

    let addr = match args.bind {
        Some(addr) => addr,
        None => config.bind_addr()?,
    };
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
