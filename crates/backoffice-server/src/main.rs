#![allow(clippy::doc_markdown)]
//! Back-office record store server.

use axum::extract::DefaultBodyLimit;
use backoffice_core::{BackofficeConfig, Database};
use backoffice_server::{router, AppState};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Back-office record store - serves a JSON document as REST collections
#[derive(Parser, Debug)]
#[command(name = "backoffice-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "backoffice.toml", env = "BACKOFFICE_CONFIG")]
    config: PathBuf,

    /// Database document (overrides `store.db_path`)
    #[arg(short, long, env = "BACKOFFICE_DB")]
    db: Option<String>,

    /// Host address to bind to (overrides `server.host`)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides `server.port`)
    #[arg(short, long)]
    port: Option<u16>,

    /// Keep changes in memory only
    #[arg(long)]
    no_persist: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = BackofficeConfig::load_from_path(&args.config)?;
    if let Some(db) = args.db {
        config.store.db_path = db;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.no_persist {
        config.store.persist = false;
    }
    config.validate()?;

    init_tracing(&config);

    tracing::info!("Starting back-office record store...");
    tracing::info!("Database document: {}", config.store.db_path);

    let db = Database::open(&config.store.db_path, config.store.persist)?;
    let state = Arc::new(AppState { db });

    let mut app = router(state)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(TraceLayer::new_for_http());
    if config.server.cors_enabled {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Record store listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Record store stopped");
    Ok(())
}

fn init_tracing(config: &BackofficeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=debug", config.logging.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
