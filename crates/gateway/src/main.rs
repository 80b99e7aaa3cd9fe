//! Hangar Gateway - HTTP gateway for namespaced bucket storage
//!
//! Serves the bucket API and object byte endpoints over a remote object
//! store, with a local disk cache in front of reads.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use service::{Config, ServiceState};
use store::BackendConfig;

/// Hangar Gateway - HTTP gateway for namespaced bucket storage
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on for HTTP requests
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Path to SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Directory for the local disk cache
    #[arg(short, long)]
    cache: Option<PathBuf>,

    /// Serve objects from a local directory instead of S3
    #[arg(long, conflicts_with = "s3_endpoint")]
    data_dir: Option<PathBuf>,

    /// S3-compatible endpoint URL (e.g. http://localhost:9000)
    #[arg(long, requires = "s3_bucket")]
    s3_endpoint: Option<String>,

    /// S3 access key ID
    #[arg(long)]
    s3_access_key: Option<String>,

    /// S3 secret access key
    #[arg(long)]
    s3_secret_key: Option<String>,

    /// S3 bucket holding all gateway content
    #[arg(long)]
    s3_bucket: Option<String>,

    /// S3 region
    #[arg(long)]
    s3_region: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn backend_config(&self) -> BackendConfig {
        if let Some(endpoint) = &self.s3_endpoint {
            return BackendConfig::S3 {
                endpoint: endpoint.clone(),
                access_key: self.s3_access_key.clone().unwrap_or_default(),
                secret_key: self.s3_secret_key.clone().unwrap_or_default(),
                bucket: self.s3_bucket.clone().unwrap_or_default(),
                region: self.s3_region.clone(),
            };
        }
        if let Some(path) = &self.data_dir {
            return BackendConfig::Local { path: path.clone() };
        }
        BackendConfig::Memory
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    let log_level: tracing::Level = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(non_blocking_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stdout_layer).init();

    tracing::info!("Starting Hangar Gateway");

    // Create configuration
    let mut config = Config::default();
    config.log_level = log_level;
    config.backend = args.backend_config();

    if let Some(db_path) = args.database {
        config.sqlite_path = Some(db_path);
    }
    if let Some(cache_path) = args.cache {
        config.cache_path = Some(cache_path);
    }

    // Create state
    let state = match ServiceState::from_config(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to create service state: {}", e);
            std::process::exit(1);
        }
    };

    // Set up graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let graceful_shutdown = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl+c");
        tracing::info!("Received shutdown signal");
        let _ = shutdown_tx.send(());
    };
    tokio::spawn(graceful_shutdown);

    // Build router and serve
    let listen_addr = SocketAddr::from_str(&format!("0.0.0.0:{}", args.port))?;
    let router = service::http::router(state);

    tracing::info!("Gateway listening on {}", listen_addr);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    let mut server_rx = shutdown_rx.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = server_rx.changed().await;
        })
        .await?;

    tracing::info!("Gateway shutdown complete");
    Ok(())
}
