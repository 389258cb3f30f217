//! Stool Classification Server
//!
//! HTTP API server exposing a single image-classification endpoint.
//! Loads the model and label vocabulary once at startup and refuses to
//! serve if either fails to load.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use stool_classifier::backend::backend_name;
use stool_classifier::server::state::{AppState, ServerConfig};
use stool_classifier::server::router;
use stool_classifier::Predictor;

/// Stool Classification Server
#[derive(Parser, Debug)]
#[command(name = "stool-server")]
#[command(version)]
#[command(about = "HTTP inference service for stool image classification")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Path to the model weights file
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Training data directory (sorted subdirectory names define the labels)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Explicit ordered label file (JSON array of class names)
    #[arg(long)]
    labels: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    // Build configuration
    let mut config = ServerConfig::default();

    if let Some(weights) = cli.weights {
        config.weights_path = weights;
    }

    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    if let Some(labels) = cli.labels {
        config.labels_file = Some(labels);
    }

    info!("Stool Classification Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Weights:  {:?}", config.weights_path);
    info!("  Data dir: {:?}", config.data_dir);
    info!("  Labels:   {:?}", config.labels_file);
    info!("  Backend:  {}", backend_name());

    // Load labels and model before accepting any traffic; a failure here
    // aborts startup.
    let labels = config
        .load_labels()
        .context("failed to load class labels")?;
    info!("Serving {} classes", labels.len());

    let predictor = Predictor::load(&config.weights_path, labels)
        .context("failed to load model weights")?;

    // Create shared state
    let state = Arc::new(AppState::new(config, predictor));

    // Build router
    let app = router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
