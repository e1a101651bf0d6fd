//! Lemma Service - Main Entry Point
//!
//! HTTP service for tokenization and lemmatization over a pre-trained
//! model package.
//!
//! Usage:
//!     lemma-server --port 8000
//!     LEMMA_MODEL=en-core-sm lemma-server --address 0.0.0.0:8000

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use lemma_core::Pipeline;
use lemma_server::config::ServiceConfig;
use lemma_server::service::{router, AppState};
use lemma_server::shutdown::shutdown_signal;

#[derive(Parser, Debug)]
#[command(name = "lemma-server")]
#[command(about = "HTTP tokenization and lemmatization service")]
#[command(version)]
struct Args {
    /// HTTP server port
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Bind address (overrides port)
    #[arg(short, long)]
    address: Option<String>,

    /// Log level (debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging
    let log_level = match args.log_level.as_str() {
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    info!("Starting lemma-server v{}", env!("CARGO_PKG_VERSION"));

    // Load the model before binding: a model that cannot be loaded must
    // never accept traffic.
    let config = ServiceConfig::from_env();
    info!(
        "Loading model '{}' from {}",
        config.model,
        config.model_dir.display()
    );
    let pipeline = Pipeline::load(&config.model_dir, &config.model)?;

    let state = AppState::new(Arc::new(pipeline), config.model);
    let app = router(state);

    // Determine server address
    let addr: SocketAddr = if let Some(address) = args.address {
        address.parse()?
    } else {
        format!("0.0.0.0:{}", args.port).parse()?
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("lemma-server shutdown complete");
    Ok(())
}
