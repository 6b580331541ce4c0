mod api;
mod config;
mod error;
mod models;
mod ocr;
mod registry;
mod services;
mod vin;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::ocr::OcrProvider;
use crate::registry::NhtsaClient;
use crate::services::ScanService;

#[derive(Parser)]
#[command(name = "vinscan")]
#[command(about = "VIN scanning pipeline: OCR extraction, ISO 3779 validation, NHTSA decoding")]
struct Args {
    /// Scan a single image file, print the result as JSON, and exit
    /// instead of starting the server
    #[arg(long, value_name = "IMAGE")]
    scan: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vinscan=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Initializing OCR provider: {}...", config.ocr.provider);
    let ocr = OcrProvider::new(&config.ocr);
    if !ocr.is_available() {
        tracing::warn!("OCR unavailable - image scans will fail until configured");
    }

    let decoder = Arc::new(NhtsaClient::new(&config.registry)?);
    let scan = ScanService::new(Arc::new(ocr), decoder);

    if let Some(image_path) = args.scan {
        let image = tokio::fs::read(&image_path).await?;
        let info = scan.process_vin_image(&image).await;
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    if config.server.api_keys.is_empty() {
        tracing::warn!(
            "VINSCAN_API_KEYS is not set — scan endpoints are locked. Set VINSCAN_API_KEYS to enable access."
        );
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, scan);
    let app = create_router(state);

    tracing::info!("VinScan starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
