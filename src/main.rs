//! StockEye API server.
//!
//! Serves next-close predictions from the bundles written by the `train`
//! binary. Run `train` first; symbols without a bundle answer 404.
//!
//! # Usage
//! ```sh
//! STOCKEYE_PORT=8000 cargo run --bin stockeye
//! ```

use anyhow::{Context, Result};
use std::sync::Arc;
use stockeye::application::inference_service::InferenceService;
use stockeye::config::Config;
use stockeye::infrastructure::artifact_store::ArtifactStore;
use stockeye::infrastructure::dataset::DatasetRepository;
use stockeye::infrastructure::yahoo::YahooFinanceSource;
use stockeye::interfaces::api::{AppState, start_server};
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("StockEye {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("Failed to load configuration")?;
    let registry = config.load_registry()?;
    info!(
        "Datasets: {:?} | Models: {:?} | Symbols: {:?}",
        config.storage.data_dir,
        config.storage.model_dir,
        registry.entries().iter().map(|e| e.key.as_str()).collect::<Vec<_>>()
    );

    let store = ArtifactStore::new(config.storage.model_dir.clone());
    for entry in registry.entries() {
        match store.current_version(entry) {
            Some(version) => info!("{}: model v{} available", entry.key, version),
            None => warn!("{}: no trained model at {:?}", entry.key, store.path_for(entry)),
        }
    }

    let source = YahooFinanceSource::new(&config.upstream)
        .context("Failed to build the upstream HTTP client")?;
    let service = InferenceService::new(
        Arc::new(registry),
        store,
        DatasetRepository::new(config.storage.data_dir.clone()),
        Arc::new(source),
        config.server.chart_window,
        config.upstream.timeout(),
    );
    let state = Arc::new(AppState {
        service,
        chart_default_limit: config.server.chart_default_limit,
    });

    let addr = config.server.socket_address();
    tokio::select! {
        result = start_server(state, &addr) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received. Exiting..."),
    }

    Ok(())
}
