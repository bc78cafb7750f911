//! Offline trainer: fits one linear model per registry symbol and writes
//! its bundle. Exits non-zero when any symbol failed.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use stockeye::application::ml::training_pipeline::{TrainingPipeline, train_symbols};
use stockeye::config::{Config, SymbolEntry, SymbolRegistry};
use stockeye::domain::ml::artifact::ScalerFitPolicy;
use stockeye::infrastructure::artifact_store::ArtifactStore;
use stockeye::infrastructure::dataset::DatasetRepository;
use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the per-symbol CSV datasets
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory the model bundles are written to
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Symbol registry TOML file
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Train only this symbol key
    #[arg(long)]
    symbol: Option<String>,

    /// Exclusive training start date (YYYY-MM-DD)
    #[arg(long)]
    cutoff: Option<NaiveDate>,

    /// Trailing share of rows held out for evaluation
    #[arg(long)]
    test_ratio: Option<f64>,

    /// Rows the scalers are fit on: `full` or `train-only`
    #[arg(long)]
    scaler_fit: Option<ScalerFitPolicy>,

    /// Train symbols concurrently
    #[arg(long)]
    parallel: bool,
}

fn select_entries(registry: &SymbolRegistry, symbol: Option<&str>) -> Result<Vec<SymbolEntry>> {
    match symbol {
        Some(key) => Ok(vec![registry.resolve(key)?.clone()]),
        None => Ok(registry.entries().to_vec()),
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let args = Args::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;

    if let Some(dir) = args.data_dir {
        config.storage.data_dir = dir;
    }
    if let Some(dir) = args.model_dir {
        config.storage.model_dir = dir;
    }
    if let Some(path) = args.registry {
        config.storage.registry_path = path;
    }
    if let Some(cutoff) = args.cutoff {
        config.training.cutoff = cutoff;
    }
    if let Some(ratio) = args.test_ratio {
        config.training.test_ratio = ratio;
    }
    if let Some(policy) = args.scaler_fit {
        config.training.scaler_policy = policy;
    }
    config.training.validate()?;

    let registry = config.load_registry()?;
    let entries = select_entries(&registry, args.symbol.as_deref())?;

    info!(
        "Training {} symbol(s): cutoff > {}, test ratio {}, scalers fit on {}",
        entries.len(),
        config.training.cutoff,
        config.training.test_ratio,
        config.training.scaler_policy
    );

    let pipeline = TrainingPipeline::new(config.training.clone());
    let datasets = DatasetRepository::new(config.storage.data_dir.clone());
    let store = ArtifactStore::new(config.storage.model_dir.clone());

    let results = train_symbols(&pipeline, &entries, &datasets, &store, args.parallel);

    let mut failed = Vec::new();
    for (symbol, result) in &results {
        match result {
            Ok(report) => info!(
                "{}: v{} written to {:?} ({} rows, hash {})",
                symbol,
                report.bundle.version,
                entries
                    .iter()
                    .find(|e| &e.key == symbol)
                    .map(|e| store.path_for(e))
                    .unwrap_or_default(),
                report.rows,
                report.bundle.content_hash
            ),
            Err(e) => {
                error!("{}: {}", symbol, e);
                failed.push(symbol.as_str());
            }
        }
    }

    if !failed.is_empty() {
        bail!(
            "{} of {} symbol(s) failed: {}",
            failed.len(),
            results.len(),
            failed.join(", ")
        );
    }
    info!("All {} symbol(s) trained", results.len());
    Ok(())
}
