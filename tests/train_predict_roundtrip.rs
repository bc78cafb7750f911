use chrono::{Duration, NaiveDate};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use stockeye::application::inference_service::InferenceService;
use stockeye::application::ml::training_pipeline::{TrainingPipeline, train_symbols};
use stockeye::config::{SymbolEntry, SymbolRegistry, TrainingConfig};
use stockeye::domain::errors::PredictionError;
use stockeye::domain::ml::feature_registry::bar_to_features;
use stockeye::domain::types::OhlcvBar;
use stockeye::infrastructure::artifact_store::ArtifactStore;
use stockeye::infrastructure::dataset::DatasetRepository;
use stockeye::infrastructure::mock::StaticFeatureSource;

fn aapl() -> SymbolEntry {
    SymbolEntry::new("AAPL", "AAPL_stock_data.csv", "AAPL", "Apple Inc.")
}

/// Daily bars whose close is almost exactly 0.2*open + 0.4*high + 0.4*low
fn synthetic_bars(n: usize) -> Vec<OhlcvBar> {
    let start = NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let t = i as f64;
            let open = 150.0 + 12.0 * (t * 0.21).sin() + 4.0 * (t * 0.05).cos();
            let high = open + 1.5 + (t * 0.9).sin().abs() * 2.0;
            let low = open - 1.5 - (t * 0.4).cos().abs() * 2.0;
            let volume = 3.0e7 + 5.0e6 * (t * 0.13).sin();
            let noise = 0.001 * (t * 1.7).sin();
            OhlcvBar {
                date: start + Duration::days(i as i64),
                open,
                high,
                low,
                close: 0.2 * open + 0.4 * high + 0.4 * low + noise,
                volume,
            }
        })
        .collect()
}

fn write_dataset(path: &Path, bars: &[OhlcvBar], blank_open_at: Option<usize>) {
    let mut csv = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for (i, b) in bars.iter().enumerate() {
        let open = if blank_open_at == Some(i) {
            String::new()
        } else {
            b.open.to_string()
        };
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            b.date, open, b.high, b.low, b.close, b.close, b.volume
        ));
    }
    fs::write(path, csv).unwrap();
}

struct Harness {
    _dir: tempfile::TempDir,
    entry: SymbolEntry,
    datasets: DatasetRepository,
    store: ArtifactStore,
}

fn harness(bars: &[OhlcvBar], blank_open_at: Option<usize>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("datasets");
    fs::create_dir_all(&data_dir).unwrap();
    let entry = aapl();
    write_dataset(&data_dir.join(&entry.dataset), bars, blank_open_at);

    Harness {
        datasets: DatasetRepository::new(data_dir),
        store: ArtifactStore::new(dir.path().join("trained_models")),
        entry,
        _dir: dir,
    }
}

fn service(h: &Harness, source: &StaticFeatureSource) -> InferenceService {
    InferenceService::new(
        Arc::new(SymbolRegistry::new(vec![h.entry.clone()]).unwrap()),
        h.store.clone(),
        h.datasets.clone(),
        Arc::new(source.clone()),
        30,
        std::time::Duration::from_secs(1),
    )
}

#[tokio::test]
async fn test_train_then_predict_last_sample() {
    let bars = synthetic_bars(120);
    let h = harness(&bars, None);
    let pipeline = TrainingPipeline::new(TrainingConfig::default());

    let results = train_symbols(&pipeline, &[h.entry.clone()], &h.datasets, &h.store, false);
    let report = results[0].1.as_ref().unwrap();
    assert_eq!(report.rows, 120);
    assert_eq!(report.test_rows, 24);
    assert!(report.metrics.mae < 0.01, "mae = {}", report.metrics.mae);
    assert_eq!(report.bundle.version, 1);

    let last = *bars.last().unwrap();
    let source = StaticFeatureSource::new();
    source.set_bar("AAPL", last).await;

    let result = service(&h, &source).predict("AAPL").await.unwrap();
    assert_eq!(result.symbol, "AAPL");
    assert_eq!(result.current_price, last.close);
    assert!(
        (result.prediction - last.close).abs() < 0.01,
        "prediction {} vs close {}",
        result.prediction,
        last.close
    );
    assert!((75.0..=98.0).contains(&result.confidence));
    assert_eq!(result.chart_data.len(), 30);
    assert_eq!(result.chart_data[29].time, last.date.format("%Y-%m-%d").to_string());
    assert_eq!(result.model_version, 1);
}

#[tokio::test]
async fn test_reloaded_bundle_predicts_like_fresh_fit() {
    let bars = synthetic_bars(90);
    let h = harness(&bars, None);
    let pipeline = TrainingPipeline::new(TrainingConfig::default());

    let report = pipeline
        .train_symbol(&h.entry, &h.datasets, &h.store)
        .unwrap();

    let sample = bars[45];
    let fresh = {
        let b = &report.bundle;
        let scaled = b
            .normalizers
            .features
            .transform(bar_to_features(&sample).as_slice())
            .unwrap();
        b.normalizers
            .target
            .inverse_value(b.model.predict_row(&scaled).unwrap())
            .unwrap()
    };

    let source = StaticFeatureSource::new();
    source.set_bar("AAPL", sample).await;
    let served = service(&h, &source).predict("AAPL").await.unwrap();
    assert_eq!(served.prediction, fresh);
}

#[tokio::test]
async fn test_retrain_bumps_served_version() {
    let bars = synthetic_bars(60);
    let h = harness(&bars, Some(10));
    let pipeline = TrainingPipeline::new(TrainingConfig::default());

    pipeline.train_symbol(&h.entry, &h.datasets, &h.store).unwrap();
    pipeline.train_symbol(&h.entry, &h.datasets, &h.store).unwrap();

    let source = StaticFeatureSource::new();
    source.set_bar("AAPL", bars[59]).await;
    let result = service(&h, &source).predict("AAPL").await.unwrap();
    assert_eq!(result.model_version, 2);
}

#[tokio::test]
async fn test_unsupported_symbol_never_reaches_upstream() {
    let h = harness(&synthetic_bars(40), None);
    let source = StaticFeatureSource::new();
    let svc = service(&h, &source);

    assert!(matches!(
        svc.predict("2222.SR").await,
        Err(PredictionError::UnsupportedSymbol(_))
    ));
    assert!(matches!(
        svc.price("TSLA").await,
        Err(PredictionError::UnsupportedSymbol(_))
    ));
    assert_eq!(source.call_count(), 0);
}
