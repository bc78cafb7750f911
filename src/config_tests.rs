use crate::config::Config;
use crate::domain::ml::artifact::ScalerFitPolicy;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(move |key| map.get(key).cloned())
}

#[test]
fn test_config_defaults() {
    let config = config_from(&[]).unwrap();

    assert_eq!(config.storage.data_dir, PathBuf::from("datasets"));
    assert_eq!(
        config.storage.model_dir,
        PathBuf::from("trained_models/linear_regression")
    );
    assert_eq!(config.storage.registry_path, PathBuf::from("symbols.toml"));

    assert_eq!(config.server.socket_address(), "127.0.0.1:8000");
    assert_eq!(config.server.chart_window, 30);
    assert_eq!(config.server.chart_default_limit, 120);

    assert!(config.upstream.base_url.contains("finance.yahoo.com"));
    assert_eq!(config.upstream.timeout(), Duration::from_millis(10_000));
    assert_eq!(config.upstream.max_retries, 0);

    assert_eq!(
        config.training.cutoff,
        NaiveDate::from_ymd_opt(2010, 1, 1).unwrap()
    );
    assert_eq!(config.training.test_ratio, 0.2);
    assert_eq!(config.training.scaler_policy, ScalerFitPolicy::FullWindow);
}

#[test]
fn test_config_overrides() {
    let config = config_from(&[
        ("STOCKEYE_DATA_DIR", "/srv/data"),
        ("STOCKEYE_MODEL_DIR", "/srv/models"),
        ("STOCKEYE_BIND_ADDRESS", "0.0.0.0"),
        ("STOCKEYE_PORT", "9090"),
        ("STOCKEYE_CHART_WINDOW", "60"),
        ("UPSTREAM_TIMEOUT_MS", "2500"),
        ("UPSTREAM_MAX_RETRIES", "2"),
        ("TRAINING_CUTOFF_DATE", "2015-06-30"),
        ("TRAINING_TEST_RATIO", "0.25"),
        ("TRAINING_SCALER_FIT", "train-only"),
    ])
    .unwrap();

    assert_eq!(config.storage.data_dir, PathBuf::from("/srv/data"));
    assert_eq!(config.storage.model_dir, PathBuf::from("/srv/models"));
    assert_eq!(config.server.socket_address(), "0.0.0.0:9090");
    assert_eq!(config.server.chart_window, 60);
    assert_eq!(config.upstream.timeout(), Duration::from_millis(2500));
    assert_eq!(config.upstream.max_retries, 2);
    assert_eq!(
        config.training.cutoff,
        NaiveDate::from_ymd_opt(2015, 6, 30).unwrap()
    );
    assert_eq!(config.training.test_ratio, 0.25);
    assert_eq!(config.training.scaler_policy, ScalerFitPolicy::TrainOnly);
}

#[test]
fn test_malformed_values_are_rejected() {
    assert!(config_from(&[("STOCKEYE_PORT", "eighty")]).is_err());
    assert!(config_from(&[("TRAINING_CUTOFF_DATE", "01/01/2010")]).is_err());
    assert!(config_from(&[("TRAINING_SCALER_FIT", "sometimes")]).is_err());
    assert!(config_from(&[("UPSTREAM_TIMEOUT_MS", "-5")]).is_err());
}

#[test]
fn test_test_ratio_must_leave_both_segments() {
    assert!(config_from(&[("TRAINING_TEST_RATIO", "0")]).is_err());
    assert!(config_from(&[("TRAINING_TEST_RATIO", "1.0")]).is_err());
    assert!(config_from(&[("TRAINING_TEST_RATIO", "0.5")]).is_ok());
}
