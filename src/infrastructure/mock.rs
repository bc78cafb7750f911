use crate::domain::errors::UpstreamDataError;
use crate::domain::ports::LiveFeatureSource;
use crate::domain::types::OhlcvBar;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
enum Scripted {
    Bar(OhlcvBar),
    Incomplete(&'static str),
    Empty,
}

/// Deterministic in-memory `LiveFeatureSource` for tests and offline runs.
///
/// Unknown tickers answer with `NoData`. Every call is counted so callers
/// can assert that no upstream request was made.
#[derive(Clone, Default)]
pub struct StaticFeatureSource {
    responses: Arc<RwLock<HashMap<String, Scripted>>>,
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl StaticFeatureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every answer, to exercise timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn set_bar(&self, ticker: &str, bar: OhlcvBar) {
        self.responses
            .write()
            .await
            .insert(ticker.to_string(), Scripted::Bar(bar));
    }

    pub async fn set_incomplete(&self, ticker: &str, field: &'static str) {
        self.responses
            .write()
            .await
            .insert(ticker.to_string(), Scripted::Incomplete(field));
    }

    pub async fn set_empty(&self, ticker: &str) {
        self.responses
            .write()
            .await
            .insert(ticker.to_string(), Scripted::Empty);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiveFeatureSource for StaticFeatureSource {
    async fn fetch(&self, ticker: &str) -> Result<OhlcvBar, UpstreamDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.responses.read().await.get(ticker).cloned() {
            Some(Scripted::Bar(bar)) => Ok(bar),
            Some(Scripted::Incomplete(field)) => Err(UpstreamDataError::Incomplete {
                ticker: ticker.to_string(),
                field,
            }),
            Some(Scripted::Empty) | None => Err(UpstreamDataError::NoData {
                ticker: ticker.to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "Static"
    }
}
