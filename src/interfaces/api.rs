//! HTTP API consumed by the dashboard UI.
//!
//! Handlers stay thin: the inference service owns all behavior and this
//! module only maps its error categories onto status codes.

use crate::application::inference_service::InferenceService;
use crate::config::{MAX_CHART_LIMIT, MIN_CHART_LIMIT};
use crate::domain::errors::{PredictionError, UpstreamDataError};
use crate::domain::types::{ChartSeries, PredictionResult, PriceQuote};
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// State shared across handlers
pub struct AppState {
    pub service: InferenceService,
    pub chart_default_limit: usize,
}

#[derive(Debug)]
pub enum ApiError {
    Prediction(PredictionError),
    InvalidLimit(usize),
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        ApiError::Prediction(err)
    }
}

pub fn status_for(err: &PredictionError) -> StatusCode {
    match err {
        PredictionError::UnsupportedSymbol(_) => StatusCode::BAD_REQUEST,
        PredictionError::NotFound(_) => StatusCode::NOT_FOUND,
        PredictionError::UpstreamData(UpstreamDataError::NoData { .. }) => StatusCode::NOT_FOUND,
        PredictionError::UpstreamData(_)
        | PredictionError::Artifact(_)
        | PredictionError::Model(_)
        | PredictionError::Data(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Prediction(err) => {
                let status = status_for(&err);
                if status.is_server_error() {
                    error!("Request failed: {}", err);
                } else {
                    warn!("Request rejected ({}): {}", status, err);
                }
                (status, err.to_string())
            }
            ApiError::InvalidLimit(limit) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!(
                    "limit must be between {} and {}, got {}",
                    MIN_CHART_LIMIT, MAX_CHART_LIMIT, limit
                ),
            ),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuery {
    pub symbol: String,
}

/// Liveness probe
async fn liveness() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_price(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<PriceQuote>, ApiError> {
    Ok(Json(state.service.price(&symbol).await?))
}

async fn get_chart(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartSeries>, ApiError> {
    let limit = query.limit.unwrap_or(state.chart_default_limit);
    if !(MIN_CHART_LIMIT..=MAX_CHART_LIMIT).contains(&limit) {
        return Err(ApiError::InvalidLimit(limit));
    }
    Ok(Json(state.service.chart(&symbol, limit)?))
}

async fn generate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GenerateQuery>,
) -> Result<Json<PredictionResult>, ApiError> {
    Ok(Json(state.service.predict(&query.symbol).await?))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/price/{symbol}", get(get_price))
        .route("/chart/{symbol}", get(get_chart))
        .route("/generate", get(generate))
        .with_state(state)
}

pub async fn start_server(state: Arc<AppState>, addr: &str) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
