use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::audit::{AuditEntry, HistorySink};
use crate::error::PhishingError;
use crate::fusion::FusionPolicy;
use crate::metrics::Metrics;
use crate::pipeline::Analyzer;
use crate::record::DecisionRecord;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub history: Arc<HistorySink>,
    pub debug_routes: bool,
    pub max_body_bytes: Option<usize>,
}

impl AppState {
    pub fn new(analyzer: Analyzer, history: Arc<HistorySink>) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            history,
            debug_routes: false,
            max_body_bytes: None,
        }
    }

    pub fn with_debug_routes(mut self, on: bool) -> Self {
        self.debug_routes = on;
        self
    }

    pub fn with_body_limit(mut self, max_bytes: Option<usize>) -> Self {
        self.max_body_bytes = max_bytes;
        self
    }
}

/// Build the service router.
pub fn create_router(state: AppState) -> Router {
    let metrics = Metrics::init();

    let body_limit = match state.max_body_bytes {
        Some(n) => DefaultBodyLimit::max(n),
        None => DefaultBodyLimit::disable(),
    };

    let mut router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze).layer(body_limit));

    if state.debug_routes {
        router = router
            .route("/debug/history", get(debug_history))
            .route("/debug/policy", get(debug_policy));
    }

    router
        .with_state(state)
        .merge(metrics.router())
        .layer(CorsLayer::very_permissive())
}

/// HTTP face of `PhishingError`.
pub struct ApiError(pub PhishingError);

impl From<PhishingError> for ApiError {
    fn from(err: PhishingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PhishingError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PhishingError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

#[derive(Deserialize)]
struct AnalyzeReq {
    text: String,
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeReq>, JsonRejection>,
) -> Result<Json<DecisionRecord>, ApiError> {
    let Json(body) = payload.map_err(reject_to_error)?;
    let record = state.analyzer.analyze(&body.text).await;
    Ok(Json(record))
}

fn reject_to_error(rej: JsonRejection) -> PhishingError {
    if rej.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PhishingError::PayloadTooLarge(rej.body_text())
    } else {
        PhishingError::InvalidInput(rej.body_text())
    }
}

async fn debug_history(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Vec<AuditEntry>> {
    let limit = q
        .get("limit")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10);
    Json(state.history.snapshot_last_n(limit))
}

#[derive(Serialize)]
struct PolicyOut {
    policy: FusionPolicy,
    provider: &'static str,
}

async fn debug_policy(State(state): State<AppState>) -> Json<PolicyOut> {
    Json(PolicyOut {
        policy: *state.analyzer.policy(),
        provider: state.analyzer.provider_name(),
    })
}
