// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod audit;
pub mod config;
pub mod detect;
pub mod error;
pub mod fusion;
pub mod metrics;
pub mod oracle;
pub mod pipeline;
pub mod record;

use std::sync::Arc;

use axum::Router;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::AppConfig;
pub use crate::detect::{DetectorResult, Verdict};
pub use crate::fusion::{FusionEngine, FusionPolicy, FusionResult, RiskLevel};
pub use crate::pipeline::Analyzer;
pub use crate::record::DecisionRecord;

use crate::audit::HistorySink;
use crate::error::PhishingError;

/// Build the full application router from `AppConfig::load()`.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = AppConfig::load().map_err(|e| PhishingError::Config(format!("{e:#}")))?;
    Ok(app_with_config(&cfg))
}

/// Router for an already-loaded config (oracle and sink built from it).
pub fn app_with_config(cfg: &AppConfig) -> Router {
    let history = Arc::new(HistorySink::with_capacity(cfg.audit.history_capacity));
    let analyzer = Analyzer::from_config(cfg, history.clone());
    info!(
        provider = analyzer.provider_name(),
        sink = %cfg.audit.sink,
        debug_routes = cfg.server.debug_routes,
        "phishing analyzer ready"
    );
    let state = AppState::new(analyzer, history)
        .with_debug_routes(cfg.server.debug_routes)
        .with_body_limit(cfg.server.max_body_bytes);
    create_router(state)
}

/// Install a tracing subscriber driven by `RUST_LOG` (default `info`).
/// `LOG_FORMAT=json` switches to JSON lines. No-op if one is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
