//! Sentiment oracle: provider abstraction around an external text classifier.
//!
//! The detector only needs `classify(text) -> {label, score}`; everything
//! behind that (HTTP inference, local lexicon, test fakes) is a provider.

pub mod huggingface;
pub mod lexicon;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::OracleConfig;
use crate::error::OracleError;

pub use huggingface::HuggingFaceOracle;
pub use lexicon::LexiconOracle;

/// Boxed future returned by oracle providers.
pub type OracleFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Classification, OracleError>> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
}

impl SentimentLabel {
    /// Accepts `POSITIVE`/`NEGATIVE` and the `LABEL_1`/`LABEL_0` aliases
    /// some hosted SST-2 models report.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" | "POS" | "LABEL_1" => Some(SentimentLabel::Positive),
            "NEGATIVE" | "NEG" | "LABEL_0" => Some(SentimentLabel::Negative),
            _ => None,
        }
    }
}

/// Raw oracle answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: SentimentLabel,
    pub score: f64,
}

impl Classification {
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        Self { label, score }
    }

    /// Score must be a finite probability.
    pub fn validate(self) -> Result<Self, OracleError> {
        if self.score.is_finite() && (0.0..=1.0).contains(&self.score) {
            Ok(self)
        } else {
            Err(OracleError::Malformed(format!(
                "score {} outside [0,1]",
                self.score
            )))
        }
    }
}

/// Capability used by the sentiment-proxy detector.
pub trait SentimentOracle: Send + Sync {
    fn classify<'a>(&'a self, text: &'a str) -> OracleFuture<'a>;
    /// Provider name for diagnostics/audit.
    fn provider_name(&self) -> &'static str;
}

pub type DynOracle = Arc<dyn SentimentOracle>;

/// Always fails with `Disabled`; used when no provider is configured.
pub struct DisabledOracle;

impl SentimentOracle for DisabledOracle {
    fn classify<'a>(&'a self, _text: &'a str) -> OracleFuture<'a> {
        Box::pin(async { Err(OracleError::Disabled) })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic provider for tests/local runs.
#[derive(Debug, Clone)]
pub struct MockOracle {
    pub fixed: Classification,
}

impl MockOracle {
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        Self {
            fixed: Classification::new(label, score),
        }
    }
}

impl SentimentOracle for MockOracle {
    fn classify<'a>(&'a self, _text: &'a str) -> OracleFuture<'a> {
        let out = self.fixed;
        Box::pin(async move { Ok(out) })
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Build a provider according to config and environment.
///
/// * `ORACLE_TEST_MODE=mock` returns a fixed `NEGATIVE 0.95` mock.
/// * `ORACLE_TEST_MODE=error` returns the disabled provider (every call fails).
/// * Otherwise `provider` selects `huggingface`, `lexicon` or `disabled`.
pub fn build_oracle(cfg: &OracleConfig) -> DynOracle {
    match std::env::var("ORACLE_TEST_MODE").ok().as_deref() {
        Some("mock") => return Arc::new(MockOracle::new(SentimentLabel::Negative, 0.95)),
        Some("error") => return Arc::new(DisabledOracle),
        _ => {}
    }

    let oracle: DynOracle = match cfg.provider.as_str() {
        "huggingface" | "hf" => Arc::new(HuggingFaceOracle::new(
            cfg.endpoint.clone(),
            cfg.model.clone(),
            cfg.api_key.clone(),
        )),
        "lexicon" => Arc::new(LexiconOracle::new()),
        _ => Arc::new(DisabledOracle),
    };
    info!(
        provider = oracle.provider_name(),
        timeout_ms = cfg.timeout_ms,
        key_len = cfg.api_key.len(),
        "sentiment oracle ready"
    );
    oracle
}
