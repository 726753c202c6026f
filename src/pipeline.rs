//! Per-request orchestration: detectors → fusion → record → audit.
//!
//! Detector failures are translated here into degraded results, so
//! `analyze` itself is infallible for any input text.
//!
//! The audit append runs on its own task. `analyze` waits for it at most
//! `audit.max_wait_ms`; a slower sink keeps delivering in the background.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::audit::{build_sink, AuditEntry, DynSink, HistorySink};
use crate::config::AppConfig;
use crate::detect::{KeywordDetector, SentimentProxyDetector, UrlAnalyzer};
use crate::error::PhishingError;
use crate::fusion::{FusionEngine, FusionPolicy};
use crate::metrics;
use crate::oracle::{build_oracle, DynOracle};
use crate::record::DecisionRecord;

pub struct Analyzer {
    rules: KeywordDetector,
    sentiment: SentimentProxyDetector,
    urls: UrlAnalyzer,
    fusion: FusionEngine,
    sink: DynSink,
    audit_wait: Duration,
}

impl Analyzer {
    /// Wire detectors from config with an explicit oracle and sink.
    pub fn new(cfg: &AppConfig, oracle: DynOracle, sink: DynSink) -> Self {
        Self {
            rules: KeywordDetector::new(&cfg.keywords.phrases, cfg.keywords.min_matches),
            sentiment: SentimentProxyDetector::new(
                oracle,
                &cfg.sentiment.indicators,
                cfg.sentiment.negative_threshold,
                cfg.sentiment.min_indicator_hits,
                Duration::from_millis(cfg.oracle.timeout_ms),
            ),
            urls: UrlAnalyzer::new(cfg.urls.clone()),
            fusion: FusionEngine::new(cfg.fusion),
            sink,
            audit_wait: Duration::from_millis(cfg.audit.max_wait_ms),
        }
    }

    /// Build the configured oracle and sink; `history` is attached to the sink.
    pub fn from_config(cfg: &AppConfig, history: Arc<HistorySink>) -> Self {
        let oracle = build_oracle(&cfg.oracle);
        let sink = build_sink(&cfg.audit, history);
        Self::new(cfg, oracle, sink)
    }

    pub fn policy(&self) -> &FusionPolicy {
        self.fusion.policy()
    }

    pub fn provider_name(&self) -> &'static str {
        self.sentiment.provider_name()
    }

    pub async fn analyze(&self, text: &str) -> DecisionRecord {
        let started = Instant::now();

        // Keyword and URL passes are pure; run them while the oracle call is in flight.
        let (ai, (rule, (_urls, url))) = tokio::join!(self.sentiment.detect(text), async {
            (self.rules.detect(text), self.urls.analyze(text))
        });

        let ai = match ai {
            Ok(r) => r,
            Err(e) => {
                let kind = e.kind();
                let err = PhishingError::from(e);
                warn!(
                    provider = self.sentiment.provider_name(),
                    kind,
                    error = %err,
                    "using degraded sentiment signal"
                );
                metrics::record_oracle_failure(kind);
                self.sentiment.degraded(text)
            }
        };

        let fusion = self.fusion.fuse(&rule, &ai, &url);
        let record = DecisionRecord::build(fusion, rule, ai, url);

        let entry = AuditEntry::new(text, self.sentiment.provider_name(), record.clone());
        let text_id = entry.text_id.clone();
        self.dispatch_audit(entry).await;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        metrics::record_decision(record.final_verdict, record.risk_level, elapsed_ms);
        info!(
            text_id = %text_id,
            verdict = record.final_verdict.as_str(),
            risk = record.risk_level.as_str(),
            score = record.final_score,
            partial = record.partial,
            elapsed_ms,
            "text analyzed"
        );

        record
    }

    /// Append on a detached task; failures are logged and counted there.
    async fn dispatch_audit(&self, entry: AuditEntry) {
        let sink = self.sink.clone();
        let task = tokio::spawn(async move {
            if let Err(e) = sink.append(&entry).await {
                let err = PhishingError::from(e);
                warn!(
                    sink = sink.name(),
                    text_id = %entry.text_id,
                    error = %err,
                    "audit append failed"
                );
                metrics::record_audit_failure();
            }
        });

        if tokio::time::timeout(self.audit_wait, task).await.is_err() {
            debug!(
                sink = self.sink.name(),
                wait_ms = self.audit_wait.as_millis() as u64,
                "audit append still in flight; responding without it"
            );
        }
    }
}
