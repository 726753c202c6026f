use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::warn;

use crate::detect::Verdict;
use crate::fusion::RiskLevel;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process; later calls share it.
    pub fn init() -> Self {
        let handle = HANDLE
            .get_or_init(|| {
                let handle = match PrometheusBuilder::new().install_recorder() {
                    Ok(h) => h,
                    Err(e) => {
                        // Another recorder owns the process; keep a detached handle.
                        warn!(error = %e, "prometheus: recorder already installed");
                        PrometheusBuilder::new().build_recorder().handle()
                    }
                };
                describe();
                handle
            })
            .clone();
        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe() {
    describe_counter!("phishing_analyze_requests_total", "Texts scored.");
    describe_counter!("phishing_verdicts_total", "Final verdicts by label.");
    describe_counter!("phishing_risk_total", "Risk buckets assigned.");
    describe_counter!(
        "phishing_oracle_failures_total",
        "Sentiment oracle calls replaced by a degraded result."
    );
    describe_counter!(
        "phishing_audit_failures_total",
        "Audit log writes that failed (request still served)."
    );
    describe_histogram!(
        "phishing_analyze_duration_ms",
        "End-to-end scoring time in milliseconds."
    );
}

pub fn record_decision(verdict: Verdict, risk: RiskLevel, elapsed_ms: f64) {
    counter!("phishing_analyze_requests_total").increment(1);
    counter!("phishing_verdicts_total", "verdict" => verdict.as_str()).increment(1);
    counter!("phishing_risk_total", "risk" => risk.as_str()).increment(1);
    histogram!("phishing_analyze_duration_ms").record(elapsed_ms);
}

pub fn record_oracle_failure(kind: &'static str) {
    counter!("phishing_oracle_failures_total", "kind" => kind).increment(1);
}

pub fn record_audit_failure() {
    counter!("phishing_audit_failures_total").increment(1);
}
