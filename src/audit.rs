//! Audit log sinks: one structured, append-only entry per decision.
//!
//! The pipeline writes after the decision is final; sink failures are
//! reported back as `AuditError` and the caller downgrades them to a warning.
//! Raw input text is never written, only a short SHA-256 id and its length.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::record::DecisionRecord;

/// What gets persisted for each request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// First 6 bytes of SHA-256(text), hex.
    pub text_id: String,
    pub text_len: usize,
    /// Oracle provider that served (or failed) the sentiment signal.
    pub provider: String,
    pub record: DecisionRecord,
}

impl AuditEntry {
    pub fn new(text: &str, provider: &str, record: DecisionRecord) -> Self {
        Self {
            text_id: anon_hash(text),
            text_len: text.chars().count(),
            provider: provider.to_string(),
            record,
        }
    }
}

/// Short, anonymized id for a piece of text.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError>;
    fn name(&self) -> &'static str;
}

pub type DynSink = Arc<dyn AuditSink>;

/// Discards everything.
pub struct NoopSink;

#[async_trait]
impl AuditSink for NoopSink {
    async fn append(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
        Ok(())
    }
    fn name(&self) -> &'static str {
        "none"
    }
}

/// Structured `info!` event on the `audit` target.
pub struct TracingSink;

#[async_trait]
impl AuditSink for TracingSink {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let payload = serde_json::to_string(&entry.record)?;
        info!(
            target: "audit",
            text_id = %entry.text_id,
            text_len = entry.text_len,
            provider = %entry.provider,
            verdict = entry.record.final_verdict.as_str(),
            risk = entry.record.risk_level.as_str(),
            score = entry.record.final_score,
            partial = entry.record.partial,
            record = %payload,
            "decision"
        );
        Ok(())
    }
    fn name(&self) -> &'static str {
        "tracing"
    }
}

/// Appends one JSON object per line to a file.
pub struct JsonlFileSink {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl JsonlFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl AuditSink for JsonlFileSink {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        // One writer at a time keeps lines whole.
        let _guard = self.lock.lock().await;
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir).await?;
            }
        }
        let mut f = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        f.write_all(&line).await?;
        f.flush().await?;
        Ok(())
    }
    fn name(&self) -> &'static str {
        "jsonl"
    }
}

pub const MAX_WEBHOOK_RETRIES: u8 = 10;
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// 200ms, 400ms, 800ms, ... capped at `MAX_BACKOFF`.
fn retry_backoff(attempt: u8) -> Duration {
    let shift = u32::from(attempt.saturating_sub(1)).min(16);
    Duration::from_millis(200u64.saturating_mul(1 << shift)).min(MAX_BACKOFF)
}

/// POSTs each entry as JSON; retries with exponential back-off.
#[derive(Clone)]
pub struct WebhookSink {
    url: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl WebhookSink {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.clamp(1, MAX_WEBHOOK_RETRIES);
        self
    }
}

#[async_trait]
impl AuditSink for WebhookSink {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.url)
                .timeout(self.timeout)
                .json(entry)
                .send()
                .await;

            let err = match res {
                Ok(rsp) => match rsp.error_for_status_ref() {
                    Ok(_) => return Ok(()),
                    Err(e) => format!("audit webhook HTTP error: {e}"),
                },
                Err(e) => format!("audit webhook request failed: {e}"),
            };
            if attempt >= self.max_retries {
                return Err(AuditError::Delivery(err));
            }
            tokio::time::sleep(retry_backoff(attempt)).await;
        }
    }
    fn name(&self) -> &'static str {
        "webhook"
    }
}

/// Bounded in-memory log of recent entries (oldest dropped first).
#[derive(Debug)]
pub struct HistorySink {
    inner: Mutex<VecDeque<AuditEntry>>,
    cap: usize,
}

impl HistorySink {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 10_000);
        Self {
            inner: Mutex::new(VecDeque::with_capacity(cap)),
            cap,
        }
    }

    pub fn push(&self, entry: AuditEntry) {
        let mut v = match self.inner.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        v.push_back(entry);
        while v.len() > self.cap {
            v.pop_front();
        }
    }

    /// Last `n` entries, oldest first.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<AuditEntry> {
        let v = match self.inner.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let start = v.len().saturating_sub(n);
        v.iter().skip(start).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditSink for HistorySink {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.push(entry.clone());
        Ok(())
    }
    fn name(&self) -> &'static str {
        "history"
    }
}

/// Fan-out to several sinks. Every sink is attempted; the first failure
/// is returned.
pub struct SinkMux {
    sinks: Vec<DynSink>,
}

impl SinkMux {
    pub fn new(sinks: Vec<DynSink>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl AuditSink for SinkMux {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let mut first_err: Option<AuditError> = None;
        for s in &self.sinks {
            if let Err(e) = s.append(entry).await {
                tracing::debug!(sink = s.name(), error = %e, "audit sink failed");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
    fn name(&self) -> &'static str {
        "mux"
    }
}

/// Configured sink plus the always-on history ring.
pub fn build_sink(cfg: &AuditConfig, history: Arc<HistorySink>) -> DynSink {
    let primary: Option<DynSink> = match cfg.sink.as_str() {
        "jsonl" | "file" => Some(Arc::new(JsonlFileSink::new(cfg.path.clone()))),
        "tracing" | "log" => Some(Arc::new(TracingSink)),
        "webhook" => cfg.webhook_url.clone().map(|url| {
            Arc::new(
                WebhookSink::new(url)
                    .with_timeout(cfg.webhook_timeout_secs)
                    .with_retries(cfg.webhook_retries),
            ) as DynSink
        }),
        _ => None,
    };

    let mut sinks: Vec<DynSink> = vec![history];
    if let Some(p) = primary {
        sinks.push(p);
    }
    Arc::new(SinkMux::new(sinks))
}
