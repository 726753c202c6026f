//! Service configuration (TOML), loaded once at startup.
//!
//! Resolution order:
//! 1) `$PHISHING_CONFIG_PATH` (must exist)
//! 2) `config/phishing.toml`
//! 3) built-in defaults
//!
//! Every section and field is optional; missing values fall back to the
//! built-in scoring defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::audit::MAX_WEBHOOK_RETRIES;
use crate::detect::{UrlHeuristics, DEFAULT_INDICATORS, DEFAULT_KEYWORDS};
use crate::fusion::FusionPolicy;
use crate::oracle::huggingface::{DEFAULT_ENDPOINT, DEFAULT_MODEL};

pub const DEFAULT_CONFIG_PATH: &str = "config/phishing.toml";
pub const ENV_CONFIG_PATH: &str = "PHISHING_CONFIG_PATH";
pub const ENV_ORACLE_TIMEOUT_MS: &str = "PHISHING_ORACLE_TIMEOUT_MS";
pub const ENV_HF_TOKEN: &str = "HF_API_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub fusion: FusionPolicy,
    #[serde(default)]
    pub keywords: KeywordConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
    #[serde(default)]
    pub urls: UrlHeuristics,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect()
}
fn default_min_matches() -> usize {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(default = "default_keywords")]
    pub phrases: Vec<String>,
    #[serde(default = "default_min_matches")]
    pub min_matches: usize,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            phrases: default_keywords(),
            min_matches: default_min_matches(),
        }
    }
}

fn default_indicators() -> Vec<String> {
    DEFAULT_INDICATORS.iter().map(|s| s.to_string()).collect()
}
fn default_negative_threshold() -> f64 {
    0.80
}
fn default_min_indicator_hits() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentConfig {
    #[serde(default = "default_indicators")]
    pub indicators: Vec<String>,
    /// Oracle score must be strictly above this for a phishing verdict.
    #[serde(default = "default_negative_threshold")]
    pub negative_threshold: f64,
    #[serde(default = "default_min_indicator_hits")]
    pub min_indicator_hits: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            indicators: default_indicators(),
            negative_threshold: default_negative_threshold(),
            min_indicator_hits: default_min_indicator_hits(),
        }
    }
}

fn default_provider() -> String {
    "lexicon".into()
}
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}
fn default_model() -> String {
    DEFAULT_MODEL.into()
}
fn default_timeout_ms() -> u64 {
    2_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// "huggingface" | "lexicon" | "disabled"
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// "ENV" means: read from HF_API_TOKEN.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_sink() -> String {
    "tracing".into()
}
fn default_audit_path() -> PathBuf {
    PathBuf::from("logs/decisions.jsonl")
}
fn default_history_capacity() -> usize {
    500
}
fn default_webhook_timeout_secs() -> u64 {
    5
}
fn default_webhook_retries() -> u8 {
    3
}
fn default_audit_max_wait_ms() -> u64 {
    250
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// "jsonl" | "tracing" | "webhook" | "none"
    #[serde(default = "default_sink")]
    pub sink: String,
    #[serde(default = "default_audit_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_webhook_timeout_secs")]
    pub webhook_timeout_secs: u64,
    #[serde(default = "default_webhook_retries")]
    pub webhook_retries: u8,
    /// Longest a request waits for its audit append; slower sinks finish in the background.
    #[serde(default = "default_audit_max_wait_ms")]
    pub max_wait_ms: u64,
    /// Size of the in-memory ring behind `/debug/history`.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            sink: default_sink(),
            path: default_audit_path(),
            webhook_url: None,
            webhook_timeout_secs: default_webhook_timeout_secs(),
            webhook_retries: default_webhook_retries(),
            max_wait_ms: default_audit_max_wait_ms(),
            history_capacity: default_history_capacity(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub debug_routes: bool,
    /// Request body cap for `/analyze`; unset means no limit.
    #[serde(default)]
    pub max_body_bytes: Option<usize>,
}

impl AppConfig {
    /// Resolve the config path from env/defaults and load it.
    pub fn load() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let path = PathBuf::from(p);
            if !path.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path {}", path.display());
            }
            return Self::load_from_file(&path);
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load_from_file(&default);
        }
        let mut cfg = Self::default();
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading phishing config from {}", path.display()))?;
        let mut cfg = Self::from_toml_str(&content)
            .with_context(|| format!("parsing phishing config {}", path.display()))?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse without env overrides (used by tests and tools).
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s)?;
        cfg.oracle.provider = cfg.oracle.provider.trim().to_lowercase();
        cfg.audit.sink = cfg.audit.sink.trim().to_lowercase();
        Ok(cfg)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(ms) = parse_timeout_env(std::env::var(ENV_ORACLE_TIMEOUT_MS).ok()) {
            self.oracle.timeout_ms = ms;
        }
        if self.oracle.api_key.trim().eq_ignore_ascii_case("env") {
            self.oracle.api_key = std::env::var(ENV_HF_TOKEN)
                .map_err(|_| anyhow!("Missing {ENV_HF_TOKEN} env var"))?;
        }
        if std::env::var("DEBUG_ROUTES").ok().as_deref() == Some("1") {
            self.server.debug_routes = true;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.fusion.validate()?;
        if !(0.0..=1.0).contains(&self.sentiment.negative_threshold) {
            bail!("sentiment.negative_threshold must be within [0,1]");
        }
        let step = self.urls.per_url_confidence;
        if !step.is_finite() || step < 0.0 {
            bail!("urls.per_url_confidence must be a non-negative number");
        }
        if self.server.max_body_bytes == Some(0) {
            bail!("server.max_body_bytes must be > 0 when set");
        }
        if self.oracle.timeout_ms == 0 {
            bail!("oracle.timeout_ms must be > 0");
        }
        if !(1..=MAX_WEBHOOK_RETRIES).contains(&self.audit.webhook_retries) {
            bail!("audit.webhook_retries must be within 1..={MAX_WEBHOOK_RETRIES}");
        }
        if self.audit.sink == "webhook" && self.audit.webhook_url.is_none() {
            bail!("audit.sink = \"webhook\" requires audit.webhook_url");
        }
        Ok(())
    }
}

fn parse_timeout_env(raw: Option<String>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
}
