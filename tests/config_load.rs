// tests/config_load.rs
//
// Config resolution from file + environment. These tests mutate process
// env, so they run serially.

use std::io::Write;

use serial_test::serial;
use tempfile::NamedTempFile;

use phishing_fusion_analyzer::config::{AppConfig, ENV_CONFIG_PATH, ENV_ORACLE_TIMEOUT_MS};
use phishing_fusion_analyzer::fusion::DegradedWeighting;

fn write_cfg(body: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("tempfile");
    f.write_all(body.as_bytes()).expect("write cfg");
    f
}

fn clear_env() {
    std::env::remove_var(ENV_CONFIG_PATH);
    std::env::remove_var(ENV_ORACLE_TIMEOUT_MS);
    std::env::remove_var("DEBUG_ROUTES");
    std::env::remove_var("HF_API_TOKEN");
}

#[test]
#[serial]
fn loads_file_named_by_env() {
    clear_env();
    let f = write_cfg(
        r#"
[fusion]
degraded = "reweight"

[keywords]
phrases = ["wire transfer", "gift card", "verify"]
min_matches = 1

[audit]
sink = "JSONL"
path = "target/test-audit.jsonl"
"#,
    );
    std::env::set_var(ENV_CONFIG_PATH, f.path());

    let cfg = AppConfig::load().expect("load");
    assert_eq!(cfg.fusion.degraded, DegradedWeighting::Reweight);
    assert_eq!(cfg.keywords.phrases.len(), 3);
    assert_eq!(cfg.keywords.min_matches, 1);
    assert_eq!(cfg.audit.sink, "jsonl");
    // untouched sections keep defaults
    assert_eq!(cfg.sentiment.negative_threshold, 0.80);
    assert_eq!(cfg.oracle.timeout_ms, 2_000);
    clear_env();
}

#[test]
#[serial]
fn missing_env_path_is_an_error() {
    clear_env();
    std::env::set_var(ENV_CONFIG_PATH, "/definitely/not/here/phishing.toml");
    let err = AppConfig::load().unwrap_err().to_string();
    assert!(err.contains("non-existent"), "{err}");
    clear_env();
}

#[test]
#[serial]
fn env_overrides_apply_after_file() {
    clear_env();
    let f = write_cfg("[oracle]\ntimeout_ms = 5000\n");
    std::env::set_var(ENV_CONFIG_PATH, f.path());
    std::env::set_var(ENV_ORACLE_TIMEOUT_MS, "150");
    std::env::set_var("DEBUG_ROUTES", "1");

    let cfg = AppConfig::load().expect("load");
    assert_eq!(cfg.oracle.timeout_ms, 150);
    assert!(cfg.server.debug_routes);
    clear_env();
}

#[test]
#[serial]
fn api_key_env_indirection() {
    clear_env();
    let f = write_cfg("[oracle]\nprovider = \"huggingface\"\napi_key = \"ENV\"\n");
    std::env::set_var(ENV_CONFIG_PATH, f.path());

    let err = AppConfig::load().unwrap_err().to_string();
    assert!(err.contains("HF_API_TOKEN"), "{err}");

    std::env::set_var("HF_API_TOKEN", "hf_test_token");
    let cfg = AppConfig::load().expect("load with token");
    assert_eq!(cfg.oracle.api_key, "hf_test_token");
    assert_eq!(cfg.oracle.provider, "huggingface");
    clear_env();
}

#[test]
#[serial]
fn invalid_weights_fail_to_load() {
    clear_env();
    let f = write_cfg("[fusion]\nrule_weight = 0.9\n");
    std::env::set_var(ENV_CONFIG_PATH, f.path());
    assert!(AppConfig::load().is_err());
    clear_env();
}

#[test]
#[serial]
fn shipped_sample_config_matches_defaults() {
    clear_env();
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/phishing.toml");
    let cfg = AppConfig::load_from_file(path).expect("sample config");
    assert_eq!(cfg, AppConfig::default());
}

#[tokio::test]
#[serial]
async fn app_reports_config_errors() {
    clear_env();
    std::env::set_var(ENV_CONFIG_PATH, "/definitely/not/here/phishing.toml");
    let err = phishing_fusion_analyzer::app().await.unwrap_err().to_string();
    assert!(err.starts_with("configuration error:"), "{err}");
    assert!(err.contains("non-existent"), "{err}");
    clear_env();
}
