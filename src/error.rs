//! Error taxonomy. Detector failures are translated at their own boundary;
//! only request-shape errors (`InvalidInput`, `PayloadTooLarge`) reach an
//! HTTP client as an error status.

use std::time::Duration;

use thiserror::Error;

/// Why the sentiment oracle could not produce a usable classification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    #[error("oracle timed out after {0:?}")]
    Timeout(Duration),

    #[error("oracle transport error: {0}")]
    Transport(String),

    #[error("oracle returned HTTP {0}")]
    Status(u16),

    #[error("oracle returned a malformed result: {0}")]
    Malformed(String),

    #[error("oracle disabled")]
    Disabled,
}

impl OracleError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OracleError::Timeout(_) => "timeout",
            OracleError::Transport(_) => "transport",
            OracleError::Status(_) => "status",
            OracleError::Malformed(_) => "malformed",
            OracleError::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("audit delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Error)]
pub enum PhishingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("sentiment oracle unavailable: {0}")]
    OracleUnavailable(#[from] OracleError),

    #[error("audit log write failed: {0}")]
    LoggingFailure(#[from] AuditError),

    #[error("configuration error: {0}")]
    Config(String),
}
