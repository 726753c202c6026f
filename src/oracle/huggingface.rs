//! Hosted text-classification provider (Hugging Face inference API shape).
//!
//! Request: `POST {endpoint}/{model}` with `{"inputs": text}`.
//! Response: `[[{"label": "NEGATIVE", "score": 0.98}, ...]]` (or the flat
//! variant without the outer array). The highest-scoring label wins.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Classification, OracleFuture, SentimentLabel, SentimentOracle};
use crate::error::OracleError;

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";

pub struct HuggingFaceOracle {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl HuggingFaceOracle {
    pub fn new(endpoint: String, model: String, api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("phishing-fusion-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        let endpoint = if endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };
        let model = if model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            model
        };
        Self {
            http,
            url: format!("{endpoint}/{model}"),
            api_key,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Serialize)]
struct Req<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Resp {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// Pick the top label out of a provider response body.
pub(crate) fn parse_response(body: &[u8]) -> Result<Classification, OracleError> {
    let resp: Resp =
        serde_json::from_slice(body).map_err(|e| OracleError::Malformed(e.to_string()))?;
    let candidates = match resp {
        Resp::Nested(mut outer) => {
            if outer.is_empty() {
                Vec::new()
            } else {
                outer.swap_remove(0)
            }
        }
        Resp::Flat(v) => v,
    };

    let best = candidates
        .into_iter()
        .filter(|c| c.score.is_finite())
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| OracleError::Malformed("empty label list".into()))?;

    let label = SentimentLabel::parse(&best.label)
        .ok_or_else(|| OracleError::Malformed(format!("unknown label `{}`", best.label)))?;
    Classification::new(label, best.score).validate()
}

impl SentimentOracle for HuggingFaceOracle {
    fn classify<'a>(&'a self, text: &'a str) -> OracleFuture<'a> {
        Box::pin(async move {
            let mut req = self.http.post(&self.url).json(&Req { inputs: text });
            if !self.api_key.is_empty() {
                req = req.bearer_auth(&self.api_key);
            }

            let resp = req
                .send()
                .await
                .map_err(|e| OracleError::Transport(e.to_string()))?;
            let status = resp.status();
            if !status.is_success() {
                return Err(OracleError::Status(status.as_u16()));
            }
            let body = resp
                .bytes()
                .await
                .map_err(|e| OracleError::Transport(e.to_string()))?;
            parse_response(&body)
        })
    }

    fn provider_name(&self) -> &'static str {
        "huggingface"
    }
}
