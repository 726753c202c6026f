//! Sentiment-proxy detector.
//!
//! Reinterprets an external sentiment classification as a phishing signal.
//! Verdict needs strong negative sentiment AND at least one urgency/action
//! indicator; confidence is the oracle score alone. The oracle call is the
//! only suspension point and is bounded by `timeout`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{matched_phrases, normalize, DetectorResult, Verdict};
use crate::error::OracleError;
use crate::oracle::{DynOracle, SentimentLabel};

/// Secondary urgency/action vocabulary.
pub const DEFAULT_INDICATORS: [&str; 7] = [
    "urgent",
    "immediately",
    "verify",
    "suspended",
    "click",
    "login",
    "confirm",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentEvidence {
    /// `None` when the oracle was unavailable.
    pub model_label: Option<SentimentLabel>,
    pub indicator_hits: usize,
    /// False when the oracle did not produce a usable answer.
    pub available: bool,
}

pub struct SentimentProxyDetector {
    oracle: DynOracle,
    indicators: Vec<String>,
    negative_threshold: f64,
    min_indicator_hits: usize,
    timeout: Duration,
}

impl SentimentProxyDetector {
    pub fn new<I, S>(
        oracle: DynOracle,
        indicators: I,
        negative_threshold: f64,
        min_indicator_hits: usize,
        timeout: Duration,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table: Vec<String> = Vec::new();
        for p in indicators {
            let n = normalize(p.as_ref());
            if !n.is_empty() && !table.contains(&n) {
                table.push(n);
            }
        }
        Self {
            oracle,
            indicators: table,
            negative_threshold,
            min_indicator_hits: min_indicator_hits.max(1),
            timeout,
        }
    }

    /// Defaults: built-in indicators, threshold 0.80, one hit, 2s timeout.
    pub fn with_oracle(oracle: DynOracle) -> Self {
        Self::new(oracle, DEFAULT_INDICATORS, 0.80, 1, Duration::from_secs(2))
    }

    pub fn provider_name(&self) -> &'static str {
        self.oracle.provider_name()
    }

    pub fn indicator_hits(&self, text: &str) -> usize {
        matched_phrases(&text.to_lowercase(), &self.indicators).len()
    }

    /// One oracle call, bounded by the configured timeout.
    pub async fn detect(&self, text: &str) -> Result<DetectorResult<SentimentEvidence>, OracleError> {
        let hits = self.indicator_hits(text);

        let classification = tokio::time::timeout(self.timeout, self.oracle.classify(text))
            .await
            .map_err(|_| OracleError::Timeout(self.timeout))??
            .validate()?;

        let is_phishing = classification.label == SentimentLabel::Negative
            && classification.score > self.negative_threshold
            && hits >= self.min_indicator_hits;
        let verdict = if is_phishing {
            Verdict::Phishing
        } else {
            Verdict::Legitimate
        };

        Ok(DetectorResult::new(
            verdict,
            classification.score,
            SentimentEvidence {
                model_label: Some(classification.label),
                indicator_hits: hits,
                available: true,
            },
        ))
    }

    /// Neutral stand-in used when the oracle failed.
    pub fn degraded(&self, text: &str) -> DetectorResult<SentimentEvidence> {
        DetectorResult::new(
            Verdict::Legitimate,
            0.0,
            SentimentEvidence {
                model_label: None,
                indicator_hits: self.indicator_hits(text),
                available: false,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{DisabledOracle, MockOracle};
    use std::sync::Arc;

    fn detector(label: SentimentLabel, score: f64) -> SentimentProxyDetector {
        SentimentProxyDetector::with_oracle(Arc::new(MockOracle::new(label, score)))
    }

    #[tokio::test]
    async fn negative_with_indicator_is_phishing() {
        let d = detector(SentimentLabel::Negative, 0.93);
        let r = d.detect("Verify your details immediately").await.unwrap();
        assert_eq!(r.verdict, Verdict::Phishing);
        assert_eq!(r.confidence, 0.93);
        assert_eq!(r.evidence.indicator_hits, 2);
        assert_eq!(r.evidence.model_label, Some(SentimentLabel::Negative));
    }

    #[tokio::test]
    async fn angry_complaint_without_indicator_is_legitimate() {
        let d = detector(SentimentLabel::Negative, 0.99);
        let r = d.detect("This service is terrible and I want a refund").await.unwrap();
        assert_eq!(r.verdict, Verdict::Legitimate);
        // confidence still reflects sentiment strength only
        assert_eq!(r.confidence, 0.99);
    }

    #[tokio::test]
    async fn score_threshold_is_strict() {
        let d = detector(SentimentLabel::Negative, 0.80);
        let r = d.detect("click the link").await.unwrap();
        assert_eq!(r.verdict, Verdict::Legitimate);
        let d = detector(SentimentLabel::Negative, 0.81);
        assert_eq!(d.detect("click the link").await.unwrap().verdict, Verdict::Phishing);
    }

    #[tokio::test]
    async fn positive_label_never_flags() {
        let d = detector(SentimentLabel::Positive, 0.99);
        let r = d.detect("urgent: confirm your login").await.unwrap();
        assert_eq!(r.verdict, Verdict::Legitimate);
        assert_eq!(r.confidence, 0.99);
    }

    #[tokio::test]
    async fn confidence_is_rounded_oracle_score() {
        let d = detector(SentimentLabel::Negative, 0.876_5);
        let r = d.detect("hello").await.unwrap();
        assert_eq!(r.confidence, 0.88);
    }

    #[tokio::test]
    async fn oracle_failure_surfaces_as_error() {
        let d = SentimentProxyDetector::with_oracle(Arc::new(DisabledOracle));
        assert_eq!(d.detect("x").await.unwrap_err(), OracleError::Disabled);
    }

    #[tokio::test]
    async fn malformed_score_is_rejected() {
        let d = detector(SentimentLabel::Negative, 1.5);
        assert!(matches!(
            d.detect("x").await.unwrap_err(),
            OracleError::Malformed(_)
        ));
    }

    #[test]
    fn degraded_result_is_neutral_but_keeps_hits() {
        let d = SentimentProxyDetector::with_oracle(Arc::new(DisabledOracle));
        let r = d.degraded("please login and confirm");
        assert_eq!(r.verdict, Verdict::Legitimate);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.evidence.indicator_hits, 2);
        assert!(!r.evidence.available);
        assert!(r.evidence.model_label.is_none());
    }
}
