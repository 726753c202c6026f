//! Decision record: the externally visible, write-once output of one
//! scoring call. Pure assembly, no decision logic.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::detect::{DetectorResult, KeywordEvidence, SentimentEvidence, UrlEvidence, Verdict};
use crate::fusion::{Explanations, FusionResult, RiskLevel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// ISO 8601 / RFC 3339, UTC, captured at build time.
    pub timestamp: String,
    pub final_verdict: Verdict,
    pub risk_level: RiskLevel,
    pub final_score: f64,
    /// True when a signal was evaluated in degraded mode.
    pub partial: bool,
    pub explanation: Explanations,
    pub rule_based: DetectorResult<KeywordEvidence>,
    pub ai_based: DetectorResult<SentimentEvidence>,
    pub url_analysis: DetectorResult<UrlEvidence>,
}

impl DecisionRecord {
    pub fn build(
        fusion: FusionResult,
        rule: DetectorResult<KeywordEvidence>,
        ai: DetectorResult<SentimentEvidence>,
        url: DetectorResult<UrlEvidence>,
    ) -> Self {
        Self::at(Utc::now(), fusion, rule, ai, url)
    }

    pub fn at(
        ts: DateTime<Utc>,
        fusion: FusionResult,
        rule: DetectorResult<KeywordEvidence>,
        ai: DetectorResult<SentimentEvidence>,
        url: DetectorResult<UrlEvidence>,
    ) -> Self {
        Self {
            timestamp: ts.to_rfc3339_opts(SecondsFormat::Millis, true),
            final_verdict: fusion.final_verdict,
            risk_level: fusion.risk_level,
            final_score: fusion.final_score,
            partial: fusion.partial,
            explanation: fusion.explanations,
            rule_based: rule,
            ai_based: ai,
            url_analysis: url,
        }
    }
}
