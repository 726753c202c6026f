//! # Fusion Engine
//! Pure, deterministic combination of the three detector outputs into one
//! verdict, a risk bucket and a per-signal explanation. No I/O.
//!
//! final_score = round2(w_rule*rule + w_ai*ai + w_url*url)
//!
//! The verdict cut (0.5) and the risk cuts (0.40 / 0.75) are
//! independent: a `legitimate` verdict may carry `medium` risk.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::detect::{
    round2, DetectorResult, KeywordEvidence, SentimentEvidence, UrlEvidence, Verdict,
};

pub const RULE_MATCHED: &str = "Matched known phishing keywords";
pub const RULE_CLEAN: &str = "No critical phishing keywords detected";
pub const AI_THREAT: &str = "Language model detected urgency or threatening language";
pub const AI_NORMAL: &str = "Language appears normal";
pub const AI_UNAVAILABLE: &str =
    "Language model unavailable; sentiment signal was not evaluated (degraded result)";
pub const URL_SUSPICIOUS: &str = "Suspicious or shortened URLs detected";
pub const URL_CLEAN: &str = "No suspicious URLs detected";

/// What to do with the AI weight when the oracle could not answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedWeighting {
    /// AI contributes 0.0; the score ceiling drops to `rule + url` weight.
    #[default]
    KeepWeights,
    /// Rule and URL weights are scaled to sum to 1.0.
    Reweight,
}

fn default_rule_weight() -> f64 {
    0.5
}
fn default_ai_weight() -> f64 {
    0.3
}
fn default_url_weight() -> f64 {
    0.2
}
fn default_verdict_threshold() -> f64 {
    0.5
}
fn default_risk_high() -> f64 {
    0.75
}
fn default_risk_medium() -> f64 {
    0.40
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionPolicy {
    #[serde(default = "default_rule_weight")]
    pub rule_weight: f64,
    #[serde(default = "default_ai_weight")]
    pub ai_weight: f64,
    #[serde(default = "default_url_weight")]
    pub url_weight: f64,
    /// `final_score >= verdict_threshold` → phishing.
    #[serde(default = "default_verdict_threshold")]
    pub verdict_threshold: f64,
    #[serde(default = "default_risk_high")]
    pub risk_high: f64,
    #[serde(default = "default_risk_medium")]
    pub risk_medium: f64,
    #[serde(default)]
    pub degraded: DegradedWeighting,
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self {
            rule_weight: default_rule_weight(),
            ai_weight: default_ai_weight(),
            url_weight: default_url_weight(),
            verdict_threshold: default_verdict_threshold(),
            risk_high: default_risk_high(),
            risk_medium: default_risk_medium(),
            degraded: DegradedWeighting::default(),
        }
    }
}

impl FusionPolicy {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("fusion.rule_weight", self.rule_weight),
            ("fusion.ai_weight", self.ai_weight),
            ("fusion.url_weight", self.url_weight),
            ("fusion.verdict_threshold", self.verdict_threshold),
            ("fusion.risk_high", self.risk_high),
            ("fusion.risk_medium", self.risk_medium),
        ] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                bail!("{name} must be within [0,1], got {v}");
            }
        }
        let sum = self.rule_weight + self.ai_weight + self.url_weight;
        if (sum - 1.0).abs() > 1e-6 {
            bail!("fusion weights must sum to 1.0, got {sum:.4}");
        }
        if self.risk_medium > self.risk_high {
            bail!("fusion.risk_medium must not exceed fusion.risk_high");
        }
        Ok(())
    }

    /// Weights (rule, ai, url) actually applied for this availability.
    pub fn effective_weights(&self, ai_available: bool) -> (f64, f64, f64) {
        if ai_available {
            return (self.rule_weight, self.ai_weight, self.url_weight);
        }
        match self.degraded {
            DegradedWeighting::KeepWeights => (self.rule_weight, 0.0, self.url_weight),
            DegradedWeighting::Reweight => {
                let rest = self.rule_weight + self.url_weight;
                if rest <= f64::EPSILON {
                    (0.0, 0.0, 0.0)
                } else {
                    (self.rule_weight / rest, 0.0, self.url_weight / rest)
                }
            }
        }
    }

    pub fn verdict_for(&self, score: f64) -> Verdict {
        if score >= self.verdict_threshold {
            Verdict::Phishing
        } else {
            Verdict::Legitimate
        }
    }

    pub fn risk_for(&self, score: f64) -> RiskLevel {
        if score >= self.risk_high {
            RiskLevel::High
        } else if score >= self.risk_medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// One fixed sentence per signal; each signal explains only itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanations {
    pub rule_based_reason: String,
    pub ai_reason: String,
    pub url_reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub final_verdict: Verdict,
    pub final_score: f64,
    pub risk_level: RiskLevel,
    pub explanations: Explanations,
    /// True when at least one signal was substituted by a degraded result.
    pub partial: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FusionEngine {
    policy: FusionPolicy,
}

impl FusionEngine {
    pub fn new(policy: FusionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FusionPolicy {
        &self.policy
    }

    /// Weighted sum of the three confidences, rounded to 2 decimals.
    pub fn score(&self, rule: f64, ai: f64, url: f64, ai_available: bool) -> f64 {
        let (wr, wa, wu) = self.policy.effective_weights(ai_available);
        round2(rule * wr + ai * wa + url * wu).clamp(0.0, 1.0)
    }

    pub fn fuse(
        &self,
        rule: &DetectorResult<KeywordEvidence>,
        ai: &DetectorResult<SentimentEvidence>,
        url: &DetectorResult<UrlEvidence>,
    ) -> FusionResult {
        let ai_available = ai.evidence.available;
        let final_score = self.score(rule.confidence, ai.confidence, url.confidence, ai_available);

        FusionResult {
            final_verdict: self.policy.verdict_for(final_score),
            final_score,
            risk_level: self.policy.risk_for(final_score),
            explanations: Explanations {
                rule_based_reason: explain_rule(rule).to_string(),
                ai_reason: explain_ai(ai).to_string(),
                url_reason: explain_url(url).to_string(),
            },
            partial: !ai_available,
        }
    }
}

pub fn explain_rule(rule: &DetectorResult<KeywordEvidence>) -> &'static str {
    if rule.verdict.is_phishing() {
        RULE_MATCHED
    } else {
        RULE_CLEAN
    }
}

pub fn explain_ai(ai: &DetectorResult<SentimentEvidence>) -> &'static str {
    if !ai.evidence.available {
        AI_UNAVAILABLE
    } else if ai.verdict.is_phishing() {
        AI_THREAT
    } else {
        AI_NORMAL
    }
}

pub fn explain_url(url: &DetectorResult<UrlEvidence>) -> &'static str {
    if url.confidence > 0.0 {
        URL_SUSPICIOUS
    } else {
        URL_CLEAN
    }
}
