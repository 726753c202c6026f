//! Detector primitives shared by the three signal sources.
//!
//! Every detector reduces the input text to a [`DetectorResult`]: a binary
//! verdict, a confidence in `[0,1]` rounded to 2 decimals, and an
//! evidence payload specific to that detector (flattened into JSON).

pub mod keywords;
pub mod sentiment;
pub mod urls;

use serde::{Deserialize, Serialize};

pub use keywords::{KeywordDetector, KeywordEvidence, DEFAULT_KEYWORDS};
pub use sentiment::{SentimentEvidence, SentimentProxyDetector, DEFAULT_INDICATORS};
pub use urls::{UrlAnalyzer, UrlEvidence, UrlFinding, UrlHeuristics};

/// Binary opinion of a detector (or of the fused result).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Phishing,
    Legitimate,
}

impl Verdict {
    pub fn is_phishing(self) -> bool {
        matches!(self, Verdict::Phishing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Phishing => "phishing",
            Verdict::Legitimate => "legitimate",
        }
    }
}

/// Output of one detector. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorResult<E> {
    pub verdict: Verdict,
    /// Always within `[0,1]`, rounded to 2 decimals.
    pub confidence: f64,
    #[serde(flatten)]
    pub evidence: E,
}

impl<E> DetectorResult<E> {
    /// Clamps and rounds `confidence` before storing it.
    pub fn new(verdict: Verdict, confidence: f64, evidence: E) -> Self {
        Self {
            verdict,
            confidence: round2(clamp01(confidence)),
            evidence,
        }
    }
}

/// Round to 2 decimal places (half away from zero).
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Clamp to [0.0, 1.0]; NaN maps to 0.0.
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Lower-case and collapse whitespace runs into a single space.
/// Applied to configured phrase tables, not to the scanned text.
pub(crate) fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.extend(ch.to_lowercase());
            last_space = false;
        }
    }
    out.trim().to_string()
}

/// Count distinct `phrases` occurring as substrings of the lower-cased text.
/// Phrases are expected to be normalized already; empty ones never match.
pub(crate) fn matched_phrases<'a>(text: &str, phrases: &'a [String]) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for p in phrases {
        if p.is_empty() || seen.contains(&p.as_str()) {
            continue;
        }
        if text.contains(p.as_str()) {
            seen.push(p.as_str());
        }
    }
    seen
}
