//! Keyword rule detector.
//!
//! Case-insensitive substring scan over a fixed, ordered phrase table.
//! `confidence = matches / table_len`; a single hit is never enough for a
//! phishing verdict (common words like "password" would dominate).

use serde::{Deserialize, Serialize};

use super::{matched_phrases, normalize, DetectorResult, Verdict};

/// Built-in phrase table, in reporting order.
pub const DEFAULT_KEYWORDS: [&str; 9] = [
    "urgent",
    "verify",
    "account suspended",
    "click here",
    "login immediately",
    "update your account",
    "password",
    "confirm identity",
    "security alert",
];

/// Matched phrases, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEvidence {
    pub matched_keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct KeywordDetector {
    phrases: Vec<String>,
    min_matches: usize,
}

impl Default for KeywordDetector {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().map(|s| s.to_string()), 2)
    }
}

impl KeywordDetector {
    /// Phrases are normalized once here; blanks are dropped, duplicates kept
    /// out so the denominator counts distinct phrases.
    pub fn new<I, S>(phrases: I, min_matches: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table: Vec<String> = Vec::new();
        for p in phrases {
            let n = normalize(p.as_ref());
            if !n.is_empty() && !table.contains(&n) {
                table.push(n);
            }
        }
        Self {
            phrases: table,
            min_matches: min_matches.max(1),
        }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn detect(&self, text: &str) -> DetectorResult<KeywordEvidence> {
        let text = text.to_lowercase();
        let matched = matched_phrases(&text, &self.phrases);

        let confidence = if self.phrases.is_empty() {
            0.0
        } else {
            (matched.len() as f64 / self.phrases.len() as f64).min(1.0)
        };
        let verdict = if matched.len() >= self.min_matches {
            Verdict::Phishing
        } else {
            Verdict::Legitimate
        };

        DetectorResult::new(
            verdict,
            confidence,
            KeywordEvidence {
                matched_keywords: matched.into_iter().map(str::to_string).collect(),
            },
        )
    }
}
