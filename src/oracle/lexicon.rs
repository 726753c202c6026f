//! Offline sentiment provider backed by an embedded word lexicon.
//!
//! Sum of per-word scores; a negator within the previous 1..=3 tokens flips
//! the sign of a word's score. The sum maps to a label (negative when < 0)
//! and a pseudo-probability `0.5 + 0.5 * |s| / (|s| + 1)`.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::{Classification, OracleFuture, SentimentLabel, SentimentOracle};

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).unwrap_or_default()
});

#[derive(Debug, Clone, Default)]
pub struct LexiconOracle;

impl LexiconOracle {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (raw score, token count).
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
        }

        (score, tokens.len())
    }

    pub fn classify_sync(&self, text: &str) -> Classification {
        let (s, _) = self.score_text(text);
        let label = if s < 0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Positive
        };
        let a = s.unsigned_abs() as f64;
        Classification::new(label, 0.5 + 0.5 * a / (a + 1.0))
    }
}

impl SentimentOracle for LexiconOracle {
    fn classify<'a>(&'a self, text: &'a str) -> OracleFuture<'a> {
        let out = self.classify_sync(text);
        Box::pin(async move { Ok(out) })
    }
    fn provider_name(&self) -> &'static str {
        "lexicon"
    }
}

/// Alphanumeric tokens (apostrophes kept for "isn't"), lower-case.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "without"
    )
}
