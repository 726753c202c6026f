//! URL heuristic analyzer.
//!
//! Extracts `http://` / `https://` URLs (scheme followed by non-whitespace,
//! first-seen order, duplicates kept) and flags each one that trips any
//! structural heuristic. `confidence = min(suspicious * step, 1.0)`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{DetectorResult, Verdict};

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://\S+").expect("url regex"));
static IP_HOST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://\d+\.\d+\.\d+\.\d+").expect("ip host regex"));

fn default_shorteners() -> Vec<String> {
    vec!["bit.ly".into(), "tinyurl".into()]
}
fn default_max_hyphens() -> usize {
    3
}
fn default_per_url_confidence() -> f64 {
    0.3
}
fn default_secure_scheme() -> String {
    "https".into()
}

/// Tunable heuristic table; loaded once and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlHeuristics {
    /// Tokens of known link-shortener domains.
    #[serde(default = "default_shorteners")]
    pub shorteners: Vec<String>,
    /// A URL with more hyphens than this is suspicious.
    #[serde(default = "default_max_hyphens")]
    pub max_hyphens: usize,
    /// Confidence added per suspicious URL.
    #[serde(default = "default_per_url_confidence")]
    pub per_url_confidence: f64,
    /// URLs not starting with this prefix are suspicious.
    #[serde(default = "default_secure_scheme")]
    pub secure_scheme: String,
}

impl Default for UrlHeuristics {
    fn default() -> Self {
        Self {
            shorteners: default_shorteners(),
            max_hyphens: default_max_hyphens(),
            per_url_confidence: default_per_url_confidence(),
            secure_scheme: default_secure_scheme(),
        }
    }
}

/// One extracted URL and whether any heuristic fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlFinding {
    pub raw_url: String,
    pub is_suspicious: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEvidence {
    pub urls_found: Vec<String>,
    pub suspicious_urls: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UrlAnalyzer {
    heuristics: UrlHeuristics,
}

impl UrlAnalyzer {
    pub fn new(mut heuristics: UrlHeuristics) -> Self {
        heuristics.shorteners = heuristics
            .shorteners
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        heuristics.secure_scheme = heuristics.secure_scheme.trim().to_lowercase();
        Self { heuristics }
    }

    pub fn heuristics(&self) -> &UrlHeuristics {
        &self.heuristics
    }

    /// All http(s) URLs in order of appearance.
    pub fn extract(&self, text: &str) -> Vec<String> {
        URL_RE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    pub fn is_suspicious(&self, url: &str) -> bool {
        let u = url.to_lowercase();
        let h = &self.heuristics;

        let shortened = h.shorteners.iter().any(|s| u.contains(s.as_str()));
        let ip_literal = IP_HOST_RE.is_match(&u);
        let hyphen_heavy = u.matches('-').count() > h.max_hyphens;
        let insecure = !u.starts_with(h.secure_scheme.as_str());

        shortened || ip_literal || hyphen_heavy || insecure
    }

    pub fn findings(&self, text: &str) -> Vec<UrlFinding> {
        self.extract(text)
            .into_iter()
            .map(|raw_url| UrlFinding {
                is_suspicious: self.is_suspicious(&raw_url),
                raw_url,
            })
            .collect()
    }

    pub fn analyze(&self, text: &str) -> (Vec<String>, DetectorResult<UrlEvidence>) {
        let findings = self.findings(text);
        let urls_found: Vec<String> = findings.iter().map(|f| f.raw_url.clone()).collect();
        let suspicious_urls: Vec<String> = findings
            .into_iter()
            .filter(|f| f.is_suspicious)
            .map(|f| f.raw_url)
            .collect();

        let confidence =
            (suspicious_urls.len() as f64 * self.heuristics.per_url_confidence).min(1.0);
        let verdict = if confidence > 0.0 {
            Verdict::Phishing
        } else {
            Verdict::Legitimate
        };

        let result = DetectorResult::new(
            verdict,
            confidence,
            UrlEvidence {
                urls_found: urls_found.clone(),
                suspicious_urls,
            },
        );
        (urls_found, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> UrlAnalyzer {
        UrlAnalyzer::new(UrlHeuristics::default())
    }

    #[test]
    fn shortener_link_is_flagged() {
        let (urls, r) = analyzer().analyze("visit http://bit.ly/abc now");
        assert_eq!(urls, vec!["http://bit.ly/abc"]);
        assert_eq!(r.evidence.suspicious_urls, vec!["http://bit.ly/abc"]);
        assert_eq!(r.confidence, 0.3);
        assert_eq!(r.verdict, Verdict::Phishing);
    }

    #[test]
    fn no_urls_is_clean() {
        let (urls, r) = analyzer().analyze("no links in here, just www.example.com");
        assert!(urls.is_empty());
        assert!(r.evidence.suspicious_urls.is_empty());
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.verdict, Verdict::Legitimate);
    }

    #[test]
    fn secure_plain_url_is_clean() {
        let (urls, r) = analyzer().analyze("docs at https://docs.rs/regex");
        assert_eq!(urls.len(), 1);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn each_heuristic_fires_independently() {
        let a = analyzer();
        assert!(a.is_suspicious("https://192.168.1.1/login"));
        assert!(a.is_suspicious("https://my-secure-bank-login-portal.com"));
        assert!(!a.is_suspicious("https://my-bank-login.com"));
        assert!(a.is_suspicious("https://TinyURL.com/x"));
        assert!(a.is_suspicious("http://example.com"));
        assert!(!a.is_suspicious("HTTPS://example.com"));
    }

    #[test]
    fn ip_check_is_anchored_to_host() {
        assert!(!analyzer().is_suspicious("https://example.com/?next=10.0.0.1"));
    }

    #[test]
    fn order_and_duplicates_preserved() {
        let text = "a https://b.com x HTTP://c.com y https://b.com";
        let (urls, r) = analyzer().analyze(text);
        assert_eq!(urls, vec!["https://b.com", "HTTP://c.com", "https://b.com"]);
        assert_eq!(r.evidence.suspicious_urls, vec!["HTTP://c.com"]);
    }

    #[test]
    fn confidence_saturates_at_one() {
        let text = "http://a http://b http://c http://d http://e";
        let (_, r) = analyzer().analyze(text);
        assert_eq!(r.confidence, 1.0);
        let (_, r3) = analyzer().analyze("http://a http://b http://c");
        assert_eq!(r3.confidence, 0.9);
    }
}
