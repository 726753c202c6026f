// tests/detectors.rs
//
// Handpicked inputs for the three detectors, exercised through the public API.

use std::sync::Arc;
use std::time::Duration;

use phishing_fusion_analyzer::detect::{
    KeywordDetector, SentimentProxyDetector, UrlAnalyzer, UrlHeuristics, Verdict,
};
use phishing_fusion_analyzer::oracle::{MockOracle, SentimentLabel};

#[test]
fn keywords_match_case_insensitively_on_raw_spacing() {
    let d = KeywordDetector::default();
    assert!(d.detect("confirm\nidentity").evidence.matched_keywords.is_empty());
    let r = d.detect("SECURITY ALERT: please Confirm Identity now");
    assert_eq!(r.evidence.matched_keywords, vec!["confirm identity", "security alert"]);
    assert_eq!(r.verdict, Verdict::Phishing);
    assert_eq!(r.confidence, 0.22);
}

#[test]
fn one_keyword_is_not_enough() {
    let d = KeywordDetector::default();
    let r = d.detect("Your password was changed yesterday.");
    assert_eq!(r.evidence.matched_keywords, vec!["password"]);
    assert_eq!(r.verdict, Verdict::Legitimate);
    assert_eq!(r.confidence, 0.11);
}

#[test]
fn repeated_keyword_counts_once() {
    let d = KeywordDetector::default();
    let r = d.detect("urgent urgent URGENT");
    assert_eq!(r.evidence.matched_keywords.len(), 1);
    assert_eq!(r.verdict, Verdict::Legitimate);
}

#[test]
fn custom_keyword_tables_are_independent() {
    let a = KeywordDetector::new(["wire transfer", "gift card"], 1);
    let b = KeywordDetector::default();
    let text = "Send the gift card codes today";
    assert_eq!(a.detect(text).verdict, Verdict::Phishing);
    assert_eq!(a.detect(text).confidence, 0.5);
    assert_eq!(b.detect(text).confidence, 0.0);
}

#[test]
fn url_heuristics_flag_each_rule() {
    let u = UrlAnalyzer::default();
    assert!(u.is_suspicious("http://example.com"), "insecure scheme");
    assert!(u.is_suspicious("https://bit.ly/abc"), "shortener");
    assert!(u.is_suspicious("https://TinyURL.com/x"), "shortener, any case");
    assert!(u.is_suspicious("https://10.0.0.1/login"), "ip host");
    assert!(u.is_suspicious("https://a-b-c-d-e.example.com"), "hyphens");
    assert!(!u.is_suspicious("https://my-bank.example.com/login"));
    // digits later in the URL are not an IP host
    assert!(!u.is_suspicious("https://example.com/v/1.2.3.4"));
}

#[test]
fn url_confidence_grows_per_suspicious_url_and_caps() {
    let u = UrlAnalyzer::default();
    let (_, r) = u.analyze("see https://example.com and http://a.test and https://bit.ly/x");
    assert_eq!(r.evidence.urls_found.len(), 3);
    assert_eq!(r.evidence.suspicious_urls.len(), 2);
    assert_eq!(r.confidence, 0.6);
    assert_eq!(r.verdict, Verdict::Phishing);

    let many = (0..5).map(|i| format!("http://x{i}.test")).collect::<Vec<_>>().join(" ");
    let (_, r) = u.analyze(&many);
    assert_eq!(r.confidence, 1.0);
}

#[test]
fn no_urls_means_clean_url_signal() {
    let u = UrlAnalyzer::new(UrlHeuristics::default());
    let (found, r) = u.analyze("nothing to see here, ftp://old.example is ignored");
    assert!(found.is_empty());
    assert_eq!(r.confidence, 0.0);
    assert_eq!(r.verdict, Verdict::Legitimate);
}

#[tokio::test]
async fn sentiment_needs_negative_label_score_and_indicator() {
    let strong = SentimentProxyDetector::with_oracle(Arc::new(MockOracle::new(
        SentimentLabel::Negative,
        0.95,
    )));
    let r = strong.detect("Login now or lose access").await.unwrap();
    assert_eq!(r.verdict, Verdict::Phishing);
    assert_eq!(r.confidence, 0.95);
    assert_eq!(r.evidence.indicator_hits, 1);

    // strong negative but no indicator words
    let r = strong.detect("This movie was terrible").await.unwrap();
    assert_eq!(r.verdict, Verdict::Legitimate);

    // threshold is strict: exactly 0.80 is not enough
    let edge = SentimentProxyDetector::new(
        Arc::new(MockOracle::new(SentimentLabel::Negative, 0.80)),
        ["verify"],
        0.80,
        1,
        Duration::from_secs(1),
    );
    let r = edge.detect("verify").await.unwrap();
    assert_eq!(r.verdict, Verdict::Legitimate);
    assert_eq!(r.confidence, 0.8);

    let positive = SentimentProxyDetector::with_oracle(Arc::new(MockOracle::new(
        SentimentLabel::Positive,
        0.99,
    )));
    let r = positive.detect("click to confirm your reward").await.unwrap();
    assert_eq!(r.verdict, Verdict::Legitimate);
    assert_eq!(r.confidence, 0.99);
}
