// tests/thresholds.rs
//
// Boundary checks for the fusion policy: verdict cut, risk buckets,
// monotonicity and determinism of the weighted score.

use phishing_fusion_analyzer::detect::{
    DetectorResult, KeywordEvidence, SentimentEvidence, UrlEvidence, Verdict,
};
use phishing_fusion_analyzer::fusion::{DegradedWeighting, FusionEngine, FusionPolicy, RiskLevel};

fn rule(c: f64) -> DetectorResult<KeywordEvidence> {
    DetectorResult::new(Verdict::Legitimate, c, KeywordEvidence::default())
}

fn ai(c: f64) -> DetectorResult<SentimentEvidence> {
    DetectorResult::new(
        Verdict::Legitimate,
        c,
        SentimentEvidence {
            available: true,
            ..Default::default()
        },
    )
}

fn url(c: f64) -> DetectorResult<UrlEvidence> {
    DetectorResult::new(Verdict::Legitimate, c, UrlEvidence::default())
}

#[test]
fn verdict_threshold_is_inclusive() {
    let p = FusionPolicy::default();
    assert_eq!(p.verdict_for(0.50), Verdict::Phishing);
    assert_eq!(p.verdict_for(0.49), Verdict::Legitimate);

    // rule alone at full confidence lands exactly on the cut
    let e = FusionEngine::default();
    let r = e.fuse(&rule(1.0), &ai(0.0), &url(0.0));
    assert_eq!(r.final_score, 0.5);
    assert_eq!(r.final_verdict, Verdict::Phishing);
}

#[test]
fn risk_buckets_are_inclusive_at_lower_edge() {
    let p = FusionPolicy::default();
    assert_eq!(p.risk_for(0.75), RiskLevel::High);
    assert_eq!(p.risk_for(0.74), RiskLevel::Medium);
    assert_eq!(p.risk_for(0.40), RiskLevel::Medium);
    assert_eq!(p.risk_for(0.39), RiskLevel::Low);
    assert_eq!(p.risk_for(0.0), RiskLevel::Low);
    assert_eq!(p.risk_for(1.0), RiskLevel::High);
}

#[test]
fn all_zero_and_all_one_hit_the_extremes() {
    let e = FusionEngine::default();
    let lo = e.fuse(&rule(0.0), &ai(0.0), &url(0.0));
    assert_eq!(lo.final_score, 0.0);
    assert_eq!(lo.risk_level, RiskLevel::Low);

    let hi = e.fuse(&rule(1.0), &ai(1.0), &url(1.0));
    assert_eq!(hi.final_score, 1.0);
    assert_eq!(hi.final_verdict, Verdict::Phishing);
    assert_eq!(hi.risk_level, RiskLevel::High);
}

#[test]
fn score_is_monotonic_in_each_input() {
    let e = FusionEngine::default();
    let steps: Vec<f64> = (0..=20).map(|i| i as f64 * 0.05).collect();
    for &fixed in &[0.0, 0.3, 0.7, 1.0] {
        let mut prev = (-1.0, -1.0, -1.0);
        for &x in &steps {
            let by_rule = e.score(x, fixed, fixed, true);
            let by_ai = e.score(fixed, x, fixed, true);
            let by_url = e.score(fixed, fixed, x, true);
            assert!(by_rule >= prev.0, "rule {x} with {fixed}");
            assert!(by_ai >= prev.1, "ai {x} with {fixed}");
            assert!(by_url >= prev.2, "url {x} with {fixed}");
            assert!((0.0..=1.0).contains(&by_rule));
            prev = (by_rule, by_ai, by_url);
        }
    }
}

#[test]
fn fusion_is_deterministic() {
    let e = FusionEngine::default();
    let (r, a, u) = (rule(0.33), ai(0.87), url(0.6));
    let first = e.fuse(&r, &a, &u);
    for _ in 0..10 {
        assert_eq!(e.fuse(&r, &a, &u), first);
    }
}

#[test]
fn degraded_policies_differ_only_when_ai_is_down() {
    let keep = FusionEngine::new(FusionPolicy::default());
    let reweight = FusionEngine::new(FusionPolicy {
        degraded: DegradedWeighting::Reweight,
        ..FusionPolicy::default()
    });

    assert_eq!(
        keep.score(0.6, 0.8, 0.3, true),
        reweight.score(0.6, 0.8, 0.3, true)
    );

    // keep: 0.5*1.0 + 0.2*1.0; reweight: rule/url rescaled to 5/7 and 2/7
    assert_eq!(keep.score(1.0, 0.0, 1.0, false), 0.7);
    assert_eq!(reweight.score(1.0, 0.0, 1.0, false), 1.0);
}

#[test]
fn invalid_policies_are_rejected() {
    let bad_sum = FusionPolicy {
        rule_weight: 0.7,
        ..FusionPolicy::default()
    };
    assert!(bad_sum.validate().is_err());

    let inverted = FusionPolicy {
        risk_medium: 0.8,
        risk_high: 0.6,
        ..FusionPolicy::default()
    };
    assert!(inverted.validate().is_err());
}
