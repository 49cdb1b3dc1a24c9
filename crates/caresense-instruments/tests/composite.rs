use caresense_core::models::risk::RiskCategory;
use caresense_instruments::ComponentZ;
use caresense_instruments::composite::{classify, composite, mean_z};
use caresense_instruments::norms::NormativeEntry;
use caresense_instruments::scoring::ScoreComponent;

fn scored(component: ScoreComponent, normalized_z: f64) -> ComponentZ {
    ComponentZ {
        component,
        raw_value: 0.0,
        norm: NormativeEntry::new(0.0, 1.0),
        raw_z: normalized_z,
        normalized_z,
    }
}

#[test]
fn classification_boundaries() {
    assert_eq!(classify(-2.0), RiskCategory::Critical);
    assert_eq!(classify(-2.7), RiskCategory::Critical);
    assert_eq!(classify(-1.999_999), RiskCategory::High);
    assert_eq!(classify(-1.5), RiskCategory::High);
    assert_eq!(classify(-1.499_999), RiskCategory::Moderate);
    assert_eq!(classify(-1.0), RiskCategory::Moderate);
    assert_eq!(classify(-0.999_999), RiskCategory::Low);
    assert_eq!(classify(1.2), RiskCategory::Low);
}

#[test]
fn no_scores_no_classification() {
    assert_eq!(mean_z(&[]), None);
    assert!(composite(&[]).is_none());
}

#[test]
fn single_critical_stroop() {
    let risk = composite(&[scored(ScoreComponent::Stroop, -2.2)]).expect("one score");
    assert_eq!(risk.mean_z, -2.2);
    assert_eq!(risk.category, RiskCategory::Critical);
}

#[test]
fn mean_is_unweighted_over_present_scores() {
    let scores = [
        scored(ScoreComponent::DigitSpan, -1.0),
        scored(ScoreComponent::TmtA, -2.0),
        scored(ScoreComponent::TmtB, -3.0),
    ];
    let risk = composite(&scores).expect("three scores");
    assert_eq!(risk.mean_z, -2.0);
    assert_eq!(risk.category, RiskCategory::Critical);
    assert_eq!(risk.contributions.len(), 3);
}

#[test]
fn non_finite_scores_are_dropped() {
    let scores = [
        scored(ScoreComponent::DigitSpan, f64::NAN),
        scored(ScoreComponent::Meem, -1.2),
    ];
    let risk = composite(&scores).expect("one finite score");
    assert_eq!(risk.mean_z, -1.2);
    assert_eq!(risk.category, RiskCategory::Moderate);
    assert_eq!(risk.contributions.len(), 1);
}
