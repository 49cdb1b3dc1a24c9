use approx::assert_abs_diff_eq;

use caresense_core::models::patient::EducationLevel;
use caresense_core::models::results::{
    AssessmentResults, ClockDrawingResult, DigitSpanResult, MeemResult, StroopResult, TestKind,
    TestResult, TmtResult,
};
use caresense_core::models::risk::RiskCategory;
use caresense_instruments::demographics::Demographics;
use caresense_instruments::engine::{EngineSettings, ScoringEngine};
use caresense_instruments::error::InstrumentError;
use caresense_instruments::norms::NormativeTable;
use caresense_instruments::scoring::ScoreComponent;

fn engine() -> ScoringEngine {
    ScoringEngine::new(NormativeTable::builtin(), EngineSettings::default())
}

fn high_education_65() -> Demographics {
    Demographics {
        age: 65,
        education_level: Some(EducationLevel::Graduacao),
        education_years: None,
    }
}

fn low_education_65() -> Demographics {
    Demographics {
        age: 65,
        education_level: Some(EducationLevel::Fundamental),
        education_years: None,
    }
}

fn tmt(time_a: f64, time_b: f64) -> TmtResult {
    TmtResult {
        time_a_seconds: time_a,
        errors_a: 1,
        time_b_seconds: time_b,
        errors_b: 3,
        z_score_a: None,
        z_score_b: None,
    }
}

fn digit_span(forward: u32, backward: u32) -> DigitSpanResult {
    DigitSpanResult {
        forward_score: forward,
        forward_span: 6,
        backward_score: backward,
        backward_span: 4,
        z_score: None,
    }
}

fn stroop(card_3: f64) -> StroopResult {
    StroopResult {
        card_1_time: 20.0,
        card_1_errors: 0,
        card_2_time: 25.0,
        card_2_errors: 0,
        card_3_time: card_3,
        card_3_errors: 2,
        z_score: None,
    }
}

fn perfect_meem() -> MeemResult {
    MeemResult {
        temporal_orientation: [true; 5],
        spatial_orientation: [true; 5],
        immediate_memory: [true; 3],
        attention_calculation: [true; 5],
        recall: [true; 3],
        naming: [true; 2],
        repetition: true,
        verbal_command: [true; 3],
        written_command: true,
        write_sentence: true,
        copy_pentagons: true,
        z_score: None,
    }
}

fn clock(circle: u32, numbers: u32, hands: u32) -> ClockDrawingResult {
    ClockDrawingResult {
        requested_time: "11:10".to_string(),
        circle_score: circle,
        numbers_score: numbers,
        hands_score: hands,
        observations: None,
        z_score: None,
    }
}

#[test]
fn tmt_a_marginally_slow_folds_negative() {
    let mut result = TestResult::Tmt(tmt(30.0, 70.1));
    let scores = engine()
        .score_test(&high_education_65(), &mut result)
        .expect("valid TMT");

    let a = scores
        .iter()
        .find(|s| s.component == ScoreComponent::TmtA)
        .expect("TMT-A scored");
    assert_abs_diff_eq!(a.raw_z, 0.0198, epsilon = 1e-4);
    assert_abs_diff_eq!(a.normalized_z, -0.0198, epsilon = 1e-4);

    let TestResult::Tmt(stored) = result else {
        panic!("kind changed");
    };
    assert_abs_diff_eq!(stored.z_score_a.expect("z a"), 0.0198, epsilon = 1e-4);
    assert_abs_diff_eq!(stored.z_score_b.expect("z b"), 0.0, epsilon = 1e-9);
}

#[test]
fn digit_span_above_average_stays_positive() {
    let mut result = TestResult::DigitSpan(digit_span(9, 7));
    let scores = engine()
        .score_test(&high_education_65(), &mut result)
        .expect("valid digit span");
    assert_eq!(scores.len(), 1);
    assert_abs_diff_eq!(scores[0].raw_z, 1.565, epsilon = 1e-3);
    assert_eq!(scores[0].raw_z, scores[0].normalized_z);
}

#[test]
fn stroop_only_assessment_is_critical() {
    // 45.2 + 2.2 * 12.3: raw z 2.2 against 60-69 low-education norms.
    let mut results = AssessmentResults {
        stroop: Some(stroop(72.26)),
        ..Default::default()
    };
    let card = engine().score_assessment(&low_education_65(), &mut results);
    let composite = card.composite.expect("stroop scored");
    assert_abs_diff_eq!(composite.mean_z, -2.2, epsilon = 1e-9);
    assert_eq!(composite.category, RiskCategory::Critical);
    assert_abs_diff_eq!(
        results.stroop.and_then(|s| s.z_score).expect("stored"),
        2.2,
        epsilon = 1e-9
    );
}

#[test]
fn meem_uses_education_fallback_norms() {
    let engine = engine();
    let mut high = TestResult::Meem(perfect_meem());
    let z_high = engine.score_test(&high_education_65(), &mut high).expect("meem")[0].raw_z;
    assert_abs_diff_eq!(z_high, (30.0 - 28.5) / 1.8, epsilon = 1e-9);

    let mut low = TestResult::Meem(perfect_meem());
    let z_low = engine.score_test(&low_education_65(), &mut low).expect("meem")[0].raw_z;
    assert_abs_diff_eq!(z_low, (30.0 - 25.2) / 2.3, epsilon = 1e-9);
}

#[test]
fn table_meem_norms_override_fallback() {
    let table = NormativeTable::from_json(
        r#"{"meem": {"60-69": {"high_education": {"mean": 27.0, "sd": 1.5}}}}"#,
    )
    .expect("table");
    let engine = ScoringEngine::new(table, EngineSettings::default());
    let mut result = TestResult::Meem(perfect_meem());
    let scores = engine.score_test(&high_education_65(), &mut result).expect("meem");
    assert_abs_diff_eq!(scores[0].raw_z, 2.0, epsilon = 1e-9);
}

#[test]
fn clock_drawing_defaults_missing_years_and_rounds() {
    let demographics = Demographics {
        age: 70,
        education_level: Some(EducationLevel::Graduacao),
        education_years: None,
    };
    let mut result = TestResult::ClockDrawing(clock(2, 3, 2));
    let scores = engine().score_test(&demographics, &mut result).expect("clock");
    // age < 75, <= 8 years assumed: mean 7.8, sd 1.5
    assert_eq!(scores[0].raw_z, -0.53);
    assert_eq!(scores[0].norm.mean, 7.8);
}

#[test]
fn clock_drawing_grid() {
    let engine = engine();
    let cases = [
        (60, 4, 8.5),
        (60, 12, 9.2),
        (72, 8, 7.8),
        (72, 9, 8.7),
        (80, 3, 7.2),
        (80, 16, 8.0),
    ];
    for (age, years, expected_mean) in cases {
        let demographics = Demographics {
            age,
            education_level: None,
            education_years: Some(years),
        };
        let mut result = TestResult::ClockDrawing(clock(2, 4, 4));
        let scores = engine.score_test(&demographics, &mut result).expect("clock");
        assert_eq!(scores[0].norm.mean, expected_mean, "age {age}, years {years}");
    }
}

#[test]
fn invalid_input_is_rejected() {
    let engine = engine();
    let mut result = TestResult::DigitSpan(digit_span(20, 5));
    let err = engine.score_test(&high_education_65(), &mut result).unwrap_err();
    match err {
        InstrumentError::Validation { kind, errors } => {
            assert_eq!(kind, TestKind::DigitSpan);
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "forward_score");
        }
        other => panic!("unexpected error: {other}"),
    }

    let mut negative = TestResult::Tmt(tmt(-1.0, f64::NAN));
    let errors = engine.validate(&negative);
    assert_eq!(errors.len(), 2);
    assert!(engine.score_test(&high_education_65(), &mut negative).is_err());

    assert_eq!(engine.validate(&TestResult::ClockDrawing(clock(3, 4, 4))).len(), 1);
}

#[test]
fn failed_test_is_skipped_not_fatal() {
    let mut results = AssessmentResults {
        digit_span: Some(digit_span(30, 30)),
        stroop: Some(stroop(72.26)),
        ..Default::default()
    };
    let card = engine().score_assessment(&low_education_65(), &mut results);
    assert_eq!(card.skipped.len(), 1);
    assert_eq!(card.skipped[0].0, TestKind::DigitSpan);
    assert_eq!(card.category(), Some(RiskCategory::Critical));
}

#[test]
fn full_assessment_composite_and_idempotent_recalculation() {
    let engine = engine();
    let demographics = high_education_65();
    let mut results = AssessmentResults {
        digit_span: Some(digit_span(9, 7)),
        tmt: Some(tmt(30.0, 70.1)),
        stroop: Some(stroop(35.8)),
        meem: Some(perfect_meem()),
        clock_drawing: Some(clock(2, 4, 4)),
    };

    let first = engine.score_assessment(&demographics, &mut results);
    assert_eq!(first.components.len(), 6);
    let snapshot = results.clone();
    let second = engine.score_assessment(&demographics, &mut results);

    assert_eq!(first.category(), Some(RiskCategory::Low));
    assert_eq!(first.category(), second.category());
    assert_eq!(snapshot, results);
    assert!(engine.is_complete(&results));
}

#[test]
fn empty_assessment_has_no_classification() {
    let mut results = AssessmentResults::default();
    let card = engine().score_assessment(&high_education_65(), &mut results);
    assert!(card.composite.is_none());
    assert!(card.components.is_empty());
}

#[test]
fn required_tests_drive_completeness() {
    let engine = engine();
    let results = AssessmentResults {
        digit_span: Some(digit_span(8, 6)),
        tmt: Some(tmt(40.0, 90.0)),
        stroop: Some(stroop(40.0)),
        ..Default::default()
    };
    assert!(!engine.is_complete(&results));
    assert_eq!(engine.missing_tests(&results), vec![TestKind::Meem]);
}

#[test]
fn report_describes_components() {
    let results = AssessmentResults {
        stroop: Some(stroop(72.26)),
        meem: Some(perfect_meem()),
        clock_drawing: Some(clock(1, 2, 3)),
        ..Default::default()
    };
    let report = engine().report(&low_education_65(), &results);

    assert_eq!(report.components.len(), 3);
    let stroop = &report.components[0];
    assert_eq!(stroop.component, ScoreComponent::Stroop);
    assert_eq!(stroop.percentile, 1);
    let meem = report.meem.expect("meem summary");
    assert_eq!(meem.total_score, 30);
    assert_eq!(meem.cutoff, None);
    let clock = report.clock_drawing.expect("clock summary");
    assert_eq!(clock.total_score, 6);
    // The input is not scored in place.
    assert_eq!(results.stroop.and_then(|s| s.z_score), None);
}

#[test]
fn report_skips_summary_of_invalid_clock() {
    let results = AssessmentResults {
        stroop: Some(stroop(40.0)),
        clock_drawing: Some(clock(u32::MAX, 4, 4)),
        ..Default::default()
    };
    let report = engine().report(&low_education_65(), &results);

    assert!(report.clock_drawing.is_none());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].0, TestKind::ClockDrawing);
    assert_eq!(report.components.len(), 1);
    assert!(report.composite.is_some());
}

#[test]
fn out_of_range_sub_scores_saturate() {
    assert_eq!(clock(u32::MAX, 4, 4).total_score(), u32::MAX);
    assert_eq!(digit_span(u32::MAX, 1).total_score(), u32::MAX);
}
