use caresense_core::models::results::{ClockDrawingResult, MeemResult};
use caresense_instruments::demographics::Demographics;
use caresense_instruments::instruments::clock_drawing::{self, ClockClassification};
use caresense_instruments::instruments::meem::{self, MeemInterpretation};

#[test]
fn meem_cutoffs_by_years_of_study() {
    assert_eq!(meem::cutoff_for_years(0), 20);
    assert_eq!(meem::cutoff_for_years(1), 25);
    assert_eq!(meem::cutoff_for_years(4), 25);
    assert_eq!(meem::cutoff_for_years(5), 26);
    assert_eq!(meem::cutoff_for_years(8), 26);
    assert_eq!(meem::cutoff_for_years(9), 28);
    assert_eq!(meem::cutoff_for_years(11), 28);
    assert_eq!(meem::cutoff_for_years(12), 29);
    assert_eq!(meem::cutoff_for_years(30), 29);
}

#[test]
fn meem_interpretation_bands() {
    assert_eq!(meem::interpret(30, 20), MeemInterpretation::Normal);
    assert_eq!(meem::interpret(20, 20), MeemInterpretation::Normal);
    assert_eq!(meem::interpret(19, 20), MeemInterpretation::MildImpairment);
    assert_eq!(meem::interpret(17, 20), MeemInterpretation::MildImpairment);
    assert_eq!(meem::interpret(16, 20), MeemInterpretation::ModerateImpairment);
    assert_eq!(meem::interpret(14, 20), MeemInterpretation::ModerateImpairment);
    assert_eq!(meem::interpret(13, 20), MeemInterpretation::SevereImpairment);
    assert_eq!(meem::interpret(10, 20), MeemInterpretation::SevereImpairment);
    assert_eq!(meem::interpret(9, 20), MeemInterpretation::RequiresFurtherEvaluation);
    assert_eq!(meem::interpret(0, 29), MeemInterpretation::RequiresFurtherEvaluation);
}

#[test]
fn meem_totals_and_summary() {
    let result = MeemResult {
        temporal_orientation: [true, true, false, true, true],
        spatial_orientation: [true; 5],
        immediate_memory: [true; 3],
        attention_calculation: [true, true, true, false, false],
        recall: [true, false, false],
        naming: [true; 2],
        repetition: true,
        verbal_command: [true; 3],
        written_command: true,
        write_sentence: false,
        copy_pentagons: true,
        z_score: None,
    };
    assert_eq!(result.total_score(), 24);

    let demographics = Demographics {
        age: 72,
        education_level: None,
        education_years: Some(10),
    };
    let summary = meem::summarize(&result, &demographics);
    assert_eq!(summary.cutoff, Some(28));
    assert_eq!(summary.interpretation, MeemInterpretation::ModerateImpairment);
    assert_eq!(summary.domain_scores.len(), 11);
    assert_eq!(summary.domain_scores[4], ("recall".to_string(), 1));
}

#[test]
fn clock_classification_cutoff() {
    assert_eq!(clock_drawing::classify(7), ClockClassification::Normal);
    assert_eq!(clock_drawing::classify(10), ClockClassification::Normal);
    assert_eq!(clock_drawing::classify(6), ClockClassification::Impaired);
    assert_eq!(clock_drawing::classify(0), ClockClassification::Impaired);

    let result = ClockDrawingResult {
        requested_time: "10:05".to_string(),
        circle_score: 2,
        numbers_score: 3,
        hands_score: 2,
        observations: Some("hesitant hand placement".to_string()),
        z_score: None,
    };
    let summary = clock_drawing::summarize(&result);
    assert_eq!(summary.total_score, 7);
    assert_eq!(summary.classification, ClockClassification::Normal);
}
