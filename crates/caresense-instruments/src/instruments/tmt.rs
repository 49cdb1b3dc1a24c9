use caresense_core::models::results::{TestKind, TmtResult};

use crate::scoring::{ScoreComponent, ValidationError};
use crate::{ComponentZ, NeuroTest, z_for};

/// Trail-Making Test. Parts A and B are scored separately on completion
/// time; error counts are kept on the record only.
pub struct Tmt;

impl NeuroTest for Tmt {
    type Result = TmtResult;

    fn kind(&self) -> TestKind {
        TestKind::Tmt
    }

    fn name(&self) -> &str {
        "Trail-Making Test"
    }

    fn validate(&self, result: &TmtResult) -> Vec<ValidationError> {
        [
            ("time_a_seconds", result.time_a_seconds),
            ("time_b_seconds", result.time_b_seconds),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            ValidationError::check_range(self.name(), field, value, 0.0, None)
        })
        .collect()
    }

    fn raw_values(&self, result: &TmtResult) -> Vec<(ScoreComponent, f64)> {
        vec![
            (ScoreComponent::TmtA, result.time_a_seconds),
            (ScoreComponent::TmtB, result.time_b_seconds),
        ]
    }

    fn store_scores(&self, result: &mut TmtResult, scores: &[ComponentZ]) {
        result.z_score_a = z_for(scores, ScoreComponent::TmtA);
        result.z_score_b = z_for(scores, ScoreComponent::TmtB);
    }
}
