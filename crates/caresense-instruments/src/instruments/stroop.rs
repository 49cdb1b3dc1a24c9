use caresense_core::models::results::{StroopResult, TestKind};

use crate::scoring::{ScoreComponent, ValidationError};
use crate::{ComponentZ, NeuroTest, z_for};

/// Stroop color-word test, scored on the card 3 interference time.
pub struct Stroop;

impl NeuroTest for Stroop {
    type Result = StroopResult;

    fn kind(&self) -> TestKind {
        TestKind::Stroop
    }

    fn name(&self) -> &str {
        "Stroop"
    }

    fn validate(&self, result: &StroopResult) -> Vec<ValidationError> {
        [
            ("card_1_time", result.card_1_time),
            ("card_2_time", result.card_2_time),
            ("card_3_time", result.card_3_time),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            ValidationError::check_range(self.name(), field, value, 0.0, None)
        })
        .collect()
    }

    fn raw_values(&self, result: &StroopResult) -> Vec<(ScoreComponent, f64)> {
        vec![(ScoreComponent::Stroop, result.interference_time())]
    }

    fn store_scores(&self, result: &mut StroopResult, scores: &[ComponentZ]) {
        result.z_score = z_for(scores, ScoreComponent::Stroop);
    }
}
