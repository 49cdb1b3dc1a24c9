use caresense_core::models::results::{DigitSpanResult, TestKind};

use crate::scoring::{ScoreComponent, ValidationError};
use crate::{ComponentZ, NeuroTest, z_for};

/// Digit Span: forward plus backward score; higher is better.
pub struct DigitSpan;

impl NeuroTest for DigitSpan {
    type Result = DigitSpanResult;

    fn kind(&self) -> TestKind {
        TestKind::DigitSpan
    }

    fn name(&self) -> &str {
        "Digit Span"
    }

    fn validate(&self, result: &DigitSpanResult) -> Vec<ValidationError> {
        let fields = [
            ("forward_score", result.forward_score, 0.0, 16.0),
            ("forward_span", result.forward_span, 3.0, 9.0),
            ("backward_score", result.backward_score, 0.0, 14.0),
            ("backward_span", result.backward_span, 2.0, 8.0),
        ];
        fields
            .into_iter()
            .filter_map(|(field, value, min, max)| {
                ValidationError::check_range(self.name(), field, f64::from(value), min, Some(max))
            })
            .collect()
    }

    fn raw_values(&self, result: &DigitSpanResult) -> Vec<(ScoreComponent, f64)> {
        vec![(ScoreComponent::DigitSpan, f64::from(result.total_score()))]
    }

    fn store_scores(&self, result: &mut DigitSpanResult, scores: &[ComponentZ]) {
        result.z_score = z_for(scores, ScoreComponent::DigitSpan);
    }
}
