use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use caresense_core::models::results::{ClockDrawingResult, TestKind};

use crate::demographics::Demographics;
use crate::norms::NormativeEntry;
use crate::scoring::{ScoreComponent, ValidationError};
use crate::{ComponentZ, NeuroTest, z_for};

/// Years of study assumed when the patient record has none.
pub const DEFAULT_EDUCATION_YEARS: u8 = 8;

/// Totals above this are normal.
pub const NORMAL_CUTOFF: u32 = 6;

/// Clock Drawing Test, 0–10; higher is better.
pub struct ClockDrawing;

impl NeuroTest for ClockDrawing {
    type Result = ClockDrawingResult;

    fn kind(&self) -> TestKind {
        TestKind::ClockDrawing
    }

    fn name(&self) -> &str {
        "Clock Drawing Test"
    }

    fn validate(&self, result: &ClockDrawingResult) -> Vec<ValidationError> {
        [
            ("circle_score", result.circle_score, 2.0),
            ("numbers_score", result.numbers_score, 4.0),
            ("hands_score", result.hands_score, 4.0),
        ]
        .into_iter()
        .filter_map(|(field, value, max)| {
            ValidationError::check_range(self.name(), field, f64::from(value), 0.0, Some(max))
        })
        .collect()
    }

    fn raw_values(&self, result: &ClockDrawingResult) -> Vec<(ScoreComponent, f64)> {
        vec![(ScoreComponent::ClockDrawing, f64::from(result.total_score()))]
    }

    /// Cacho-Gutiérrez et al. (1999) approximations by age band and
    /// legacy years of study.
    fn fallback_norm(
        &self,
        _component: ScoreComponent,
        demographics: &Demographics,
    ) -> Option<NormativeEntry> {
        let years = demographics.education_years.unwrap_or_else(|| {
            warn!(
                default_years = DEFAULT_EDUCATION_YEARS,
                "education years unknown for clock drawing norms, using default"
            );
            DEFAULT_EDUCATION_YEARS
        });
        let schooled = years > 8;
        let (mean, sd) = match (demographics.age, schooled) {
            (age, false) if age < 65 => (8.5, 1.2),
            (age, true) if age < 65 => (9.2, 0.9),
            (age, false) if age < 75 => (7.8, 1.5),
            (age, true) if age < 75 => (8.7, 1.1),
            (_, false) => (7.2, 1.8),
            (_, true) => (8.0, 1.4),
        };
        Some(NormativeEntry::new(mean, sd))
    }

    fn finish_z(&self, z: f64) -> f64 {
        (z * 100.0).round() / 100.0
    }

    fn store_scores(&self, result: &mut ClockDrawingResult, scores: &[ComponentZ]) {
        result.z_score = z_for(scores, ScoreComponent::ClockDrawing);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ClockClassification {
    Normal,
    Impaired,
}

pub fn classify(total_score: u32) -> ClockClassification {
    if total_score > NORMAL_CUTOFF {
        ClockClassification::Normal
    } else {
        ClockClassification::Impaired
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ClockSummary {
    pub total_score: u32,
    pub classification: ClockClassification,
}

pub fn summarize(result: &ClockDrawingResult) -> ClockSummary {
    let total_score = result.total_score();
    ClockSummary {
        total_score,
        classification: classify(total_score),
    }
}
