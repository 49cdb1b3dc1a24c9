//! caresense-instruments
//!
//! The normative scoring engine. Pure and synchronous, with no storage or AWS
//! dependency. Converts raw neuropsychological test results into
//! age/education-adjusted z-scores, folds them to a common polarity, and
//! classifies their mean into a risk category.

pub mod composite;
pub mod demographics;
pub mod engine;
pub mod error;
pub mod instruments;
pub mod norms;
pub mod report;
pub mod scoring;

use caresense_core::models::results::TestKind;

use demographics::Demographics;
use norms::NormativeEntry;
use scoring::{ScoreComponent, ValidationError};

/// Z-score of one component, with the inputs that produced it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, ts_rs::TS)]
#[ts(export)]
pub struct ComponentZ {
    pub component: ScoreComponent,
    pub raw_value: f64,
    pub norm: NormativeEntry,
    /// `(raw - mean) / sd`, as stored on the result record.
    pub raw_z: f64,
    /// Negative means deficit, regardless of the test's direction.
    pub normalized_z: f64,
}

/// Implemented once per supported neuropsychological test.
pub trait NeuroTest: Send + Sync {
    /// The result record this test reads and writes.
    type Result;

    fn kind(&self) -> TestKind;

    /// Human-readable name (e.g., "Trail-Making Test").
    fn name(&self) -> &str;

    /// Range checks on the raw input. Empty when the result is scorable.
    fn validate(&self, result: &Self::Result) -> Vec<ValidationError>;

    /// The raw value fed to the z-score for each component.
    fn raw_values(&self, result: &Self::Result) -> Vec<(ScoreComponent, f64)>;

    /// Literature norms used when the normative table has no data for the
    /// component.
    fn fallback_norm(
        &self,
        _component: ScoreComponent,
        _demographics: &Demographics,
    ) -> Option<NormativeEntry> {
        None
    }

    /// Final adjustment to a computed z-score before it is stored.
    fn finish_z(&self, z: f64) -> f64 {
        z
    }

    /// Write computed z-scores onto the record. Components missing from
    /// `scores` are cleared.
    fn store_scores(&self, result: &mut Self::Result, scores: &[ComponentZ]);
}

pub(crate) fn z_for(scores: &[ComponentZ], component: ScoreComponent) -> Option<f64> {
    scores
        .iter()
        .find(|s| s.component == component)
        .map(|s| s.raw_z)
}
