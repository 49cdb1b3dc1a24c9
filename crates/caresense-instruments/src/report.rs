use serde::Serialize;
use ts_rs::TS;

use caresense_core::models::results::{AssessmentResults, TestKind};

use crate::composite::CompositeRisk;
use crate::demographics::{AgeBracket, Demographics, EducationBracket};
use crate::engine::Scorecard;
use crate::instruments::{clock_drawing, meem};
use crate::scoring::{self, ScoreComponent, ZBand};

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ComponentReport {
    pub component: ScoreComponent,
    pub raw_value: f64,
    pub mean: f64,
    pub standard_deviation: f64,
    pub raw_z: f64,
    pub normalized_z: f64,
    pub band: ZBand,
    pub percentile: u8,
}

/// Everything a result screen shows for one assessment.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct AssessmentReport {
    pub age_bracket: AgeBracket,
    pub education_bracket: EducationBracket,
    pub components: Vec<ComponentReport>,
    pub skipped: Vec<(TestKind, String)>,
    pub composite: Option<CompositeRisk>,
    pub meem: Option<meem::MeemSummary>,
    pub clock_drawing: Option<clock_drawing::ClockSummary>,
}

impl AssessmentReport {
    pub fn build(
        demographics: &Demographics,
        results: &AssessmentResults,
        card: &Scorecard,
    ) -> Self {
        let components = card
            .components
            .iter()
            .map(|c| ComponentReport {
                component: c.component,
                raw_value: c.raw_value,
                mean: c.norm.mean,
                standard_deviation: c.norm.standard_deviation,
                raw_z: c.raw_z,
                normalized_z: c.normalized_z,
                band: ZBand::for_z(c.normalized_z),
                percentile: scoring::percentile(c.normalized_z),
            })
            .collect();

        // A result that failed validation gets no clinical summary.
        let scored = |kind: TestKind| card.skipped.iter().all(|(skipped, _)| *skipped != kind);

        Self {
            age_bracket: demographics.age_bracket(),
            education_bracket: demographics.education_bracket(),
            components,
            skipped: card.skipped.clone(),
            composite: card.composite.clone(),
            meem: results
                .meem
                .as_ref()
                .filter(|_| scored(TestKind::Meem))
                .map(|r| meem::summarize(r, demographics)),
            clock_drawing: results
                .clock_drawing
                .as_ref()
                .filter(|_| scored(TestKind::ClockDrawing))
                .map(clock_drawing::summarize),
        }
    }
}
