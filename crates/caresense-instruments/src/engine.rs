use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use caresense_core::models::results::{AssessmentResults, TestKind, TestResult};
use caresense_core::models::risk::RiskCategory;

use crate::composite::{self, CompositeRisk};
use crate::demographics::Demographics;
use crate::error::InstrumentError;
use crate::instruments::{
    clock_drawing::ClockDrawing, digit_span::DigitSpan, meem::Meem, stroop::Stroop, tmt::Tmt,
};
use crate::norms::{NormativeEntry, NormativeTable};
use crate::report::AssessmentReport;
use crate::scoring::{self, ScoreComponent, ValidationError};
use crate::{ComponentZ, NeuroTest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Test kinds that must all be present before an assessment completes
    /// on its own.
    pub required_tests: Vec<TestKind>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            required_tests: vec![
                TestKind::DigitSpan,
                TestKind::Tmt,
                TestKind::Stroop,
                TestKind::Meem,
            ],
        }
    }
}

/// The outcome of scoring a set of results.
#[derive(Debug, Clone, Default)]
pub struct Scorecard {
    pub components: Vec<ComponentZ>,
    /// Tests that could not be scored, with the reason.
    pub skipped: Vec<(TestKind, String)>,
    pub composite: Option<CompositeRisk>,
}

impl Scorecard {
    pub fn category(&self) -> Option<RiskCategory> {
        self.composite.as_ref().map(|c| c.category)
    }
}

/// Scores results against one normative table. Built once at startup and
/// shared read-only.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    norms: NormativeTable,
    settings: EngineSettings,
}

impl ScoringEngine {
    pub fn new(norms: NormativeTable, settings: EngineSettings) -> Self {
        Self { norms, settings }
    }

    pub fn norms(&self) -> &NormativeTable {
        &self.norms
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Whether every required test kind has a result.
    pub fn is_complete(&self, results: &AssessmentResults) -> bool {
        self.settings
            .required_tests
            .iter()
            .all(|kind| results.contains(*kind))
    }

    pub fn missing_tests(&self, results: &AssessmentResults) -> Vec<TestKind> {
        self.settings
            .required_tests
            .iter()
            .copied()
            .filter(|kind| !results.contains(*kind))
            .collect()
    }

    pub fn validate(&self, result: &TestResult) -> Vec<ValidationError> {
        match result {
            TestResult::DigitSpan(r) => DigitSpan.validate(r),
            TestResult::Tmt(r) => Tmt.validate(r),
            TestResult::Stroop(r) => Stroop.validate(r),
            TestResult::Meem(r) => Meem.validate(r),
            TestResult::ClockDrawing(r) => ClockDrawing.validate(r),
        }
    }

    /// Compute one test's z-score(s), writing them onto the record.
    pub fn score_test(
        &self,
        demographics: &Demographics,
        result: &mut TestResult,
    ) -> Result<Vec<ComponentZ>, InstrumentError> {
        match result {
            TestResult::DigitSpan(r) => self.run(&DigitSpan, r, demographics),
            TestResult::Tmt(r) => self.run(&Tmt, r, demographics),
            TestResult::Stroop(r) => self.run(&Stroop, r, demographics),
            TestResult::Meem(r) => self.run(&Meem, r, demographics),
            TestResult::ClockDrawing(r) => self.run(&ClockDrawing, r, demographics),
        }
    }

    /// Score every test in `results` in place and classify the composite.
    /// A test that fails to score is skipped, not fatal.
    pub fn score_assessment(
        &self,
        demographics: &Demographics,
        results: &mut AssessmentResults,
    ) -> Scorecard {
        let mut card = Scorecard::default();
        let outcomes = [
            (
                TestKind::DigitSpan,
                results.digit_span.as_mut().map(|r| self.run(&DigitSpan, r, demographics)),
            ),
            (
                TestKind::Tmt,
                results.tmt.as_mut().map(|r| self.run(&Tmt, r, demographics)),
            ),
            (
                TestKind::Stroop,
                results.stroop.as_mut().map(|r| self.run(&Stroop, r, demographics)),
            ),
            (
                TestKind::Meem,
                results.meem.as_mut().map(|r| self.run(&Meem, r, demographics)),
            ),
            (
                TestKind::ClockDrawing,
                results
                    .clock_drawing
                    .as_mut()
                    .map(|r| self.run(&ClockDrawing, r, demographics)),
            ),
        ];
        for (kind, outcome) in outcomes {
            match outcome {
                Some(Ok(scores)) => card.components.extend(scores),
                Some(Err(e)) => {
                    warn!(test = %kind, error = %e, "skipping test in composite");
                    card.skipped.push((kind, e.to_string()));
                }
                None => {}
            }
        }
        card.composite = composite::composite(&card.components);
        card
    }

    /// Score a copy of `results` and describe it; the input is untouched.
    pub fn report(
        &self,
        demographics: &Demographics,
        results: &AssessmentResults,
    ) -> AssessmentReport {
        let mut scored = results.clone();
        let card = self.score_assessment(demographics, &mut scored);
        AssessmentReport::build(demographics, &scored, &card)
    }

    fn run<T: NeuroTest>(
        &self,
        test: &T,
        result: &mut T::Result,
        demographics: &Demographics,
    ) -> Result<Vec<ComponentZ>, InstrumentError> {
        let errors = test.validate(result);
        if !errors.is_empty() {
            return Err(InstrumentError::Validation {
                kind: test.kind(),
                errors,
            });
        }

        let mut scores = Vec::new();
        for (component, raw_value) in test.raw_values(result) {
            let Some(norm) = self.resolve_norm(test, component, demographics) else {
                warn!(component = %component, "no normative data for component, leaving unscored");
                continue;
            };
            let raw_z = test.finish_z(scoring::z_score(
                raw_value,
                norm.mean,
                norm.standard_deviation,
            ));
            let normalized_z = scoring::normalize(raw_z, component.polarity());
            debug!(
                component = %component,
                raw_value,
                mean = norm.mean,
                sd = norm.standard_deviation,
                raw_z,
                normalized_z,
                "component scored"
            );
            scores.push(ComponentZ {
                component,
                raw_value,
                norm,
                raw_z,
                normalized_z,
            });
        }
        test.store_scores(result, &scores);
        Ok(scores)
    }

    /// Table data wins over an adapter's fallback constants.
    fn resolve_norm<T: NeuroTest>(
        &self,
        test: &T,
        component: ScoreComponent,
        demographics: &Demographics,
    ) -> Option<NormativeEntry> {
        self.norms
            .lookup(
                component,
                demographics.age_bracket(),
                demographics.education_bracket(),
            )
            .or_else(|| test.fallback_norm(component, demographics))
    }
}
