use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;

/// The neuropsychological tests an assessment can hold one result for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TestKind {
    DigitSpan,
    Tmt,
    Stroop,
    Meem,
    ClockDrawing,
}

impl TestKind {
    pub const ALL: [TestKind; 5] = [
        TestKind::DigitSpan,
        TestKind::Tmt,
        TestKind::Stroop,
        TestKind::Meem,
        TestKind::ClockDrawing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DigitSpan => "digit_span",
            Self::Tmt => "tmt",
            Self::Stroop => "stroop",
            Self::Meem => "meem",
            Self::ClockDrawing => "clock_drawing",
        }
    }
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Digit Span, forward and backward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DigitSpanResult {
    pub forward_score: u32,
    pub forward_span: u32,
    pub backward_score: u32,
    pub backward_span: u32,
    #[serde(default)]
    pub z_score: Option<f64>,
}

impl DigitSpanResult {
    pub fn total_score(&self) -> u32 {
        self.forward_score.saturating_add(self.backward_score)
    }
}

/// Trail-Making Test, parts A and B.
///
/// Error counts are recorded but do not enter the z-score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TmtResult {
    pub time_a_seconds: f64,
    #[serde(default)]
    pub errors_a: u32,
    pub time_b_seconds: f64,
    #[serde(default)]
    pub errors_b: u32,
    #[serde(default)]
    pub z_score_a: Option<f64>,
    #[serde(default)]
    pub z_score_b: Option<f64>,
}

/// Stroop color-word test, three cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StroopResult {
    pub card_1_time: f64,
    #[serde(default)]
    pub card_1_errors: u32,
    pub card_2_time: f64,
    #[serde(default)]
    pub card_2_errors: u32,
    pub card_3_time: f64,
    #[serde(default)]
    pub card_3_errors: u32,
    #[serde(default)]
    pub z_score: Option<f64>,
}

impl StroopResult {
    /// Card 3 (incongruent color-word) completion time.
    pub fn interference_time(&self) -> f64 {
        self.card_3_time
    }
}

/// Mini-Mental State Exam (MEEM), Folstein protocol: 30 binary items in
/// 11 sub-domains.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MeemResult {
    /// Weekday, day of month, month, year, hour.
    pub temporal_orientation: [bool; 5],
    /// Location, place, neighborhood, city, state.
    pub spatial_orientation: [bool; 5],
    pub immediate_memory: [bool; 3],
    /// Serial sevens from 100.
    pub attention_calculation: [bool; 5],
    pub recall: [bool; 3],
    pub naming: [bool; 2],
    pub repetition: bool,
    /// Take the sheet, fold it, put it on the floor.
    pub verbal_command: [bool; 3],
    pub written_command: bool,
    pub write_sentence: bool,
    pub copy_pentagons: bool,
    #[serde(default)]
    pub z_score: Option<f64>,
}

impl MeemResult {
    /// Points per sub-domain, in protocol order.
    pub fn domain_scores(&self) -> [(&'static str, u32); 11] {
        fn count(items: &[bool]) -> u32 {
            items.iter().filter(|&&hit| hit).count() as u32
        }
        [
            ("temporal_orientation", count(&self.temporal_orientation)),
            ("spatial_orientation", count(&self.spatial_orientation)),
            ("immediate_memory", count(&self.immediate_memory)),
            ("attention_calculation", count(&self.attention_calculation)),
            ("recall", count(&self.recall)),
            ("naming", count(&self.naming)),
            ("repetition", u32::from(self.repetition)),
            ("verbal_command", count(&self.verbal_command)),
            ("written_command", u32::from(self.written_command)),
            ("write_sentence", u32::from(self.write_sentence)),
            ("copy_pentagons", u32::from(self.copy_pentagons)),
        ]
    }

    /// Total score, 0–30.
    pub fn total_score(&self) -> u32 {
        self.domain_scores().iter().map(|(_, points)| points).sum()
    }
}

/// Clock Drawing Test, 10-point scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClockDrawingResult {
    /// Time the patient was asked to draw, e.g. "11:10".
    pub requested_time: String,
    pub circle_score: u32,
    pub numbers_score: u32,
    pub hands_score: u32,
    #[serde(default)]
    pub observations: Option<String>,
    #[serde(default)]
    pub z_score: Option<f64>,
}

impl ClockDrawingResult {
    /// Total score, 0–10.
    pub fn total_score(&self) -> u32 {
        self.circle_score
            .saturating_add(self.numbers_score)
            .saturating_add(self.hands_score)
    }
}

/// One test's recorded result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "test", rename_all = "snake_case")]
#[ts(export)]
pub enum TestResult {
    DigitSpan(DigitSpanResult),
    Tmt(TmtResult),
    Stroop(StroopResult),
    Meem(MeemResult),
    ClockDrawing(ClockDrawingResult),
}

impl TestResult {
    pub fn kind(&self) -> TestKind {
        match self {
            Self::DigitSpan(_) => TestKind::DigitSpan,
            Self::Tmt(_) => TestKind::Tmt,
            Self::Stroop(_) => TestKind::Stroop,
            Self::Meem(_) => TestKind::Meem,
            Self::ClockDrawing(_) => TestKind::ClockDrawing,
        }
    }
}

/// The stored form of a result: exactly one per (assessment, test kind).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TestRecord {
    pub assessment_id: Uuid,
    pub result: TestResult,
    pub created_at: jiff::Timestamp,
    /// Last time z-scores were written, by submission or recalculation.
    pub scored_at: Option<jiff::Timestamp>,
}

impl TestRecord {
    pub fn kind(&self) -> TestKind {
        self.result.kind()
    }
}

/// An assessment's results, one explicit slot per test kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AssessmentResults {
    pub digit_span: Option<DigitSpanResult>,
    pub tmt: Option<TmtResult>,
    pub stroop: Option<StroopResult>,
    pub meem: Option<MeemResult>,
    pub clock_drawing: Option<ClockDrawingResult>,
}

impl AssessmentResults {
    /// Place a result in its slot. An occupied slot is never overwritten.
    pub fn insert(&mut self, result: TestResult) -> Result<(), CoreError> {
        let kind = result.kind();
        if self.contains(kind) {
            return Err(CoreError::SlotOccupied(kind));
        }
        match result {
            TestResult::DigitSpan(r) => self.digit_span = Some(r),
            TestResult::Tmt(r) => self.tmt = Some(r),
            TestResult::Stroop(r) => self.stroop = Some(r),
            TestResult::Meem(r) => self.meem = Some(r),
            TestResult::ClockDrawing(r) => self.clock_drawing = Some(r),
        }
        Ok(())
    }

    pub fn contains(&self, kind: TestKind) -> bool {
        match kind {
            TestKind::DigitSpan => self.digit_span.is_some(),
            TestKind::Tmt => self.tmt.is_some(),
            TestKind::Stroop => self.stroop.is_some(),
            TestKind::Meem => self.meem.is_some(),
            TestKind::ClockDrawing => self.clock_drawing.is_some(),
        }
    }

    pub fn kinds(&self) -> Vec<TestKind> {
        TestKind::ALL
            .into_iter()
            .filter(|kind| self.contains(*kind))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }

    pub fn get(&self, kind: TestKind) -> Option<TestResult> {
        match kind {
            TestKind::DigitSpan => self.digit_span.clone().map(TestResult::DigitSpan),
            TestKind::Tmt => self.tmt.clone().map(TestResult::Tmt),
            TestKind::Stroop => self.stroop.clone().map(TestResult::Stroop),
            TestKind::Meem => self.meem.clone().map(TestResult::Meem),
            TestKind::ClockDrawing => self.clock_drawing.clone().map(TestResult::ClockDrawing),
        }
    }

    /// Owned results in `TestKind` order.
    pub fn to_vec(&self) -> Vec<TestResult> {
        TestKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind))
            .collect()
    }
}
