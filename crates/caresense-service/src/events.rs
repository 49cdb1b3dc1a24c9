use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use caresense_core::models::assessment::AssessmentStatus;
use caresense_core::models::results::TestKind;
use caresense_core::models::risk::RiskCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringAction {
    AssessmentStarted,
    ResultSubmitted,
    AssessmentCompleted,
    AssessmentRecalculated,
    AssessmentCancelled,
}

impl ScoringAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssessmentStarted => "assessment_started",
            Self::ResultSubmitted => "result_submitted",
            Self::AssessmentCompleted => "assessment_completed",
            Self::AssessmentRecalculated => "assessment_recalculated",
            Self::AssessmentCancelled => "assessment_cancelled",
        }
    }
}

/// A structured workflow event, logged through `tracing` so it lands in
/// the same stream as the rest of the service output.
#[derive(Debug, Clone, Serialize)]
pub struct ScoringEvent {
    pub action: ScoringAction,
    pub assessment_id: Uuid,
    pub status: AssessmentStatus,
    pub test: Option<TestKind>,
    pub risk: Option<RiskCategory>,
}

impl ScoringEvent {
    pub fn new(action: ScoringAction, assessment_id: Uuid, status: AssessmentStatus) -> Self {
        Self {
            action,
            assessment_id,
            status,
            test: None,
            risk: None,
        }
    }

    pub fn with_test(mut self, test: TestKind) -> Self {
        self.test = Some(test);
        self
    }

    pub fn with_risk(mut self, risk: Option<RiskCategory>) -> Self {
        self.risk = risk;
        self
    }

    pub fn emit(&self) {
        info!(
            scoring.action = self.action.as_str(),
            scoring.assessment_id = %self.assessment_id,
            scoring.status = ?self.status,
            scoring.test = self.test.map(|t| t.as_str()),
            scoring.risk = self.risk.map(|r| r.as_str()),
            "scoring event"
        );
    }
}
