use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::risk::RiskCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum AssessmentStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl AssessmentStatus {
    /// PENDING moves to IN_PROGRESS on the first submitted result. Later
    /// submissions leave the status where it is.
    pub fn on_result_submitted(self) -> Result<Self, CoreError> {
        match self {
            Self::Pending => Ok(Self::InProgress),
            Self::InProgress | Self::Completed => Ok(self),
            Self::Cancelled => Err(CoreError::InvalidTransition {
                from: self,
                to: Self::InProgress,
            }),
        }
    }

    /// Completion is reachable from every non-cancelled state. Re-completing
    /// a COMPLETED assessment is how recalculation overwrites the risk score.
    pub fn complete(self) -> Result<Self, CoreError> {
        match self {
            Self::Cancelled => Err(CoreError::InvalidTransition {
                from: self,
                to: Self::Completed,
            }),
            _ => Ok(Self::Completed),
        }
    }

    pub fn cancel(self) -> Result<Self, CoreError> {
        match self {
            Self::Pending | Self::InProgress => Ok(Self::Cancelled),
            Self::Cancelled => Ok(self),
            Self::Completed => Err(CoreError::InvalidTransition {
                from: self,
                to: Self::Cancelled,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Assessment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub assessor: Option<String>,
    pub status: AssessmentStatus,
    pub final_risk_score: Option<RiskCategory>,
    pub created_at: jiff::Timestamp,
    pub completed_at: Option<jiff::Timestamp>,
}

impl Assessment {
    pub fn new(patient_id: Uuid, assessor: Option<String>, now: jiff::Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            assessor,
            status: AssessmentStatus::Pending,
            final_risk_score: None,
            created_at: now,
            completed_at: None,
        }
    }

    /// Store the composite risk and stamp completion.
    pub fn mark_completed(
        &mut self,
        risk: RiskCategory,
        at: jiff::Timestamp,
    ) -> Result<(), CoreError> {
        self.status = self.status.complete()?;
        self.final_risk_score = Some(risk);
        self.completed_at = Some(at);
        Ok(())
    }
}
