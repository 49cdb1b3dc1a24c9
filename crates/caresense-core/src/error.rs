use thiserror::Error;

use crate::models::assessment::AssessmentStatus;
use crate::models::results::TestKind;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: AssessmentStatus,
        to: AssessmentStatus,
    },

    #[error("a {0} result is already recorded for this assessment")]
    SlotOccupied(TestKind),
}
