use thiserror::Error;
use uuid::Uuid;

use caresense_core::error::CoreError;
use caresense_core::models::results::TestKind;
use caresense_instruments::error::InstrumentError;
use caresense_instruments::scoring::ValidationError;
use caresense_storage::error::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error("assessment not found: {0}")]
    AssessmentNotFound(Uuid),

    #[error("assessment {0} is cancelled")]
    Closed(Uuid),

    #[error("invalid {kind} result ({} field error(s))", .errors.len())]
    Validation {
        kind: TestKind,
        errors: Vec<ValidationError>,
    },

    #[error("a {kind} result already exists for assessment {assessment_id}")]
    Duplicate {
        assessment_id: Uuid,
        kind: TestKind,
    },

    #[error("no scorable results for assessment {0}")]
    NoScores(Uuid),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
