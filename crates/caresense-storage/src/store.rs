use std::future::Future;
use std::pin::Pin;

use caresense_core::models::assessment::Assessment;
use caresense_core::models::patient::Patient;
use caresense_core::models::results::TestRecord;
use uuid::Uuid;

use crate::error::StorageError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Repository seam between the assessment workflow and persistence.
///
/// `create_result` is the only write with a uniqueness guarantee: at most
/// one record per (assessment, test kind) ever succeeds, even under
/// concurrent submissions. Everything else is last-writer-wins.
pub trait AssessmentStore: Send + Sync {
    fn load_patient(&self, id: Uuid) -> BoxFuture<'_, Result<Patient, StorageError>>;

    fn save_patient<'a>(&'a self, patient: &'a Patient) -> BoxFuture<'a, Result<(), StorageError>>;

    fn load_assessment(&self, id: Uuid) -> BoxFuture<'_, Result<Assessment, StorageError>>;

    fn save_assessment<'a>(
        &'a self,
        assessment: &'a Assessment,
    ) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Fails with [`StorageError::AlreadyExists`] if a record for the same
    /// test kind is already stored on the assessment.
    fn create_result<'a>(&'a self, record: &'a TestRecord)
    -> BoxFuture<'a, Result<(), StorageError>>;

    /// Overwrite an existing record (used to persist z-scores).
    fn update_result<'a>(&'a self, record: &'a TestRecord)
    -> BoxFuture<'a, Result<(), StorageError>>;

    /// All records of an assessment, ordered by test kind.
    fn load_results(&self, assessment_id: Uuid)
    -> BoxFuture<'_, Result<Vec<TestRecord>, StorageError>>;
}
