//! S3 key/path conventions.
//!
//! Pure string functions with no AWS SDK dependency. These define the canonical
//! layout of objects in the CareSense S3 bucket.

use uuid::Uuid;

use crate::models::results::TestKind;

pub fn patient(id: Uuid) -> String {
    format!("patients/{id}.json")
}

pub fn assessment(id: Uuid) -> String {
    format!("assessments/{id}.json")
}

pub fn assessment_results_prefix(id: Uuid) -> String {
    format!("assessments/{id}/results/")
}

/// One object per test kind, so submissions of different tests never touch
/// the same key.
pub fn test_result(id: Uuid, kind: TestKind) -> String {
    format!("assessments/{id}/results/{}.json", kind.as_str())
}
