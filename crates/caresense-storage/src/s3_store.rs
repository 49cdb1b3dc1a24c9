use aws_sdk_s3::Client;
use caresense_core::models::assessment::Assessment;
use caresense_core::models::patient::Patient;
use caresense_core::models::results::TestRecord;
use caresense_core::s3_keys;
use uuid::Uuid;

use crate::error::StorageError;
use crate::objects;
use crate::state;
use crate::store::{AssessmentStore, BoxFuture};

/// One JSON object per patient, assessment and test record in a single
/// bucket. Result uniqueness rides on S3 conditional writes.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl AssessmentStore for S3Store {
    fn load_patient(&self, id: Uuid) -> BoxFuture<'_, Result<Patient, StorageError>> {
        Box::pin(async move { state::load_json(&self.client, &self.bucket, &s3_keys::patient(id)).await })
    }

    fn save_patient<'a>(&'a self, patient: &'a Patient) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            state::save_json(&self.client, &self.bucket, &s3_keys::patient(patient.id), patient).await
        })
    }

    fn load_assessment(&self, id: Uuid) -> BoxFuture<'_, Result<Assessment, StorageError>> {
        Box::pin(async move {
            state::load_json(&self.client, &self.bucket, &s3_keys::assessment(id)).await
        })
    }

    fn save_assessment<'a>(
        &'a self,
        assessment: &'a Assessment,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let key = s3_keys::assessment(assessment.id);
            state::save_json(&self.client, &self.bucket, &key, assessment).await
        })
    }

    fn create_result<'a>(
        &'a self,
        record: &'a TestRecord,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let key = s3_keys::test_result(record.assessment_id, record.kind());
            state::create_json(&self.client, &self.bucket, &key, record).await?;
            tracing::debug!(key = %key, "stored test result");
            Ok(())
        })
    }

    fn update_result<'a>(
        &'a self,
        record: &'a TestRecord,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let key = s3_keys::test_result(record.assessment_id, record.kind());
            state::save_json(&self.client, &self.bucket, &key, record).await
        })
    }

    fn load_results(
        &self,
        assessment_id: Uuid,
    ) -> BoxFuture<'_, Result<Vec<TestRecord>, StorageError>> {
        Box::pin(async move {
            let prefix = s3_keys::assessment_results_prefix(assessment_id);
            let keys = objects::list_keys(&self.client, &self.bucket, &prefix).await?;

            let mut records = Vec::with_capacity(keys.len());
            for key in keys.iter().filter(|k| k.ends_with(".json")) {
                match state::load_json::<TestRecord>(&self.client, &self.bucket, key).await {
                    Ok(record) => records.push(record),
                    // Listed then removed between calls.
                    Err(e) if e.is_not_found() => continue,
                    Err(e) => return Err(e),
                }
            }
            records.sort_by_key(TestRecord::kind);
            Ok(records)
        })
    }
}
