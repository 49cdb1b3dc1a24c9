use std::collections::{BTreeMap, HashMap};

use caresense_core::models::assessment::Assessment;
use caresense_core::models::patient::Patient;
use caresense_core::models::results::{TestKind, TestRecord};
use caresense_core::s3_keys;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StorageError;
use crate::store::{AssessmentStore, BoxFuture};

/// In-process store for tests and offline scoring.
///
/// A single lock guards every table, so the existence check and insert in
/// `create_result` are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    patients: HashMap<Uuid, Patient>,
    assessments: HashMap<Uuid, Assessment>,
    results: BTreeMap<(Uuid, TestKind), TestRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssessmentStore for MemoryStore {
    fn load_patient(&self, id: Uuid) -> BoxFuture<'_, Result<Patient, StorageError>> {
        Box::pin(async move {
            let tables = self.inner.lock().await;
            tables
                .patients
                .get(&id)
                .cloned()
                .ok_or_else(|| StorageError::NotFound {
                    key: s3_keys::patient(id),
                })
        })
    }

    fn save_patient<'a>(&'a self, patient: &'a Patient) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let mut tables = self.inner.lock().await;
            tables.patients.insert(patient.id, patient.clone());
            Ok(())
        })
    }

    fn load_assessment(&self, id: Uuid) -> BoxFuture<'_, Result<Assessment, StorageError>> {
        Box::pin(async move {
            let tables = self.inner.lock().await;
            tables
                .assessments
                .get(&id)
                .cloned()
                .ok_or_else(|| StorageError::NotFound {
                    key: s3_keys::assessment(id),
                })
        })
    }

    fn save_assessment<'a>(
        &'a self,
        assessment: &'a Assessment,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let mut tables = self.inner.lock().await;
            tables.assessments.insert(assessment.id, assessment.clone());
            Ok(())
        })
    }

    fn create_result<'a>(
        &'a self,
        record: &'a TestRecord,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let slot = (record.assessment_id, record.kind());
            let mut tables = self.inner.lock().await;
            if tables.results.contains_key(&slot) {
                return Err(StorageError::AlreadyExists {
                    key: s3_keys::test_result(slot.0, slot.1),
                });
            }
            tables.results.insert(slot, record.clone());
            Ok(())
        })
    }

    fn update_result<'a>(
        &'a self,
        record: &'a TestRecord,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let slot = (record.assessment_id, record.kind());
            let mut tables = self.inner.lock().await;
            match tables.results.get_mut(&slot) {
                Some(existing) => {
                    *existing = record.clone();
                    Ok(())
                }
                None => Err(StorageError::NotFound {
                    key: s3_keys::test_result(slot.0, slot.1),
                }),
            }
        })
    }

    fn load_results(
        &self,
        assessment_id: Uuid,
    ) -> BoxFuture<'_, Result<Vec<TestRecord>, StorageError>> {
        Box::pin(async move {
            let tables = self.inner.lock().await;
            Ok(tables
                .results
                .range((assessment_id, TestKind::DigitSpan)..=(assessment_id, TestKind::ClockDrawing))
                .map(|(_, record)| record.clone())
                .collect())
        })
    }
}
