use std::sync::Arc;

use jiff::civil::Date;
use jiff::{Timestamp, Zoned};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use caresense_core::models::assessment::{Assessment, AssessmentStatus};
use caresense_core::models::patient::Patient;
use caresense_core::models::results::{AssessmentResults, TestKind, TestRecord, TestResult};
use caresense_core::models::risk::RiskCategory;
use caresense_instruments::demographics::Demographics;
use caresense_instruments::engine::{Scorecard, ScoringEngine};
use caresense_instruments::report::AssessmentReport;
use caresense_storage::error::StorageError;
use caresense_storage::store::AssessmentStore;

use crate::error::ServiceError;
use crate::events::{ScoringAction, ScoringEvent};

/// Outcome of a single result submission.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub record: TestRecord,
    pub status: AssessmentStatus,
    /// Set when this submission completed the required set and the
    /// composite was computed.
    pub final_risk: Option<RiskCategory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSummary {
    pub assessment: Assessment,
    pub records: Vec<TestRecord>,
    pub report: AssessmentReport,
}

/// A scored snapshot of one assessment.
struct Rescored {
    demographics: Demographics,
    results: AssessmentResults,
    card: Scorecard,
}

pub struct AssessmentService {
    store: Arc<dyn AssessmentStore>,
    engine: Arc<ScoringEngine>,
    evaluation_date: Option<Date>,
}

impl AssessmentService {
    pub fn new(store: Arc<dyn AssessmentStore>, engine: Arc<ScoringEngine>) -> Self {
        Self {
            store,
            engine,
            evaluation_date: None,
        }
    }

    /// Compute patient ages as of `date` instead of today.
    pub fn with_evaluation_date(mut self, date: Date) -> Self {
        self.evaluation_date = Some(date);
        self
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub async fn register_patient(&self, patient: &Patient) -> Result<(), ServiceError> {
        self.store.save_patient(patient).await?;
        info!(patient_id = %patient.id, "patient registered");
        Ok(())
    }

    pub async fn start_assessment(
        &self,
        patient_id: Uuid,
        assessor: Option<String>,
    ) -> Result<Assessment, ServiceError> {
        self.patient(patient_id).await?;
        let assessment = Assessment::new(patient_id, assessor, Timestamp::now());
        self.store.save_assessment(&assessment).await?;

        ScoringEvent::new(ScoringAction::AssessmentStarted, assessment.id, assessment.status).emit();
        Ok(assessment)
    }

    /// Record one test's result, scored at submission.
    ///
    /// A second result for the same test kind is rejected, never merged. Once
    /// every required kind is present the final risk is computed; a failure
    /// there is logged and leaves the submission itself in place.
    pub async fn submit_result(
        &self,
        assessment_id: Uuid,
        mut result: TestResult,
    ) -> Result<Submission, ServiceError> {
        let mut assessment = self.assessment(assessment_id).await?;
        if assessment.status == AssessmentStatus::Cancelled {
            return Err(ServiceError::Closed(assessment_id));
        }

        let kind = result.kind();
        let errors = self.engine.validate(&result);
        if !errors.is_empty() {
            return Err(ServiceError::Validation { kind, errors });
        }

        let patient = self.patient(assessment.patient_id).await?;
        let demographics = Demographics::from_patient(&patient, self.today());
        self.engine.score_test(&demographics, &mut result)?;

        let now = Timestamp::now();
        let record = TestRecord {
            assessment_id,
            result,
            created_at: now,
            scored_at: Some(now),
        };
        self.store
            .create_result(&record)
            .await
            .map_err(|e| match e {
                StorageError::AlreadyExists { .. } => ServiceError::Duplicate {
                    assessment_id,
                    kind,
                },
                other => ServiceError::Storage(other),
            })?;

        let next = assessment.status.on_result_submitted()?;
        if next != assessment.status {
            assessment.status = next;
            self.store.save_assessment(&assessment).await?;
        }
        ScoringEvent::new(ScoringAction::ResultSubmitted, assessment_id, assessment.status)
            .with_test(kind)
            .emit();

        let mut submission = Submission {
            record,
            status: assessment.status,
            final_risk: None,
        };

        if assessment.status != AssessmentStatus::Completed
            && self.has_required_set(assessment_id).await?
        {
            match self.compute_final_risk(assessment_id).await {
                Ok(Some(risk)) => {
                    submission.status = AssessmentStatus::Completed;
                    submission.final_risk = Some(risk);
                }
                Ok(None) => {
                    warn!(assessment_id = %assessment_id, "required tests present but nothing scorable");
                }
                Err(e) => {
                    warn!(assessment_id = %assessment_id, error = %e, "auto-completion failed");
                }
            }
        }

        Ok(submission)
    }

    /// Rescore every stored result from its raw values, write the z-scores
    /// back, and classify the composite.
    ///
    /// When a category results the assessment is marked completed with it.
    /// `None` means nothing was scorable; the assessment is left as is.
    /// Writes are per record and then the assessment, not one transaction.
    pub async fn compute_final_risk(
        &self,
        assessment_id: Uuid,
    ) -> Result<Option<RiskCategory>, ServiceError> {
        let mut assessment = self.assessment(assessment_id).await?;
        if assessment.status == AssessmentStatus::Cancelled {
            return Err(ServiceError::Closed(assessment_id));
        }

        let rescored = self.rescore(&assessment).await?;
        let Some(risk) = rescored.card.category() else {
            return Ok(None);
        };

        let was_completed = assessment.status == AssessmentStatus::Completed;
        let completed_at = assessment.completed_at.unwrap_or_else(Timestamp::now);
        assessment.mark_completed(risk, completed_at)?;
        self.store.save_assessment(&assessment).await?;

        let action = if was_completed {
            ScoringAction::AssessmentRecalculated
        } else {
            ScoringAction::AssessmentCompleted
        };
        ScoringEvent::new(action, assessment_id, assessment.status)
            .with_risk(Some(risk))
            .emit();
        Ok(Some(risk))
    }

    /// Re-run the full pipeline and return the fresh report.
    pub async fn recalculate(&self, assessment_id: Uuid) -> Result<AssessmentReport, ServiceError> {
        self.compute_final_risk(assessment_id).await?;
        let assessment = self.assessment(assessment_id).await?;
        let rescored = self.rescore_in_memory(&assessment).await?;
        Ok(AssessmentReport::build(
            &rescored.demographics,
            &rescored.results,
            &rescored.card,
        ))
    }

    /// Explicit completion; a partial set of tests is enough.
    pub async fn complete_assessment(&self, assessment_id: Uuid) -> Result<RiskCategory, ServiceError> {
        self.compute_final_risk(assessment_id)
            .await?
            .ok_or(ServiceError::NoScores(assessment_id))
    }

    pub async fn cancel_assessment(&self, assessment_id: Uuid) -> Result<Assessment, ServiceError> {
        let mut assessment = self.assessment(assessment_id).await?;
        let next = assessment.status.cancel()?;
        if next != assessment.status {
            assessment.status = next;
            self.store.save_assessment(&assessment).await?;
            ScoringEvent::new(ScoringAction::AssessmentCancelled, assessment_id, next).emit();
        }
        Ok(assessment)
    }

    /// Stored state plus a report over the stored results. Read-only.
    pub async fn results(&self, assessment_id: Uuid) -> Result<AssessmentSummary, ServiceError> {
        let assessment = self.assessment(assessment_id).await?;
        let records = self.store.load_results(assessment_id).await?;
        let rescored = self.rescore_in_memory(&assessment).await?;
        let report = AssessmentReport::build(
            &rescored.demographics,
            &rescored.results,
            &rescored.card,
        );
        Ok(AssessmentSummary {
            assessment,
            records,
            report,
        })
    }

    /// Score and persist each record's z-scores.
    async fn rescore(&self, assessment: &Assessment) -> Result<Rescored, ServiceError> {
        let mut records = self.store.load_results(assessment.id).await?;
        let rescored = self.score_records(assessment, &records).await?;

        let skipped: Vec<TestKind> = rescored.card.skipped.iter().map(|(kind, _)| *kind).collect();
        let now = Timestamp::now();
        for record in &mut records {
            let kind = record.kind();
            if skipped.contains(&kind) {
                continue;
            }
            if let Some(scored) = rescored.results.get(kind) {
                record.result = scored;
                record.scored_at = Some(now);
                self.store.update_result(record).await?;
            }
        }
        Ok(rescored)
    }

    async fn rescore_in_memory(&self, assessment: &Assessment) -> Result<Rescored, ServiceError> {
        let records = self.store.load_results(assessment.id).await?;
        self.score_records(assessment, &records).await
    }

    async fn score_records(
        &self,
        assessment: &Assessment,
        records: &[TestRecord],
    ) -> Result<Rescored, ServiceError> {
        let patient = self.patient(assessment.patient_id).await?;
        let demographics = Demographics::from_patient(&patient, self.today());

        let mut results = AssessmentResults::default();
        for record in records {
            results.insert(record.result.clone())?;
        }
        let card = self.engine.score_assessment(&demographics, &mut results);
        Ok(Rescored {
            demographics,
            results,
            card,
        })
    }

    async fn has_required_set(&self, assessment_id: Uuid) -> Result<bool, ServiceError> {
        let mut present = AssessmentResults::default();
        for record in self.store.load_results(assessment_id).await? {
            present.insert(record.result)?;
        }
        Ok(self.engine.is_complete(&present))
    }

    async fn assessment(&self, id: Uuid) -> Result<Assessment, ServiceError> {
        self.store.load_assessment(id).await.map_err(|e| {
            if e.is_not_found() {
                ServiceError::AssessmentNotFound(id)
            } else {
                e.into()
            }
        })
    }

    async fn patient(&self, id: Uuid) -> Result<Patient, ServiceError> {
        self.store.load_patient(id).await.map_err(|e| {
            if e.is_not_found() {
                ServiceError::PatientNotFound(id)
            } else {
                e.into()
            }
        })
    }

    fn today(&self) -> Date {
        self.evaluation_date.unwrap_or_else(|| Zoned::now().date())
    }
}
