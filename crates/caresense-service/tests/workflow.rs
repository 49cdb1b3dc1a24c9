use std::sync::Arc;

use approx::assert_abs_diff_eq;
use jiff::Timestamp;
use jiff::civil::date;
use uuid::Uuid;

use caresense_core::error::CoreError;
use caresense_core::models::assessment::AssessmentStatus;
use caresense_core::models::patient::{EducationLevel, Patient};
use caresense_core::models::results::{
    DigitSpanResult, MeemResult, StroopResult, TestKind, TestResult, TmtResult,
};
use caresense_core::models::risk::RiskCategory;
use caresense_instruments::engine::{EngineSettings, ScoringEngine};
use caresense_instruments::norms::NormativeTable;
use caresense_service::AssessmentService;
use caresense_service::error::ServiceError;
use caresense_storage::memory::MemoryStore;
use caresense_storage::store::AssessmentStore;

fn patient(education: EducationLevel) -> Patient {
    Patient {
        id: Uuid::new_v4(),
        full_name: "Maria Aparecida".into(),
        birth_date: date(1959, 1, 15),
        education_level: Some(education),
        education_years: None,
        room_number: Some("12B".into()),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// Service with patients aged 65 on the evaluation date.
fn service() -> (AssessmentService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(ScoringEngine::new(
        NormativeTable::builtin(),
        EngineSettings::default(),
    ));
    let service = AssessmentService::new(store.clone(), engine)
        .with_evaluation_date(date(2024, 6, 1));
    (service, store)
}

async fn started(service: &AssessmentService, education: EducationLevel) -> Uuid {
    let patient = patient(education);
    service.register_patient(&patient).await.unwrap();
    service
        .start_assessment(patient.id, Some("enf. souza".into()))
        .await
        .unwrap()
        .id
}

fn tmt(time_a: f64) -> TestResult {
    TestResult::Tmt(TmtResult {
        time_a_seconds: time_a,
        errors_a: 0,
        time_b_seconds: 70.1,
        errors_b: 0,
        z_score_a: None,
        z_score_b: None,
    })
}

fn digit_span() -> TestResult {
    TestResult::DigitSpan(DigitSpanResult {
        forward_score: 6,
        forward_span: 5,
        backward_score: 6,
        backward_span: 4,
        z_score: None,
    })
}

fn stroop(card_3: f64) -> TestResult {
    TestResult::Stroop(StroopResult {
        card_1_time: 18.0,
        card_1_errors: 0,
        card_2_time: 24.0,
        card_2_errors: 1,
        card_3_time: card_3,
        card_3_errors: 2,
        z_score: None,
    })
}

fn meem() -> TestResult {
    TestResult::Meem(MeemResult {
        temporal_orientation: [true; 5],
        spatial_orientation: [true; 5],
        immediate_memory: [true; 3],
        attention_calculation: [true; 5],
        recall: [true; 3],
        naming: [true; 2],
        repetition: true,
        verbal_command: [true; 3],
        written_command: true,
        write_sentence: true,
        copy_pentagons: true,
        z_score: None,
    })
}

#[tokio::test]
async fn start_requires_known_patient() {
    let (service, _) = service();
    let missing = Uuid::new_v4();
    let err = service.start_assessment(missing, None).await.unwrap_err();
    assert!(matches!(err, ServiceError::PatientNotFound(id) if id == missing));
}

#[tokio::test]
async fn submit_to_unknown_assessment_is_not_found() {
    let (service, _) = service();
    let err = service.submit_result(Uuid::new_v4(), tmt(30.0)).await.unwrap_err();
    assert!(matches!(err, ServiceError::AssessmentNotFound(_)));
}

#[tokio::test]
async fn final_risk_for_unknown_assessment_is_not_found() {
    let (service, _) = service();
    let missing = Uuid::new_v4();

    let err = service.compute_final_risk(missing).await.unwrap_err();
    assert!(matches!(err, ServiceError::AssessmentNotFound(id) if id == missing));

    let err = service.recalculate(missing).await.unwrap_err();
    assert!(matches!(err, ServiceError::AssessmentNotFound(id) if id == missing));

    let err = service.complete_assessment(missing).await.unwrap_err();
    assert!(matches!(err, ServiceError::AssessmentNotFound(id) if id == missing));
}

#[tokio::test]
async fn first_submission_scores_and_moves_to_in_progress() {
    let (service, store) = service();
    let id = started(&service, EducationLevel::Graduacao).await;

    let submission = service.submit_result(id, tmt(30.0)).await.unwrap();
    assert_eq!(submission.status, AssessmentStatus::InProgress);
    assert_eq!(submission.final_risk, None);

    let TestResult::Tmt(scored) = &submission.record.result else {
        panic!("expected a tmt record");
    };
    // Records keep the raw z; the composite uses the polarity-normalized one.
    assert_abs_diff_eq!(scored.z_score_a.unwrap(), 0.0198, epsilon = 1e-4);
    assert!(submission.record.scored_at.is_some());

    let stored = store.load_assessment(id).await.unwrap();
    assert_eq!(stored.status, AssessmentStatus::InProgress);
}

#[tokio::test]
async fn duplicate_submission_keeps_original() {
    let (service, store) = service();
    let id = started(&service, EducationLevel::Graduacao).await;

    service.submit_result(id, tmt(30.0)).await.unwrap();
    let err = service.submit_result(id, tmt(95.0)).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Duplicate { kind: TestKind::Tmt, .. }
    ));

    let records = store.load_results(id).await.unwrap();
    assert_eq!(records.len(), 1);
    let TestResult::Tmt(kept) = &records[0].result else {
        panic!("expected a tmt record");
    };
    assert_eq!(kept.time_a_seconds, 30.0);
}

#[tokio::test]
async fn invalid_result_is_rejected_before_storage() {
    let (service, store) = service();
    let id = started(&service, EducationLevel::Graduacao).await;

    let err = service.submit_result(id, tmt(-4.0)).await.unwrap_err();
    match err {
        ServiceError::Validation { kind, errors } => {
            assert_eq!(kind, TestKind::Tmt);
            assert_eq!(errors[0].field, "time_a_seconds");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(store.load_results(id).await.unwrap().is_empty());
    let assessment = store.load_assessment(id).await.unwrap();
    assert_eq!(assessment.status, AssessmentStatus::Pending);
}

#[tokio::test]
async fn required_set_completes_automatically() {
    let (service, store) = service();
    let id = started(&service, EducationLevel::Graduacao).await;

    for result in [digit_span(), tmt(30.0), stroop(35.8)] {
        let submission = service.submit_result(id, result).await.unwrap();
        assert_eq!(submission.status, AssessmentStatus::InProgress);
    }
    let last = service.submit_result(id, meem()).await.unwrap();
    assert_eq!(last.status, AssessmentStatus::Completed);
    assert_eq!(last.final_risk, Some(RiskCategory::Low));

    let assessment = store.load_assessment(id).await.unwrap();
    assert_eq!(assessment.status, AssessmentStatus::Completed);
    assert_eq!(assessment.final_risk_score, Some(RiskCategory::Low));
    assert!(assessment.completed_at.is_some());
}

#[tokio::test]
async fn explicit_completion_accepts_partial_set() {
    let (service, store) = service();
    let id = started(&service, EducationLevel::Fundamental).await;

    // Low education, 60-69: mean 45.2, sd 12.3; z = 2.2, normalized -2.2.
    service.submit_result(id, stroop(72.26)).await.unwrap();
    let risk = service.complete_assessment(id).await.unwrap();
    assert_eq!(risk, RiskCategory::Critical);

    let records = store.load_results(id).await.unwrap();
    let TestResult::Stroop(scored) = &records[0].result else {
        panic!("expected a stroop record");
    };
    assert_abs_diff_eq!(scored.z_score.unwrap(), 2.2, epsilon = 1e-9);
}

#[tokio::test]
async fn completion_without_scores_leaves_assessment_open() {
    let (service, store) = service();
    let id = started(&service, EducationLevel::Graduacao).await;

    let err = service.complete_assessment(id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NoScores(_)));
    assert_eq!(service.compute_final_risk(id).await.unwrap(), None);

    let assessment = store.load_assessment(id).await.unwrap();
    assert_eq!(assessment.status, AssessmentStatus::Pending);
    assert_eq!(assessment.final_risk_score, None);
}

#[tokio::test]
async fn recalculation_is_idempotent() {
    let (service, store) = service();
    let id = started(&service, EducationLevel::Fundamental).await;
    service.submit_result(id, stroop(72.26)).await.unwrap();
    service.submit_result(id, tmt(30.0)).await.unwrap();

    let first = service.compute_final_risk(id).await.unwrap();
    let completed_at = store.load_assessment(id).await.unwrap().completed_at;
    let second = service.compute_final_risk(id).await.unwrap();
    assert_eq!(first, second);
    assert!(first.is_some());

    let report = service.recalculate(id).await.unwrap();
    assert_eq!(report.composite.map(|c| c.category), first);
    assert_eq!(store.load_assessment(id).await.unwrap().completed_at, completed_at);
}

#[tokio::test]
async fn cancelled_assessment_rejects_submissions() {
    let (service, _) = service();
    let id = started(&service, EducationLevel::Graduacao).await;

    let cancelled = service.cancel_assessment(id).await.unwrap();
    assert_eq!(cancelled.status, AssessmentStatus::Cancelled);

    let err = service.submit_result(id, tmt(30.0)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Closed(_)));
    assert!(matches!(
        service.compute_final_risk(id).await.unwrap_err(),
        ServiceError::Closed(_)
    ));
}

#[tokio::test]
async fn completed_assessment_cannot_be_cancelled() {
    let (service, _) = service();
    let id = started(&service, EducationLevel::Fundamental).await;
    service.submit_result(id, stroop(72.26)).await.unwrap();
    service.complete_assessment(id).await.unwrap();

    let err = service.cancel_assessment(id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Core(CoreError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn concurrent_submissions_of_different_tests_both_land() {
    let (service, store) = service();
    let service = Arc::new(service);
    let id = started(&service, EducationLevel::Graduacao).await;

    let a = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.submit_result(id, tmt(30.0)).await }
    });
    let b = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.submit_result(id, stroop(35.8)).await }
    });
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let kinds: Vec<TestKind> = store
        .load_results(id)
        .await
        .unwrap()
        .iter()
        .map(|r| r.kind())
        .collect();
    assert_eq!(kinds, vec![TestKind::Tmt, TestKind::Stroop]);
}

#[tokio::test]
async fn results_summary_reports_stored_scores() {
    let (service, _) = service();
    let id = started(&service, EducationLevel::Graduacao).await;
    service.submit_result(id, digit_span()).await.unwrap();

    let summary = service.results(id).await.unwrap();
    assert_eq!(summary.assessment.status, AssessmentStatus::InProgress);
    assert_eq!(summary.records.len(), 1);
    assert_eq!(summary.report.components.len(), 1);
    assert_abs_diff_eq!(
        summary.report.components[0].normalized_z,
        (12.0 - 12.4) / 2.3,
        epsilon = 1e-9
    );
}
