use std::path::Path;
use std::sync::Arc;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use caresense_core::models::patient::Patient;
use caresense_core::models::results::TestResult;
use caresense_instruments::engine::ScoringEngine;
use caresense_instruments::norms::NormativeTable;
use caresense_service::error::ServiceError;
use caresense_service::{AssessmentService, AssessmentSummary};
use caresense_storage::memory::MemoryStore;
use caresense_storage::s3_store::S3Store;

use crate::args::Command;
use crate::config::{self, CareSenseConfig};

/// Input to `caresense score`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreBundle {
    pub patient: Patient,
    pub results: Vec<TestResult>,
    #[serde(default)]
    pub assessor: Option<String>,
    /// Date ages are computed on; today when absent.
    #[serde(default)]
    pub evaluated_on: Option<Date>,
}

pub fn build_engine(config: &CareSenseConfig) -> ScoringEngine {
    let norms = NormativeTable::load_or_builtin(config.norms_path.as_deref());
    ScoringEngine::new(norms, config.engine_settings())
}

/// Run a bundle through the full workflow against an in-memory store.
pub async fn score_bundle(
    engine: Arc<ScoringEngine>,
    bundle: ScoreBundle,
) -> eyre::Result<AssessmentSummary> {
    let mut service = AssessmentService::new(Arc::new(MemoryStore::new()), engine);
    if let Some(date) = bundle.evaluated_on {
        service = service.with_evaluation_date(date);
    }

    service.register_patient(&bundle.patient).await?;
    let assessment = service
        .start_assessment(bundle.patient.id, bundle.assessor)
        .await?;
    for result in bundle.results {
        service.submit_result(assessment.id, result).await?;
    }

    match service.complete_assessment(assessment.id).await {
        Ok(_) | Err(ServiceError::NoScores(_)) => {}
        Err(e) => return Err(e.into()),
    }
    Ok(service.results(assessment.id).await?)
}

#[derive(Debug, Serialize)]
struct NormsListing<'a> {
    source: &'a caresense_instruments::norms::NormSource,
    table: serde_json::Value,
}

async fn s3_service(
    config: &CareSenseConfig,
    engine: Arc<ScoringEngine>,
) -> eyre::Result<AssessmentService> {
    let bucket = config.require_bucket()?;
    let client = caresense_storage::client::build_client(config.region.clone()).await;
    let store = S3Store::new(client, bucket);
    Ok(AssessmentService::new(Arc::new(store), engine))
}

fn print_json<T: Serialize>(value: &T) -> eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(command: Command, config: CareSenseConfig, config_path: &Path) -> eyre::Result<()> {
    match command {
        Command::Score { bundle } => {
            let contents = std::fs::read_to_string(&bundle)
                .map_err(|e| eyre::eyre!("failed to read bundle at {}: {e}", bundle.display()))?;
            let bundle: ScoreBundle = serde_json::from_str(&contents)?;
            let engine = Arc::new(build_engine(&config));
            print_json(&score_bundle(engine, bundle).await?)
        }
        Command::Norms => {
            let engine = build_engine(&config);
            print_json(&NormsListing {
                source: engine.norms().source(),
                table: engine.norms().to_json_value(),
            })
        }
        Command::Recalculate { assessment_id } => {
            let service = s3_service(&config, Arc::new(build_engine(&config))).await?;
            print_json(&service.recalculate(assessment_id).await?)
        }
        Command::Complete { assessment_id } => {
            let service = s3_service(&config, Arc::new(build_engine(&config))).await?;
            let risk = service.complete_assessment(assessment_id).await?;
            print_json(&serde_json::json!({
                "assessment_id": assessment_id,
                "final_risk_score": risk,
            }))
        }
        Command::Show { assessment_id } => show(&config, assessment_id).await,
        Command::InitConfig => config::save_config(&config, config_path),
    }
}

async fn show(config: &CareSenseConfig, assessment_id: Uuid) -> eyre::Result<()> {
    let service = s3_service(config, Arc::new(build_engine(config))).await?;
    print_json(&service.results(assessment_id).await?)
}
