use std::path::PathBuf;

use thiserror::Error;

use caresense_core::models::results::TestKind;

use crate::scoring::ValidationError;

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("failed to read normative data at {path}: {source}")]
    NormsIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("normative data is not valid JSON: {0}")]
    NormsFormat(#[from] serde_json::Error),

    #[error("normative entry {test}/{age}/{education} has negative standard deviation {sd}")]
    NegativeDeviation {
        test: String,
        age: String,
        education: String,
        sd: f64,
    },

    #[error("{kind} result failed validation: {}", summarize(.errors))]
    Validation {
        kind: TestKind,
        errors: Vec<ValidationError>,
    },
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
