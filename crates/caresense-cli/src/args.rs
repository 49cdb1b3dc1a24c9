use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config::LogFormat;

/// Normative scoring for neuropsychological assessments
#[derive(Debug, Parser)]
#[command(name = "caresense", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (default: <config dir>/caresense/config.json)
    #[arg(long, global = true, env = "CARESENSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the configured log format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score a patient + results bundle offline and print the report
    Score {
        /// JSON file with `patient`, `results` and optional `evaluated_on`
        bundle: PathBuf,
    },

    /// Print the active normative table
    Norms,

    /// Rescore a stored assessment and print the fresh report
    Recalculate { assessment_id: Uuid },

    /// Complete a stored assessment with whatever results it has
    Complete { assessment_id: Uuid },

    /// Print a stored assessment's status, records and report
    Show { assessment_id: Uuid },

    /// Write the effective configuration to the config file
    #[command(name = "init-config")]
    InitConfig,
}
