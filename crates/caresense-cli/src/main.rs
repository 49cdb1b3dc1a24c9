use clap::Parser;
use tracing_subscriber::EnvFilter;

use caresense_cli::args::Cli;
use caresense_cli::config::{self, LogFormat};
use caresense_cli::commands;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };

    // Logs go to stderr; stdout carries the JSON output of each command.
    let log_format = cli
        .log_format
        .or_else(|| config::peek_log_format(&config_path))
        .unwrap_or_default();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    match log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
    }

    let mut config = config::load_config(&config_path)?;
    config.apply_env(|key| std::env::var(key).ok());

    commands::run(cli.command, config, &config_path).await
}
