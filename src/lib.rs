pub mod config;
pub mod models;
pub mod pipeline;

use std::io::{self, BufWriter};
use std::process::ExitCode;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use config::{ConfigError, PipelineConfig};
use pipeline::healing::{HealingEngine, RuleCatalog, SystemClock};
use pipeline::processor::{BatchSummary, ProcessError, ReviewProcessor};
use pipeline::sentiment::{ClassifierError, OllamaSentimentEngine};

/// Startup and batch failures of the command-line pipeline.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Classifier setup failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Build the pipeline described by `config`. The rule table is validated
/// here, before any record is read.
pub fn build_processor(config: &PipelineConfig) -> Result<ReviewProcessor, AppError> {
    let catalog = match &config.rules_path {
        Some(path) => RuleCatalog::from_path(path)?,
        None => RuleCatalog::standard(),
    };
    let healer = HealingEngine::new(&catalog, SystemClock::new())?;
    let classifier =
        OllamaSentimentEngine::new(&config.ollama_url, &config.model, config.timeout_secs)?;

    Ok(ReviewProcessor::new(
        healer,
        Box::new(classifier),
        config.max_length,
    ))
}

fn run_batch() -> Result<BatchSummary, AppError> {
    let config = PipelineConfig::from_env()?;
    tracing::info!(
        model = %config.model,
        ollama_url = %config.ollama_url,
        max_length = config.max_length.get(),
        "Review pipeline configured"
    );

    let processor = build_processor(&config)?;
    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    Ok(processor.process_jsonl(stdin, stdout)?)
}

/// Entry point: JSON-lines reviews on stdin, analyzed reviews on stdout,
/// logs on stderr.
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    match run_batch() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Review pipeline failed");
            ExitCode::FAILURE
        }
    }
}
