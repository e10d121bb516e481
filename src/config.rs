use std::num::NonZeroUsize;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "review-healer";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default character budget for review text sent to the classifier.
pub const DEFAULT_MAX_LENGTH: usize = 2000;

/// Default Ollama instance and model.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const ENV_MAX_LENGTH: &str = "REVIEW_HEALER_MAX_LENGTH";
const ENV_OLLAMA_URL: &str = "REVIEW_HEALER_OLLAMA_URL";
const ENV_MODEL: &str = "REVIEW_HEALER_MODEL";
const ENV_TIMEOUT_SECS: &str = "REVIEW_HEALER_TIMEOUT_SECS";
const ENV_RULES: &str = "REVIEW_HEALER_RULES";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "review_healer_lib=info"
}

/// Configuration inconsistencies. All of these are startup failures,
/// never per-record errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No healing rule configured for defect kind '{0}'")]
    MissingRule(String),

    #[error("Unknown defect kind '{0}' in rule table")]
    UnknownDefect(String),

    #[error("Unknown healing action '{action}' for defect kind '{kind}'")]
    UnknownAction { kind: String, action: String },

    #[error("Unknown remedy strategy '{strategy}' for defect kind '{kind}'")]
    UnknownStrategy { kind: String, strategy: String },

    #[error("Rule for '{0}' must define exactly one of placeholder or strategy")]
    InvalidRemedy(String),

    #[error("Invalid {field} value: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("Cannot read rule table {path}: {source}")]
    RulesFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed rule table: {0}")]
    RulesFormat(String),
}

/// Runtime configuration for the review pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub max_length: NonZeroUsize,
    pub ollama_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub rules_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_length: NonZeroUsize::new(DEFAULT_MAX_LENGTH).unwrap_or(NonZeroUsize::MIN),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            rules_path: None,
        }
    }
}

impl PipelineConfig {
    /// Build configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    /// Unset or blank variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(raw) = get(ENV_MAX_LENGTH) {
            config.max_length = parse_max_length(&raw)?;
        }
        if let Some(url) = get(ENV_OLLAMA_URL) {
            config.ollama_url = url;
        }
        if let Some(model) = get(ENV_MODEL) {
            config.model = model;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            config.timeout_secs = raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: ENV_TIMEOUT_SECS,
                reason: format!("'{raw}' is not a whole number of seconds"),
            })?;
        }
        config.rules_path = get(ENV_RULES).map(PathBuf::from);

        Ok(config)
    }
}

fn parse_max_length(raw: &str) -> Result<NonZeroUsize, ConfigError> {
    let value: usize = raw.parse().map_err(|_| ConfigError::InvalidValue {
        name: ENV_MAX_LENGTH,
        reason: format!("'{raw}' is not a positive integer"),
    })?;
    NonZeroUsize::new(value).ok_or(ConfigError::InvalidValue {
        name: ENV_MAX_LENGTH,
        reason: "must be greater than zero".into(),
    })
}
