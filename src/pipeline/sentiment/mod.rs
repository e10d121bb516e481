pub mod confidence;
pub mod ollama;
pub mod parser;
pub mod prompt;
pub mod types;

pub use confidence::*;
pub use ollama::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use thiserror::Error;

/// Failures talking to the sentiment classifier. Retry policy belongs to
/// the caller.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Ollama is not running at {0}")]
    Connection(String),

    #[error("Ollama returned error (status {status}): {body}")]
    ServiceError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}
