use serde::{Deserialize, Serialize};

use super::ClassifierError;
use crate::models::enums::SentimentLabel;

/// Canonical classifier verdict. `score` is always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierResult {
    pub label: SentimentLabel,
    pub score: f64,
}

impl ClassifierResult {
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        Self {
            label,
            score: clamp_score(score),
        }
    }
}

/// Clamp into [0, 1]; NaN becomes 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Sentiment classifier backend (allows mocking). Returns the model's raw
/// reply text; normalization happens downstream.
pub trait SentimentEngine {
    fn analyze(&self, text: &str) -> Result<String, ClassifierError>;
}
