use std::io::{BufRead, Write};
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::healing::{Clock, HealingEngine, SystemClock};
use super::sentiment::{confidence_band, normalize_response, ClassifierError, SentimentEngine};
use crate::models::enums::{ConfidenceBand, SentimentLabel};
use crate::models::review::{HealedRecord, Record};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A healed review together with its normalized sentiment verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedReview {
    #[serde(flatten)]
    pub healed: HealedRecord,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    pub confidence_level: ConfidenceBand,
}

/// Counters for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Records written to the output.
    pub processed: usize,
    /// Written records whose text needed a remedy.
    pub healed: usize,
    /// Lines that were not valid review JSON.
    pub rejected: usize,
    /// Records dropped because the classifier call failed.
    pub failed: usize,
}

/// Orchestrates the review pipeline:
/// heal → classify → normalize → band
pub struct ReviewProcessor<C: Clock = SystemClock> {
    healer: HealingEngine<C>,
    classifier: Box<dyn SentimentEngine + Send + Sync>,
    max_length: NonZeroUsize,
}

impl<C: Clock> ReviewProcessor<C> {
    pub fn new(
        healer: HealingEngine<C>,
        classifier: Box<dyn SentimentEngine + Send + Sync>,
        max_length: NonZeroUsize,
    ) -> Self {
        Self {
            healer,
            classifier,
            max_length,
        }
    }

    /// Run one record through the pipeline. Only classifier transport
    /// failures surface; text defects and malformed replies are absorbed.
    pub fn process(&self, record: &Record) -> Result<AnalyzedReview, ClassifierError> {
        let healed = self.healer.heal(record, self.max_length);
        let reply = self.classifier.analyze(&healed.healed_text)?;
        let verdict = normalize_response(&reply);

        Ok(AnalyzedReview {
            sentiment: verdict.label,
            confidence: verdict.score,
            confidence_level: confidence_band(verdict.score),
            healed,
        })
    }

    /// Process newline-delimited JSON records from `reader`, writing one
    /// JSON result per line to `writer`. Bad lines and classifier failures
    /// are logged and counted, not fatal.
    pub fn process_jsonl<R: BufRead, W: Write>(
        &self,
        reader: R,
        mut writer: W,
    ) -> Result<BatchSummary, ProcessError> {
        let mut summary = BatchSummary::default();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let record: Record = match serde_json::from_str(&line) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(line = line_number, error = %e, "Skipping malformed review line");
                    summary.rejected += 1;
                    continue;
                }
            };

            match self.process(&record) {
                Ok(analyzed) => {
                    if analyzed.healed.was_healed {
                        summary.healed += 1;
                    }
                    serde_json::to_writer(&mut writer, &analyzed)?;
                    writer.write_all(b"\n")?;
                    summary.processed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        line = line_number,
                        review_id = record.review_id.as_deref().unwrap_or("unknown"),
                        error = %e,
                        "Classifier call failed, review dropped"
                    );
                    summary.failed += 1;
                }
            }
        }

        writer.flush()?;

        tracing::info!(
            processed = summary.processed,
            healed = summary.healed,
            rejected = summary.rejected,
            failed = summary.failed,
            "Review batch complete"
        );

        Ok(summary)
    }
}
