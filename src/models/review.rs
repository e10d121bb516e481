use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::enums::{DefectKind, HealingAction};

/// Raw review as delivered by ingestion. Every field is optional on the wire;
/// `text` is kept as an untyped JSON value so non-string payloads can be
/// classified instead of rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub review_id: Option<String>,
    #[serde(default)]
    pub business_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stars: f64,
    #[serde(default)]
    pub text: Option<serde_json::Value>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub useful: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub funny: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cool: i64,
}

impl Record {
    /// Record carrying only the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(serde_json::Value::String(text.into())),
            ..Self::default()
        }
    }

    pub fn metadata(&self) -> ReviewMetadata {
        ReviewMetadata {
            user_id: self.user_id.clone(),
            date: self.date.clone(),
            useful: self.useful,
            funny: self.funny,
            cool: self.cool,
        }
    }
}

/// Pass-through reviewer metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewMetadata {
    pub user_id: Option<String>,
    pub date: Option<String>,
    pub useful: i64,
    pub funny: i64,
    pub cool: i64,
}

/// One applied remedy. The timestamp is audit-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealingEvent {
    pub error_type: DefectKind,
    pub action: HealingAction,
    pub timestamp: DateTime<Utc>,
}

/// Review after validation and repair, ready for classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealedRecord {
    pub review_id: Option<String>,
    pub business_id: Option<String>,
    pub stars: f64,
    pub original_text: Option<serde_json::Value>,
    pub healed_text: String,
    pub error_type: Option<DefectKind>,
    pub action_taken: Option<HealingAction>,
    pub was_healed: bool,
    pub healing_history: Vec<HealingEvent>,
    pub metadata: ReviewMetadata,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
