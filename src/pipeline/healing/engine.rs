use std::num::NonZeroUsize;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::clock::{Clock, SystemClock};
use super::rules::{Remedy, RemedyStrategy, RuleCatalog, RuleDescriptor, TRUNCATION_SEPARATOR};
use crate::config::ConfigError;
use crate::models::enums::DefectKind;
use crate::models::review::{HealedRecord, HealingEvent, Record};

static ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-zA-Z0-9]").unwrap());

/// Outcome of checking a review's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAssessment<'a> {
    /// Usable text, already trimmed.
    Clean(&'a str),
    Defective(DefectKind),
}

/// Run the defect checks in priority order; the first match wins.
pub fn assess_text(text: Option<&Value>, max_length: NonZeroUsize) -> TextAssessment<'_> {
    let text = match text {
        None | Some(Value::Null) => return TextAssessment::Defective(DefectKind::MissingText),
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return TextAssessment::Defective(DefectKind::EmptyText),
    };

    let trimmed = text.trim_matches(is_strippable);
    if trimmed.is_empty() {
        return TextAssessment::Defective(DefectKind::EmptyText);
    }
    if !ALPHANUMERIC.is_match(text) {
        return TextAssessment::Defective(DefectKind::SpecialCharactersOnly);
    }
    if text.chars().count() > max_length.get() {
        return TextAssessment::Defective(DefectKind::TooLong);
    }

    TextAssessment::Clean(trimmed)
}

/// Whitespace plus the ASCII information separators (FS, GS, RS, US),
/// which upstream exporters emit around otherwise empty fields.
fn is_strippable(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Keep the first and last `max_length / 2` characters around a separator.
/// Text within the limit is returned unchanged.
pub fn truncate_head_tail(text: &str, max_length: NonZeroUsize) -> String {
    let count = text.chars().count();
    if count <= max_length.get() {
        return text.to_string();
    }

    let half = max_length.get() / 2;
    let head_end = text
        .char_indices()
        .nth(half)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let tail_start = text
        .char_indices()
        .nth(count - half)
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    let mut out =
        String::with_capacity(head_end + TRUNCATION_SEPARATOR.len() + text.len() - tail_start);
    out.push_str(&text[..head_end]);
    out.push_str(TRUNCATION_SEPARATOR);
    out.push_str(&text[tail_start..]);
    out
}

/// Validates review text and applies the catalog's remedy for the first
/// defect found.
pub struct HealingEngine<C: Clock = SystemClock> {
    /// Indexed by `DefectKind` declaration order.
    rules: Vec<RuleDescriptor>,
    clock: C,
}

impl HealingEngine<SystemClock> {
    /// Engine over the built-in rule table and the system clock.
    pub fn standard() -> Result<Self, ConfigError> {
        Self::new(&RuleCatalog::standard(), SystemClock::new())
    }
}

impl<C: Clock> HealingEngine<C> {
    /// Resolve a rule for every defect kind up front so healing itself
    /// cannot fail.
    pub fn new(catalog: &RuleCatalog, clock: C) -> Result<Self, ConfigError> {
        let rules = DefectKind::ALL
            .iter()
            .map(|kind| catalog.lookup(*kind).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules, clock })
    }

    fn rule(&self, kind: DefectKind) -> &RuleDescriptor {
        &self.rules[kind as usize]
    }

    /// Produce a healed copy of `record`. Never fails: unusable text is
    /// always replaced by a defined placeholder or truncation.
    pub fn heal(&self, record: &Record, max_length: NonZeroUsize) -> HealedRecord {
        let mut healed = HealedRecord {
            review_id: record.review_id.clone(),
            business_id: record.business_id.clone(),
            stars: record.stars,
            original_text: record.text.clone(),
            healed_text: String::new(),
            error_type: None,
            action_taken: None,
            was_healed: false,
            healing_history: Vec::new(),
            metadata: record.metadata(),
        };

        match assess_text(record.text.as_ref(), max_length) {
            TextAssessment::Clean(text) => healed.healed_text = text.to_string(),
            TextAssessment::Defective(kind) => {
                let source = record.text.as_ref().and_then(Value::as_str).unwrap_or("");
                self.apply(kind, source, max_length, &mut healed);
            }
        }

        healed
    }

    fn apply(
        &self,
        kind: DefectKind,
        source: &str,
        max_length: NonZeroUsize,
        healed: &mut HealedRecord,
    ) {
        let rule = self.rule(kind);

        healed.healed_text = match &rule.remedy {
            Remedy::Placeholder(text) => text.clone(),
            Remedy::Strategy(RemedyStrategy::HeadTail) => truncate_head_tail(source, max_length),
        };
        healed.error_type = Some(kind);
        healed.action_taken = Some(rule.action);
        healed.was_healed = true;
        healed.healing_history.push(HealingEvent {
            error_type: kind,
            action: rule.action,
            timestamp: self.clock.now(),
        });

        tracing::debug!(
            review_id = healed.review_id.as_deref().unwrap_or("unknown"),
            error_type = %kind,
            action = %rule.action,
            "Healed review text"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::HealingAction;
    use crate::pipeline::healing::clock::FixedClock;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()
    }

    fn engine() -> HealingEngine<FixedClock> {
        HealingEngine::new(&RuleCatalog::standard(), FixedClock(instant())).unwrap()
    }

    fn limit(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn record_with(text: Option<Value>) -> Record {
        Record {
            review_id: Some("rev-1".into()),
            business_id: Some("biz-1".into()),
            stars: 3.0,
            text,
            user_id: Some("user-1".into()),
            date: Some("2019-01-01".into()),
            useful: 4,
            funny: 1,
            cool: 2,
        }
    }

    // ── Detection order ─────────────────────────────────────

    #[test]
    fn absent_text_is_missing() {
        assert_eq!(
            assess_text(None, limit(100)),
            TextAssessment::Defective(DefectKind::MissingText)
        );
    }

    #[test]
    fn blank_text_is_empty() {
        for text in ["", "   ", "\n\t "] {
            assert_eq!(
                assess_text(Some(&json!(text)), limit(100)),
                TextAssessment::Defective(DefectKind::EmptyText),
                "text {text:?}"
            );
        }
    }

    #[test]
    fn null_text_is_missing() {
        assert_eq!(
            assess_text(Some(&Value::Null), limit(100)),
            TextAssessment::Defective(DefectKind::MissingText)
        );

        let healed = engine().heal(&record_with(Some(Value::Null)), limit(10));
        assert_eq!(healed.error_type, Some(DefectKind::MissingText));
        assert_eq!(healed.healed_text, "No review text provided.");
    }

    #[test]
    fn separator_controls_count_as_blank() {
        for text in ["\u{1c}\u{1d}", " \u{1e}\n\u{1f} ", "\u{85}"] {
            assert_eq!(
                assess_text(Some(&json!(text)), limit(100)),
                TextAssessment::Defective(DefectKind::EmptyText),
                "text {text:?}"
            );
        }
        assert_eq!(
            assess_text(Some(&json!("\u{1c}Tasty\u{1f}")), limit(100)),
            TextAssessment::Clean("Tasty")
        );
    }

    #[test]
    fn non_string_text_is_empty() {
        for value in [json!(42), json!(true), json!(["a"]), json!({"body": "x"})] {
            assert_eq!(
                assess_text(Some(&value), limit(100)),
                TextAssessment::Defective(DefectKind::EmptyText)
            );
        }
    }

    #[test]
    fn symbols_only_is_special_characters() {
        assert_eq!(
            assess_text(Some(&json!("!!!@@@###")), limit(100)),
            TextAssessment::Defective(DefectKind::SpecialCharactersOnly)
        );
        assert_eq!(
            assess_text(Some(&json!("😀 😀 ✨")), limit(100)),
            TextAssessment::Defective(DefectKind::SpecialCharactersOnly)
        );
    }

    #[test]
    fn symbols_checked_before_length() {
        let long_symbols = "#".repeat(500);
        assert_eq!(
            assess_text(Some(&json!(long_symbols)), limit(10)),
            TextAssessment::Defective(DefectKind::SpecialCharactersOnly)
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 5 characters, 6 bytes
        let text = "café!";
        assert_eq!(
            assess_text(Some(&json!(text)), limit(5)),
            TextAssessment::Clean("café!")
        );
        assert_eq!(
            assess_text(Some(&json!("ééééé1")), limit(5)),
            TextAssessment::Defective(DefectKind::TooLong)
        );
    }

    #[test]
    fn length_checked_on_untrimmed_text() {
        assert_eq!(
            assess_text(Some(&json!("  ok  ")), limit(4)),
            TextAssessment::Defective(DefectKind::TooLong)
        );
    }

    #[test]
    fn clean_text_is_trimmed() {
        assert_eq!(
            assess_text(Some(&json!("  Lovely brunch spot.\n")), limit(100)),
            TextAssessment::Clean("Lovely brunch spot.")
        );
    }

    // ── Truncation ──────────────────────────────────────────

    #[test]
    fn head_tail_keeps_both_ends() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        assert_eq!(truncate_head_tail(text, limit(10)), "abcde...vwxyz");
    }

    #[test]
    fn head_tail_odd_limit_rounds_down() {
        let text = "0123456789";
        let out = truncate_head_tail(text, limit(7));
        assert_eq!(out, "012...789");
        assert_eq!(out.chars().count(), 2 * (7 / 2) + 3);
    }

    #[test]
    fn head_tail_limit_one_keeps_only_separator() {
        assert_eq!(truncate_head_tail("abc", limit(1)), "...");
    }

    #[test]
    fn head_tail_respects_char_boundaries() {
        let text = "ñandú ñandú ñandú";
        let out = truncate_head_tail(text, limit(6));
        assert_eq!(out, "ñan...ndú");
    }

    #[test]
    fn head_tail_leaves_short_text() {
        assert_eq!(truncate_head_tail("short", limit(10)), "short");
    }

    // ── Healing ─────────────────────────────────────────────

    #[test]
    fn missing_text_gets_placeholder() {
        let healed = engine().heal(&record_with(None), limit(100));
        assert_eq!(healed.error_type, Some(DefectKind::MissingText));
        assert_eq!(healed.action_taken, Some(HealingAction::FilledWithPlaceholder));
        assert!(healed.was_healed);
        assert_eq!(healed.healed_text, "No review text provided.");
        assert_eq!(healed.original_text, None);
        assert_eq!(
            healed.healing_history,
            vec![HealingEvent {
                error_type: DefectKind::MissingText,
                action: HealingAction::FilledWithPlaceholder,
                timestamp: instant(),
            }]
        );
    }

    #[test]
    fn empty_text_gets_placeholder() {
        let healed = engine().heal(&record_with(Some(json!("   "))), limit(100));
        assert_eq!(healed.error_type, Some(DefectKind::EmptyText));
        assert_eq!(healed.healed_text, "No review text provided.");
        assert_eq!(healed.original_text, Some(json!("   ")));
    }

    #[test]
    fn special_characters_get_sentinel() {
        let healed = engine().heal(&record_with(Some(json!("!!!@@@###"))), limit(100));
        assert_eq!(healed.error_type, Some(DefectKind::SpecialCharactersOnly));
        assert_eq!(
            healed.action_taken,
            Some(HealingAction::ReplacedSpecialCharacters)
        );
        assert_eq!(healed.healed_text, "[Non-text content]");
        assert_eq!(healed.healing_history.len(), 1);
    }

    #[test]
    fn long_text_is_truncated() {
        let text = format!("{}{}", "a".repeat(60), "z".repeat(60));
        let healed = engine().heal(&record_with(Some(json!(text))), limit(100));
        assert_eq!(healed.error_type, Some(DefectKind::TooLong));
        assert_eq!(healed.action_taken, Some(HealingAction::TruncatedText));
        assert_eq!(
            healed.healed_text,
            format!("{}...{}", "a".repeat(50), "z".repeat(50))
        );
        assert_eq!(healed.healed_text.chars().count(), 103);
    }

    #[test]
    fn clean_text_is_not_healed() {
        let healed = engine().heal(&record_with(Some(json!("  Fantastic pho. "))), limit(100));
        assert!(!healed.was_healed);
        assert_eq!(healed.healed_text, "Fantastic pho.");
        assert_eq!(healed.error_type, None);
        assert_eq!(healed.action_taken, None);
        assert!(healed.healing_history.is_empty());
    }

    #[test]
    fn identity_and_metadata_pass_through() {
        let record = record_with(Some(json!("Fine.")));
        let healed = engine().heal(&record, limit(100));
        assert_eq!(healed.review_id.as_deref(), Some("rev-1"));
        assert_eq!(healed.business_id.as_deref(), Some("biz-1"));
        assert_eq!(healed.stars, 3.0);
        assert_eq!(healed.metadata, record.metadata());
    }

    #[test]
    fn input_record_is_not_mutated() {
        let record = record_with(Some(json!("$$$")));
        let before = record.clone();
        let _ = engine().heal(&record, limit(100));
        assert_eq!(record, before);
    }

    #[test]
    fn custom_catalog_drives_remedy() {
        let json = r#"{
            "missing_text": {"action": "filled_with_placeholder", "placeholder": "<none>"},
            "empty_text": {"action": "filled_with_placeholder", "placeholder": "<blank>"},
            "special_characters_only": {"action": "replaced_special_characters", "placeholder": "<symbols>"},
            "too_long": {"action": "filled_with_placeholder", "placeholder": "<long>"}
        }"#;
        let catalog = RuleCatalog::from_json(json).unwrap();
        let engine = HealingEngine::new(&catalog, FixedClock(instant())).unwrap();

        let healed = engine.heal(&Record::with_text("x".repeat(20)), limit(5));
        assert_eq!(healed.healed_text, "<long>");
        assert_eq!(healed.action_taken, Some(HealingAction::FilledWithPlaceholder));

        let healed = engine.heal(&Record::default(), limit(5));
        assert_eq!(healed.healed_text, "<none>");
    }

    #[test]
    fn standard_engine_builds() {
        let engine = HealingEngine::standard().unwrap();
        let healed = engine.heal(&Record::default(), limit(10));
        assert_eq!(healed.healing_history.len(), 1);
    }
}
