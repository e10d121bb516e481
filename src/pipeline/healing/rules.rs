use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::config::ConfigError;
use crate::models::enums::{DefectKind, HealingAction};

/// Placeholder used when a review carries no usable text.
pub const NO_TEXT_PLACEHOLDER: &str = "No review text provided.";

/// Sentinel used when a review contains only symbols.
pub const NON_TEXT_SENTINEL: &str = "[Non-text content]";

/// Separator inserted between the kept head and tail of a truncated review.
pub const TRUNCATION_SEPARATOR: &str = "...";

/// Named, parameterised remedies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemedyStrategy {
    /// Keep the first and last `max_length / 2` characters.
    HeadTail,
}

impl RemedyStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HeadTail => "head_tail",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "head_tail" => Some(Self::HeadTail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remedy {
    Placeholder(String),
    Strategy(RemedyStrategy),
}

/// What to do about one defect kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDescriptor {
    pub action: HealingAction,
    pub remedy: Remedy,
}

impl RuleDescriptor {
    fn placeholder(action: HealingAction, text: &str) -> Self {
        Self {
            action,
            remedy: Remedy::Placeholder(text.to_string()),
        }
    }

    fn strategy(action: HealingAction, strategy: RemedyStrategy) -> Self {
        Self {
            action,
            remedy: Remedy::Strategy(strategy),
        }
    }
}

/// Table mapping defect kinds to remedies. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleCatalog {
    rules: Vec<(DefectKind, RuleDescriptor)>,
}

impl RuleCatalog {
    /// The built-in rule table.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                (
                    DefectKind::MissingText,
                    RuleDescriptor::placeholder(
                        HealingAction::FilledWithPlaceholder,
                        NO_TEXT_PLACEHOLDER,
                    ),
                ),
                (
                    DefectKind::EmptyText,
                    RuleDescriptor::placeholder(
                        HealingAction::FilledWithPlaceholder,
                        NO_TEXT_PLACEHOLDER,
                    ),
                ),
                (
                    DefectKind::SpecialCharactersOnly,
                    RuleDescriptor::placeholder(
                        HealingAction::ReplacedSpecialCharacters,
                        NON_TEXT_SENTINEL,
                    ),
                ),
                (
                    DefectKind::TooLong,
                    RuleDescriptor::strategy(HealingAction::TruncatedText, RemedyStrategy::HeadTail),
                ),
            ],
        }
    }

    /// Parse and validate a JSON rule table.
    ///
    /// Shape: `{"<defect_kind>": {"action": "...", "placeholder": "..."}}`, or
    /// `"strategy": "head_tail"` in place of `placeholder`. Every defect kind
    /// must be covered.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct RawRule {
            action: String,
            placeholder: Option<String>,
            strategy: Option<String>,
        }

        let raw: BTreeMap<String, RawRule> =
            serde_json::from_str(json).map_err(|e| ConfigError::RulesFormat(e.to_string()))?;

        let mut rules = Vec::with_capacity(raw.len());
        for (name, rule) in raw {
            let kind = DefectKind::from_str(&name)
                .map_err(|_| ConfigError::UnknownDefect(name.clone()))?;
            let action =
                HealingAction::from_str(&rule.action).map_err(|_| ConfigError::UnknownAction {
                    kind: name.clone(),
                    action: rule.action.clone(),
                })?;
            let remedy = match (rule.placeholder, rule.strategy) {
                (Some(text), None) => Remedy::Placeholder(text),
                (None, Some(strategy)) => Remedy::Strategy(
                    RemedyStrategy::parse(&strategy)
                        .ok_or(ConfigError::UnknownStrategy { kind: name, strategy })?,
                ),
                _ => return Err(ConfigError::InvalidRemedy(name)),
            };
            rules.push((kind, RuleDescriptor { action, remedy }));
        }

        let catalog = Self { rules };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a rule table from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::RulesFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn lookup(&self, kind: DefectKind) -> Result<&RuleDescriptor, ConfigError> {
        self.rules
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, rule)| rule)
            .ok_or_else(|| ConfigError::MissingRule(kind.as_str().to_string()))
    }

    /// Lookup by wire name. Names outside the defect enumeration are rejected.
    pub fn lookup_name(&self, name: &str) -> Result<&RuleDescriptor, ConfigError> {
        let kind =
            DefectKind::from_str(name).map_err(|_| ConfigError::UnknownDefect(name.to_string()))?;
        self.lookup(kind)
    }

    /// Every defect kind must have a rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in DefectKind::ALL {
            self.lookup(*kind)?;
        }
        Ok(())
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
