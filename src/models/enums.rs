use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Macro to generate a closed enum with as_str + std::str::FromStr pattern.
/// Serde uses the same spelling as `as_str`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ConfigError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Declaration order is detection priority.
str_enum!(DefectKind {
    MissingText => "missing_text",
    EmptyText => "empty_text",
    SpecialCharactersOnly => "special_characters_only",
    TooLong => "too_long",
});

str_enum!(HealingAction {
    FilledWithPlaceholder => "filled_with_placeholder",
    ReplacedSpecialCharacters => "replaced_special_characters",
    TruncatedText => "truncated_text",
});

str_enum!(SentimentLabel {
    Positive => "POSITIVE",
    Negative => "NEGATIVE",
    Neutral => "NEUTRAL",
});

str_enum!(ConfidenceBand {
    High => "HIGH",
    Medium => "MEDIUM",
    Low => "LOW",
});
