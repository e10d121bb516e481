use std::borrow::Cow;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

use super::types::ClassifierResult;
use crate::models::enums::SentimentLabel;

/// Code fence marker models wrap JSON replies in.
const FENCE: &str = "```";

/// Score assigned when the fallback finds a label keyword.
pub const KEYWORD_MATCH_SCORE: f64 = 0.75;

/// Score assigned when the fallback finds nothing.
pub const NO_SIGNAL_SCORE: f64 = 0.5;

/// Bare non-finite literals some models emit. Longest first so `-Infinity`
/// wins over `Infinity`.
const NON_FINITE_LITERALS: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Why a reply could not be decoded as a structured verdict.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("malformed JSON: {0}")]
    Syntax(String),

    #[error("reply is not a JSON object")]
    NotAnObject,

    #[error("field '{0}' has the wrong type")]
    WrongType(&'static str),
}

/// Turn a classifier reply into a canonical verdict. Never fails:
/// structured decoding is tried first, then keyword matching.
pub fn normalize_response(raw: &str) -> ClassifierResult {
    match decode_structured(raw) {
        Ok(result) => result,
        Err(e) => {
            tracing::debug!(reason = %e, "Classifier reply not structured, using keyword fallback");
            keyword_fallback(raw)
        }
    }
}

/// Decode `{"sentiment": "...", "confidence": ...}`, optionally wrapped in a
/// code fence. Missing fields default to NEUTRAL / 0.0; unknown labels
/// become NEUTRAL.
pub fn decode_structured(raw: &str) -> Result<ClassifierResult, NormalizeError> {
    let body = quote_non_finite_literals(strip_fence(raw.trim()));

    let value: Value =
        serde_json::from_str(&body).map_err(|e| NormalizeError::Syntax(e.to_string()))?;
    let object = value.as_object().ok_or(NormalizeError::NotAnObject)?;

    let label = match object.get("sentiment") {
        None => SentimentLabel::Neutral,
        Some(Value::String(s)) => {
            SentimentLabel::from_str(&s.to_uppercase()).unwrap_or(SentimentLabel::Neutral)
        }
        Some(_) => return Err(NormalizeError::WrongType("sentiment")),
    };

    let score = match object.get("confidence") {
        None => 0.0,
        Some(v) => confidence_value(v).ok_or(NormalizeError::WrongType("confidence"))?,
    };

    Ok(ClassifierResult::new(label, score))
}

/// Numbers, numeric strings and booleans are accepted as confidence.
fn confidence_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Rewrite bare `NaN`, `Infinity` and `-Infinity` outside string literals
/// as quoted strings, which `confidence_value` then parses as floats.
/// Input without such tokens is borrowed unchanged.
fn quote_non_finite_literals(body: &str) -> Cow<'_, str> {
    if !NON_FINITE_LITERALS.iter().any(|lit| body.contains(lit)) {
        return Cow::Borrowed(body);
    }

    let mut out = String::with_capacity(body.len() + 8);
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = body;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if let Some(lit) = NON_FINITE_LITERALS.iter().find(|lit| rest.starts_with(**lit)) {
            out.push('"');
            out.push_str(lit);
            out.push('"');
            rest = &rest[lit.len()..];
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(out)
}

/// Drop the first and last lines when the reply is fenced.
fn strip_fence(text: &str) -> &str {
    if !(text.starts_with(FENCE) && text.ends_with(FENCE)) {
        return text;
    }
    match (text.find('\n'), text.rfind('\n')) {
        (Some(first), Some(last)) if first < last => &text[first + 1..last],
        _ => "",
    }
}

/// Case-insensitive keyword search. POSITIVE takes priority over NEGATIVE.
pub fn keyword_fallback(raw: &str) -> ClassifierResult {
    let upper = raw.to_uppercase();
    if upper.contains(SentimentLabel::Positive.as_str()) {
        return ClassifierResult::new(SentimentLabel::Positive, KEYWORD_MATCH_SCORE);
    }
    if upper.contains(SentimentLabel::Negative.as_str()) {
        return ClassifierResult::new(SentimentLabel::Negative, KEYWORD_MATCH_SCORE);
    }
    ClassifierResult::new(SentimentLabel::Neutral, NO_SIGNAL_SCORE)
}
