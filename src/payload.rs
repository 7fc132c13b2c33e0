//! Decoding of loosely shaped JSON payloads.
//!
//! The web form has posted the same data under several key spellings over
//! time. Everything that knows about those spellings lives here; callers get
//! typed values back and never inspect raw JSON themselves.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::llm::prompts::EnhanceRequest;
use crate::prompt::PromptInputs;

pub const PROMPT_TEXT_KEYS: &[&str] =
    &["promptText", "generatedPrompt", "prompt", "text", "content"];
pub const FEEDBACK_TEXT_KEYS: &[&str] = &[
    "comments",
    "feedbackText",
    "feedback_text",
    "feedback",
    "text",
    "message",
];
pub const RATING_KEYS: &[&str] = &["rating", "stars", "score"];
pub const PROMPT_ID_KEYS: &[&str] = &["promptId", "sharedPromptId", "prompt_id"];

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("missing prompt text (expected one of: {})", PROMPT_TEXT_KEYS.join(", "))]
    MissingPromptText,

    #[error("feedback text is required (expected one of: {})", FEEDBACK_TEXT_KEYS.join(", "))]
    MissingFeedbackText,

    #[error("rating must be an integer between 1 and 5, got {0}")]
    InvalidRating(String),

    #[error("invalid prompt inputs: {0}")]
    InvalidInputs(#[from] serde_json::Error),

    #[error("invalid enhance request: {0}")]
    InvalidEnhanceRequest(serde_json::Error),
}

/// A feedback submission after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackInput {
    pub text: String,
    pub rating: u8,
    pub prompt_id: Option<String>,
}

/// Some clients wrap the real payload as `{ "body": { ... } }`.
pub fn unwrap_envelope(raw: &Value) -> &Value {
    match raw.get("body") {
        Some(inner @ Value::Object(_)) => inner,
        _ => raw,
    }
}

/// First key in `keys` whose value is a non-blank string.
fn first_string<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .filter_map(Value::as_str)
        .find(|s| !s.trim().is_empty())
}

/// The prompt text of a save/share request.
pub fn prompt_text(raw: &Value) -> Result<String, PayloadError> {
    let flat = unwrap_envelope(raw);
    let text = match flat {
        Value::String(s) => Some(s.as_str()),
        _ => first_string(flat, PROMPT_TEXT_KEYS),
    };
    text.filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .ok_or(PayloadError::MissingPromptText)
}

fn parse_rating(value: &Value) -> Result<u8, PayloadError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.fract() == 0.0 && (1.0..=5.0).contains(&n) => Ok(n as u8),
        _ => Err(PayloadError::InvalidRating(value.to_string())),
    }
}

/// A feedback submission: text, a 1..=5 rating and an optional prompt link.
pub fn feedback(raw: &Value) -> Result<FeedbackInput, PayloadError> {
    let flat = unwrap_envelope(raw);
    let text = first_string(flat, FEEDBACK_TEXT_KEYS)
        .map(|s| s.trim().to_string())
        .ok_or(PayloadError::MissingFeedbackText)?;

    let rating_value = RATING_KEYS
        .iter()
        .find_map(|k| flat.get(*k).filter(|v| !v.is_null()))
        .cloned()
        .unwrap_or(Value::Null);
    let rating = parse_rating(&rating_value)?;

    let prompt_id = PROMPT_ID_KEYS
        .iter()
        .filter_map(|k| flat.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    Ok(FeedbackInput {
        text,
        rating,
        prompt_id,
    })
}

/// Spellings accepted for each aliased `PromptInputs` field, canonical name
/// first. When one object carries several spellings, the earliest wins.
pub const INPUT_FIELD_KEYS: &[(&str, &[&str])] = &[
    ("objective", &["objective", "task"]),
    ("format", &["format", "outputFormat", "output_format"]),
    ("target_model", &["target_model", "targetModel", "llm", "model"]),
    ("custom_need", &["custom_need", "customNeed"]),
    ("seo_requested", &["seo_requested", "seoRequested", "seo", "seoFriendly"]),
    (
        "citations_requested",
        &["citations_requested", "citationsRequested", "citations", "includeReferences"],
    ),
    (
        "structure_requested",
        &["structure_requested", "structureRequested", "structure", "structuredOutput"],
    ),
    ("structure_style", &["structure_style", "structureStyle"]),
    ("max_words", &["max_words", "maxWords"]),
];

fn is_input_alias(key: &str) -> bool {
    INPUT_FIELD_KEYS
        .iter()
        .any(|(_, spellings)| spellings.contains(&key))
}

/// Rewrite every known spelling to its canonical key so the decoder sees
/// each field at most once. Null values count as absent.
fn fold_input_aliases(obj: &Map<String, Value>) -> Map<String, Value> {
    let mut folded: Map<String, Value> = obj
        .iter()
        .filter(|(k, v)| !v.is_null() && !is_input_alias(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    for (canonical, spellings) in INPUT_FIELD_KEYS {
        let value = spellings
            .iter()
            .filter_map(|k| obj.get(*k))
            .find(|v| !v.is_null());
        if let Some(value) = value {
            folded.insert(canonical.to_string(), value.clone());
        }
    }
    folded
}

/// Form inputs. Keys nested under `advanced` (the toggle panel) are lifted
/// to the top level before decoding; top-level keys win on conflict, whatever
/// spelling either side uses.
pub fn prompt_inputs(raw: &Value) -> Result<PromptInputs, PayloadError> {
    let flat = unwrap_envelope(raw);
    let Value::Object(obj) = flat else {
        return Ok(serde_json::from_value(flat.clone())?);
    };

    let mut merged = match obj.get("advanced") {
        Some(Value::Object(advanced)) => fold_input_aliases(advanced),
        _ => Map::new(),
    };
    for (k, v) in fold_input_aliases(obj) {
        if k != "advanced" {
            merged.insert(k, v);
        }
    }
    Ok(serde_json::from_value(Value::Object(merged))?)
}

/// An enhance request body, bare or wrapped in `{ "body": ... }`.
pub fn enhance_request(raw: &Value) -> Result<EnhanceRequest, PayloadError> {
    serde_json::from_value(unwrap_envelope(raw).clone())
        .map_err(PayloadError::InvalidEnhanceRequest)
}
