//! Schema-validating parser for the model's JSON answer.
//!
//! The parser plays two roles in a chain: it supplies format instructions
//! (a JSON schema hint injected into the prompt) and it turns the model's
//! reply into a typed [`IntentOutput`]. Failures are reported as
//! [`ParseFailure`], which the classifier converts into the fallback result.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use crate::types::LabelSet;

/// Fields the model is asked to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentOutput {
    /// Predicted intent; expected to be one of the offered labels.
    pub intent: String,
    /// Confidence as reported, accepted as a JSON number or numeric string.
    #[serde(deserialize_with = "confidence_from_number_or_string")]
    pub confidence: f64,
    /// Short justification.
    pub rationale: String,
}

/// Why a model reply could not be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum ParseFailure {
    #[error("no JSON object found in model output")]
    NoJson,

    #[error("model output is JSON but not an object")]
    NotAnObject,

    #[error("model output does not match the schema: {0}")]
    Schema(String),
}

/// Parser bound to one label set.
#[derive(Debug, Clone)]
pub struct IntentParser {
    schema: Value,
}

impl IntentParser {
    pub fn new(labels: &LabelSet) -> Self {
        let schema = json!({
            "type": "object",
            "properties": {
                "intent": {
                    "type": "string",
                    "description": "predicted intent label, must be one of the allowed labels",
                    "enum": labels.as_slice(),
                },
                "confidence": {
                    "type": "number",
                    "description": "confidence between 0 and 1",
                },
                "rationale": {
                    "type": "string",
                    "description": "short rationale",
                },
            },
            "required": ["intent", "confidence", "rationale"],
        });
        Self { schema }
    }

    /// JSON schema surfaced to the model.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Prompt text describing the expected output shape.
    pub fn format_instructions(&self) -> String {
        format!(
            "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\
             Return only the JSON object, without any surrounding prose.\n\n\
             Here is the output schema:\n```\n{}\n```",
            self.schema
        )
    }

    /// Interpret a model reply.
    ///
    /// Accepts a bare JSON object, one wrapped in a Markdown code fence, or
    /// one embedded in surrounding prose (first `{` to last `}`).
    pub fn parse(&self, raw: &str) -> Result<IntentOutput, ParseFailure> {
        let value = extract_json(raw).ok_or(ParseFailure::NoJson)?;
        if !value.is_object() {
            return Err(ParseFailure::NotAnObject);
        }
        serde_json::from_value(value).map_err(|e| ParseFailure::Schema(e.to_string()))
    }
}

fn extract_json(raw: &str) -> Option<Value> {
    let text = raw.trim();
    let mut candidates = Vec::with_capacity(3);
    if let Some((body, rest)) = split_code_fence(text) {
        candidates.push(body);
        candidates.push(rest);
    }
    candidates.push(text);

    // an object anywhere wins over a non-object found earlier
    let mut first = None;
    for value in candidates.into_iter().filter_map(parse_candidate) {
        if value.is_object() {
            return Some(value);
        }
        first.get_or_insert(value);
    }
    first
}

fn parse_candidate(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Split on the first ```` ``` ```` block into its body and the text after
/// the closing fence. `None` when `text` has no fence.
fn split_code_fence(text: &str) -> Option<(&str, &str)> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    let close = after_open.find("```");
    // an info string such as `json` ends at a newline inside the fence
    let body_start = match after_open.find('\n') {
        Some(newline) if close.is_none_or(|close| newline < close) => newline + 1,
        _ => 0,
    };
    Some(match close {
        Some(close) => (
            after_open[body_start..close].trim(),
            after_open[close + 3..].trim(),
        ),
        None => (after_open[body_start..].trim(), ""),
    })
}

fn confidence_from_number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("confidence is not representable as f64"))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("confidence '{s}' is not numeric")))?,
        other => {
            return Err(D::Error::custom(format!(
                "confidence must be a number, got {other}"
            )));
        }
    };
    if !value.is_finite() {
        return Err(D::Error::custom("confidence must be finite"));
    }
    Ok(value)
}
