//! Pulls a JSON object out of free-form model output.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

lazy_static! {
    static ref FENCE: Regex = Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").unwrap();
    static ref OBJECT: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

/// Strict parse of the (unfenced) text first, then the outermost `{...}` span.
/// The span runs from the first `{` to the last `}`, so a stray brace in the
/// surrounding prose makes the fallback give up.
pub fn extract_object(text: &str) -> Option<Map<String, Value>> {
    let body = FENCE
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str())
        .trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        return Some(map);
    }
    let span = OBJECT.find(text)?;
    match serde_json::from_str::<Value>(span.as_str()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
