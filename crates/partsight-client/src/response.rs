//! Normalization of the upstream's heterogeneous response shapes.
//!
//! The upstream is inconsistent about both where the session token lives
//! and what it calls patent fields, so everything funnels through one
//! explicit precedence table:
//!
//! | canonical          | upstream precedence                   | default        |
//! |--------------------|---------------------------------------|----------------|
//! | `patent_number`    | `publication_number`, `patent_number` | `UNKNOWN`      |
//! | `title`            | `title`                               | `Patent Title` |
//! | `applicant`        | `applicant`, `assignee`               | `Unknown`      |
//! | `publication_date` | `publication_date`, `filing_date`     | `2024-01-01`   |
//! | `relevance_score`  | `score`, `relevance_score`            | `0.5`          |
//!
//! The defaults are part of the downstream compatibility contract.

use partsight_core::PatentRecord;
use serde_json::Value;

use crate::client::ScreenerError;

/// Session token from a submission response.
///
/// Checked nested-first (`data.token`), then the flat `token` / `session` /
/// `ticket` spellings. Numeric tokens are accepted and stringified.
pub fn extract_token(body: &Value) -> Option<String> {
    if let Some(token) = body.get("data").and_then(|data| data.get("token")) {
        if let Some(token) = value_to_token(token) {
            return Some(token);
        }
    }
    ["token", "session", "ticket"]
        .iter()
        .find_map(|key| body.get(key).and_then(value_to_token))
}

/// True when the body carries synchronous result data (`results` or
/// `patents`), meaning a submission completed without a session token.
pub fn has_result_data(body: &Value) -> bool {
    body.get("results").is_some() || body.get("patents").is_some()
}

/// Normalize the body's patent list into canonical records.
///
/// A missing list yields an empty vector; a list that is present but not
/// an array of objects is a processing failure.
pub fn normalize_patents(body: &Value) -> Result<Vec<PatentRecord>, ScreenerError> {
    let raw = match body.get("results").or_else(|| body.get("patents")) {
        None => return Ok(Vec::new()),
        Some(value) => value.as_array().ok_or_else(|| {
            ScreenerError::Processing(format!(
                "patent list is not an array: {}",
                shape_of(value)
            ))
        })?,
    };

    raw.iter()
        .map(|entry| {
            let obj = entry.as_object().ok_or_else(|| {
                ScreenerError::Processing(format!("patent entry is not an object: {}", shape_of(entry)))
            })?;
            Ok(PatentRecord {
                patent_number: string_field(obj, &["publication_number", "patent_number"], "UNKNOWN"),
                title: string_field(obj, &["title"], "Patent Title"),
                applicant: string_field(obj, &["applicant", "assignee"], "Unknown"),
                publication_date: string_field(obj, &["publication_date", "filing_date"], "2024-01-01"),
                relevance_score: score_field(obj),
            })
        })
        .collect()
}

fn value_to_token(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(
    obj: &serde_json::Map<String, Value>,
    precedence: &[&str],
    default: &str,
) -> String {
    precedence
        .iter()
        .find_map(|key| obj.get(*key))
        .and_then(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| default.to_string())
}

fn score_field(obj: &serde_json::Map<String, Value>) -> f64 {
    ["score", "relevance_score"]
        .iter()
        .find_map(|key| obj.get(*key))
        .and_then(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .unwrap_or(0.5)
        .clamp(0.0, 1.0)
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
