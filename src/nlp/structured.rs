//! Best-effort recovery of a `{summary, recommendations}` object from free text.
//!
//! Generation output is only loosely shaped: JSON may be wrapped in prose or
//! code fences. Everything fragile about reading it lives here.

use serde_json::Value;

use crate::nlp::claims::truncate_chars;

/// Summary and recommendations for one (theme, sentiment) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentimentInsight {
    pub summary: String,
    pub recommendations: Vec<String>,
}

impl SentimentInsight {
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.recommendations.is_empty()
    }
}

/// First balanced `{...}` span that parses as a JSON object.
///
/// Each `{` is tried in turn, so stray braces in leading prose or small
/// non-JSON spans do not hide a later object. Braces inside strings are
/// ignored.
pub fn first_json_object(text: &str) -> Option<&str> {
    text.match_indices('{')
        .filter_map(|(start, _)| balanced_span(text, start))
        .find(|span| matches!(serde_json::from_str::<Value>(span), Ok(Value::Object(_))))
}

/// Span from the `{` at `start` to its matching `}`, if the text closes it.
fn balanced_span(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a generation response.
///
/// A parsable object yields its trimmed `summary` and up to
/// `max_recommendations` non-empty recommendation strings. Anything else
/// keeps the first `fallback_chars` characters of the raw text as summary.
pub fn parse_insight(raw: &str, max_recommendations: usize, fallback_chars: usize) -> SentimentInsight {
    let parsed = first_json_object(raw).and_then(|span| serde_json::from_str::<Value>(span).ok());
    let Some(Value::Object(object)) = parsed else {
        return SentimentInsight {
            summary: truncate_chars(raw.trim(), fallback_chars).to_string(),
            recommendations: Vec::new(),
        };
    };

    let summary = match object.get("summary") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let mut recommendations: Vec<String> = match object.get("recommendations") {
        Some(Value::Array(items)) => items.iter().map(scalar_text).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![scalar_text(other)],
    };
    recommendations.retain(|r| !r.is_empty());
    recommendations.truncate(max_recommendations);

    SentimentInsight {
        summary,
        recommendations,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string().trim().to_string(),
    }
}
