//! Strict-parse-then-fallback for model replies.
//!
//! The model is asked for strict JSON but sometimes answers with fenced
//! JSON, JSON wrapped in prose, or plain free text. [`parse_reply`] models
//! that reality as a tagged result instead of an error: the caller always
//! gets either the structured value or the raw text, and decides what the
//! fallback means for its path. Nothing here ever throws past the
//! assembler/small-path boundary.

use serde::de::DeserializeOwned;

/// Outcome of parsing a model reply against an expected JSON shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply<T> {
    /// The reply parsed as the expected shape.
    Parsed(T),
    /// The reply did not parse; the raw text is preserved.
    Fallback(String),
}

/// Parse `raw` as `T`, tolerating fences and surrounding prose.
///
/// Attempts, in order: the fence-stripped reply as-is, then the first
/// balanced `{…}` block inside it. Anything else falls back to the raw text.
pub fn parse_reply<T: DeserializeOwned>(raw: &str) -> ModelReply<T> {
    let stripped = strip_fences(raw);

    if let Ok(value) = serde_json::from_str::<T>(stripped) {
        return ModelReply::Parsed(value);
    }
    if let Some(block) = first_json_object(stripped) {
        if let Ok(value) = serde_json::from_str::<T>(block) {
            return ModelReply::Parsed(value);
        }
    }
    ModelReply::Fallback(raw.to_string())
}

/// Strip an outer ``` fence (with optional `json` tag) if present.
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start_matches(['\r', '\n']);
    let rest = rest.trim_end();
    rest.strip_suffix("```").map(str::trim_end).unwrap_or(rest)
}

/// Locate the first balanced top-level `{…}` block, string-aware.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
