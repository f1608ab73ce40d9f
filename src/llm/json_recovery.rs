use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// First bracketed span, non-greedy
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*?\]|\{.*?\}").expect("valid regex"));

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[\]}])").expect("valid regex"));

/// Recover a JSON array or object from free-form model output.
///
/// Escalates through: direct parse of the trimmed text, parse of the first
/// bracketed span, then trailing-comma repair. `None` means "no structured
/// data", which is distinct from an empty array. Scalars are not considered
/// structured.
pub fn parse_lenient(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(value) = parse_structured(trimmed) {
        return Some(value);
    }

    let candidates = bracketed_candidates(trimmed);
    for candidate in &candidates {
        if let Some(value) = parse_structured(candidate) {
            debug!("Recovered JSON from bracketed span");
            return Some(value);
        }
    }

    for candidate in candidates.iter().map(String::as_str).chain(std::iter::once(trimmed)) {
        let repaired = strip_trailing_commas(candidate);
        if repaired != candidate {
            if let Some(value) = parse_structured(&repaired) {
                debug!("Recovered JSON after trailing-comma repair");
                return Some(value);
            }
        }
    }

    None
}

/// Gather lines that look like standalone JSON objects and wrap them in an
/// array. Returns `None` when no such line exists.
pub fn collect_object_lines(text: &str) -> Option<String> {
    let objects: Vec<&str> = text
        .lines()
        .map(|line| line.trim().trim_end_matches(',').trim_end())
        .filter(|line| line.starts_with('{') && line.ends_with('}'))
        .collect();

    if objects.is_empty() {
        None
    } else {
        Some(format!("[{}]", objects.join(",")))
    }
}

/// Remove commas that directly precede a closing bracket or brace
pub fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

fn parse_structured(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Array(_) | Value::Object(_))) => Some(value),
        _ => None,
    }
}

/// The non-greedy first match, then the widest span from the first opener
/// to the last closer of the same kind (for nested structures).
fn bracketed_candidates(text: &str) -> Vec<String> {
    let mut candidates = Vec::new();

    if let Some(m) = BRACKETED.find(text) {
        candidates.push(m.as_str().to_string());
    }

    if let Some(start) = text.find(['[', '{']) {
        let closer = if text[start..].starts_with('[') { ']' } else { '}' };
        if let Some(end) = text.rfind(closer) {
            if end > start {
                let widest = text[start..=end].to_string();
                if !candidates.contains(&widest) {
                    candidates.push(widest);
                }
            }
        }
    }

    candidates
}
