use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::split_speaker;
use crate::models::{ExtractedConflict, Severity};

static CONFLICT_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(disagree(?:s|d|ment|ments)?|conflict(?:s|ing)?|argument(?:s)?|arguing|dispute(?:s|d)?|concern(?:s|ed)?|(?:don['’]t|do not) agree)\b",
    )
    .expect("valid regex")
});

/// Scan transcript lines for disagreement keywords.
///
/// Emits one low-severity candidate per matching line with empty
/// participants and stance; the first matched keyword becomes the topic.
/// Further keywords on the same line add nothing, and a line whose text
/// repeats an earlier issue (case-insensitively) is skipped.
pub fn scan_conflicts(transcript: &str) -> Vec<ExtractedConflict> {
    let mut seen = HashSet::new();
    let mut conflicts = Vec::new();

    for line in transcript.lines() {
        let Some(keyword) = CONFLICT_KEYWORD.find(line) else {
            continue;
        };
        let (speaker, text) = split_speaker(line);
        let Some(mut conflict) = ExtractedConflict::new(text, speaker.unwrap_or_default()) else {
            continue;
        };
        if !seen.insert(conflict.issue.to_lowercase()) {
            continue;
        }
        conflict.severity = Severity::Low;
        conflict.topic = keyword.as_str().to_lowercase();
        conflicts.push(conflict);
    }

    conflicts
}
