pub mod conflict_scan;
pub mod deadline;
pub mod task_miner;

pub use conflict_scan::*;
pub use deadline::*;
pub use task_miner::*;

use std::sync::LazyLock;

use regex::Regex;

static SPEAKER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<speaker>[A-Za-z][\w .'-]{0,40}?)\s*:\s*(?P<text>.*)$").expect("valid regex")
});

/// Split a `Speaker: text` line into its speaker and text.
///
/// Lines without a prefix come back whole with no speaker.
pub fn split_speaker(line: &str) -> (Option<&str>, &str) {
    match SPEAKER_PREFIX.captures(line) {
        Some(caps) => match (caps.name("speaker"), caps.name("text")) {
            (Some(speaker), Some(text)) => (Some(speaker.as_str().trim()), text.as_str().trim()),
            _ => (None, line.trim()),
        },
        None => (None, line.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_speaker() {
        assert_eq!(split_speaker("John: hello there"), (Some("John"), "hello there"));
        assert_eq!(split_speaker("SPEAKER_1:  ok "), (Some("SPEAKER_1"), "ok"));
        assert_eq!(split_speaker("no prefix here"), (None, "no prefix here"));
    }
}
