use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};
use tracing::debug;

use super::deadline::resolve_deadline_from;
use crate::models::ExtractedTask;

/// `<Speaker>: ... I will / I'll / I'm going to <task> [by <deadline>]`
static SELF_COMMITMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<speaker>[A-Za-z][\w .'-]{0,40}?)\s*:\s*.*?\b(?i:i\s+will|i['’]ll|i['’]m\s+going\s+to|i\s+am\s+going\s+to)\s+(?P<task>[^.!?]+?)(?:\s+(?i:by)\s+(?P<deadline>[^.!?,;]+?))?\s*(?:[.!?,;]|$)",
    )
    .expect("valid regex")
});

/// `assign(ed) [to] <Name> to <task> [by <deadline>]`
static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?i:assign(?:ed)?)\s+(?:(?i:to)\s+)?(?P<name>[A-Z][\w'-]*)\s+(?i:to)\s+(?P<task>[^.!?]+?)(?:\s+(?i:by)\s+(?P<deadline>[^.!?,;]+?))?\s*(?:[.!?,;]|$)",
    )
    .expect("valid regex")
});

/// `<Name>, can you <task>`
static ADDRESS_BEFORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<name>[A-Z][a-z]+),\s*(?i:can|could)\s+(?i:you)\s+(?P<task>[^.!?]+)")
        .expect("valid regex")
});

/// `can you <task>, <Name>`
static ADDRESS_AFTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?i:can|could)\s+(?i:you)\s+(?P<task>[^.!?,]+),\s*(?P<name>[A-Z][a-z]+)\s*(?:[.!?]|$)",
    )
    .expect("valid regex")
});

/// Capitalized words that open a sentence but are not names
const NOT_NAMES: &[&str] = &[
    "Also", "And", "But", "Great", "Hello", "Hey", "Hi", "Now", "Ok", "Okay", "Please", "Right",
    "So", "Sure", "Thanks", "Then", "Well", "Yeah", "Yes",
];

/// Mine commitments from transcript text using literal trigger phrases.
///
/// Every task comes back pending. Duplicates by (assignee, task), compared
/// case-insensitively, keep the first occurrence.
pub fn mine_tasks(transcript: &str) -> Vec<ExtractedTask> {
    mine_tasks_from(transcript, chrono::Local::now().date_naive())
}

/// Mine tasks resolving deadlines against a fixed reference date
pub fn mine_tasks_from(transcript: &str, today: NaiveDate) -> Vec<ExtractedTask> {
    let mut candidates = Vec::new();

    for line in transcript.lines() {
        if let Some(caps) = SELF_COMMITMENT.captures(line) {
            candidates.extend(candidate(&caps, "speaker", today));
        }
    }
    for line in transcript.lines() {
        for caps in ASSIGNMENT.captures_iter(line) {
            candidates.extend(candidate(&caps, "name", today));
        }
    }
    for line in transcript.lines() {
        for caps in ADDRESS_BEFORE.captures_iter(line) {
            candidates.extend(candidate(&caps, "name", today));
        }
        for caps in ADDRESS_AFTER.captures_iter(line) {
            candidates.extend(candidate(&caps, "name", today));
        }
    }

    let found = candidates.len();
    let tasks = dedup_tasks(candidates);
    debug!("Task miner: {} matches, {} unique tasks", found, tasks.len());
    tasks
}

/// Drop later tasks whose (assignee, name) repeats an earlier one
pub fn dedup_tasks(tasks: Vec<ExtractedTask>) -> Vec<ExtractedTask> {
    let mut seen = HashSet::new();
    tasks
        .into_iter()
        .filter(|task| seen.insert(task.dedup_key()))
        .collect()
}

fn candidate(caps: &Captures<'_>, assignee_group: &str, today: NaiveDate) -> Option<ExtractedTask> {
    let assignee = caps.name(assignee_group)?.as_str().trim();
    if NOT_NAMES.contains(&assignee) {
        return None;
    }
    let task = clean_task_text(caps.name("task")?.as_str());
    let deadline = caps
        .name("deadline")
        .map(|m| resolve_deadline_from(m.as_str().trim(), today))
        .unwrap_or_default();
    ExtractedTask::new(task, assignee, deadline)
}

fn clean_task_text(text: &str) -> String {
    let mut task = text.trim().trim_end_matches([',', ';', ':']).trim();
    for suffix in [", please", " please"] {
        if let Some(stripped) = task.strip_suffix(suffix) {
            task = stripped.trim();
        }
    }
    task.strip_prefix("please ").unwrap_or(task).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // A Wednesday
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_self_commitment_with_deadline() {
        let tasks = mine_tasks("John: I'll prepare the report by Friday.\n");

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].assigned_to, "John");
        assert_eq!(tasks[0].name, "prepare the report");
        assert!(!tasks[0].due_date.is_empty());
        assert_eq!(tasks[0].status, crate::models::TaskStatus::Pending);

        let fixed = mine_tasks_from("John: I'll prepare the report by Friday.", today());
        assert_eq!(fixed[0].due_date, "2025-01-17");
    }

    #[test]
    fn test_self_commitment_variants() {
        let transcript = "Mary: Sounds good. I'm going to update the budget sheet.\n\
                          Raj: I will call the vendor by end of the week\n\
                          Ann: I think we should wait.";
        let tasks = mine_tasks_from(transcript, today());

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].assigned_to, "Mary");
        assert_eq!(tasks[0].name, "update the budget sheet");
        assert_eq!(tasks[0].due_date, "");
        assert_eq!(tasks[1].assigned_to, "Raj");
        assert_eq!(tasks[1].name, "call the vendor");
        assert_eq!(tasks[1].due_date, "2025-01-17");
    }

    #[test]
    fn test_assignment_pattern() {
        let tasks = mine_tasks_from(
            "Lead: Let's assign Priya to draft the press release by next Monday.",
            today(),
        );

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].assigned_to, "Priya");
        assert_eq!(tasks[0].name, "draft the press release");
        assert_eq!(tasks[0].due_date, "2025-01-20");

        let tasks = mine_tasks_from("We assigned to Bob to fix the login bug.", today());
        assert_eq!(tasks[0].assigned_to, "Bob");
        assert_eq!(tasks[0].name, "fix the login bug");
    }

    #[test]
    fn test_direct_address_patterns() {
        let transcript = "John: Mary, can you send the deck to the client?\n\
                          Mary: Sure. Can you review the contract, Tom?";
        let tasks = mine_tasks_from(transcript, today());

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].assigned_to, "Mary");
        assert_eq!(tasks[0].name, "send the deck to the client");
        assert_eq!(tasks[0].due_date, "");
        assert_eq!(tasks[1].assigned_to, "Tom");
        assert_eq!(tasks[1].name, "review the contract");
    }

    #[test]
    fn test_filler_words_are_not_assignees() {
        let tasks = mine_tasks_from("Okay, can you all hear me?", today());
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_deadline_closed_by_trailing_clause() {
        let tasks = mine_tasks_from(
            "John: I'll send the report by Friday, okay?\n\
             Lead: We assigned Priya to book the room by tomorrow; thanks.",
            today(),
        );

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].name, "send the report");
        assert_eq!(tasks[0].due_date, "2025-01-17");
        assert_eq!(tasks[1].assigned_to, "Priya");
        assert_eq!(tasks[1].name, "book the room");
        assert_eq!(tasks[1].due_date, "2025-01-16");
    }

    #[test]
    fn test_huge_offset_deadline_kept_as_text() {
        let tasks = mine_tasks_from("John: I'll ship it by 100000000 weeks later.", today());
        assert_eq!(tasks[0].name, "ship it");
        assert_eq!(tasks[0].due_date, "100000000 weeks later");
    }

    #[test]
    fn test_deadline_kept_when_unparseable() {
        let tasks = mine_tasks_from("Sam: I'll ship it by the next release", today());
        assert_eq!(tasks[0].name, "ship it");
        assert_eq!(tasks[0].due_date, "the next release");
    }

    #[test]
    fn test_duplicates_collapse_case_insensitively() {
        let transcript = "John: I'll prepare the report.\n\
                          john: I will Prepare The Report.\n\
                          John: I'll prepare the slides.";
        let tasks = mine_tasks_from(transcript, today());

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].name, "prepare the report");
        assert_eq!(tasks[0].assigned_to, "John");
        assert_eq!(tasks[1].name, "prepare the slides");
    }

    #[test]
    fn test_no_triggers_no_tasks() {
        assert!(mine_tasks("Alice: The weather is nice.\nBob: Agreed.").is_empty());
        assert!(mine_tasks("").is_empty());
    }
}
