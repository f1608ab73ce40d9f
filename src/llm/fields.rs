use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::heuristics::resolve_deadline_from;
use crate::models::{
    parse_participants, Decision, ExtractedConflict, ExtractedTask, Severity, TaskStatus,
};

/// Ordered key aliases for one output field; the first non-empty wins
pub type Aliases = &'static [&'static str];

pub const TASK_NAME: Aliases = &["task_name", "task", "task_description", "description", "title"];
pub const TASK_ASSIGNEE: Aliases = &["assigned_to", "assignee", "person", "owner", "responsible"];
pub const TASK_DUE: Aliases = &["due_date", "deadline", "due", "by"];
pub const TASK_STATUS: Aliases = &["status"];

pub const CONFLICT_ISSUE: Aliases = &["issue", "conflict", "conflict_description", "description"];
pub const CONFLICT_RAISED_BY: Aliases = &["raised_by", "raisedBy", "speaker", "by"];
pub const CONFLICT_PARTICIPANTS: Aliases = &["participants", "people", "speakers"];
pub const CONFLICT_STANCE: Aliases = &["stance", "stances", "positions", "position"];
pub const CONFLICT_SEVERITY: Aliases = &["severity", "level", "priority"];
pub const CONFLICT_TOPIC: Aliases = &["topic", "subject", "category"];

pub const DECISION_TEXT: Aliases = &["decision", "text", "summary"];
pub const DECISION_SPEAKER: Aliases = &["speaker", "by", "owner"];

/// Keys under which models sometimes nest the record list
pub const TASK_CONTAINERS: Aliases = &["tasks", "action_items"];
pub const CONFLICT_CONTAINERS: Aliases = &["conflicts"];
pub const DECISION_CONTAINERS: Aliases = &["decisions", "key_decisions"];

/// Values models emit when a field is unknown
const PLACEHOLDERS: &[&str] = &[
    "n/a",
    "na",
    "none",
    "null",
    "unknown",
    "unassigned",
    "not mentioned",
    "not specified",
    "-",
];

/// Turn a recovered JSON value into candidate records
pub fn items(value: Value, containers: Aliases) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in containers {
                if let Some(Value::Array(_)) = map.get(*key) {
                    if let Some(Value::Array(items)) = map.remove(*key) {
                        return items;
                    }
                }
            }
            vec![Value::Object(map)]
        }
        _ => Vec::new(),
    }
}

/// First non-empty alias value rendered as text
pub fn lookup_text(item: &Map<String, Value>, aliases: Aliases) -> Option<String> {
    aliases
        .iter()
        .filter_map(|key| item.get(*key))
        .find_map(value_text)
}

/// Normalize one model record into a task; records without a name are dropped
pub fn task_from_item(item: &Value, today: NaiveDate) -> Option<ExtractedTask> {
    let map = item.as_object()?;
    let name = lookup_text(map, TASK_NAME)?;
    let assignee = lookup_text(map, TASK_ASSIGNEE)
        .filter(|a| !is_placeholder(a))
        .unwrap_or_default();
    let due = lookup_text(map, TASK_DUE)
        .filter(|d| !is_placeholder(d))
        .map(|d| resolve_deadline_from(&d, today))
        .unwrap_or_default();
    let status = lookup_text(map, TASK_STATUS)
        .and_then(|s| TaskStatus::parse(&s))
        .unwrap_or_default();

    ExtractedTask::new(name, assignee, due).map(|task| task.with_status(status))
}

/// Normalize one model record into a conflict; records without an issue are dropped
pub fn conflict_from_item(item: &Value) -> Option<ExtractedConflict> {
    let map = item.as_object()?;
    let issue = lookup_text(map, CONFLICT_ISSUE)?;
    let raised_by = lookup_text(map, CONFLICT_RAISED_BY)
        .filter(|r| !is_placeholder(r))
        .unwrap_or_default();
    let mut conflict = ExtractedConflict::new(issue, raised_by)?;

    conflict.participants = CONFLICT_PARTICIPANTS
        .iter()
        .filter_map(|key| map.get(*key))
        .map(participants_of)
        .find(|p| !p.is_empty())
        .unwrap_or_default();
    conflict.stance = lookup_text(map, CONFLICT_STANCE).unwrap_or_default();
    conflict.severity = lookup_text(map, CONFLICT_SEVERITY)
        .and_then(|s| Severity::parse(&s))
        .unwrap_or_default();
    conflict.topic = lookup_text(map, CONFLICT_TOPIC).unwrap_or_default();

    Some(conflict)
}

/// Normalize one model record into a decision. Bare strings are accepted.
pub fn decision_from_item(item: &Value) -> Option<Decision> {
    match item {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| Decision {
                text: text.to_string(),
                speaker: String::new(),
            })
        }
        Value::Object(map) => Some(Decision {
            text: lookup_text(map, DECISION_TEXT)?,
            speaker: lookup_text(map, DECISION_SPEAKER)
                .filter(|s| !is_placeholder(s))
                .unwrap_or_default(),
        }),
        _ => None,
    }
}

fn participants_of(value: &Value) -> std::collections::BTreeSet<String> {
    match value {
        Value::Array(values) => values
            .iter()
            .filter_map(value_text)
            .filter(|p| !is_placeholder(p))
            .collect(),
        other => value_text(other)
            .map(|text| parse_participants(&text))
            .unwrap_or_default(),
    }
}

/// Render a JSON value as trimmed text; empty renders as `None`
fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(values) => values
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| value_text(v).map(|v| format!("{}: {}", k, v)))
            .collect::<Vec<_>>()
            .join("; "),
    };
    (!text.is_empty()).then_some(text)
}

/// Whether a value is a stand-in for "unknown"
pub fn is_placeholder(text: &str) -> bool {
    PLACEHOLDERS.contains(&text.trim().to_lowercase().as_str())
}
