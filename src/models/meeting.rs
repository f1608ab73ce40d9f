use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ExtractedConflict, ExtractedTask, TranscriptSegment};

/// A decision recorded during the meeting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub text: String,
    /// Who made or announced the decision (may be empty)
    #[serde(default)]
    pub speaker: String,
}

/// Aggregate root for everything derived from one recording or manual entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    /// Unique identifier (UUID)
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    /// Comma-separated attendee names
    #[serde(default)]
    pub presentees: Option<String>,
    #[serde(default)]
    pub absentees: Option<String>,
    /// One agenda item per line
    #[serde(default)]
    pub agenda: Option<String>,
    #[serde(default)]
    pub adjournment_time: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_decisions: Vec<Decision>,
    #[serde(default)]
    pub tasks: Vec<ExtractedTask>,
    #[serde(default)]
    pub conflicts: Vec<ExtractedConflict>,
    /// Raw segments, kept for re-rendering
    #[serde(default)]
    pub transcript: Vec<TranscriptSegment>,
    pub created_at: DateTime<Utc>,
}

impl Meeting {
    /// Create an empty meeting dated today
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            "Untitled Meeting".to_string()
        } else {
            title.trim().to_string()
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            date: Local::now().date_naive(),
            location: None,
            host: None,
            presentees: None,
            absentees: None,
            agenda: None,
            adjournment_time: None,
            summary: String::new(),
            key_decisions: Vec::new(),
            tasks: Vec::new(),
            conflicts: Vec::new(),
            transcript: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Replace extracted tasks and conflicts
    pub fn apply_extraction(
        &mut self,
        tasks: Vec<ExtractedTask>,
        conflicts: Vec<ExtractedConflict>,
    ) {
        self.tasks = tasks;
        self.conflicts = conflicts;
    }

    /// Replace the summary and key decisions
    pub fn set_summary(&mut self, summary: impl Into<String>, decisions: Vec<Decision>) {
        self.summary = summary.into();
        self.key_decisions = decisions;
    }

    /// Split a comma-separated attendee field into names
    pub fn attendee_list(field: Option<&str>) -> Vec<String> {
        field
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Non-empty agenda lines
    pub fn agenda_items(&self) -> Vec<&str> {
        self.agenda
            .as_deref()
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}
