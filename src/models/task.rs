use serde::{Deserialize, Serialize};

/// Progress of an action item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }

    /// Lenient parse of a status written by a model or a user
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "pending" | "todo" | "to-do" | "open" | "not-started" => Some(Self::Pending),
            "in-progress" | "inprogress" | "ongoing" | "started" | "wip" => Some(Self::InProgress),
            "done" | "complete" | "completed" | "finished" | "closed" => Some(Self::Done),
            _ => None,
        }
    }

    /// Cycle Pending -> InProgress -> Done -> Pending
    pub fn next(self) -> Self {
        match self {
            Self::Pending => Self::InProgress,
            Self::InProgress => Self::Done,
            Self::Done => Self::Pending,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action item pulled out of a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTask {
    /// What needs doing; never empty
    pub name: String,
    /// Person responsible (may be empty)
    #[serde(default)]
    pub assigned_to: String,
    /// ISO-8601 date, or the original phrase when it could not be resolved
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub status: TaskStatus,
}

impl ExtractedTask {
    /// Create a pending task. Returns `None` when the name is blank.
    pub fn new(
        name: impl Into<String>,
        assigned_to: impl Into<String>,
        due_date: impl Into<String>,
    ) -> Option<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            assigned_to: assigned_to.into().trim().to_string(),
            due_date: due_date.into().trim().to_string(),
            status: TaskStatus::Pending,
        })
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Case-insensitive identity used for deduplication
    pub fn dedup_key(&self) -> (String, String) {
        (self.assigned_to.to_lowercase(), self.name.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(TaskStatus::parse("In Progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("in_progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("DONE"), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::parse("pending"), Some(TaskStatus::Pending));
        assert_eq!(TaskStatus::parse("blocked"), None);
    }

    #[test]
    fn test_status_cycle() {
        let status = TaskStatus::default();
        assert_eq!(status, TaskStatus::Pending);
        assert_eq!(status.next(), TaskStatus::InProgress);
        assert_eq!(status.next().next(), TaskStatus::Done);
        assert_eq!(status.next().next().next(), TaskStatus::Pending);
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(ExtractedTask::new("   ", "John", "").is_none());
        let task = ExtractedTask::new(" Send deck ", " Mary ", "").unwrap();
        assert_eq!(task.name, "Send deck");
        assert_eq!(task.assigned_to, "Mary");
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn test_status_serialization() {
        let task = ExtractedTask::new("a", "b", "")
            .unwrap()
            .with_status(TaskStatus::InProgress);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["status"], "in-progress");
    }
}
