use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// How serious a disagreement is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "minor" => Some(Self::Low),
            "medium" | "moderate" | "med" => Some(Self::Medium),
            "high" | "major" | "severe" | "critical" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A disagreement raised during the meeting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedConflict {
    /// What the disagreement is about; never empty
    pub issue: String,
    #[serde(default)]
    pub raised_by: String,
    /// People involved, kept sorted and unique
    #[serde(default)]
    pub participants: BTreeSet<String>,
    /// Summary of the positions taken
    #[serde(default)]
    pub stance: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub topic: String,
}

impl ExtractedConflict {
    /// Create a conflict with default severity. Returns `None` when the issue is blank.
    pub fn new(issue: impl Into<String>, raised_by: impl Into<String>) -> Option<Self> {
        let issue = issue.into().trim().to_string();
        if issue.is_empty() {
            return None;
        }
        Some(Self {
            issue,
            raised_by: raised_by.into().trim().to_string(),
            participants: BTreeSet::new(),
            stance: String::new(),
            severity: Severity::default(),
            topic: String::new(),
        })
    }

    /// Participants joined for display
    pub fn participants_display(&self) -> String {
        self.participants
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Split a free-text participant list ("A, B and C", "A vs B") into names
pub fn parse_participants(text: &str) -> BTreeSet<String> {
    let mut normalized = text.to_string();
    for sep in [" and ", " vs. ", " vs ", " & ", ";", "/"] {
        normalized = normalized.replace(sep, ",");
    }
    normalized
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
