use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::models::Meeting;

const NOT_SPECIFIED: &str = "Not specified";

/// Knobs for the minutes document
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Append the speaker-grouped transcript
    pub include_transcript: bool,
    /// Wrap summary and transcript text at this width
    pub wrap_width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            include_transcript: true,
            wrap_width: 80,
        }
    }
}

/// Write the meeting aggregate as pretty JSON
pub fn write_meeting_json(meeting: &Meeting, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, meeting).context("Failed to write JSON")?;
    Ok(())
}

/// Read a meeting aggregate back from JSON
pub fn read_meeting_json(path: &Path) -> Result<Meeting> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    serde_json::from_str(&content).context("Failed to parse meeting JSON")
}

/// `MoM_<id>_<safe title>.md`
pub fn minutes_filename(meeting: &Meeting) -> String {
    let title = if meeting.title.trim().is_empty() {
        "Meeting"
    } else {
        meeting.title.as_str()
    };
    let safe: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe: String = safe.trim_end().replace(' ', "_").chars().take(50).collect();
    format!("MoM_{}_{}.md", meeting.id, safe)
}

/// Markdown minutes-of-meeting document
pub struct MinutesDocument<'a> {
    meeting: &'a Meeting,
    config: RenderConfig,
}

impl<'a> MinutesDocument<'a> {
    pub fn new(meeting: &'a Meeting, config: RenderConfig) -> Self {
        Self { meeting, config }
    }

    /// Render with the current local time as the generation stamp
    pub fn format(&self) -> String {
        self.format_at(Local::now())
    }

    /// Render with a fixed generation stamp
    pub fn format_at(&self, generated: DateTime<Local>) -> String {
        let mut out = String::new();
        self.write_header(&mut out);
        self.write_attendees(&mut out);
        self.write_agenda(&mut out);
        self.write_summary(&mut out);
        self.write_decisions(&mut out);
        self.write_action_items(&mut out);
        self.write_conflicts(&mut out);
        if self.config.include_transcript {
            self.write_transcript(&mut out);
        }
        self.write_footer(&mut out, generated);
        out
    }

    /// Write to a Markdown file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }

    fn write_header(&self, out: &mut String) {
        let m = self.meeting;
        out.push_str("# MINUTES OF MEETING\n\n");
        out.push_str(&format!("## {}\n\n", m.title));
        out.push_str("| | |\n|---|---|\n");
        out.push_str(&format!("| **Date** | {} |\n", m.date.format("%B %d, %Y")));
        out.push_str(&format!("| **Time** | {} |\n", cell(m.adjournment_time.as_deref())));
        out.push_str(&format!("| **Location** | {} |\n", cell(m.location.as_deref())));
        out.push_str(&format!("| **Host/Chairperson** | {} |\n\n", cell(m.host.as_deref())));
    }

    fn write_attendees(&self, out: &mut String) {
        out.push_str("## Attendees\n\n");
        let presentees = Meeting::attendee_list(self.meeting.presentees.as_deref());
        if presentees.is_empty() {
            out.push_str(&format!("- Presentees: {}\n", NOT_SPECIFIED));
        } else {
            out.push_str("- Presentees:\n");
            for person in &presentees {
                out.push_str(&format!("  - {}\n", person));
            }
        }
        let absentees = Meeting::attendee_list(self.meeting.absentees.as_deref());
        if !absentees.is_empty() {
            out.push_str("- Absentees:\n");
            for person in &absentees {
                out.push_str(&format!("  - {}\n", person));
            }
        }
        out.push('\n');
    }

    fn write_agenda(&self, out: &mut String) {
        let items = self.meeting.agenda_items();
        if items.is_empty() {
            return;
        }
        out.push_str("## Agenda\n\n");
        for (i, item) in items.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, item));
        }
        out.push('\n');
    }

    fn write_summary(&self, out: &mut String) {
        let summary = self.meeting.summary.trim();
        if summary.is_empty() {
            return;
        }
        out.push_str("## Meeting Summary\n\n");
        for paragraph in summary.split("\n\n") {
            out.push_str(&wrap_text(paragraph, self.config.wrap_width));
            out.push_str("\n\n");
        }
    }

    fn write_decisions(&self, out: &mut String) {
        if self.meeting.key_decisions.is_empty() {
            return;
        }
        out.push_str("## Key Decisions\n\n");
        for (i, decision) in self.meeting.key_decisions.iter().enumerate() {
            if decision.speaker.is_empty() {
                out.push_str(&format!("{}. {}\n", i + 1, decision.text));
            } else {
                out.push_str(&format!("{}. {} (by {})\n", i + 1, decision.text, decision.speaker));
            }
        }
        out.push('\n');
    }

    fn write_action_items(&self, out: &mut String) {
        if self.meeting.tasks.is_empty() {
            return;
        }
        out.push_str("## Action Items\n\n");
        out.push_str("| Task Description | Assigned To | Deadline | Status |\n");
        out.push_str("|---|---|---|---|\n");
        for task in &self.meeting.tasks {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(&task.name),
                escape_cell(&task.assigned_to),
                if task.due_date.is_empty() {
                    "Not mentioned".to_string()
                } else {
                    escape_cell(&task.due_date)
                },
                task.status
            ));
        }
        out.push('\n');
    }

    fn write_conflicts(&self, out: &mut String) {
        if self.meeting.conflicts.is_empty() {
            return;
        }
        out.push_str("## Conflicts and Issues\n\n");
        out.push_str("| Issue | Raised By | Severity | Participants | Stance |\n");
        out.push_str("|---|---|---|---|---|\n");
        for conflict in &self.meeting.conflicts {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                escape_cell(&conflict.issue),
                escape_cell(&conflict.raised_by),
                conflict.severity,
                escape_cell(&conflict.participants_display()),
                escape_cell(&conflict.stance)
            ));
        }
        out.push('\n');
    }

    fn write_transcript(&self, out: &mut String) {
        if self.meeting.transcript.is_empty() {
            return;
        }
        out.push_str("## Full Transcript\n\n");

        let mut current_speaker: Option<&str> = None;
        for segment in &self.meeting.transcript {
            if current_speaker != Some(segment.speaker.as_str()) {
                out.push_str(&format!("**{}:**\n\n", segment.speaker));
                current_speaker = Some(segment.speaker.as_str());
            }
            let line = format!("[{}] {}", format_timestamp(segment.start), segment.text.trim());
            out.push_str(&wrap_text(&line, self.config.wrap_width));
            out.push_str("\n\n");
        }
    }

    fn write_footer(&self, out: &mut String, generated: DateTime<Local>) {
        out.push_str("---\n\n");
        out.push_str("*End of Minutes*\n\n");
        if let Some(time) = self.meeting.adjournment_time.as_deref().filter(|t| !t.trim().is_empty()) {
            out.push_str(&format!("Meeting adjourned at: {}\n\n", time.trim()));
        }
        out.push_str(&format!(
            "*Document generated on: {}*\n",
            generated.format("%B %d, %Y at %I:%M %p")
        ));
    }
}

fn cell(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => escape_cell(v),
        None => NOT_SPECIFIED.to_string(),
    }
}

/// Keep a value inside a single Markdown table cell
fn escape_cell(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

/// Format seconds as MM:SS
fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len + word_len + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word_len;
    }

    result
}
