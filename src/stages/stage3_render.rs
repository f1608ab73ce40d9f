use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::io::{write_meeting_json, MinutesDocument, RenderConfig};
use crate::models::Meeting;

/// Configuration for Stage 3 rendering
#[derive(Debug, Clone)]
pub struct Stage3Config {
    /// Whether to write the meeting JSON
    pub generate_json: bool,
    /// Whether to write the minutes document
    pub generate_minutes: bool,
    pub render: RenderConfig,
}

impl Default for Stage3Config {
    fn default() -> Self {
        Self {
            generate_json: true,
            generate_minutes: true,
            render: RenderConfig::default(),
        }
    }
}

/// Result of Stage 3 rendering
#[derive(Debug)]
pub struct Stage3Result {
    /// Path to meeting JSON (if generated)
    pub json_path: Option<PathBuf>,
    /// Path to minutes document (if generated)
    pub minutes_path: Option<PathBuf>,
}

/// Execute Stage 3: Rendering
///
/// Produces two views of the meeting:
/// 1. Meeting JSON: the persisted aggregate, re-renderable later
/// 2. Minutes document: Markdown minutes of meeting
pub fn execute_stage3(
    meeting: &Meeting,
    json_output: Option<&Path>,
    minutes_output: Option<&Path>,
    config: &Stage3Config,
) -> Result<Stage3Result> {
    let mut result = Stage3Result {
        json_path: None,
        minutes_path: None,
    };

    if config.generate_json {
        if let Some(path) = json_output {
            info!("Writing meeting JSON to {:?}", path);
            write_meeting_json(meeting, path)?;
            result.json_path = Some(path.to_path_buf());
        }
    }

    if config.generate_minutes {
        if let Some(path) = minutes_output {
            info!("Writing minutes to {:?}", path);
            MinutesDocument::new(meeting, config.render.clone()).write_file(path)?;
            result.minutes_path = Some(path.to_path_buf());
        }
    }

    Ok(result)
}
