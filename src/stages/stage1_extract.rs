use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::heuristics::{mine_tasks_from, resolve_deadline_from, scan_conflicts};
use crate::llm::fields::{self, Aliases};
use crate::llm::{
    build_conflict_prompt, build_pipe_retry_prompt, build_task_prompt, chunk_text,
    collect_object_lines, parse_lenient, CompletionProvider, PIPE_DELIMITER,
};
use crate::models::{ExtractedConflict, ExtractedTask};

/// Leading list markers models put in front of delimited lines
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]+|\d+[.)])\s*").expect("valid regex"));

/// Configuration for Stage 1
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Output cap for the structured prompts
    pub max_tokens: u32,
    /// Sampling temperature; kept low since this is extraction
    pub temperature: f64,
    /// Output cap for the delimited-line retry prompt
    pub retry_max_tokens: u32,
    /// Transcript characters per completion call
    pub chunk_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.1,
            retry_max_tokens: 512,
            chunk_chars: 3000,
        }
    }
}

/// Which rung of the ladder produced the tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSource {
    ModelJson,
    ObjectLines,
    RegexMiner,
    PipeRetry,
    None,
}

/// Which rung of the ladder produced the conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictSource {
    ModelJson,
    ObjectLines,
    KeywordScan,
    None,
}

/// Result of Stage 1 processing
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub tasks: Vec<ExtractedTask>,
    pub conflicts: Vec<ExtractedConflict>,
    pub task_source: TaskSource,
    pub conflict_source: ConflictSource,
}

/// How a chunk's model output was recovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Recovery {
    Json,
    ObjectLines,
}

/// Execute Stage 1: extract tasks and conflicts from a speaker-labeled transcript.
///
/// Tasks and conflicts run their own escalation ladders one after the
/// other. Malformed model output only ever degrades to an empty result;
/// a failed completion call aborts the whole extraction.
pub async fn extract_tasks_and_conflicts<P>(
    provider: &P,
    transcript: &str,
    config: &ExtractionConfig,
) -> PipelineResult<ExtractionResult>
where
    P: CompletionProvider + ?Sized,
{
    extract_tasks_and_conflicts_from(provider, transcript, config, Local::now().date_naive()).await
}

/// Same as [`extract_tasks_and_conflicts`] with a fixed reference date
pub async fn extract_tasks_and_conflicts_from<P>(
    provider: &P,
    transcript: &str,
    config: &ExtractionConfig,
    today: NaiveDate,
) -> PipelineResult<ExtractionResult>
where
    P: CompletionProvider + ?Sized,
{
    let (tasks, task_source) = extract_tasks_from(provider, transcript, config, today).await?;
    let (conflicts, conflict_source) = extract_conflicts(provider, transcript, config).await?;

    info!(
        "Stage 1: {} tasks ({:?}), {} conflicts ({:?})",
        tasks.len(),
        task_source,
        conflicts.len(),
        conflict_source
    );

    Ok(ExtractionResult {
        tasks,
        conflicts,
        task_source,
        conflict_source,
    })
}

/// Task ladder: PARSE, LINE_FALLBACK, REGEX_FALLBACK, then the delimited retry
pub async fn extract_tasks_from<P>(
    provider: &P,
    transcript: &str,
    config: &ExtractionConfig,
    today: NaiveDate,
) -> PipelineResult<(Vec<ExtractedTask>, TaskSource)>
where
    P: CompletionProvider + ?Sized,
{
    let chunks = chunk_text(transcript, config.chunk_chars);
    if chunks.is_empty() {
        debug!("Empty transcript; skipping task extraction");
        return Ok((Vec::new(), TaskSource::None));
    }

    let (tasks, recovery) = model_stage(
        provider,
        &chunks,
        config,
        "task prompt",
        build_task_prompt,
        fields::TASK_CONTAINERS,
        |item| fields::task_from_item(item, today),
    )
    .await?;
    if let Some(recovery) = recovery {
        let source = match recovery {
            Recovery::Json => TaskSource::ModelJson,
            Recovery::ObjectLines => TaskSource::ObjectLines,
        };
        info!("Tasks: {} from {:?}", tasks.len(), source);
        return Ok((tasks, source));
    }

    info!("Tasks: model output unusable, mining transcript");
    let mined = mine_tasks_from(transcript, today);
    if !mined.is_empty() {
        info!("Tasks: {} from regex miner", mined.len());
        return Ok((mined, TaskSource::RegexMiner));
    }

    info!("Tasks: regex miner found nothing, retrying with delimited lines");
    let mut retried = Vec::new();
    for (index, chunk) in chunks.iter().enumerate() {
        let prompt = build_pipe_retry_prompt(chunk);
        let raw = provider
            .complete(&prompt, config.retry_max_tokens, config.temperature)
            .await
            .map_err(|e| PipelineError::completion("task retry prompt", e))?;
        let parsed = parse_pipe_lines(&raw, today);
        debug!("Chunk {}: {} tasks from delimited retry", index, parsed.len());
        retried.extend(parsed);
    }

    if retried.is_empty() {
        warn!("Tasks: every fallback exhausted, no tasks found");
        Ok((retried, TaskSource::None))
    } else {
        info!("Tasks: {} from delimited retry", retried.len());
        Ok((retried, TaskSource::PipeRetry))
    }
}

/// Task ladder against today's date
pub async fn extract_tasks<P>(
    provider: &P,
    transcript: &str,
    config: &ExtractionConfig,
) -> PipelineResult<(Vec<ExtractedTask>, TaskSource)>
where
    P: CompletionProvider + ?Sized,
{
    extract_tasks_from(provider, transcript, config, Local::now().date_naive()).await
}

/// Conflict ladder: PARSE, LINE_FALLBACK, then keyword scan
pub async fn extract_conflicts<P>(
    provider: &P,
    transcript: &str,
    config: &ExtractionConfig,
) -> PipelineResult<(Vec<ExtractedConflict>, ConflictSource)>
where
    P: CompletionProvider + ?Sized,
{
    let chunks = chunk_text(transcript, config.chunk_chars);
    if chunks.is_empty() {
        debug!("Empty transcript; skipping conflict extraction");
        return Ok((Vec::new(), ConflictSource::None));
    }

    let (conflicts, recovery) = model_stage(
        provider,
        &chunks,
        config,
        "conflict prompt",
        build_conflict_prompt,
        fields::CONFLICT_CONTAINERS,
        fields::conflict_from_item,
    )
    .await?;
    if let Some(recovery) = recovery {
        let source = match recovery {
            Recovery::Json => ConflictSource::ModelJson,
            Recovery::ObjectLines => ConflictSource::ObjectLines,
        };
        info!("Conflicts: {} from {:?}", conflicts.len(), source);
        return Ok((conflicts, source));
    }

    info!("Conflicts: model output unusable, scanning for keywords");
    let scanned = scan_conflicts(transcript);
    if scanned.is_empty() {
        debug!("Conflicts: keyword scan found nothing");
        Ok((scanned, ConflictSource::None))
    } else {
        info!("Conflicts: {} from keyword scan", scanned.len());
        Ok((scanned, ConflictSource::KeywordScan))
    }
}

/// Run one prompt per chunk and recover records from each output.
///
/// Returns the concatenated records and the strongest recovery used, or
/// `None` when no chunk yielded a usable record.
async fn model_stage<P, T>(
    provider: &P,
    chunks: &[String],
    config: &ExtractionConfig,
    stage: &'static str,
    build_prompt: impl Fn(&str) -> String,
    containers: Aliases,
    normalize: impl Fn(&Value) -> Option<T>,
) -> PipelineResult<(Vec<T>, Option<Recovery>)>
where
    P: CompletionProvider + ?Sized,
{
    let mut records = Vec::new();
    let mut best: Option<Recovery> = None;

    for (index, chunk) in chunks.iter().enumerate() {
        let prompt = build_prompt(chunk);
        let raw = provider
            .complete(&prompt, config.max_tokens, config.temperature)
            .await
            .map_err(|e| PipelineError::completion(stage, e))?;

        match recover_records(&raw, containers, &normalize) {
            Some((found, recovery)) => {
                debug!("Chunk {}: {} records via {:?}", index, found.len(), recovery);
                records.extend(found);
                best = match (best, recovery) {
                    (Some(Recovery::Json), _) | (_, Recovery::Json) => Some(Recovery::Json),
                    _ => Some(Recovery::ObjectLines),
                };
            }
            None => debug!("Chunk {}: no usable records", index),
        }
    }

    Ok((records, best))
}

/// PARSE then LINE_FALLBACK over one raw model output.
///
/// A parse whose items all lack required fields counts as empty.
pub(crate) fn recover_records<T>(
    raw: &str,
    containers: Aliases,
    normalize: &impl Fn(&Value) -> Option<T>,
) -> Option<(Vec<T>, Recovery)> {
    let normalize_all = |value: Value| -> Vec<T> {
        fields::items(value, containers)
            .iter()
            .filter_map(normalize)
            .collect()
    };

    if let Some(value) = parse_lenient(raw) {
        let records = normalize_all(value);
        if !records.is_empty() {
            return Some((records, Recovery::Json));
        }
    }

    let wrapped = collect_object_lines(raw)?;
    let records = normalize_all(parse_lenient(&wrapped)?);
    if records.is_empty() {
        None
    } else {
        Some((records, Recovery::ObjectLines))
    }
}

/// Parse `task ||| assignee ||| deadline` lines.
///
/// Lines with fewer than two fields are skipped, as is a header line.
pub fn parse_pipe_lines(text: &str, today: NaiveDate) -> Vec<ExtractedTask> {
    text.lines()
        .filter_map(|line| {
            let line = LIST_MARKER.replace(line, "");
            let parts: Vec<&str> = line.split(PIPE_DELIMITER).map(str::trim).collect();
            if parts.len() < 2 {
                return None;
            }
            if parts[0].eq_ignore_ascii_case("task") && parts[1].eq_ignore_ascii_case("assignee") {
                return None;
            }

            let assignee = if fields::is_placeholder(parts[1]) { "" } else { parts[1] };
            let deadline = parts
                .get(2)
                .filter(|d| !fields::is_placeholder(d))
                .map(|d| resolve_deadline_from(d, today))
                .unwrap_or_default();

            ExtractedTask::new(parts[0], assignee, deadline)
        })
        .collect()
}
