use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use super::stage1_extract::recover_records;
use crate::error::{PipelineError, PipelineResult};
use crate::llm::fields;
use crate::llm::{build_decision_prompt, build_summary_prompt, chunk_text, CompletionProvider};
use crate::models::Decision;

static THINKING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think(?:ing)?>.*?</think(?:ing)?>").expect("valid regex"));

/// Configuration for Stage 2
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub max_tokens: u32,
    /// Slightly above extraction; summaries are prose
    pub temperature: f64,
    pub decision_max_tokens: u32,
    pub chunk_chars: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.3,
            decision_max_tokens: 512,
            chunk_chars: 3000,
        }
    }
}

/// Result of Stage 2 processing
#[derive(Debug, Clone, Default)]
pub struct SummaryResult {
    pub summary: String,
    pub decisions: Vec<Decision>,
}

/// Execute Stage 2: summary and key decisions
pub async fn summarize_meeting<P>(
    provider: &P,
    transcript: &str,
    config: &SummaryConfig,
) -> PipelineResult<SummaryResult>
where
    P: CompletionProvider + ?Sized,
{
    let summary = summarize(provider, transcript, config).await?;
    let decisions = extract_decisions(provider, transcript, config).await?;

    info!(
        "Stage 2: {} summary chars, {} decisions",
        summary.len(),
        decisions.len()
    );

    Ok(SummaryResult { summary, decisions })
}

/// Summarize each chunk and join the pieces with blank lines
pub async fn summarize<P>(
    provider: &P,
    transcript: &str,
    config: &SummaryConfig,
) -> PipelineResult<String>
where
    P: CompletionProvider + ?Sized,
{
    let mut parts = Vec::new();

    for chunk in chunk_text(transcript, config.chunk_chars) {
        let raw = provider
            .complete(&build_summary_prompt(&chunk), config.max_tokens, config.temperature)
            .await
            .map_err(|e| PipelineError::completion("summary prompt", e))?;
        let cleaned = clean_model_text(&raw);
        if !cleaned.is_empty() {
            parts.push(cleaned);
        }
    }

    Ok(parts.join("\n\n"))
}

/// Key decisions via the JSON prompt with line fallback; no rule-based rung
pub async fn extract_decisions<P>(
    provider: &P,
    transcript: &str,
    config: &SummaryConfig,
) -> PipelineResult<Vec<Decision>>
where
    P: CompletionProvider + ?Sized,
{
    let mut decisions = Vec::new();

    for (index, chunk) in chunk_text(transcript, config.chunk_chars).iter().enumerate() {
        let raw = provider
            .complete(
                &build_decision_prompt(chunk),
                config.decision_max_tokens,
                config.temperature,
            )
            .await
            .map_err(|e| PipelineError::completion("decision prompt", e))?;

        match recover_records(&raw, fields::DECISION_CONTAINERS, &fields::decision_from_item) {
            Some((found, recovery)) => {
                debug!("Chunk {}: {} decisions via {:?}", index, found.len(), recovery);
                decisions.extend(found);
            }
            None => debug!("Chunk {}: no decisions recovered", index),
        }
    }

    Ok(decisions)
}

/// Strip reasoning blocks and a wrapping code fence from model prose
pub fn clean_model_text(text: &str) -> String {
    let without_thinking = THINKING.replace_all(text, "");
    let trimmed = without_thinking.trim();

    for prefix in ["```markdown\n", "```text\n", "```\n"] {
        if let Some(inner) = trimmed
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix("```"))
        {
            return inner.trim().to_string();
        }
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    struct ScriptedProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(&self, prompt: &str, _: u32, _: f64) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if prompt.contains("\"decision\"") {
                Ok("Decisions:\n{\"decision\": \"Ship on Monday\", \"speaker\": \"Ann\", \"notes\": {\"a\": 1}}\n{\"decision\": \"Hire a designer\", \"extra\": {}}".to_string())
            } else {
                Ok("<think>let me see</think>\n```\nThe team agreed on a launch plan.\n```".to_string())
            }
        }
    }

    #[test]
    fn test_clean_model_text() {
        assert_eq!(clean_model_text("<thinking>x</thinking> Hello "), "Hello");
        assert_eq!(clean_model_text("```markdown\nBody\n```"), "Body");
        assert_eq!(clean_model_text("plain"), "plain");
    }

    #[tokio::test]
    async fn test_summarize_meeting() {
        let provider = ScriptedProvider {
            calls: AtomicUsize::new(0),
        };
        let result = summarize_meeting(&provider, "Ann: Let's ship Monday.", &SummaryConfig::default())
            .await
            .unwrap();

        assert_eq!(result.summary, "The team agreed on a launch plan.");
        assert_eq!(result.decisions.len(), 2);
        assert_eq!(result.decisions[0].speaker, "Ann");
        assert_eq!(result.decisions[1].speaker, "");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_transcript_skips_model() {
        let provider = ScriptedProvider {
            calls: AtomicUsize::new(0),
        };
        let result = summarize_meeting(&provider, "", &SummaryConfig::default())
            .await
            .unwrap();

        assert!(result.summary.is_empty());
        assert!(result.decisions.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
