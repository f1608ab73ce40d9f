use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{LlmProviderKind, Settings};
use crate::error::PipelineError;
use crate::serialized::Serialized;

/// Black-box text completion capability
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete `prompt`, producing at most `max_tokens` tokens
    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f64) -> Result<String>;
}

#[async_trait]
impl<T: CompletionProvider + ?Sized> CompletionProvider for Box<T> {
    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f64) -> Result<String> {
        (**self).complete(prompt, max_tokens, temperature).await
    }
}

#[async_trait]
impl<T: CompletionProvider + ?Sized> CompletionProvider for Serialized<T> {
    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f64) -> Result<String> {
        let (_guard, inner) = self.acquire().await;
        inner.complete(prompt, max_tokens, temperature).await
    }
}

/// Build the completion provider selected in settings
pub fn build_provider(settings: &Settings) -> Result<Box<dyn CompletionProvider>, PipelineError> {
    match settings.provider {
        LlmProviderKind::Anthropic => Ok(Box::new(AnthropicClient::new(
            AnthropicConfig::from_settings(settings)?,
        ))),
        LlmProviderKind::Llama => Ok(Box::new(LlamaServerClient::new(&settings.llama_url))),
    }
}

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,
}

impl AnthropicConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, PipelineError> {
        let api_key = settings.anthropic_api_key.clone().ok_or_else(|| {
            PipelineError::Config("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key, settings.anthropic_model.clone()))
    }

    pub fn new(api_key: String, model: String) -> Self {
        Self { api_key, model }
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl CompletionProvider for AnthropicClient {
    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f64) -> Result<String> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens,
            temperature: Some(temperature),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        debug!("Anthropic request: {} prompt chars, max_tokens={}", prompt.len(), max_tokens);

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error: {} - {}", status, body);
        }

        let response: AnthropicResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        // Text blocks only; an empty completion is valid output
        Ok(response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(""))
    }
}

/// Client for a llama.cpp server hosting a local model
pub struct LlamaServerClient {
    client: Client,
    base_url: String,
}

impl LlamaServerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn completion_url(&self) -> String {
        format!("{}/completion", self.base_url)
    }
}

#[async_trait]
impl CompletionProvider for LlamaServerClient {
    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f64) -> Result<String> {
        let request = LlamaRequest {
            prompt,
            n_predict: max_tokens,
            temperature,
            top_p: 0.9,
        };

        let response = self
            .client
            .post(self.completion_url())
            .json(&request)
            .send()
            .await
            .context("Failed to send request to llama.cpp server")?
            .error_for_status()
            .context("llama.cpp server returned an error status")?;

        let response: LlamaResponse = response
            .json()
            .await
            .context("Failed to parse llama.cpp server response")?;

        Ok(response.content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct LlamaRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f64,
    top_p: f64,
}

#[derive(Debug, Deserialize)]
struct LlamaResponse {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_anthropic_requires_api_key() {
        let settings = Settings::default();
        let err = match build_provider(&settings) {
            Ok(_) => panic!("expected provider creation to fail"),
            Err(e) => e.to_string(),
        };
        assert!(err.contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_llama_provider_needs_no_key() {
        let settings = Settings {
            provider: LlmProviderKind::Llama,
            ..Settings::default()
        };
        assert!(build_provider(&settings).is_ok());
        let client = LlamaServerClient::new("http://localhost:8080/");
        assert_eq!(client.completion_url(), "http://localhost:8080/completion");
    }

    #[test]
    fn test_parse_anthropic_response_text() {
        let json = r#"{"content": [{"type": "text", "text": "[]"}], "stop_reason": "end_turn"}"#;
        let response: AnthropicResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.content[0].text, "[]");
    }

    struct Probe {
        in_flight: AtomicUsize,
        max_seen: AtomicUsize,
    }

    #[async_trait]
    impl CompletionProvider for Probe {
        async fn complete(&self, prompt: &str, _: u32, _: f64) -> Result<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(prompt.to_string())
        }
    }

    #[tokio::test]
    async fn test_serialized_allows_one_call_in_flight() {
        let provider = Arc::new(Serialized::new(Probe {
            in_flight: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
        }));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let provider = Arc::clone(&provider);
                tokio::spawn(async move { provider.complete(&i.to_string(), 16, 0.0).await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(provider.inner().max_seen.load(Ordering::SeqCst), 1);
    }
}
