use crate::error::PipelineError;

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_LLAMA_URL: &str = "http://127.0.0.1:8080";

/// Which completion backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    Anthropic,
    /// A llama.cpp server hosting a local model
    Llama,
}

impl LlmProviderKind {
    pub fn parse(s: &str) -> Result<Self, PipelineError> {
        match s.trim().to_lowercase().as_str() {
            "" | "anthropic" | "claude" => Ok(Self::Anthropic),
            "llama" | "llama.cpp" | "local" => Ok(Self::Llama),
            other => Err(PipelineError::Config(format!(
                "Unsupported LLM provider '{}'. Supported providers: anthropic, llama",
                other
            ))),
        }
    }
}

/// Runtime settings gathered from the environment
#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: LlmProviderKind,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub llama_url: String,
    pub deepgram_api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::Anthropic,
            anthropic_api_key: None,
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            llama_url: DEFAULT_LLAMA_URL.to_string(),
            deepgram_api_key: None,
        }
    }
}

impl Settings {
    /// Read settings from environment variables
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PipelineError> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let provider = match non_empty("MINUTEMIND_LLM_PROVIDER") {
            Some(value) => LlmProviderKind::parse(&value)?,
            None => defaults.provider,
        };

        Ok(Self {
            provider,
            anthropic_api_key: non_empty("ANTHROPIC_API_KEY"),
            anthropic_model: non_empty("MINUTEMIND_ANTHROPIC_MODEL")
                .unwrap_or(defaults.anthropic_model),
            llama_url: non_empty("MINUTEMIND_LLAMA_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.llama_url),
            deepgram_api_key: non_empty("DEEPGRAM_API_KEY"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.provider, LlmProviderKind::Anthropic);
        assert_eq!(settings.anthropic_model, DEFAULT_ANTHROPIC_MODEL);
        assert_eq!(settings.llama_url, DEFAULT_LLAMA_URL);
        assert!(settings.anthropic_api_key.is_none());
    }

    #[test]
    fn test_llama_provider_from_env() {
        let settings = Settings::from_lookup(lookup(&[
            ("MINUTEMIND_LLM_PROVIDER", "llama"),
            ("MINUTEMIND_LLAMA_URL", "http://gpu-box:9000/"),
            ("ANTHROPIC_API_KEY", "  "),
        ]))
        .unwrap();
        assert_eq!(settings.provider, LlmProviderKind::Llama);
        assert_eq!(settings.llama_url, "http://gpu-box:9000");
        assert!(settings.anthropic_api_key.is_none());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = Settings::from_lookup(lookup(&[("MINUTEMIND_LLM_PROVIDER", "gpt")])).unwrap_err();
        assert!(err.to_string().contains("Unsupported LLM provider"));
    }
}
