use thiserror::Error;

/// Failures that abort a pipeline run.
///
/// Malformed model output is not represented here: it degrades to empty
/// results after the fallback ladder is exhausted.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Completion failed during {stage}: {source:#}")]
    Completion {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Transcription failed: {0:#}")]
    Transcription(#[source] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn completion(stage: &'static str, source: anyhow::Error) -> Self {
        Self::Completion { stage, source }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_error_names_stage() {
        let err = PipelineError::completion("task prompt", anyhow::anyhow!("connection refused"));
        let message = err.to_string();
        assert!(message.contains("task prompt"));
        assert!(message.contains("connection refused"));
    }
}
