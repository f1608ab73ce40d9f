use serde::{Deserialize, Serialize};

/// Root response from Deepgram API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramResponse {
    pub results: DeepgramResults,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramResults {
    #[serde(default)]
    pub channels: Vec<DeepgramChannel>,
    /// Present when the request asked for `utterances=true`
    #[serde(default)]
    pub utterances: Option<Vec<DeepgramUtterance>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramChannel {
    pub alternatives: Vec<DeepgramAlternative>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramAlternative {
    #[serde(default)]
    pub words: Vec<DeepgramWord>,
    #[serde(default)]
    pub transcript: Option<String>,
}

/// A single word from Deepgram with diarization info
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramWord {
    /// The recognized text
    pub word: String,
    /// Start timestamp in seconds
    pub start: f64,
    /// End timestamp in seconds
    pub end: f64,
    /// Transcription accuracy score (0-1)
    #[serde(default)]
    pub confidence: f64,
    /// Numeric speaker identifier, absent without diarization
    #[serde(default)]
    pub speaker: Option<u32>,
    /// Reliability of speaker assignment (0-1), only for pre-recorded
    #[serde(default)]
    pub speaker_confidence: Option<f64>,
    /// Word with punctuation and casing applied (if available)
    #[serde(default)]
    pub punctuated_word: Option<String>,
}

impl DeepgramWord {
    /// Punctuated form when present, raw word otherwise
    pub fn display_text(&self) -> &str {
        self.punctuated_word.as_deref().unwrap_or(&self.word)
    }
}

/// A diarized utterance (contiguous speech from one speaker)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramUtterance {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub speaker: Option<u32>,
    pub transcript: String,
}

impl DeepgramResponse {
    /// Extract all words from the first channel's first alternative
    pub fn words(&self) -> &[DeepgramWord] {
        self.first_alternative()
            .map(|a| a.words.as_slice())
            .unwrap_or(&[])
    }

    /// Transcript text of the first channel's first alternative
    pub fn transcript(&self) -> Option<&str> {
        self.first_alternative()
            .and_then(|a| a.transcript.as_deref())
    }

    /// Utterances, if the response carries any
    pub fn utterances(&self) -> &[DeepgramUtterance] {
        self.results.utterances.as_deref().unwrap_or(&[])
    }

    fn first_alternative(&self) -> Option<&DeepgramAlternative> {
        self.results
            .channels
            .first()
            .and_then(|c| c.alternatives.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deepgram_response() {
        let json = r#"{
            "results": {
                "channels": [{
                    "alternatives": [{
                        "transcript": "hello world",
                        "words": [
                            {"word": "hello", "start": 0.5, "end": 0.8, "confidence": 0.95, "speaker": 0, "speaker_confidence": 0.85},
                            {"word": "world", "start": 0.9, "end": 1.2, "confidence": 0.92}
                        ]
                    }]
                }],
                "utterances": [
                    {"start": 0.5, "end": 1.2, "speaker": 0, "transcript": "hello world"}
                ]
            }
        }"#;

        let response: DeepgramResponse = serde_json::from_str(json).unwrap();
        let words = response.words();

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].speaker, Some(0));
        assert_eq!(words[0].speaker_confidence, Some(0.85));
        assert_eq!(words[1].speaker, None);
        assert_eq!(response.transcript(), Some("hello world"));
        assert_eq!(response.utterances().len(), 1);
    }

    #[test]
    fn test_missing_utterances() {
        let json = r#"{"results": {"channels": [{"alternatives": [{"words": []}]}]}}"#;
        let response: DeepgramResponse = serde_json::from_str(json).unwrap();
        assert!(response.utterances().is_empty());
        assert!(response.transcript().is_none());
    }
}
