use serde::{Deserialize, Serialize};

use super::{DeepgramUtterance, DeepgramWord};

/// Speaker label used when the transcription capability has no diarization
pub const UNKNOWN_SPEAKER: &str = "UNKNOWN";

/// A time-bounded span of transcript attributed to one speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start timestamp in seconds
    pub start: f64,
    /// End timestamp in seconds
    pub end: f64,
    /// Opaque speaker identifier
    #[serde(default = "unknown_speaker")]
    pub speaker: String,
    /// Spoken text
    pub text: String,
}

fn unknown_speaker() -> String {
    UNKNOWN_SPEAKER.to_string()
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            speaker: speaker.into(),
            text: text.into(),
        }
    }

    /// Create a segment from a Deepgram utterance
    pub fn from_utterance(utterance: &DeepgramUtterance) -> Self {
        Self {
            start: utterance.start,
            end: utterance.end,
            speaker: speaker_label(utterance.speaker),
            text: utterance.transcript.trim().to_string(),
        }
    }

    /// Create a single-word segment from a Deepgram word
    pub fn from_word(word: &DeepgramWord) -> Self {
        Self {
            start: word.start,
            end: word.end,
            speaker: speaker_label(word.speaker),
            text: word.display_text().to_string(),
        }
    }

    /// Duration of this segment in seconds
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Map a numeric diarization id to a speaker label
pub fn speaker_label(speaker: Option<u32>) -> String {
    match speaker {
        Some(id) => format!("SPEAKER_{}", id),
        None => UNKNOWN_SPEAKER.to_string(),
    }
}

/// Output of the transcription capability
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcription {
    /// Segments ordered by start time
    pub segments: Vec<TranscriptSegment>,
    /// Plain text of the whole recording
    pub full_text: String,
}

impl Transcription {
    /// Build a transcription from segments, deriving the full text
    pub fn from_segments(segments: Vec<TranscriptSegment>) -> Self {
        let full_text = segments
            .iter()
            .map(|s| s.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            segments,
            full_text,
        }
    }

    /// Total duration in seconds
    pub fn duration(&self) -> f64 {
        self.segments
            .last()
            .map(|s| s.end)
            .unwrap_or(0.0)
            .max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_from_word() {
        let word = DeepgramWord {
            word: "hello".to_string(),
            start: 0.5,
            end: 0.8,
            confidence: 0.95,
            speaker: Some(1),
            speaker_confidence: Some(0.85),
            punctuated_word: Some("Hello,".to_string()),
        };

        let segment = TranscriptSegment::from_word(&word);

        assert_eq!(segment.text, "Hello,");
        assert_eq!(segment.speaker, "SPEAKER_1");
        assert!((segment.duration() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_missing_speaker_defaults_to_unknown() {
        let segment: TranscriptSegment =
            serde_json::from_str(r#"{"start": 0.0, "end": 1.0, "text": "hi"}"#).unwrap();
        assert_eq!(segment.speaker, UNKNOWN_SPEAKER);
        assert_eq!(speaker_label(None), UNKNOWN_SPEAKER);
    }

    #[test]
    fn test_full_text_skips_empty_segments() {
        let transcription = Transcription::from_segments(vec![
            TranscriptSegment::new(0.0, 1.0, "A", "one"),
            TranscriptSegment::new(1.0, 2.0, "B", ""),
            TranscriptSegment::new(2.0, 3.0, "A", "two"),
        ]);
        assert_eq!(transcription.full_text, "one two");
        assert_eq!(transcription.duration(), 3.0);
    }
}
