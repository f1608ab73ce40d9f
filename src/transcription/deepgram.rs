use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::Transcriber;
use crate::config::Settings;
use crate::error::PipelineError;
use crate::models::{DeepgramResponse, TranscriptSegment, Transcription};

const LISTEN_URL: &str = "https://api.deepgram.com/v1/listen";
const LISTEN_PARAMS: &str = "diarize=true&utterances=true&punctuate=true&smart_format=true";

/// Deepgram pre-recorded transcription with diarization
pub struct DeepgramTranscriber {
    client: Client,
    api_key: String,
    base_url: String,
}

impl DeepgramTranscriber {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: LISTEN_URL.to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, PipelineError> {
        let api_key = settings.deepgram_api_key.clone().ok_or_else(|| {
            PipelineError::Config("DEEPGRAM_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Point the transcriber at a different listen endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn listen_url(&self) -> String {
        format!("{}?{}", self.base_url, LISTEN_PARAMS)
    }
}

#[async_trait]
impl Transcriber for DeepgramTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<Transcription> {
        let bytes = tokio::fs::read(audio)
            .await
            .with_context(|| format!("Failed to read audio file: {:?}", audio))?;

        debug!("Uploading {} bytes of audio to Deepgram", bytes.len());

        let response = self
            .client
            .post(self.listen_url())
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", content_type_for(audio))
            .body(bytes)
            .send()
            .await
            .context("Failed to send request to Deepgram API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Deepgram API error: {} - {}", status, body);
        }

        let response: DeepgramResponse = response
            .json()
            .await
            .context("Failed to parse Deepgram API response")?;

        let transcription = transcription_from_deepgram(&response);
        info!(
            "Transcribed {:.1}s of audio into {} segments",
            transcription.duration(),
            transcription.segments.len()
        );
        Ok(transcription)
    }
}

/// Convert a Deepgram response into a transcription.
///
/// The full text prefers the channel transcript over joined segment text.
pub fn transcription_from_deepgram(response: &DeepgramResponse) -> Transcription {
    let segments = segments_from_deepgram(response);
    match response.transcript().map(str::trim).filter(|t| !t.is_empty()) {
        Some(full_text) => Transcription {
            segments,
            full_text: full_text.to_string(),
        },
        None => Transcription::from_segments(segments),
    }
}

/// Segments from utterances when present, otherwise words grouped into
/// speaker turns.
pub fn segments_from_deepgram(response: &DeepgramResponse) -> Vec<TranscriptSegment> {
    let utterances = response.utterances();
    if !utterances.is_empty() {
        return utterances
            .iter()
            .map(TranscriptSegment::from_utterance)
            .filter(|s| !s.text.is_empty())
            .collect();
    }

    let mut segments: Vec<TranscriptSegment> = Vec::new();
    let mut current: Option<TranscriptSegment> = None;

    for word in response.words() {
        let next = TranscriptSegment::from_word(word);

        match current.as_mut() {
            Some(turn) if turn.speaker == next.speaker => {
                turn.end = next.end;
                turn.text.push(' ');
                turn.text.push_str(&next.text);
            }
            _ => {
                // Speaker changed; close the current turn
                if let Some(turn) = current.take() {
                    segments.push(turn);
                }
                current = Some(next);
            }
        }
    }

    if let Some(turn) = current {
        segments.push(turn);
    }

    segments
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a") | Some("mp4") => "audio/mp4",
        Some("ogg") | Some("opus") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> DeepgramResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_segments_from_utterances() {
        let response = response(
            r#"{
            "results": {
                "channels": [{"alternatives": [{"transcript": "hello there hi", "words": []}]}],
                "utterances": [
                    {"start": 0.0, "end": 1.0, "speaker": 0, "transcript": "Hello there."},
                    {"start": 1.2, "end": 1.5, "speaker": 1, "transcript": "Hi."}
                ]
            }
        }"#,
        );

        let transcription = transcription_from_deepgram(&response);

        assert_eq!(transcription.segments.len(), 2);
        assert_eq!(transcription.segments[0].speaker, "SPEAKER_0");
        assert_eq!(transcription.segments[1].text, "Hi.");
        assert_eq!(transcription.full_text, "hello there hi");
    }

    #[test]
    fn test_segments_from_words_grouped_by_speaker() {
        let response = response(
            r#"{
            "results": {
                "channels": [{
                    "alternatives": [{
                        "words": [
                            {"word": "hello", "start": 0.5, "end": 0.8, "speaker": 0, "punctuated_word": "Hello"},
                            {"word": "world", "start": 0.9, "end": 1.2, "speaker": 0},
                            {"word": "how", "start": 1.5, "end": 1.7, "speaker": 1},
                            {"word": "are", "start": 1.8, "end": 2.0, "speaker": 1},
                            {"word": "you", "start": 2.1, "end": 2.3, "speaker": 1}
                        ]
                    }]
                }]
            }
        }"#,
        );

        let segments = segments_from_deepgram(&response);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello world");
        assert_eq!(segments[0].end, 1.2);
        assert_eq!(segments[1].speaker, "SPEAKER_1");
        assert_eq!(segments[1].text, "how are you");
        assert_eq!(segments[1].start, 1.5);
    }

    #[test]
    fn test_words_without_diarization_are_unknown() {
        let response = response(
            r#"{"results": {"channels": [{"alternatives": [{"words": [
                {"word": "solo", "start": 0.0, "end": 0.4}
            ]}]}]}}"#,
        );

        let transcription = transcription_from_deepgram(&response);
        assert_eq!(transcription.segments.len(), 1);
        assert_eq!(transcription.segments[0].speaker, "UNKNOWN");
        assert_eq!(transcription.full_text, "solo");
    }

    #[test]
    fn test_requires_api_key() {
        assert!(DeepgramTranscriber::from_settings(&Settings::default()).is_err());
        let transcriber = DeepgramTranscriber::new("key").with_base_url("http://localhost:9000/listen");
        assert!(transcriber.listen_url().starts_with("http://localhost:9000/listen?diarize=true"));
        assert_eq!(content_type_for(Path::new("a.MP3")), "audio/mpeg");
    }
}
