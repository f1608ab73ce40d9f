use std::path::Path;

use anyhow::{Context, Result};

use crate::heuristics::split_speaker;
use crate::models::{DeepgramResponse, Transcription, TranscriptSegment, UNKNOWN_SPEAKER};
use crate::transcription::transcription_from_deepgram;

/// Load a transcript from disk.
///
/// `.json` files are read as Deepgram responses; anything else is read as
/// plain `Speaker: text` lines.
pub fn load_transcript_file(path: &Path) -> Result<Transcription> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        parse_deepgram_json(&content)
    } else {
        Ok(parse_plain_transcript(&content))
    }
}

/// Parse Deepgram JSON string into a transcription
pub fn parse_deepgram_json(json: &str) -> Result<Transcription> {
    let response: DeepgramResponse =
        serde_json::from_str(json).context("Failed to parse Deepgram JSON")?;
    Ok(transcription_from_deepgram(&response))
}

/// Parse plain text, one segment per non-empty line.
///
/// Plain text carries no timing, so every segment sits at 0.0.
pub fn parse_plain_transcript(text: &str) -> Transcription {
    let segments = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let (speaker, text) = split_speaker(line);
            TranscriptSegment::new(0.0, 0.0, speaker.unwrap_or(UNKNOWN_SPEAKER), text)
        })
        .collect();
    Transcription::from_segments(segments)
}

/// Render segments as the speaker-labeled transcript fed to extraction
pub fn segments_to_transcript(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .filter(|s| !s.text.trim().is_empty())
        .map(|s| format!("{}: {}\n", s.speaker, s.text.trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_deepgram_json() {
        let json = r#"{
            "results": {
                "channels": [{
                    "alternatives": [{
                        "words": [
                            {"word": "hello", "start": 0.5, "end": 0.8, "confidence": 0.95, "speaker": 0, "speaker_confidence": 0.85},
                            {"word": "world", "start": 0.9, "end": 1.2, "confidence": 0.92, "speaker": 0},
                            {"word": "how", "start": 1.5, "end": 1.7, "confidence": 0.90, "speaker": 1},
                            {"word": "are", "start": 1.8, "end": 2.0, "confidence": 0.91, "speaker": 1},
                            {"word": "you", "start": 2.1, "end": 2.3, "confidence": 0.93, "speaker": 1}
                        ]
                    }]
                }]
            }
        }"#;

        let transcription = parse_deepgram_json(json).unwrap();

        assert_eq!(transcription.segments.len(), 2);
        assert_eq!(transcription.segments[0].speaker, "SPEAKER_0");
        assert_eq!(transcription.segments[1].text, "how are you");
        assert_eq!(transcription.full_text, "hello world how are you");
    }

    #[test]
    fn test_empty_response() {
        let json = r#"{"results": {"channels": [{"alternatives": [{"words": []}]}]}}"#;
        let transcription = parse_deepgram_json(json).unwrap();
        assert!(transcription.segments.is_empty());
        assert!(transcription.full_text.is_empty());
    }

    #[test]
    fn test_plain_transcript() {
        let transcription = parse_plain_transcript("John: I'll send it.\n\nno speaker here\n");
        assert_eq!(transcription.segments.len(), 2);
        assert_eq!(transcription.segments[0].speaker, "John");
        assert_eq!(transcription.segments[0].text, "I'll send it.");
        assert_eq!(transcription.segments[1].speaker, UNKNOWN_SPEAKER);
    }

    #[test]
    fn test_segments_to_transcript() {
        let segments = vec![
            TranscriptSegment::new(0.0, 1.0, "Ann", " Let's start. "),
            TranscriptSegment::new(1.0, 2.0, "Bob", ""),
            TranscriptSegment::new(2.0, 3.0, "Bob", "Sure."),
        ];
        assert_eq!(segments_to_transcript(&segments), "Ann: Let's start.\nBob: Sure.\n");
    }

    #[test]
    fn test_load_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "Ann: Can you book the room, Bob?").unwrap();
        let transcription = load_transcript_file(file.path()).unwrap();
        assert_eq!(transcription.segments[0].speaker, "Ann");

        assert!(load_transcript_file(Path::new("/definitely/missing.json")).is_err());
    }
}
