pub mod config;
pub mod error;
pub mod heuristics;
pub mod io;
pub mod llm;
pub mod models;
pub mod serialized;
pub mod stages;
pub mod transcription;

pub use config::Settings;
pub use error::{PipelineError, PipelineResult};
pub use heuristics::{mine_tasks, resolve_deadline};
pub use io::{load_transcript_file, segments_to_transcript, MinutesDocument, StagedAudio};
pub use llm::{build_provider, parse_lenient, CompletionProvider};
pub use models::{ExtractedConflict, ExtractedTask, Meeting, TranscriptSegment, Transcription};
pub use serialized::Serialized;
pub use stages::{
    execute_stage3, extract_tasks_and_conflicts, normalize_segments, summarize_meeting,
    ExtractionConfig, ExtractionResult, Stage3Config, SummaryConfig,
};
pub use transcription::{DeepgramTranscriber, Transcriber};
