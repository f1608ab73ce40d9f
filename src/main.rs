use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use minutemind::io::minutes_filename;
use minutemind::stages::DEFAULT_MERGE_THRESHOLD;
use minutemind::{
    build_provider, execute_stage3, extract_tasks_and_conflicts, load_transcript_file,
    normalize_segments, resolve_deadline, segments_to_transcript, summarize_meeting,
    DeepgramTranscriber, ExtractionConfig, Meeting, PipelineError, Serialized, Settings,
    StagedAudio, Stage3Config, SummaryConfig, Transcriber, TranscriptSegment,
};

#[derive(Parser)]
#[command(name = "minutemind")]
#[command(author, version, about = "Meeting transcript to minutes pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe a recording and produce meeting minutes
    Process {
        /// Audio file to transcribe, or "-" to read from stdin
        #[arg(short, long)]
        audio: PathBuf,

        /// Container extension used when reading audio from stdin
        #[arg(long, default_value = "wav")]
        audio_format: String,

        #[command(flatten)]
        outputs: OutputArgs,

        #[command(flatten)]
        meeting: MeetingArgs,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Produce meeting minutes from an existing transcript
    Extract {
        /// Transcript file (Deepgram JSON, or "Speaker: text" lines)
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        outputs: OutputArgs,

        #[command(flatten)]
        meeting: MeetingArgs,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Resolve a natural-language deadline to a date
    Deadline {
        /// Deadline phrase, e.g. "next Friday"
        #[arg(required = true)]
        text: Vec<String>,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Output file for the meeting record (JSON)
    #[arg(short, long)]
    output: PathBuf,

    /// Output file or directory for the minutes document (Markdown)
    #[arg(long)]
    minutes: Option<PathBuf>,
}

#[derive(Args)]
struct MeetingArgs {
    /// Meeting title
    #[arg(long, default_value = "")]
    title: String,

    #[arg(long)]
    location: Option<String>,

    /// Host or chairperson
    #[arg(long)]
    host: Option<String>,

    /// Comma-separated attendees
    #[arg(long)]
    presentees: Option<String>,

    /// Comma-separated absentees
    #[arg(long)]
    absentees: Option<String>,

    /// Agenda items, one per line
    #[arg(long)]
    agenda: Option<String>,

    /// Time the meeting was adjourned
    #[arg(long)]
    adjourned: Option<String>,
}

#[derive(Args)]
struct PipelineArgs {
    /// Maximum gap in seconds bridged between same-speaker segments
    #[arg(long, default_value_t = DEFAULT_MERGE_THRESHOLD)]
    merge_threshold: f64,

    /// Transcript characters per completion call
    #[arg(long, default_value = "3000")]
    chunk_chars: usize,

    /// Output token cap for extraction prompts
    #[arg(long, default_value = "1024")]
    max_tokens: u32,

    /// Sampling temperature for extraction prompts
    #[arg(long, default_value = "0.1")]
    temperature: f64,

    /// Skip the summary and key decision prompts
    #[arg(long)]
    no_summary: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            audio,
            audio_format,
            outputs,
            meeting,
            pipeline,
            verbose,
        } => {
            setup_logging(verbose);
            let settings = Settings::from_env()?;
            let segments = transcribe_audio(&settings, &audio, &audio_format).await?;
            run_pipeline(&settings, segments, &outputs, meeting, &pipeline).await
        }
        Commands::Extract {
            input,
            outputs,
            meeting,
            pipeline,
            verbose,
        } => {
            setup_logging(verbose);
            let settings = Settings::from_env()?;
            info!("Loading transcript from {:?}", input);
            let transcription =
                load_transcript_file(&input).context("Failed to load input transcript")?;
            run_pipeline(&settings, transcription.segments, &outputs, meeting, &pipeline).await
        }
        Commands::Deadline { text } => {
            println!("{}", resolve_deadline(&text.join(" ")));
            Ok(())
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn transcribe_audio(
    settings: &Settings,
    audio: &Path,
    audio_format: &str,
) -> Result<Vec<TranscriptSegment>> {
    let transcriber = Serialized::new(DeepgramTranscriber::from_settings(settings)?);

    // Removed when `staged` drops, whichever way this returns
    let staged = if audio == Path::new("-") {
        info!("Reading audio from stdin");
        StagedAudio::from_reader(std::io::stdin().lock(), audio_format)?
    } else {
        info!("Staging audio from {:?}", audio);
        StagedAudio::from_path(audio)?
    };

    info!("Transcribing {} bytes of audio...", staged.len());
    let transcription = transcriber
        .transcribe(staged.path())
        .await
        .map_err(PipelineError::Transcription)?;

    info!(
        "Transcribed {} segments, {:.1}s",
        transcription.segments.len(),
        transcription.duration()
    );
    Ok(transcription.segments)
}

async fn run_pipeline(
    settings: &Settings,
    segments: Vec<TranscriptSegment>,
    outputs: &OutputArgs,
    details: MeetingArgs,
    pipeline: &PipelineArgs,
) -> Result<()> {
    // Stage 0: Normalize
    info!("Stage 0: Normalizing {} segments...", segments.len());
    let segments = normalize_segments(&segments, pipeline.merge_threshold);
    let transcript = segments_to_transcript(&segments);
    info!(
        "Normalized into {} segments ({} chars)",
        segments.len(),
        transcript.len()
    );

    let provider = Serialized::new(build_provider(settings)?);

    // Stage 1: Extraction
    info!("Stage 1: Extracting tasks and conflicts...");
    let extraction_config = ExtractionConfig {
        max_tokens: pipeline.max_tokens,
        temperature: pipeline.temperature,
        chunk_chars: pipeline.chunk_chars,
        ..Default::default()
    };
    let extraction = extract_tasks_and_conflicts(&provider, &transcript, &extraction_config).await?;

    let mut meeting = Meeting::new(details.title);
    meeting.location = details.location;
    meeting.host = details.host;
    meeting.presentees = details.presentees;
    meeting.absentees = details.absentees;
    meeting.agenda = details.agenda.map(|a| a.replace("\\n", "\n"));
    meeting.adjournment_time = details.adjourned;
    meeting.apply_extraction(extraction.tasks, extraction.conflicts);

    // Stage 2: Summary and decisions
    if pipeline.no_summary {
        info!("Skipping summary (--no-summary)");
    } else {
        info!("Stage 2: Summarizing...");
        let summary_config = SummaryConfig {
            chunk_chars: pipeline.chunk_chars,
            ..Default::default()
        };
        let summary = summarize_meeting(&provider, &transcript, &summary_config).await?;
        meeting.set_summary(summary.summary, summary.decisions);
    }

    meeting.transcript = segments;

    // Stage 3: Rendering
    info!("Stage 3: Rendering output...");
    let minutes_path = outputs.minutes.as_ref().map(|path| {
        if path.is_dir() {
            path.join(minutes_filename(&meeting))
        } else {
            path.clone()
        }
    });
    let stage3_result = execute_stage3(
        &meeting,
        Some(outputs.output.as_path()),
        minutes_path.as_deref(),
        &Stage3Config::default(),
    )?;

    if let Some(path) = stage3_result.json_path {
        info!("Meeting record written to {:?}", path);
    }
    if let Some(path) = stage3_result.minutes_path {
        info!("Minutes written to {:?}", path);
    }

    info!(
        "Complete: {} tasks, {} conflicts, {} decisions",
        meeting.tasks.len(),
        meeting.conflicts.len(),
        meeting.key_decisions.len()
    );

    Ok(())
}
