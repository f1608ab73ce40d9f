use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Datelike, Local, Weekday};

use minutemind::io::parse_plain_transcript;
use minutemind::models::TaskStatus;
use minutemind::stages::{ConflictSource, TaskSource};
use minutemind::{
    extract_tasks_and_conflicts, normalize_segments, parse_lenient, resolve_deadline,
    segments_to_transcript, CompletionProvider, ExtractionConfig, ExtractedTask, Meeting,
    MinutesDocument, Serialized, TranscriptSegment,
};

/// Returns invalid text for every structured prompt and a fixed
/// delimited list for the retry prompt
struct RetryOnlyProvider {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl CompletionProvider for RetryOnlyProvider {
    async fn complete(&self, prompt: &str, _max_tokens: u32, _temperature: f64) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if prompt.contains("|||") {
            Ok("Prepare slides ||| Maria ||| 2031-03-04\nCall the venue ||| Tom\n".to_string())
        } else {
            Ok("I am unable to produce JSON today.".to_string())
        }
    }
}

#[tokio::test]
async fn retry_response_is_the_final_task_list() {
    let provider = Serialized::new(RetryOnlyProvider {
        prompts: Mutex::new(Vec::new()),
    });
    let transcript = "Maria: Let's review the conference plan.\nTom: The venue looks good.\n";

    let result = extract_tasks_and_conflicts(&provider, transcript, &ExtractionConfig::default())
        .await
        .unwrap();

    assert_eq!(result.task_source, TaskSource::PipeRetry);
    assert_eq!(
        result.tasks,
        vec![
            ExtractedTask::new("Prepare slides", "Maria", "2031-03-04").unwrap(),
            ExtractedTask::new("Call the venue", "Tom", "").unwrap(),
        ]
    );
    assert!(result.tasks.iter().all(|t| t.status == TaskStatus::Pending));
    assert_eq!(result.conflict_source, ConflictSource::None);

    let prompts = provider.inner().prompts.lock().unwrap().clone();
    assert_eq!(prompts.iter().filter(|p| p.contains("|||")).count(), 1);
}

#[tokio::test]
async fn miner_output_stops_the_ladder_before_retry() {
    let provider = RetryOnlyProvider {
        prompts: Mutex::new(Vec::new()),
    };
    let transcript = "John: I'll prepare the report by Friday.\nAnn, can you check the budget?\nJohn: I'll prepare the report by Friday.\n";

    let result = extract_tasks_and_conflicts(&provider, transcript, &ExtractionConfig::default())
        .await
        .unwrap();

    assert_eq!(result.task_source, TaskSource::RegexMiner);
    assert_eq!(result.tasks.len(), 2);
    assert_eq!(result.tasks[0].assigned_to, "John");
    assert_eq!(result.tasks[1].assigned_to, "Ann");
    assert!(provider.prompts.lock().unwrap().iter().all(|p| !p.contains("|||")));
}

#[test]
fn normalized_segments_feed_the_transcript() {
    let segments = vec![
        TranscriptSegment::new(0.0, 1.0, "SPEAKER_0", "We should"),
        TranscriptSegment::new(1.2, 2.0, "SPEAKER_0", "ship it."),
        TranscriptSegment::new(2.1, 3.0, "SPEAKER_1", "Agreed."),
    ];

    let merged = normalize_segments(&segments, 0.5);

    assert_eq!(
        segments_to_transcript(&merged),
        "SPEAKER_0: We should ship it.\nSPEAKER_1: Agreed.\n"
    );
}

#[test]
fn deadline_contract() {
    assert_eq!(resolve_deadline(""), "");
    assert_eq!(resolve_deadline("asdkjashd"), "asdkjashd");

    let resolved = resolve_deadline("next Friday");
    let date = chrono::NaiveDate::parse_from_str(&resolved, "%Y-%m-%d").unwrap();
    assert_eq!(date.weekday(), Weekday::Fri);
    assert!(date >= Local::now().date_naive());
}

#[test]
fn lenient_parse_contract() {
    let expected = serde_json::json!([{"a": 1}]);
    assert_eq!(parse_lenient("[{\"a\":1}]"), Some(expected.clone()));
    assert_eq!(parse_lenient("noise [{\"a\":1}] noise"), Some(expected.clone()));
    assert_eq!(parse_lenient("[{\"a\":1},]"), Some(expected));
    assert_eq!(parse_lenient("not json"), None);
}

#[test]
fn plain_transcript_renders_into_minutes() {
    let transcription = parse_plain_transcript("Ann: I disagree with the timeline.\nBob: Noted.\n");
    let mut meeting = Meeting::new("Timeline review");
    meeting.transcript = transcription.segments;

    let doc = MinutesDocument::new(&meeting, Default::default()).format();

    assert!(doc.contains("## Timeline review"));
    assert!(doc.contains("**Ann:**"));
    assert!(doc.contains("[00:00] I disagree with the timeline."));
}
