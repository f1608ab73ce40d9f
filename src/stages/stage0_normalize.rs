use tracing::debug;

use crate::models::TranscriptSegment;

/// Default maximum gap, in seconds, bridged between same-speaker segments
pub const DEFAULT_MERGE_THRESHOLD: f64 = 0.5;

/// Perform Stage 0: merge adjacent same-speaker segments.
///
/// Single left-to-right scan with one accumulator. The next segment is
/// folded in when it has the same speaker and starts no more than
/// `merge_threshold` seconds after the accumulator ends; otherwise the
/// accumulator is flushed. A merge takes the next segment's end, which
/// assumes start-ordered input overlapping by at most the threshold. Output never has two consecutive same-speaker
/// segments within the threshold, so re-normalizing is a no-op.
pub fn normalize_segments(
    segments: &[TranscriptSegment],
    merge_threshold: f64,
) -> Vec<TranscriptSegment> {
    let mut merged: Vec<TranscriptSegment> = Vec::with_capacity(segments.len());
    let mut current: Option<TranscriptSegment> = None;

    for next in segments {
        match current.as_mut() {
            Some(acc) if acc.speaker == next.speaker && next.start - acc.end <= merge_threshold => {
                acc.end = next.end;
                append_text(&mut acc.text, &next.text);
            }
            _ => {
                if let Some(acc) = current.take() {
                    merged.push(acc);
                }
                current = Some(next.clone());
            }
        }
    }

    if let Some(acc) = current {
        merged.push(acc);
    }

    debug!(
        "Stage 0: {} segments merged into {}",
        segments.len(),
        merged.len()
    );

    merged
}

fn append_text(acc: &mut String, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !acc.trim().is_empty() {
        acc.push(' ');
    }
    acc.push_str(text);
}
