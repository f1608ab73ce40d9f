/// Delimiter for the simplified line-based task format
pub const PIPE_DELIMITER: &str = "|||";

/// Strict-JSON task extraction prompt
pub fn build_task_prompt(transcript: &str) -> String {
    format!(
        "You extract action items from meeting transcripts.\n\
\n\
Read the transcript and list every task someone committed to or was asked to do.\n\
Return ONLY a JSON array, with no commentary before or after it.\n\
Each element must be an object with exactly these keys:\n\
- \"task_name\": what needs to be done\n\
- \"assigned_to\": the person responsible, or \"\" if nobody is named\n\
- \"due_date\": the deadline as spoken (e.g. \"Friday\"), or \"\" if none\n\
- \"status\": \"pending\", \"in-progress\" or \"done\"\n\
\n\
Example:\n\
[{{\"task_name\": \"Prepare the quarterly report\", \"assigned_to\": \"John\", \"due_date\": \"Friday\", \"status\": \"pending\"}}]\n\
\n\
If there are no action items, return [].\n\
\n\
Transcript:\n\
{transcript}\n\
\n\
JSON:"
    )
}

/// Strict-JSON conflict extraction prompt
pub fn build_conflict_prompt(transcript: &str) -> String {
    format!(
        "You detect disagreements in meeting transcripts.\n\
\n\
Read the transcript and list every conflict, disagreement or unresolved dispute.\n\
Return ONLY a JSON array, with no commentary before or after it.\n\
Each element must be an object with exactly these keys:\n\
- \"issue\": what the disagreement is about\n\
- \"raised_by\": who raised it\n\
- \"participants\": array of everyone involved\n\
- \"stance\": short summary of each side's position\n\
- \"severity\": \"Low\", \"Medium\" or \"High\"\n\
- \"topic\": one or two words naming the subject\n\
\n\
Example:\n\
[{{\"issue\": \"Launch date for the beta\", \"raised_by\": \"Ann\", \"participants\": [\"Ann\", \"Bob\"], \"stance\": \"Ann wants to delay; Bob wants to ship now\", \"severity\": \"Medium\", \"topic\": \"release\"}}]\n\
\n\
If there are no conflicts, return [].\n\
\n\
Transcript:\n\
{transcript}\n\
\n\
JSON:"
    )
}

/// Simplified retry prompt asking for one delimited task per line
pub fn build_pipe_retry_prompt(transcript: &str) -> String {
    format!(
        "List the action items from this meeting transcript.\n\
Write one task per line in this exact format and nothing else:\n\
task {PIPE_DELIMITER} assignee {PIPE_DELIMITER} deadline\n\
Leave the deadline empty if none was mentioned.\n\
\n\
Transcript:\n\
{transcript}\n\
\n\
Tasks:"
    )
}

/// Plain-text summary prompt for one transcript chunk
pub fn build_summary_prompt(transcript: &str) -> String {
    format!(
        "You write concise, factual minutes of meetings.\n\
\n\
Summarize the following meeting transcript in one paragraph of 3-6 sentences.\n\
Use only information present in the transcript. Do not use headings or bullet points.\n\
\n\
Transcript:\n\
{transcript}\n\
\n\
Summary:"
    )
}

/// Strict-JSON key decision prompt
pub fn build_decision_prompt(transcript: &str) -> String {
    format!(
        "You record the decisions made in meetings.\n\
\n\
List every decision the participants agreed on.\n\
Return ONLY a JSON array of objects with keys \"decision\" and \"speaker\".\n\
\n\
Example:\n\
[{{\"decision\": \"Move the launch to March\", \"speaker\": \"Ann\"}}]\n\
\n\
If no decisions were made, return [].\n\
\n\
Transcript:\n\
{transcript}\n\
\n\
JSON:"
    )
}

/// Split a transcript into chunks of at most `max_chars` characters.
///
/// Splits on line boundaries; a single over-long line is split on
/// whitespace, and an over-long word is split by characters.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.trim().is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.lines() {
        for piece in split_long_line(line, max_chars) {
            let piece_len = piece.chars().count();
            let needed = if current.is_empty() { piece_len } else { piece_len + 1 };

            if current_len + needed > max_chars && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if !current.is_empty() {
                current.push('\n');
                current_len += 1;
            }
            current.push_str(&piece);
            current_len += piece_len;
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks.retain(|c| !c.trim().is_empty());
    chunks
}

fn split_long_line(line: &str, max_chars: usize) -> Vec<String> {
    if line.chars().count() <= max_chars {
        return vec![line.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            pieces.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }
        let current_len = current.chars().count();
        if current_len > 0 && current_len + 1 + word_len > max_chars {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
