use crate::transcript::Segment;

/// Format an offset in seconds as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// One `[MM:SS] text` line per segment.
pub fn format_transcript(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|seg| format!("[{}] {}", format_time(seg.start_seconds), seg.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the key-point summary prompt around a formatted transcript block.
pub fn build_key_points_prompt(transcript: &str) -> String {
    format!(
        "Analyze this video transcript and create a structured summary. For each key point:\n\
1. Identify the most relevant timestamp\n\
2. Extract the main point\n\
3. Format as: \"Timestamp: [MM:SS] - Key Point: [point]\"\n\
\n\
Transcript:\n\
{transcript}\n\
\n\
Please provide a summary with 5-7 key points, each with its timestamp. Format exactly as shown above.\n\
Focus on main topics, important statements, and significant transitions in the video.\n"
    )
}
