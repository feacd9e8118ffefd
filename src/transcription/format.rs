//! WebVTT parsing and SRT rendering.

use super::TranscriptSegment;
use regex::Regex;
use std::sync::OnceLock;

/// Join segment texts into one line of plain text.
pub fn plain_text(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render segments as SRT (SubRip).
pub fn format_srt(segments: &[TranscriptSegment]) -> String {
    let mut output = String::new();

    for (i, segment) in segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_timestamp(segment.start_seconds),
            format_srt_timestamp(segment.end_seconds)
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

/// Format timestamp for SRT (00:00:00,000).
pub fn format_srt_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, ms)
}

/// Parse a VTT timestamp (`HH:MM:SS.mmm` or `MM:SS.mmm`) into seconds.
fn parse_vtt_timestamp(ts: &str) -> Option<f64> {
    let (clock, millis) = ts.trim().split_once('.')?;
    let millis: f64 = millis.parse().ok()?;
    let parts: Vec<f64> = clock
        .split(':')
        .map(|p| p.parse::<f64>().ok())
        .collect::<Option<_>>()?;

    let secs = match parts.as_slice() {
        [h, m, s] => h * 3600.0 + m * 60.0 + s,
        [m, s] => m * 60.0 + s,
        _ => return None,
    };
    Some(secs + millis / 1000.0)
}

fn strip_tags(line: &str) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"));
    re.replace_all(line, "")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .trim()
        .to_string()
}

/// Parse WebVTT captions into segments.
///
/// Inline tags are stripped. Auto-generated captions repeat the previous
/// line at the top of each cue; a line identical to the last emitted line
/// is dropped so the text reads once.
pub fn parse_vtt(vtt: &str) -> Vec<TranscriptSegment> {
    let mut segments = Vec::new();
    let mut last_line = String::new();
    let mut lines = vtt.lines().peekable();

    while let Some(line) = lines.next() {
        let Some((start, rest)) = line.split_once("-->") else {
            continue;
        };
        let end = rest.split_whitespace().next().unwrap_or_default();
        let (Some(start), Some(end)) = (parse_vtt_timestamp(start), parse_vtt_timestamp(end))
        else {
            continue;
        };

        let mut texts = Vec::new();
        while let Some(text_line) = lines.peek() {
            if text_line.trim().is_empty() {
                break;
            }
            let cleaned = strip_tags(text_line);
            lines.next();
            if cleaned.is_empty() || cleaned == last_line {
                continue;
            }
            last_line = cleaned.clone();
            texts.push(cleaned);
        }

        if !texts.is_empty() {
            segments.push(TranscriptSegment::new(start, end, texts.join(" ")));
        }
    }

    segments
}
