//! Transcript data types.

use super::format::{format_srt, plain_text};

/// A timed piece of transcript text.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start_seconds: f64, end_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text: text.into(),
        }
    }

    /// Shift both timestamps by `offset` seconds.
    pub fn offset(mut self, offset: f64) -> Self {
        self.start_seconds += offset;
        self.end_seconds += offset;
        self
    }
}

/// A fetched or transcribed transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    /// Plain text used for LLM prompts and the transcript file.
    pub text: String,
    /// True when the text was machine generated rather than human authored.
    pub is_generated: bool,
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn from_segments(segments: Vec<TranscriptSegment>, is_generated: bool) -> Self {
        Self {
            text: plain_text(&segments),
            is_generated,
            segments,
        }
    }

    /// A transcript without timing, e.g. read back from a transcript file.
    pub fn from_text(text: impl Into<String>, is_generated: bool) -> Self {
        Self {
            text: text.into(),
            is_generated,
            segments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// SRT rendition, if timing is known.
    pub fn srt(&self) -> Option<String> {
        if self.segments.is_empty() {
            None
        } else {
            Some(format_srt(&self.segments))
        }
    }
}
