//! Command-line interface.

mod output;
pub mod preflight;
mod run;

pub use output::Output;
pub use run::{build_options, run_docs};

use clap::Parser;

/// Video ID processed when none is given.
pub const DEFAULT_VIDEO_ID: &str = "atmGAHYpf_c";

/// ytdocs - turn YouTube videos into documentation
///
/// Fetches metadata and transcripts, generates summaries, Q&A and tags with
/// LLMs, optionally translates them, and accumulates one row per video in a
/// CSV table that is updated incrementally on every run.
#[derive(Parser, Debug)]
#[command(name = "ytdocs")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Video ID or URL, comma-separated IDs, playlist ID (PL...) or channel handle (@...)
    #[arg(default_value = DEFAULT_VIDEO_ID)]
    pub video_id: String,

    /// Output table (CSV). Defaults to the configured output file
    #[arg(short, long)]
    pub outfile: Option<String>,

    /// Comma-separated models for summaries, Q&A and tags
    /// (e.g. gemini-3-flash-preview,bedrock-nova-2-lite-v1)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Transcript source: "youtube" or a speech-to-text model such as whisper-1
    #[arg(short, long)]
    pub transcript: Option<String>,

    /// Translate artifacts: {model}-{language} or a bare language code
    /// (e.g. gemini-3-flash-preview-es, aws-translate-fr, es)
    #[arg(long)]
    pub translate: Option<String>,

    /// Suggest corrected captions: {model}[-{source}]
    /// (e.g. gemini-3-flash-preview-youtube)
    #[arg(long)]
    pub suggest_corrected_captions: Option<String>,

    /// Skip the extra "from youtube" artifacts when using another transcript source
    #[arg(long)]
    pub no_youtube_summary: bool,

    /// Combine infographic and audio columns into videos
    #[arg(long)]
    pub combine_info_audio: bool,

    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,
}
