//! ytdocs - YouTube videos to documentation
//!
//! Converts YouTube videos, playlists and channels into documentation
//! artifacts (transcripts, summaries, Q&A, tags, translations, caption
//! corrections and still-image videos), accumulating one row per video in a
//! CSV table that is re-read and incrementally updated on every run.
//!
//! # Architecture
//!
//! - `table` - rows, the table, column naming and row reconciliation
//! - `shorthand` - parsers for compact CLI arguments
//! - `youtube` - video ID resolution and metadata
//! - `transcription` - platform captions and speech-to-text
//! - `llm` - model backends and artifact prompts
//! - `translate` - translation backends and the translation column pass
//! - `media` - audio handling and the infographic + audio video pass
//! - `storage` - where artifact files live
//! - `pipeline` - per-video processing and the passes over the table
//!
//! # Example
//!
//! ```rust,no_run
//! use ytdocs::table::{reconcile, Row, Table};
//!
//! let existing = Table::load(std::path::Path::new("youtube-docs.csv"))?;
//! let mut row = Row::new();
//! row.set("URL", "https://www.youtube.com/watch?v=atmGAHYpf_c");
//! let merged = reconcile(existing, vec![row]);
//! merged.save(std::path::Path::new("youtube-docs.csv"))?;
//! # Ok::<(), ytdocs::YtDocsError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod media;
pub mod openai;
pub mod pipeline;
pub mod shorthand;
pub mod storage;
pub mod table;
pub mod transcription;
pub mod translate;
pub mod youtube;

pub use error::{Result, YtDocsError};
