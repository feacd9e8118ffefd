//! OpenAI speech-to-text transcription.

use super::{Transcript, TranscriptSegment};
use crate::error::{Result, YtDocsError};
use crate::media::{download_audio, split_audio};
use crate::openai::create_client;
use crate::table::columns::watch_url;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_openai::{config::OpenAIConfig, Client};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Transcribes downloaded audio with an OpenAI model such as `whisper-1`.
pub struct SpeechToText {
    client: Client<OpenAIConfig>,
    scratch_dir: PathBuf,
    chunk_seconds: u32,
}

impl SpeechToText {
    pub fn new(scratch_dir: impl Into<PathBuf>, chunk_seconds: u32, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client(timeout)?,
            scratch_dir: scratch_dir.into(),
            chunk_seconds,
        })
    }

    /// Transcribe one audio file (no splitting).
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, model: &str, audio_path: &Path) -> Result<Vec<TranscriptSegment>> {
        let file_bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();

        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8(file_name, file_bytes))
            .model(model)
            .response_format(AudioResponseFormat::VerboseJson)
            .build()
            .map_err(|e| YtDocsError::Transcript(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| YtDocsError::OpenAI(format!("{} transcription error: {}", model, e)))?;

        let segments = match response.segments {
            Some(segs) => segs
                .iter()
                .map(|s| TranscriptSegment::new(s.start as f64, s.end as f64, s.text.trim()))
                .collect(),
            None => vec![TranscriptSegment::new(
                0.0,
                response.duration as f64,
                response.text.trim(),
            )],
        };

        debug!("Transcribed {} segments", segments.len());
        Ok(segments)
    }

    /// Download, split and transcribe a video's audio.
    ///
    /// Chunks are transcribed in order and their timestamps shifted by the
    /// chunk offset so the SRT rendition lines up with the full video.
    #[instrument(skip(self))]
    pub async fn transcribe(&self, video_id: &str, model: &str) -> Result<Transcript> {
        let audio = download_audio(&watch_url(video_id), video_id, &self.scratch_dir).await?;

        let chunk_dir = tempfile::tempdir()?;
        let chunks = split_audio(&audio, chunk_dir.path(), self.chunk_seconds).await?;
        info!("Transcribing {} audio chunks with {}", chunks.len(), model);

        let pb = ProgressBar::new(chunks.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("  {spinner:.green} Transcribing [{bar:30.cyan/blue}] {pos}/{len}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }

        let mut segments = Vec::new();
        for (idx, (chunk_path, offset)) in chunks.iter().enumerate() {
            let chunk_segments = self.transcribe_single(model, chunk_path).await.map_err(|e| {
                pb.finish_and_clear();
                YtDocsError::Transcript(format!("Chunk {} at {:.0}s failed: {}", idx, offset, e))
            })?;
            segments.extend(chunk_segments.into_iter().map(|s| s.offset(*offset)));
            pb.inc(1);
        }
        pb.finish_and_clear();

        Ok(Transcript::from_segments(segments, true))
    }
}
