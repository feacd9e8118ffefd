//! Transcripts for videos.
//!
//! The `youtube` source reads the platform's captions through yt-dlp. Any
//! other source names an OpenAI speech-to-text model (e.g. `whisper-1`) that
//! transcribes the downloaded audio.

mod captions;
mod format;
mod models;
mod stt;

pub use captions::YtDlpCaptions;
pub use format::{format_srt, format_srt_timestamp, parse_vtt, plain_text};
pub use models::{Transcript, TranscriptSegment};
pub use stt::SpeechToText;

use crate::error::{Result, YtDocsError};
use crate::table::columns::YOUTUBE_SOURCE;
use async_trait::async_trait;
use tracing::instrument;

/// Anything that can produce a transcript for a video.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript of `video_id` from `source`. `None` when the
    /// source has nothing for this video.
    async fn fetch_transcript(&self, video_id: &str, source: &str) -> Result<Option<Transcript>>;
}

/// Routes `youtube` to captions and everything else to speech-to-text.
pub struct TranscriptRouter {
    captions: YtDlpCaptions,
    stt: Option<SpeechToText>,
}

impl TranscriptRouter {
    pub fn new(captions: YtDlpCaptions, stt: Option<SpeechToText>) -> Self {
        Self { captions, stt }
    }
}

#[async_trait]
impl TranscriptSource for TranscriptRouter {
    #[instrument(skip(self))]
    async fn fetch_transcript(&self, video_id: &str, source: &str) -> Result<Option<Transcript>> {
        if source == YOUTUBE_SOURCE {
            return self.captions.fetch(video_id).await;
        }

        let stt = self.stt.as_ref().ok_or_else(|| {
            YtDocsError::Config(format!(
                "Transcript source '{}' needs OPENAI_API_KEY for speech-to-text",
                source
            ))
        })?;
        let transcript = stt.transcribe(video_id, source).await?;
        Ok((!transcript.is_empty()).then_some(transcript))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stt_source_without_client_is_config_error() {
        let router = TranscriptRouter::new(YtDlpCaptions::new(), None);
        let err = router.fetch_transcript("abc", "whisper-1").await.unwrap_err();
        assert!(matches!(err, YtDocsError::Config(_)));
    }
}
