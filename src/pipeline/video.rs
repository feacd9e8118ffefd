//! Per-video work: metadata, transcripts and generated artifacts.

use super::{Pipeline, PipelineOptions};
use crate::config::DirectorySettings;
use crate::error::{Result, YtDocsError};
use crate::llm::{Completion, VideoContext};
use crate::storage::join;
use crate::table::columns::{
    artifact_file_name, safe_title, srt_file_column, transcript_file_candidates,
    transcript_file_column, watch_url, ArtifactKind, ColumnName, TRANSCRIPT_CHARACTERS,
    YOUTUBE_SOURCE,
};
use crate::table::{plan_video, Row, VideoPlan};
use crate::transcription::Transcript;
use crate::translate::ArtifactDirs;
use crate::youtube::VideoDetails;
use tracing::{debug, info, instrument, warn};

/// Identity of the video being worked on.
pub(super) struct VideoWork {
    pub id: String,
    pub safe_title: String,
    pub context: VideoContext,
}

impl VideoWork {
    fn new(details: &VideoDetails) -> Self {
        Self {
            id: details.id.clone(),
            safe_title: safe_title(&details.title),
            context: VideoContext {
                url: watch_url(&details.id),
                title: details.title.clone(),
            },
        }
    }
}

/// Transcript file name: `[youtube generated - ]{id} - {title}.txt` for the
/// platform source, `{source} - {id} - {title}.txt` otherwise.
fn transcript_file_name(source: &str, is_generated: bool, work: &VideoWork) -> String {
    if source == YOUTUBE_SOURCE {
        let prefix = if is_generated { "youtube generated - " } else { "" };
        format!("{}{} - {}.txt", prefix, work.id, work.safe_title)
    } else {
        format!("{} - {} - {}.txt", source, work.id, work.safe_title)
    }
}

fn srt_file_name(source: &str, work: &VideoWork) -> String {
    format!("{} - {} - {}.srt", source, work.id, work.safe_title)
}

impl Pipeline {
    /// Build the row for one video.
    ///
    /// `Ok(None)` means the row is already complete and nothing was called.
    /// Missing metadata or transcript is an error: the caller skips the
    /// video.
    #[instrument(skip(self, existing, required, options))]
    pub(super) async fn process_video(
        &self,
        video_id: &str,
        existing: Option<&Row>,
        required: &[String],
        options: &PipelineOptions,
    ) -> Result<Option<Row>> {
        let details = match plan_video(existing, required) {
            VideoPlan::Skip => {
                info!("Skipping {}: already in table with metadata and summaries", video_id);
                return Ok(None);
            }
            VideoPlan::Reuse { row, missing } => {
                debug!("Reusing row for {} ({} columns missing)", video_id, missing.len());
                VideoDetails::from_row(video_id, row)
            }
            VideoPlan::Fresh => self
                .videos
                .fetch_details(video_id)
                .await?
                .ok_or_else(|| YtDocsError::VideoNotFound(video_id.to_string()))?,
        };

        info!("Video title: {}", details.title);
        let work = VideoWork::new(&details);
        let dirs = &options.directories;

        let mut row = existing.cloned().unwrap_or_default();
        details.write_to(&mut row);

        let primary = &options.transcript_source;
        let transcript = self
            .load_transcript(&mut row, &work, primary, dirs)
            .await?
            .ok_or_else(|| YtDocsError::Transcript(format!("No {} transcript for {}", primary, video_id)))?;
        row.set(TRANSCRIPT_CHARACTERS, transcript.text.chars().count());

        let secondary = if options.wants_youtube_family() {
            match self.load_transcript(&mut row, &work, YOUTUBE_SOURCE, dirs).await {
                Ok(Some(t)) => Some(t),
                Ok(None) => {
                    warn!("No youtube transcript for {}; skipping youtube summaries", video_id);
                    None
                }
                Err(e) => {
                    warn!("Could not fetch youtube transcript for {}: {}", video_id, e);
                    None
                }
            }
        } else {
            None
        };

        let artifact_dirs = ArtifactDirs::from(dirs);
        for model in &options.models {
            self.generate_artifacts(&mut row, &work, model, primary, &transcript.text, &artifact_dirs)
                .await;
            if let Some(youtube) = &secondary {
                self.generate_artifacts(&mut row, &work, model, YOUTUBE_SOURCE, &youtube.text, &artifact_dirs)
                    .await;
            }
        }

        Ok(Some(row))
    }

    /// Read the transcript back from the file recorded in `row`, or fetch it
    /// and record new transcript and SRT files.
    async fn load_transcript(
        &self,
        row: &mut Row,
        work: &VideoWork,
        source: &str,
        dirs: &DirectorySettings,
    ) -> Result<Option<Transcript>> {
        for column in transcript_file_candidates(source) {
            let Some(path) = row.text(&column).filter(|p| !p.is_empty()) else {
                continue;
            };
            if !self.storage.exists(path).await.unwrap_or(false) {
                continue;
            }
            match self.storage.read_text(path).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!("Reading existing transcript from {}", path);
                    let is_generated = column == transcript_file_column(source, true);
                    return Ok(Some(Transcript::from_text(text, is_generated)));
                }
                Ok(_) => {}
                Err(e) => warn!("Could not read transcript {}: {}", path, e),
            }
        }

        let Some(transcript) = self.transcripts.fetch_transcript(&work.id, source).await? else {
            return Ok(None);
        };
        if transcript.is_empty() {
            return Ok(None);
        }

        let name = transcript_file_name(source, transcript.is_generated, work);
        match self.storage.write_text(&join(&dirs.transcripts, &name), &transcript.text).await {
            Ok(stored) => {
                info!("Saved transcript: {}", name);
                row.set(transcript_file_column(source, transcript.is_generated), stored);
            }
            Err(e) => warn!("Error writing transcript {}: {}", name, e),
        }

        if let Some(srt) = transcript.srt() {
            let name = srt_file_name(source, work);
            match self.storage.write_text(&join(&dirs.srt, &name), &srt).await {
                Ok(stored) => row.set(srt_file_column(source), stored),
                Err(e) => warn!("Error writing SRT {}: {}", name, e),
            }
        }

        Ok(Some(transcript))
    }

    /// Produce every text artifact of `model` from `source` that the row
    /// does not have yet. One-sentence summary and tags are derived from the
    /// summary, so nothing else is attempted when it cannot be produced.
    async fn generate_artifacts(
        &self,
        row: &mut Row,
        work: &VideoWork,
        model: &str,
        source: &str,
        transcript: &str,
        dirs: &ArtifactDirs,
    ) {
        for kind in ArtifactKind::TEXT_KINDS {
            let column = ColumnName::text(kind, model, source);
            let column_name = column.build();
            if row.has_value(&column_name) {
                continue;
            }

            let summary_column = ColumnName::text(ArtifactKind::Summary, model, source).build();
            let summary = row.text(&summary_column).unwrap_or_default().to_string();
            if kind != ArtifactKind::Summary && summary.is_empty() {
                debug!("No summary for {} from {}; skipping {}", model, source, kind);
                return;
            }

            info!("Generating {} with {} from {}", kind, model, source);
            let generator = &self.generator;
            let video = &work.context;
            let result: Result<Completion> = match kind {
                ArtifactKind::Summary => generator.summary(model, video, transcript).await,
                ArtifactKind::OneSentenceSummary => generator.one_sentence(model, video, &summary).await,
                ArtifactKind::Qa => generator.qa(model, video, transcript).await,
                ArtifactKind::Tags => generator.tags(model, video, &summary).await,
                ArtifactKind::Infographic | ArtifactKind::Audio => continue,
            };

            let text = match result {
                Ok(completion) if !completion.text.is_empty() => completion.text,
                Ok(_) => {
                    warn!("{} returned an empty {}", model, kind);
                    continue;
                }
                Err(e) => {
                    warn!("{} generation failed with {}: {}", kind, model, e);
                    continue;
                }
            };

            row.set(column_name, text.as_str());

            let Some(dir) = dirs.for_kind(kind) else {
                continue;
            };
            let name = artifact_file_name(kind, model, &work.id, &work.safe_title, source, None);
            match self.storage.write_text(&join(dir, &name), &text).await {
                Ok(stored) => row.set(column.file_column().build(), stored),
                Err(e) => warn!("Error writing {}: {}", name, e),
            }
        }
    }
}
