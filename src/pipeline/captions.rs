//! Suggested caption corrections.

use super::{row_identity, CaptionCorrection};
use crate::error::{Result, YtDocsError};
use crate::llm::{ArtifactGenerator, VideoContext, NO_CHANGES};
use crate::storage::{join, Storage};
use crate::table::columns::{corrected_captions_column, srt_file_column, srt_source, TITLE, YOUTUBE_SOURCE};
use crate::table::Row;
use tracing::{info, instrument};

/// The SRT column to correct for `row`.
///
/// A named source wins. Otherwise the most recently added non-youtube SRT
/// column that has a value in this row, falling back to `SRT File youtube`.
pub fn select_srt_column(row: &Row, columns: &[String], source: Option<&str>) -> String {
    if let Some(source) = source {
        return srt_file_column(source);
    }

    columns
        .iter()
        .rev()
        .find(|c| srt_source(c).is_some_and(|s| s != YOUTUBE_SOURCE) && row.has_value(c))
        .cloned()
        .unwrap_or_else(|| srt_file_column(YOUTUBE_SOURCE))
}

/// Ask `correction.model` to review the row's captions and record the reply.
///
/// Returns `Ok(false)` without calling the model when the row already has a
/// suggestion from this model or has no SRT to review. The reply, either a
/// corrected SRT or `NO_CHANGES`, is stored as-is.
#[instrument(skip_all, fields(model = %correction.model))]
pub async fn correct_captions(
    row: &mut Row,
    columns: &[String],
    correction: &CaptionCorrection,
    generator: &ArtifactGenerator,
    storage: &dyn Storage,
    srt_dir: &str,
) -> Result<bool> {
    let target = corrected_captions_column(&correction.model);
    if row.has_value(&target) {
        return Ok(false);
    }

    let srt_column = select_srt_column(row, columns, correction.source.as_deref());
    let Some(srt_path) = row.text(&srt_column).filter(|p| !p.is_empty()) else {
        info!("No {} for {}", srt_column, row.url().unwrap_or("?"));
        return Ok(false);
    };
    let srt = storage.read_text(srt_path).await?;

    let (video_id, title) = row_identity(row)
        .ok_or_else(|| YtDocsError::InvalidInput("Row has no usable URL".to_string()))?;
    let video = VideoContext {
        url: row.url().unwrap_or_default().to_string(),
        title: row.get(TITLE).map(|t| t.to_string()).unwrap_or_default(),
    };

    let reply = generator
        .suggest_corrected_captions(&correction.model, &video, &srt)
        .await?;
    if reply.text == NO_CHANGES {
        info!("No caption changes suggested for {}", video_id);
    }

    let source = srt_source(&srt_column).unwrap_or(YOUTUBE_SOURCE);
    let name = format!(
        "{} - {} - {} - corrected captions (from {}).srt",
        correction.model, video_id, title, source
    );
    let stored = storage.write_text(&join(srt_dir, &name), &reply.text).await?;
    row.set(target, stored);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::llm::{Completion, LanguageModel};
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Reviewer {
        reply: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LanguageModel for Reviewer {
        async fn query(&self, _model: &str, _prompt: &str) -> Result<Completion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Completion::new(self.reply, 10, 5))
        }
    }

    fn generator(reply: &'static str) -> (Arc<Reviewer>, ArtifactGenerator) {
        let reviewer = Arc::new(Reviewer {
            reply,
            calls: AtomicUsize::new(0),
        });
        (reviewer.clone(), ArtifactGenerator::new(reviewer, Prompts::default()))
    }

    fn row() -> Row {
        let mut row = Row::new();
        row.set("URL", "https://www.youtube.com/watch?v=atmGAHYpf_c");
        row.set("Title", "Hearing");
        row.set("SRT File youtube", "srt-files/youtube.srt");
        row.set("SRT File gcp-chirp3", "srt-files/chirp.srt");
        row.set("SRT File whisper-1", "srt-files/whisper.srt");
        row
    }

    fn columns(row: &Row) -> Vec<String> {
        row.columns().map(str::to_string).collect()
    }

    fn correction(source: Option<&str>) -> CaptionCorrection {
        CaptionCorrection {
            model: "gemini-3-flash-preview".to_string(),
            source: source.map(str::to_string),
        }
    }

    #[test]
    fn test_select_srt_column() {
        let row = row();
        let columns = columns(&row);

        assert_eq!(select_srt_column(&row, &columns, Some("gcp-chirp3")), "SRT File gcp-chirp3");
        assert_eq!(select_srt_column(&row, &columns, None), "SRT File whisper-1");

        let mut youtube_only = Row::new();
        youtube_only.set("SRT File youtube", "a.srt");
        assert_eq!(
            select_srt_column(&youtube_only, &columns, None),
            "SRT File youtube"
        );
    }

    #[tokio::test]
    async fn test_correct_captions_records_reply() {
        let (reviewer, generator) = generator("1\n00:00:00,000 --> 00:00:01,000\nFixed\n");
        let storage = MemoryStorage::new();
        storage.insert("srt-files/whisper.srt", "1\n00:00:00,000 --> 00:00:01,000\nfixd\n");
        let mut row = row();
        let columns = columns(&row);

        let done = correct_captions(&mut row, &columns, &correction(None), &generator, &storage, "srt-files")
            .await
            .unwrap();

        assert!(done);
        assert_eq!(
            row.text("Suggested Corrected Captions File (gemini-3-flash-preview)"),
            Some("srt-files/gemini-3-flash-preview - atmGAHYpf_c - Hearing - corrected captions (from whisper-1).srt")
        );
        assert_eq!(reviewer.calls.load(Ordering::SeqCst), 1);

        // Second run is a no-op.
        let done = correct_captions(&mut row, &columns, &correction(None), &generator, &storage, "srt-files")
            .await
            .unwrap();
        assert!(!done);
        assert_eq!(reviewer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_changes_reply_is_stored() {
        let (_, generator) = generator("NO_CHANGES");
        let storage = MemoryStorage::new();
        storage.insert("srt-files/youtube.srt", "1\n");
        let mut row = row();
        let columns = columns(&row);

        correct_captions(&mut row, &columns, &correction(Some("youtube")), &generator, &storage, "srt-files")
            .await
            .unwrap();

        let path = row
            .text("Suggested Corrected Captions File (gemini-3-flash-preview)")
            .unwrap()
            .to_string();
        assert_eq!(storage.read_text(&path).await.unwrap(), "NO_CHANGES");
    }

    #[tokio::test]
    async fn test_missing_srt_is_skipped() {
        let (reviewer, generator) = generator("x");
        let storage = MemoryStorage::new();
        let mut row = Row::new();
        row.set("URL", "https://www.youtube.com/watch?v=atmGAHYpf_c");

        let done = correct_captions(&mut row, &[], &correction(None), &generator, &storage, "srt-files")
            .await
            .unwrap();
        assert!(!done);
        assert_eq!(reviewer.calls.load(Ordering::SeqCst), 0);
    }
}
