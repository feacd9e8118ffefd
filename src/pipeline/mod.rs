//! The documentation pipeline.
//!
//! Videos are processed one at a time into rows, the rows are reconciled
//! into the persisted table, and the translation, caption-correction and
//! video passes then run over the merged table.

mod captions;
mod video;

pub use captions::{correct_captions, select_srt_column};

use crate::config::DirectorySettings;
use crate::error::Result;
use crate::llm::ArtifactGenerator;
use crate::media::{process_videos, Encoder};
use crate::storage::Storage;
use crate::table::columns::{
    safe_title, watch_url, ArtifactKind, ColumnName, SOURCE_LANGUAGE, TITLE, YOUTUBE_SOURCE,
};
use crate::table::{reconcile, Row, Table};
use crate::transcription::TranscriptSource;
use crate::translate::{process_translate, ArtifactDirs, TranslationJob, Translator};
use crate::youtube::{extract_video_id, VideoSource};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// A translation request: backend plus target language.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateTarget {
    pub model: String,
    pub lang: String,
}

/// A caption-correction request: model plus optional SRT source.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionCorrection {
    pub model: String,
    pub source: Option<String>,
}

/// Everything one run needs to know.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Video ID, URL, comma list, playlist ID or channel handle.
    pub video_input: String,
    /// Table file path.
    pub output: PathBuf,
    /// Models to generate artifacts with. Empty means metadata and
    /// transcript only.
    pub models: Vec<String>,
    pub transcript_source: String,
    pub translate: Option<TranslateTarget>,
    pub caption_correction: Option<CaptionCorrection>,
    /// Skip the secondary "from youtube" artifacts when the primary
    /// transcript source is not `youtube`.
    pub no_youtube_summary: bool,
    pub combine_info_audio: bool,
    /// Pause between videos.
    pub delay: Duration,
    pub directories: DirectorySettings,
}

impl PipelineOptions {
    pub fn new(video_input: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            video_input: video_input.into(),
            output: output.into(),
            models: Vec::new(),
            transcript_source: YOUTUBE_SOURCE.to_string(),
            translate: None,
            caption_correction: None,
            no_youtube_summary: false,
            combine_info_audio: false,
            delay: Duration::from_millis(1000),
            directories: DirectorySettings::default(),
        }
    }

    /// True when the secondary youtube-sourced artifacts are produced too.
    pub fn wants_youtube_family(&self) -> bool {
        self.transcript_source != YOUTUBE_SOURCE && !self.no_youtube_summary
    }

    /// Summary text columns this run produces, one per model and source.
    pub fn required_columns(&self) -> Vec<String> {
        let mut sources = vec![self.transcript_source.as_str()];
        if self.wants_youtube_family() {
            sources.push(YOUTUBE_SOURCE);
        }

        self.models
            .iter()
            .flat_map(|m| {
                sources
                    .iter()
                    .map(move |s| ColumnName::text(ArtifactKind::Summary, m, s).build())
            })
            .collect()
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub requested: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub translated: usize,
    pub captions_corrected: usize,
    pub rows: usize,
}

/// Wires the collaborators together.
pub struct Pipeline {
    videos: Arc<dyn VideoSource>,
    transcripts: Arc<dyn TranscriptSource>,
    generator: Arc<ArtifactGenerator>,
    translator: Arc<dyn Translator>,
    storage: Arc<dyn Storage>,
    encoder: Arc<dyn Encoder>,
}

impl Pipeline {
    pub fn new(
        videos: Arc<dyn VideoSource>,
        transcripts: Arc<dyn TranscriptSource>,
        generator: Arc<ArtifactGenerator>,
        translator: Arc<dyn Translator>,
        storage: Arc<dyn Storage>,
        encoder: Arc<dyn Encoder>,
    ) -> Self {
        Self {
            videos,
            transcripts,
            generator,
            translator,
            storage,
            encoder,
        }
    }

    /// Load the table from `options.output`, process, and write it back.
    pub async fn run(&self, options: &PipelineOptions) -> Result<RunSummary> {
        let existing = if options.output.exists() {
            match Table::load(&options.output) {
                Ok(table) => {
                    info!("Loaded existing data from {:?} ({} rows)", options.output, table.len());
                    table
                }
                Err(e) => {
                    warn!("Could not read existing table {:?}: {}", options.output, e);
                    Table::new()
                }
            }
        } else {
            Table::new()
        };

        let (table, summary) = self.process(existing, options).await?;
        table.save(&options.output)?;
        info!("Saved {} rows to {:?}", table.len(), options.output);
        Ok(summary)
    }

    /// Run every pass over an in-memory table.
    #[instrument(skip_all, fields(input = %options.video_input))]
    pub async fn process(&self, existing: Table, options: &PipelineOptions) -> Result<(Table, RunSummary)> {
        let video_ids = self.videos.resolve_video_ids(&options.video_input).await?;
        info!("Processing {} videos", video_ids.len());

        self.ensure_directories(&options.directories).await?;

        let mut summary = RunSummary {
            requested: video_ids.len(),
            ..RunSummary::default()
        };
        let required = options.required_columns();
        let mut new_rows = Vec::new();

        for (i, video_id) in video_ids.iter().enumerate() {
            let url = watch_url(video_id);
            let current = existing.find_by_url(&url);

            match self.process_video(video_id, current, &required, options).await {
                Ok(Some(row)) => {
                    new_rows.push(row);
                    summary.processed += 1;
                }
                Ok(None) => {
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!("Skipping {}: {}", video_id, e);
                    summary.failed += 1;
                    continue;
                }
            }

            if i + 1 < video_ids.len() && !options.delay.is_zero() {
                tokio::time::sleep(options.delay).await;
            }
        }

        let mut table = reconcile(existing, new_rows);
        let requested: HashSet<String> = video_ids.iter().map(|id| watch_url(id)).collect();

        if let Some(target) = &options.translate {
            summary.translated = self.translate_pass(&mut table, &requested, target, options).await;
        }

        if let Some(correction) = &options.caption_correction {
            summary.captions_corrected = self
                .caption_pass(&mut table, &requested, correction, &options.directories.srt)
                .await;
        }

        if options.combine_info_audio {
            let result = process_videos(
                &mut table,
                self.storage.as_ref(),
                self.encoder.as_ref(),
                &options.directories.videos,
            )
            .await;
            if let Err(e) = result {
                warn!("Video pass failed; keeping the table without videos: {}", e);
            }
        }

        summary.rows = table.len();
        Ok((table, summary))
    }

    async fn ensure_directories(&self, dirs: &DirectorySettings) -> Result<()> {
        for dir in [
            &dirs.transcripts,
            &dirs.srt,
            &dirs.summaries,
            &dirs.one_sentence_summaries,
            &dirs.qa,
            &dirs.tags,
        ] {
            self.storage.ensure_directory(dir).await?;
        }
        Ok(())
    }

    async fn translate_pass(
        &self,
        table: &mut Table,
        requested: &HashSet<String>,
        target: &TranslateTarget,
        options: &PipelineOptions,
    ) -> usize {
        if target.lang == SOURCE_LANGUAGE {
            info!("Target language is the source language; nothing to translate");
            return 0;
        }

        let dirs = ArtifactDirs::from(&options.directories);
        let mut translated = 0;

        for row in table.rows_mut().iter_mut().filter(|r| in_request(r, requested)) {
            let Some((video_id, title)) = row_identity(row) else {
                continue;
            };
            let job = TranslationJob {
                translate_model: &target.model,
                lang: &target.lang,
                transcript_source: &options.transcript_source,
                models: &options.models,
                dirs: &dirs,
                video_id: &video_id,
                safe_title: &title,
            };
            translated += process_translate(row, &job, self.translator.as_ref(), self.storage.as_ref()).await;
        }

        table.sync_columns();
        info!("Translated {} columns into {}", translated, target.lang);
        translated
    }

    async fn caption_pass(
        &self,
        table: &mut Table,
        requested: &HashSet<String>,
        correction: &CaptionCorrection,
        srt_dir: &str,
    ) -> usize {
        let columns = table.columns().to_vec();
        let mut corrected = 0;

        for row in table.rows_mut().iter_mut().filter(|r| in_request(r, requested)) {
            let result = correct_captions(
                row,
                &columns,
                correction,
                &self.generator,
                self.storage.as_ref(),
                srt_dir,
            )
            .await;
            match result {
                Ok(true) => corrected += 1,
                Ok(false) => {}
                Err(e) => warn!(
                    "Caption correction failed for {}: {}",
                    row.url().unwrap_or("?"),
                    e
                ),
            }
        }

        table.sync_columns();
        corrected
    }
}

fn in_request(row: &Row, requested: &HashSet<String>) -> bool {
    row.url().is_some_and(|u| requested.contains(u))
}

/// Video ID and file-safe title of a row.
fn row_identity(row: &Row) -> Option<(String, String)> {
    let video_id = extract_video_id(row.url()?)?;
    let title = row.get(TITLE).map(|t| t.to_string()).unwrap_or_default();
    Some((video_id, safe_title(&title)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::llm::{Completion, LanguageModel};
    use crate::storage::MemoryStorage;
    use crate::transcription::{Transcript, TranscriptSegment};
    use crate::youtube::VideoDetails;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeVideos {
        detail_calls: AtomicUsize,
    }

    #[async_trait]
    impl VideoSource for FakeVideos {
        async fn resolve_video_ids(&self, input: &str) -> Result<Vec<String>> {
            Ok(input.split(',').map(str::to_string).collect())
        }

        async fn fetch_details(&self, video_id: &str) -> Result<Option<VideoDetails>> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            if video_id == "missing0000" {
                return Ok(None);
            }
            Ok(Some(VideoDetails {
                id: video_id.to_string(),
                title: format!("Title {}", video_id),
                description: "desc".to_string(),
                published: "2024-01-01T00:00:00Z".to_string(),
                channel: "chan".to_string(),
                tags: "a, b".to_string(),
                duration: "0:10:00".to_string(),
            }))
        }
    }

    #[derive(Default)]
    struct FakeTranscripts {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TranscriptSource for FakeTranscripts {
        async fn fetch_transcript(&self, video_id: &str, source: &str) -> Result<Option<Transcript>> {
            self.calls.lock().unwrap().push(source.to_string());
            Ok(Some(Transcript::from_segments(
                vec![TranscriptSegment::new(0.0, 1.0, format!("{} words from {}", video_id, source))],
                source == YOUTUBE_SOURCE,
            )))
        }
    }

    #[derive(Default)]
    struct EchoModel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LanguageModel for EchoModel {
        async fn query(&self, model: &str, _prompt: &str) -> Result<Completion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Completion::new(format!("{} says hi", model), 1, 1))
        }
    }

    struct UpperTranslator;

    #[async_trait]
    impl Translator for UpperTranslator {
        async fn translate(&self, text: &str, _m: &str, _t: &str, _s: &str) -> Result<Completion> {
            Ok(Completion::new(text.to_uppercase(), 0, 0))
        }
    }

    struct NoEncoder;

    #[async_trait]
    impl Encoder for NoEncoder {
        async fn encode(&self, _i: &Path, _a: &Path, _o: &Path) -> Result<()> {
            Ok(())
        }
    }

    struct Harness {
        videos: Arc<FakeVideos>,
        transcripts: Arc<FakeTranscripts>,
        llm: Arc<EchoModel>,
        storage: Arc<MemoryStorage>,
        pipeline: Pipeline,
    }

    fn harness() -> Harness {
        let videos = Arc::new(FakeVideos::default());
        let transcripts = Arc::new(FakeTranscripts::default());
        let llm = Arc::new(EchoModel::default());
        let storage = Arc::new(MemoryStorage::new());
        let generator = Arc::new(ArtifactGenerator::new(llm.clone(), Prompts::default()));
        let pipeline = Pipeline::new(
            videos.clone(),
            transcripts.clone(),
            generator,
            Arc::new(UpperTranslator),
            storage.clone(),
            Arc::new(NoEncoder),
        );
        Harness {
            videos,
            transcripts,
            llm,
            storage,
            pipeline,
        }
    }

    fn options(input: &str, models: &[&str]) -> PipelineOptions {
        let mut options = PipelineOptions::new(input, "youtube-docs.csv");
        options.models = models.iter().map(|m| m.to_string()).collect();
        options.delay = Duration::ZERO;
        options
    }

    #[tokio::test]
    async fn test_fresh_video_gets_full_row() {
        let h = harness();
        let (table, summary) = h
            .pipeline
            .process(Table::new(), &options("atmGAHYpf_c", &["m1"]))
            .await
            .unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row.url(), Some("https://www.youtube.com/watch?v=atmGAHYpf_c"));
        assert_eq!(row.text("Title"), Some("Title atmGAHYpf_c"));
        assert_eq!(row.text("Summary Text m1 from youtube"), Some("m1 says hi"));
        assert!(row.has_value("QA Text m1 from youtube"));
        assert!(row.has_value("One Sentence Summary m1 from youtube"));
        assert!(row.has_value("Tags youtube m1 model"));
        assert_eq!(
            row.text("Transcript File youtube generated"),
            Some("transcript-files/youtube generated - atmGAHYpf_c - Title atmGAHYpf_c.txt")
        );
        assert!(row.has_value("SRT File youtube"));
        assert_eq!(
            row.text("Summary File m1 from youtube"),
            Some("summary-files/m1 - atmGAHYpf_c - Title atmGAHYpf_c - summary (from youtube).md")
        );
        assert_eq!(h.llm.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_complete_row_is_skipped_without_calls() {
        let h = harness();
        let opts = options("atmGAHYpf_c", &["m1"]);
        let (table, _) = h.pipeline.process(Table::new(), &opts).await.unwrap();

        let (again, summary) = h.pipeline.process(table, &opts).await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(again.len(), 1);
        assert_eq!(h.videos.detail_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.transcripts.calls.lock().unwrap().len(), 1);
        assert_eq!(h.llm.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_new_model_reuses_metadata_and_transcript() {
        let h = harness();
        let (table, _) = h
            .pipeline
            .process(Table::new(), &options("atmGAHYpf_c", &["m1"]))
            .await
            .unwrap();

        let (table, summary) = h
            .pipeline
            .process(table, &options("atmGAHYpf_c", &["m1", "m2"]))
            .await
            .unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(table.len(), 1);
        assert_eq!(h.videos.detail_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.transcripts.calls.lock().unwrap().len(), 1);
        assert_eq!(h.llm.calls.load(Ordering::SeqCst), 8);
        let row = &table.rows()[0];
        assert_eq!(row.text("Summary Text m1 from youtube"), Some("m1 says hi"));
        assert_eq!(row.text("Summary Text m2 from youtube"), Some("m2 says hi"));
    }

    #[tokio::test]
    async fn test_missing_video_is_skipped_and_run_continues() {
        let h = harness();
        let (table, summary) = h
            .pipeline
            .process(Table::new(), &options("missing0000,atmGAHYpf_c", &[]))
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.processed, 1);
        assert_eq!(table.len(), 1);
        assert_eq!(h.llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_youtube_source_adds_youtube_family() {
        let h = harness();
        let mut opts = options("atmGAHYpf_c", &["m1"]);
        opts.transcript_source = "whisper-1".to_string();

        let (table, _) = h.pipeline.process(Table::new(), &opts).await.unwrap();
        let row = &table.rows()[0];
        assert!(row.has_value("Summary Text m1 from whisper-1"));
        assert!(row.has_value("Summary Text m1 from youtube"));
        assert!(row.has_value("Transcript File whisper-1"));
        assert!(row.has_value("SRT File whisper-1"));
        assert_eq!(
            *h.transcripts.calls.lock().unwrap(),
            vec!["whisper-1".to_string(), "youtube".to_string()]
        );

        let h = harness();
        opts.no_youtube_summary = true;
        let (table, _) = h.pipeline.process(Table::new(), &opts).await.unwrap();
        assert!(!table.has_column("Summary Text m1 from youtube"));
    }

    #[tokio::test]
    async fn test_translation_pass_touches_requested_rows_only() {
        let h = harness();
        let mut other = Row::new();
        other.set("URL", "https://www.youtube.com/watch?v=other000000");
        other.set("Summary Text m1 from youtube", "left alone");
        let existing = Table::from_rows(vec![other]);

        let mut opts = options("atmGAHYpf_c", &["m1"]);
        opts.translate = Some(TranslateTarget {
            model: "gemini".to_string(),
            lang: "es".to_string(),
        });

        let (table, summary) = h.pipeline.process(existing, &opts).await.unwrap();
        assert_eq!(summary.translated, 4);
        assert!(table.has_column("Summary Text m1 from youtube (es)"));

        let processed = table.find_by_url("https://www.youtube.com/watch?v=atmGAHYpf_c").unwrap();
        assert_eq!(processed.text("Summary Text m1 from youtube (es)"), Some("M1 SAYS HI"));
        let untouched = table.find_by_url("https://www.youtube.com/watch?v=other000000").unwrap();
        assert!(untouched.get("Summary Text m1 from youtube (es)").is_none());
        assert!(h.storage.paths().iter().any(|p| p.ends_with("(es).md")));
    }

    /// Memory storage that cannot create the video directory.
    struct NoVideoDir(MemoryStorage);

    #[async_trait]
    impl Storage for NoVideoDir {
        async fn exists(&self, path: &str) -> Result<bool> {
            self.0.exists(path).await
        }
        async fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
            self.0.read_bytes(path).await
        }
        async fn write_text(&self, path: &str, content: &str) -> Result<String> {
            self.0.write_text(path, content).await
        }
        async fn upload_file(&self, local: &Path, target: &str, content_type: &str) -> Result<String> {
            self.0.upload_file(local, target, content_type).await
        }
        async fn ensure_directory(&self, path: &str) -> Result<()> {
            if path == "video-files" {
                return Err(crate::error::YtDocsError::Storage("permission denied".to_string()));
            }
            self.0.ensure_directory(path).await
        }
        fn resolve(&self, path: &str) -> String {
            self.0.resolve(path)
        }
    }

    #[tokio::test]
    async fn test_video_pass_failure_keeps_processed_rows() {
        let llm = Arc::new(EchoModel::default());
        let pipeline = Pipeline::new(
            Arc::new(FakeVideos::default()),
            Arc::new(FakeTranscripts::default()),
            Arc::new(ArtifactGenerator::new(llm, Prompts::default())),
            Arc::new(UpperTranslator),
            Arc::new(NoVideoDir(MemoryStorage::new())),
            Arc::new(NoEncoder),
        );

        let mut other = Row::new();
        other.set("URL", "https://www.youtube.com/watch?v=other000000");
        other.set("Summary Infographic File m", "info.png");
        other.set("Summary Audio File m", "audio.m4a");
        let existing = Table::from_rows(vec![other]);

        let mut opts = options("atmGAHYpf_c", &["m1"]);
        opts.combine_info_audio = true;

        let (table, summary) = pipeline.process(existing, &opts).await.unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.rows, 2);
        let row = table.find_by_url("https://www.youtube.com/watch?v=atmGAHYpf_c").unwrap();
        assert_eq!(row.text("Summary Text m1 from youtube"), Some("m1 says hi"));
        assert!(!table.has_column("Video File"));
    }

    #[test]
    fn test_required_columns() {
        let mut opts = options("x", &["m1", "m2"]);
        assert_eq!(
            opts.required_columns(),
            vec!["Summary Text m1 from youtube", "Summary Text m2 from youtube"]
        );
        opts.transcript_source = "whisper-1".to_string();
        assert_eq!(opts.required_columns().len(), 4);
        opts.models.clear();
        assert!(opts.required_columns().is_empty());
    }
}
