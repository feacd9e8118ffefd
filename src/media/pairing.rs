//! Pairing infographics with narration audio into per-language videos.

use super::Encoder;
use crate::error::Result;
use crate::storage::{join, Storage};
use crate::table::columns::{
    self, language_of, video_file_column, AUDIO_PREFIX, INFOGRAPHIC_PREFIX, SOURCE_LANGUAGE,
};
use crate::table::{Row, Table};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, instrument, warn};

type ColumnGroups<'t> = BTreeMap<&'t str, Vec<&'t str>>;

fn group_by_language<'t>(columns: &'t [String], prefix: &str) -> ColumnGroups<'t> {
    let mut groups: ColumnGroups<'t> = BTreeMap::new();
    for column in columns.iter().filter(|c| c.starts_with(prefix)) {
        groups
            .entry(language_of(column))
            .or_default()
            .push(column.as_str());
    }
    groups
}

/// Languages that have at least one infographic column and one audio column,
/// sorted.
pub fn pairable_languages(columns: &[String]) -> Vec<String> {
    let info: BTreeSet<&str> = group_by_language(columns, INFOGRAPHIC_PREFIX)
        .into_keys()
        .collect();
    let audio: BTreeSet<&str> = group_by_language(columns, AUDIO_PREFIX)
        .into_keys()
        .collect();
    info.intersection(&audio).map(|l| l.to_string()).collect()
}

/// Output file name for a row's video in `lang`.
///
/// Local audio names the video after itself (`{stem}.mp4`). Remote audio
/// falls back to the video ID from the row's URL, then to the title with
/// non-alphanumerics replaced by `_`, then to a random name; non-English
/// videos get a ` ({lang})` suffix.
pub fn video_filename(row: &Row, audio_path: &str, lang: &str) -> String {
    if !audio_path.starts_with("http") {
        let stem = Path::new(audio_path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("video_{}", uuid::Uuid::new_v4()));
        return format!("{}.mp4", stem);
    }

    static VIDEO_ID_RE: OnceLock<Regex> = OnceLock::new();
    let re = VIDEO_ID_RE.get_or_init(|| Regex::new(r"v=([a-zA-Z0-9_-]+)").expect("valid regex"));

    let from_url = row
        .url()
        .and_then(|u| re.captures(u))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());
    let from_title = || {
        row.text(columns::TITLE)
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.chars()
                    .map(|c| if c.is_alphanumeric() { c } else { '_' })
                    .collect::<String>()
            })
    };
    let base = from_url
        .or_else(from_title)
        .unwrap_or_else(|| format!("video_{}", uuid::Uuid::new_v4()));

    if lang == SOURCE_LANGUAGE {
        format!("{}.mp4", base)
    } else {
        format!("{} ({}).mp4", base, lang)
    }
}

/// First column in `candidates` whose stored path exists.
async fn first_existing(row: &Row, candidates: &[&str], storage: &dyn Storage) -> Option<String> {
    for column in candidates {
        let Some(path) = row.text(column).filter(|p| !p.is_empty()) else {
            continue;
        };
        match storage.exists(path).await {
            Ok(true) => return Some(path.to_string()),
            Ok(false) => {}
            Err(e) => warn!("Could not check {}: {}", path, e),
        }
    }
    None
}

/// Everything needed to produce one video.
struct Assembler<'a> {
    storage: &'a dyn Storage,
    encoder: &'a dyn Encoder,
    videos_dir: &'a str,
    scratch: &'a Path,
}

impl Assembler<'_> {
    /// Build (or reuse) the video for one row and language.
    async fn make_video(&self, row: &Row, lang: &str, image: &str, audio: &str) -> Result<String> {
        let name = video_filename(row, audio, lang);
        let target = join(self.videos_dir, &name);

        if self.storage.exists(&target).await? {
            info!("Video already exists: {}", name);
            return Ok(self.storage.resolve(&target));
        }

        info!("Creating video: {}", name);
        let audio_ext = Path::new(audio)
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "m4a".to_string());
        let local_image = self.scratch.join(format!("input_image_{}.png", lang));
        let local_audio = self.scratch.join(format!("input_audio_{}.{}", lang, audio_ext));
        let local_video = self.scratch.join(format!("output_video_{}.mp4", lang));

        tokio::fs::write(&local_image, self.storage.read_bytes(image).await?).await?;
        tokio::fs::write(&local_audio, self.storage.read_bytes(audio).await?).await?;

        self.encoder
            .encode(&local_image, &local_audio, &local_video)
            .await?;
        let stored = self
            .storage
            .upload_file(&local_video, &target, "video/mp4")
            .await?;
        info!("Created and uploaded: {}", stored);
        Ok(stored)
    }
}

/// Combine each row's infographic and audio into a video, per language.
///
/// For every pairable language the first infographic and first audio column
/// whose stored file exists are used. An existing output file is reused
/// without encoding. Results go to `Video File` / `Video File (xx)`, filling
/// only rows that have no value there yet. Rows missing either input, and
/// rows whose encode fails, are left empty. An error means the pass could
/// not start (output directory or scratch area) and the table is unchanged.
#[instrument(skip_all, fields(rows = table.len()))]
pub async fn process_videos(
    table: &mut Table,
    storage: &dyn Storage,
    encoder: &dyn Encoder,
    videos_dir: &str,
) -> Result<()> {
    let info_groups = group_by_language(table.columns(), INFOGRAPHIC_PREFIX);
    let audio_groups = group_by_language(table.columns(), AUDIO_PREFIX);

    if info_groups.is_empty() || audio_groups.is_empty() {
        info!("Required columns (infographic and audio) not found");
        return Ok(());
    }

    let languages = pairable_languages(table.columns());
    if languages.is_empty() {
        info!("No matching infographic/audio column pairs found");
        return Ok(());
    }

    storage.ensure_directory(videos_dir).await?;
    let scratch = tempfile::TempDir::new()?;
    let assembler = Assembler {
        storage,
        encoder,
        videos_dir,
        scratch: scratch.path(),
    };

    let mut results: Vec<(String, Vec<Option<String>>)> = Vec::new();
    for lang in &languages {
        let info_cols = &info_groups[lang.as_str()];
        let audio_cols = &audio_groups[lang.as_str()];
        let mut values = Vec::with_capacity(table.len());

        for row in table.rows() {
            let image = first_existing(row, info_cols, storage).await;
            let audio = first_existing(row, audio_cols, storage).await;
            let (Some(image), Some(audio)) = (image, audio) else {
                values.push(None);
                continue;
            };

            match assembler.make_video(row, lang, &image, &audio).await {
                Ok(path) => values.push(Some(path)),
                Err(e) => {
                    warn!("Error processing video for {}: {}", row.url().unwrap_or("?"), e);
                    values.push(None);
                }
            }
        }
        results.push((video_file_column(lang), values));
    }

    for (column, values) in results {
        table.fill_missing(&column, values);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::YtDocsError;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeEncoder {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeEncoder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Encoder for FakeEncoder {
        async fn encode(&self, image: &Path, audio: &Path, output: &Path) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(YtDocsError::ToolFailed("ffmpeg exploded".to_string()));
            }
            let mut bytes = std::fs::read(image)?;
            bytes.extend(std::fs::read(audio)?);
            std::fs::write(output, bytes)?;
            Ok(())
        }
    }

    fn row(pairs: &[(&str, &str)]) -> Row {
        let mut r = Row::new();
        for (k, v) in pairs {
            r.set(*k, *v);
        }
        r
    }

    fn seeded_storage() -> MemoryStorage {
        let storage = MemoryStorage::new();
        storage.insert("info.png", "IMG");
        storage.insert("audio/talk.m4a", "AUD");
        storage.insert("info-es.png", "IMG-ES");
        storage.insert("audio/talk-es.m4a", "AUD-ES");
        storage
    }

    #[test]
    fn test_pairable_languages() {
        let columns: Vec<String> = [
            "Summary Infographic File modelX",
            "Summary Audio File modelY",
            "Summary Audio File modelY (es)",
            "Summary Infographic File modelX (fr)",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(pairable_languages(&columns), vec!["en"]);
    }

    #[test]
    fn test_video_filename() {
        let r = row(&[("URL", "https://www.youtube.com/watch?v=abc_12-Z"), ("Title", "T")]);
        assert_eq!(video_filename(&r, "https://x/a.m4a", "en"), "abc_12-Z.mp4");
        assert_eq!(video_filename(&r, "https://x/a.m4a", "es"), "abc_12-Z (es).mp4");

        let r = row(&[("Title", "Hi there!")]);
        assert_eq!(video_filename(&r, "http://x/a.m4a", "en"), "Hi_there_.mp4");

        let r = Row::new();
        let name = video_filename(&r, "https://x/a.m4a", "de");
        assert!(name.starts_with("video_") && name.ends_with(" (de).mp4"));

        // Local audio names the video after the audio file.
        let r = row(&[("URL", "https://www.youtube.com/watch?v=abc")]);
        assert_eq!(video_filename(&r, "audio/talk (es).m4a", "es"), "talk (es).mp4");
    }

    #[tokio::test]
    async fn test_only_shared_languages_are_paired() {
        let storage = seeded_storage();
        let encoder = FakeEncoder::new();
        let mut table = Table::from_rows(vec![row(&[
            ("URL", "https://www.youtube.com/watch?v=abc"),
            ("Summary Infographic File modelX", "info.png"),
            ("Summary Audio File modelY", "audio/talk.m4a"),
            ("Summary Audio File modelY (es)", "audio/talk-es.m4a"),
        ])]);

        process_videos(&mut table, &storage, &encoder, "video-files").await.unwrap();

        assert_eq!(table.rows()[0].text("Video File"), Some("video-files/talk.mp4"));
        assert!(!table.has_column("Video File (es)"));
        assert_eq!(encoder.calls(), 1);
        assert_eq!(storage.read_bytes("video-files/talk.mp4").await.unwrap(), b"IMGAUD");
    }

    #[tokio::test]
    async fn test_second_run_reuses_existing_video() {
        let storage = seeded_storage();
        let encoder = FakeEncoder::new();
        let input = Table::from_rows(vec![row(&[
            ("URL", "https://www.youtube.com/watch?v=abc"),
            ("Summary Infographic File m", "info.png"),
            ("Summary Audio File m", "audio/talk.m4a"),
        ])]);

        let mut first = input.clone();
        process_videos(&mut first, &storage, &encoder, "video-files")
            .await
            .unwrap();
        assert_eq!(encoder.calls(), 1);

        let mut second = input;
        process_videos(&mut second, &storage, &encoder, "video-files").await.unwrap();
        assert_eq!(encoder.calls(), 1);
        assert_eq!(
            first.rows()[0].text("Video File"),
            second.rows()[0].text("Video File")
        );
    }

    #[tokio::test]
    async fn test_first_existing_file_wins() {
        let storage = seeded_storage();
        let encoder = FakeEncoder::new();
        let mut table = Table::from_rows(vec![row(&[
            ("URL", "https://www.youtube.com/watch?v=abc"),
            ("Summary Infographic File a (es)", "missing.png"),
            ("Summary Infographic File b (es)", "info-es.png"),
            ("Summary Audio File a (es)", "audio/talk-es.m4a"),
        ])]);

        process_videos(&mut table, &storage, &encoder, "video-files").await.unwrap();

        assert_eq!(table.rows()[0].text("Video File (es)"), Some("video-files/talk-es.mp4"));
        assert_eq!(
            storage.read_bytes("video-files/talk-es.mp4").await.unwrap(),
            b"IMG-ESAUD-ES"
        );
    }

    #[tokio::test]
    async fn test_missing_inputs_and_failures_leave_nulls() {
        let storage = seeded_storage();
        let encoder = FakeEncoder {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        let mut table = Table::from_rows(vec![
            row(&[
                ("URL", "https://www.youtube.com/watch?v=one"),
                ("Summary Infographic File m", "info.png"),
                ("Summary Audio File m", "audio/talk.m4a"),
            ]),
            row(&[
                ("URL", "https://www.youtube.com/watch?v=two"),
                ("Summary Infographic File m", "info.png"),
            ]),
        ]);

        process_videos(&mut table, &storage, &encoder, "video-files").await.unwrap();

        assert!(table.has_column("Video File"));
        assert!(table.rows().iter().all(|r| r.get("Video File").is_none()));
        assert_eq!(encoder.calls(), 1);
    }

    #[tokio::test]
    async fn test_existing_value_is_not_overwritten() {
        let storage = seeded_storage();
        let encoder = FakeEncoder::new();
        let mut table = Table::from_rows(vec![row(&[
            ("URL", "https://www.youtube.com/watch?v=abc"),
            ("Summary Infographic File m", "info.png"),
            ("Summary Audio File m", "audio/talk.m4a"),
            ("Video File", "elsewhere.mp4"),
        ])]);

        process_videos(&mut table, &storage, &encoder, "video-files").await.unwrap();
        assert_eq!(table.rows()[0].text("Video File"), Some("elsewhere.mp4"));
    }
}
