//! Platform captions via yt-dlp.

use super::format::parse_vtt;
use super::Transcript;
use crate::error::Result;
use crate::media::run_tool;
use crate::table::columns::watch_url;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Fetches English captions, preferring human-authored subtitles over
/// auto-generated ones.
pub struct YtDlpCaptions {
    program: String,
    language: String,
}

impl Default for YtDlpCaptions {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlpCaptions {
    pub fn new() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            language: "en".to_string(),
        }
    }

    fn command(&self, video_id: &str, dir: &Path, auto: bool) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("--skip-download")
            .arg(if auto { "--write-auto-subs" } else { "--write-subs" })
            .args(["--sub-langs", &self.language, "--sub-format", "vtt"])
            .arg("--output")
            .arg(dir.join("%(id)s.%(ext)s"))
            .args(["--no-playlist", "--quiet", "--no-warnings"])
            .arg(watch_url(video_id))
            .stdout(Stdio::null());
        command
    }

    /// Fetch captions for a video. `None` when the video has no captions in
    /// the requested language.
    #[instrument(skip(self))]
    pub async fn fetch(&self, video_id: &str) -> Result<Option<Transcript>> {
        let scratch = tempfile::tempdir()?;

        for auto in [false, true] {
            run_tool(&self.program, &mut self.command(video_id, scratch.path(), auto)).await?;

            let Some(path) = find_vtt(scratch.path()).await? else {
                debug!("No {} captions for {}", if auto { "auto" } else { "manual" }, video_id);
                continue;
            };

            let vtt = tokio::fs::read_to_string(&path).await?;
            let transcript = Transcript::from_segments(parse_vtt(&vtt), auto);
            if transcript.is_empty() {
                continue;
            }

            info!(
                "Fetched {} captions ({} chars)",
                if auto { "auto-generated" } else { "manual" },
                transcript.text.len()
            );
            return Ok(Some(transcript));
        }

        Ok(None)
    }
}

async fn find_vtt(dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "vtt") {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: &Command) -> Vec<String> {
        command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_manual_then_auto_flags() {
        let captions = YtDlpCaptions::new();
        let dir = Path::new("/tmp/x");

        let manual = args(&captions.command("atmGAHYpf_c", dir, false));
        assert!(manual.contains(&"--write-subs".to_string()));
        assert!(!manual.contains(&"--write-auto-subs".to_string()));
        assert_eq!(
            manual.last().map(String::as_str),
            Some("https://www.youtube.com/watch?v=atmGAHYpf_c")
        );

        let auto = args(&captions.command("atmGAHYpf_c", dir, true));
        assert!(auto.contains(&"--write-auto-subs".to_string()));
    }

    #[tokio::test]
    async fn test_find_vtt() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_vtt(dir.path()).await.unwrap().is_none());

        std::fs::write(dir.path().join("abc.en.vtt"), "WEBVTT\n").unwrap();
        let found = find_vtt(dir.path()).await.unwrap().unwrap();
        assert!(found.ends_with("abc.en.vtt"));
    }
}
