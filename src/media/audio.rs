//! Audio download and segmentation with yt-dlp, ffmpeg and ffprobe.

use super::run_tool;
use crate::error::{Result, YtDocsError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "m4a", "opus", "webm", "ogg"];

/// Download a video's audio track as MP3 into `output_dir`.
///
/// An existing `{video_id}.mp3` is reused.
#[instrument(skip(output_dir), fields(video_id = %video_id))]
pub async fn download_audio(url: &str, video_id: &str, output_dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;

    let target = output_dir.join(format!("{}.mp3", video_id));
    if tokio::fs::try_exists(&target).await? {
        info!("Using cached audio file");
        return Ok(target);
    }

    info!("Downloading audio from {}", url);
    let template = output_dir.join(format!("{}.%(ext)s", video_id));

    run_tool(
        "yt-dlp",
        Command::new("yt-dlp")
            .args(["--extract-audio", "--audio-format", "mp3", "--audio-quality", "0"])
            .arg("--output")
            .arg(&template)
            .args(["--no-playlist", "--quiet", "--no-warnings"])
            .arg(url)
            .stdout(Stdio::null()),
    )
    .await?;

    let downloaded = find_downloaded(output_dir, video_id)?;
    if downloaded != target {
        debug!("Converting {:?} to MP3", downloaded);
        run_tool(
            "ffmpeg",
            Command::new("ffmpeg")
                .arg("-i")
                .arg(&downloaded)
                .args(["-vn", "-codec:a", "libmp3lame", "-qscale:a", "2", "-y"])
                .args(["-loglevel", "error"])
                .arg(&target)
                .stdout(Stdio::null()),
        )
        .await?;
        if let Err(e) = tokio::fs::remove_file(&downloaded).await {
            debug!("Could not remove {:?}: {}", downloaded, e);
        }
    }

    Ok(target)
}

/// yt-dlp picks the container; look for whatever it produced.
fn find_downloaded(dir: &Path, video_id: &str) -> Result<PathBuf> {
    AUDIO_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", video_id, ext)))
        .find(|p| p.exists())
        .ok_or_else(|| {
            YtDocsError::ToolFailed(format!("yt-dlp produced no audio file for {}", video_id))
        })
}

/// Split audio into `chunk_seconds`-long MP3 segments.
///
/// Returns `(path, offset_seconds)` pairs in order. Audio no longer than one
/// chunk is returned as-is.
#[instrument(skip_all)]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    chunk_seconds: u32,
) -> Result<Vec<(PathBuf, f64)>> {
    tokio::fs::create_dir_all(output_dir).await?;

    let total = probe_duration(source).await?;
    let chunk_len = f64::from(chunk_seconds.max(1));
    info!("Total audio duration: {:.1}s", total);

    if total <= chunk_len {
        return Ok(vec![(source.to_path_buf(), 0.0)]);
    }

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");

    let mut segments = Vec::new();
    let mut offset = 0.0;
    while offset < total {
        let path = output_dir.join(format!("{}_{:04}.mp3", stem, segments.len()));
        let length = chunk_len.min(total - offset);
        extract_segment(source, &path, offset, length).await?;
        segments.push((path, offset));
        offset += chunk_len;
    }

    info!("Created {} audio segments", segments.len());
    Ok(segments)
}

async fn extract_segment(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    let segment_args = |cmd: &mut Command| {
        cmd.arg("-ss")
            .arg(format!("{:.3}", start))
            .arg("-i")
            .arg(source)
            .arg("-t")
            .arg(format!("{:.3}", length));
    };

    let mut copy = Command::new("ffmpeg");
    segment_args(&mut copy);
    copy.args(["-c", "copy", "-y", "-loglevel", "error"])
        .arg(dest)
        .stdout(Stdio::null());

    match run_tool("ffmpeg", &mut copy).await {
        Ok(_) if dest.exists() => return Ok(()),
        Err(e @ YtDocsError::ToolNotFound(_)) => return Err(e),
        _ => warn!("Stream copy failed, re-encoding segment"),
    }

    let mut encode = Command::new("ffmpeg");
    segment_args(&mut encode);
    encode
        .args(["-codec:a", "libmp3lame", "-qscale:a", "2", "-y", "-loglevel", "error"])
        .arg(dest)
        .stdout(Stdio::null());
    run_tool("ffmpeg", &mut encode).await?;
    Ok(())
}

/// Duration of a media file in seconds, from ffprobe's JSON output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let output = run_tool(
        "ffprobe",
        Command::new("ffprobe")
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path),
    )
    .await?;

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| YtDocsError::ToolFailed("Could not determine audio duration".to_string()))
}
