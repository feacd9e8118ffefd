//! Media handling: audio download and splitting, still-image video encoding,
//! and the pass that pairs infographics with narration audio.

mod audio;
mod encoder;
mod pairing;

pub use audio::{download_audio, probe_duration, split_audio};
pub use encoder::{Encoder, FfmpegEncoder};
pub use pairing::{pairable_languages, process_videos, video_filename};

use crate::error::{Result, YtDocsError};
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Run an external tool to completion, capturing stderr.
///
/// A missing binary maps to [`YtDocsError::ToolNotFound`], a non-zero exit
/// to [`YtDocsError::ToolFailed`] carrying the tool's stderr.
pub(crate) async fn run_tool(program: &str, command: &mut Command) -> Result<Output> {
    let output = command
        .stdin(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                YtDocsError::ToolNotFound(program.to_string())
            } else {
                YtDocsError::ToolFailed(format!("{} execution failed: {}", program, e))
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(YtDocsError::ToolFailed(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    Ok(output)
}
