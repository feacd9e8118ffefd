//! Still-image plus audio to MP4 encoding.

use super::run_tool;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Trait for video encoders.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Mux a still `image` and an `audio` track into an MP4 at `output`.
    async fn encode(&self, image: &Path, audio: &Path, output: &Path) -> Result<()>;
}

/// Encoder backed by the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: String,
}

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self {
            program: "ffmpeg".to_string(),
        }
    }

    /// Use a specific ffmpeg binary.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, image: &Path, audio: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-y", "-loop", "1", "-i"])
            .arg(image)
            .arg("-i")
            .arg(audio)
            .args([
                "-c:v", "libx264", "-tune", "stillimage", "-c:a", "aac", "-b:a", "192k",
                "-pix_fmt", "yuv420p", "-shortest",
            ])
            .arg(output)
            .stdout(Stdio::null());
        cmd
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    #[instrument(skip(self))]
    async fn encode(&self, image: &Path, audio: &Path, output: &Path) -> Result<()> {
        debug!("Encoding {:?}", output);
        run_tool(&self.program, &mut self.command(image, audio, output)).await?;
        Ok(())
    }
}
