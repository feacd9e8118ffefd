//! Pre-flight checks before any video is processed.
//!
//! Validates that required credentials and tools are available so a run
//! fails up front instead of midway through a playlist.

use crate::error::{Result, YtDocsError};
use crate::llm::ModelFamily;
use crate::pipeline::PipelineOptions;
use crate::shorthand::DEFAULT_TRANSLATION_ALIAS;
use crate::table::columns::YOUTUBE_SOURCE;
use std::collections::BTreeSet;
use std::process::Command;

/// What a run needs from the environment.
#[derive(Debug, Default, PartialEq)]
pub struct Requirements {
    pub env: BTreeSet<&'static str>,
    pub tools: BTreeSet<&'static str>,
}

impl Requirements {
    fn model(&mut self, model: &str) {
        let (family, _) = ModelFamily::parse(model);
        self.env.extend(family.required_env());
        if family == ModelFamily::Vertex {
            self.tools.insert("gcloud");
        }
    }

    /// Collect the requirements of a run.
    pub fn for_options(options: &PipelineOptions, translation_model: &str) -> Self {
        let mut req = Self::default();
        req.env.insert("YOUTUBE_DATA_API_KEY");
        req.tools.insert("yt-dlp");

        if options.transcript_source != YOUTUBE_SOURCE {
            req.env.insert("OPENAI_API_KEY");
            req.tools.extend(["ffmpeg", "ffprobe"]);
        }

        for model in &options.models {
            req.model(model);
        }

        if let Some(target) = &options.translate {
            match target.model.as_str() {
                "aws-translate" => {
                    req.tools.insert("aws");
                }
                "gcp-translate" => {
                    req.env.insert("GOOGLE_CLOUD_PROJECT");
                    req.tools.insert("gcloud");
                }
                DEFAULT_TRANSLATION_ALIAS => req.model(translation_model),
                other => req.model(other),
            }
        }

        if let Some(correction) = &options.caption_correction {
            req.model(&correction.model);
        }

        if options.combine_info_audio {
            req.tools.insert("ffmpeg");
        }

        req
    }
}

/// Run pre-flight checks.
///
/// Returns Ok(()) if all checks pass, or an error describing the first thing
/// that is missing.
pub fn check(requirements: &Requirements) -> Result<()> {
    for name in &requirements.env {
        check_env(name)?;
    }
    for tool in &requirements.tools {
        check_tool(tool)?;
    }
    Ok(())
}

fn check_env(name: &str) -> Result<()> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(()),
        Ok(_) => Err(YtDocsError::Config(format!("{} is empty", name))),
        Err(_) => Err(YtDocsError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            name, name
        ))),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(YtDocsError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(YtDocsError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(YtDocsError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{CaptionCorrection, TranslateTarget};

    #[test]
    fn test_youtube_only_run() {
        let options = PipelineOptions::new("x", "out.csv");
        let req = Requirements::for_options(&options, "gemini-3-flash-preview");
        assert_eq!(req.env.iter().copied().collect::<Vec<_>>(), vec!["YOUTUBE_DATA_API_KEY"]);
        assert_eq!(req.tools.iter().copied().collect::<Vec<_>>(), vec!["yt-dlp"]);
    }

    #[test]
    fn test_model_families_and_services() {
        let mut options = PipelineOptions::new("x", "out.csv");
        options.models = vec!["vertex-claude-haiku-4-5".to_string(), "foundry-gpt-5-mini".to_string()];
        options.transcript_source = "whisper-1".to_string();
        options.translate = Some(TranslateTarget {
            model: "gemini".to_string(),
            lang: "es".to_string(),
        });
        options.caption_correction = Some(CaptionCorrection {
            model: "bedrock-nova-2-lite-v1".to_string(),
            source: None,
        });

        let req = Requirements::for_options(&options, "gemini-3-flash-preview");
        for name in [
            "GOOGLE_CLOUD_PROJECT",
            "AZURE_FOUNDRY_ENDPOINT",
            "AZURE_FOUNDRY_API_KEY",
            "OPENAI_API_KEY",
            "GEMINI_API_KEY",
            "AWS_BEARER_TOKEN_BEDROCK",
        ] {
            assert!(req.env.contains(name), "{}", name);
        }
        for tool in ["gcloud", "ffmpeg", "ffprobe", "yt-dlp"] {
            assert!(req.tools.contains(tool), "{}", tool);
        }
    }

    #[test]
    fn test_cloud_translation_needs_cli() {
        let mut options = PipelineOptions::new("x", "out.csv");
        options.translate = Some(TranslateTarget {
            model: "aws-translate".to_string(),
            lang: "fr".to_string(),
        });
        let req = Requirements::for_options(&options, "gemini-3-flash-preview");
        assert!(req.tools.contains("aws"));
        assert!(!req.env.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_missing_env_is_config_error() {
        let mut req = Requirements::default();
        req.env.insert("YTDOCS_TEST_SURELY_UNSET_VARIABLE");
        assert!(matches!(check(&req), Err(YtDocsError::Config(_))));
    }
}
