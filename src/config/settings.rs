//! Configuration settings for ytdocs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub models: ModelSettings,
    pub directories: DirectorySettings,
    pub endpoints: EndpointSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Table written when `-o` is not given.
    pub output_file: String,
    /// Pause between videos, in milliseconds.
    pub delay_ms: u64,
    /// Directory for temporary files (downloaded audio, encoder scratch).
    pub temp_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_file: "youtube-docs.csv".to_string(),
            delay_ms: 1000,
            temp_dir: "/tmp/ytdocs".to_string(),
        }
    }
}

/// Default model choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Model behind the bare `gemini` translation alias.
    pub translation_model: String,
    /// Default transcript source when `-t` is not given.
    pub transcript_source: String,
    /// Chunk length in seconds when splitting audio for speech-to-text.
    pub stt_chunk_seconds: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            translation_model: "gemini-3-flash-preview".to_string(),
            transcript_source: "youtube".to_string(),
            stt_chunk_seconds: 600,
        }
    }
}

/// Artifact directory names, relative to the output file's directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorySettings {
    pub transcripts: String,
    pub srt: String,
    pub summaries: String,
    pub one_sentence_summaries: String,
    pub qa: String,
    pub tags: String,
    pub videos: String,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            transcripts: "transcript-files".to_string(),
            srt: "srt-files".to_string(),
            summaries: "summary-files".to_string(),
            one_sentence_summaries: "one-sentence-summary-files".to_string(),
            qa: "qa-files".to_string(),
            tags: "tag-files".to_string(),
            videos: "video-files".to_string(),
        }
    }
}

/// Remote service locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    /// Base URL of the Gemini REST API.
    pub gemini_api_base: String,
    /// Region hosting Bedrock runtime.
    pub bedrock_region: String,
    /// Region used for AWS Translate.
    pub translate_region: String,
    /// Vertex AI location for partner models.
    pub vertex_location: String,
    /// Base URL of the Cloud Translation v2 API.
    pub gcp_translate_base: String,
    /// Base URL of the YouTube Data API v3.
    pub youtube_api_base: String,
    /// Timeout for HTTP requests, in seconds.
    pub timeout_secs: u64,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            gemini_api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            bedrock_region: "us-east-1".to_string(),
            translate_region: "us-east-1".to_string(),
            vertex_location: "us-east5".to_string(),
            gcp_translate_base: "https://translation.googleapis.com/language/translate/v2"
                .to_string(),
            youtube_api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ytdocs")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}
