//! Configuration module for ytdocs.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ArtifactPrompts, CaptionPrompts, Prompts, TranslationPrompts};
pub use settings::{
    DirectorySettings, EndpointSettings, GeneralSettings, ModelSettings, PromptSettings, Settings,
};
