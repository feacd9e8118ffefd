//! Prompt templates for ytdocs.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub artifacts: ArtifactPrompts,
    pub translation: TranslationPrompts,
    pub captions: CaptionPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the per-video documentation artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPrompts {
    pub summary: String,
    pub one_sentence: String,
    pub qa: String,
    pub tags: String,
}

impl Default for ArtifactPrompts {
    fn default() -> Self {
        Self {
            summary: r#"I have included a transcript for {{url}} ({{title}}).

Can you please summarize this?

{{transcript}}"#
                .to_string(),

            one_sentence: r#"Please condense the following summary of the video "{{title}}" into exactly one sentence.
Return only that sentence.

{{summary}}"#
                .to_string(),

            qa: r#"I have included a transcript for {{url}} ({{title}}).

Can you please make a Q&A for the video based on the transcript? The output
must be a markdown table with the columns "questioner(s)", "question",
"responder(s)" and "answer". Use "UNKNOWN" when a speaker cannot be identified.
Return only the table.

{{transcript}}"#
                .to_string(),

            tags: r#"I have included a summary of the video "{{title}}".

Give me at most five short, lowercase topic tags for it, as a single
comma-separated line. Return only the tags.

{{summary}}"#
                .to_string(),
        }
    }
}

/// Prompt for LLM translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationPrompts {
    pub user: String,
}

impl Default for TranslationPrompts {
    fn default() -> Self {
        Self {
            user: r#"Translate the following text from {{source_language}} to {{target_language}}. Preserve the original formatting (markdown, tables, etc). Return ONLY the translated text without any introductory or concluding commentary.

{{text}}"#
                .to_string(),
        }
    }
}

/// Prompt for accessibility caption review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionPrompts {
    pub user: String,
}

impl Default for CaptionPrompts {
    fn default() -> Self {
        Self {
            user: r#"You are reviewing captions for the video "{{title}}" ({{url}}) against WCAG 2.1 Level AA and Section 508 requirements.

Correct only real problems: misheard words, names and technical terms, missing punctuation that changes meaning, and missing speaker or sound cues. Keep every cue number and timestamp exactly as given. Do not rephrase correct captions.

If corrections are needed, return the complete corrected SRT and nothing else.
If no corrections are needed, return exactly: NO_CHANGES

{{srt}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let artifacts_path = custom_path.join("artifacts.toml");
            if artifacts_path.exists() {
                let content = std::fs::read_to_string(&artifacts_path)?;
                prompts.artifacts = toml::from_str(&content)?;
            }

            let translation_path = custom_path.join("translation.toml");
            if translation_path.exists() {
                let content = std::fs::read_to_string(&translation_path)?;
                prompts.translation = toml::from_str(&content)?;
            }

            let captions_path = custom_path.join("captions.toml");
            if captions_path.exists() {
                let content = std::fs::read_to_string(&captions_path)?;
                prompts.captions = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.artifacts.summary.contains("{{transcript}}"));
        assert!(prompts.translation.user.contains("{{target_language}}"));
        assert!(prompts.captions.user.contains("NO_CHANGES"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_custom_variables_are_overridden() {
        let mut custom = HashMap::new();
        custom.insert("name".to_string(), "config".to_string());
        custom.insert("team".to_string(), "docs".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "call".to_string());
        let out = prompts.render_with_custom("{{name}}/{{team}}", &vars);
        assert_eq!(out, "call/docs");
    }

    #[test]
    fn test_custom_dir_overrides_one_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("translation.toml"),
            "user = \"To {{target_language}}: {{text}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.translation.user, "To {{target_language}}: {{text}}");
        assert!(prompts.artifacts.qa.contains("markdown table"));
    }
}
