//! Prompted generation of the per-video documentation artifacts.

use super::{Completion, LanguageModel};
use crate::config::Prompts;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// Reply meaning the reviewed captions need no changes.
pub const NO_CHANGES: &str = "NO_CHANGES";

/// Maximum number of tags kept from a model reply.
const MAX_TAGS: usize = 5;

/// Identifies the video a prompt is about.
#[derive(Debug, Clone)]
pub struct VideoContext {
    pub url: String,
    pub title: String,
}

/// Generates summaries, Q&A, tags and caption corrections with prompt templates.
pub struct ArtifactGenerator {
    llm: Arc<dyn LanguageModel>,
    prompts: Prompts,
}

impl ArtifactGenerator {
    pub fn new(llm: Arc<dyn LanguageModel>, prompts: Prompts) -> Self {
        Self { llm, prompts }
    }

    fn vars(video: &VideoContext, extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("url".to_string(), video.url.clone());
        vars.insert("title".to_string(), video.title.clone());
        for (k, v) in extra {
            vars.insert(k.to_string(), v.to_string());
        }
        vars
    }

    async fn run(&self, model: &str, template: &str, vars: HashMap<String, String>) -> Result<Completion> {
        let prompt = self.prompts.render_with_custom(template, &vars);
        let mut completion = self.llm.query(model, &prompt).await?;
        completion.text = completion.text.trim().to_string();
        Ok(completion)
    }

    #[instrument(skip(self, video, transcript), fields(title = %video.title))]
    pub async fn summary(&self, model: &str, video: &VideoContext, transcript: &str) -> Result<Completion> {
        let vars = Self::vars(video, &[("transcript", transcript)]);
        self.run(model, &self.prompts.artifacts.summary, vars).await
    }

    #[instrument(skip(self, video, summary), fields(title = %video.title))]
    pub async fn one_sentence(&self, model: &str, video: &VideoContext, summary: &str) -> Result<Completion> {
        let vars = Self::vars(video, &[("summary", summary)]);
        self.run(model, &self.prompts.artifacts.one_sentence, vars).await
    }

    #[instrument(skip(self, video, transcript), fields(title = %video.title))]
    pub async fn qa(&self, model: &str, video: &VideoContext, transcript: &str) -> Result<Completion> {
        let vars = Self::vars(video, &[("transcript", transcript)]);
        self.run(model, &self.prompts.artifacts.qa, vars).await
    }

    /// Tags come back normalized by [`normalize_tags`].
    #[instrument(skip(self, video, summary), fields(title = %video.title))]
    pub async fn tags(&self, model: &str, video: &VideoContext, summary: &str) -> Result<Completion> {
        let vars = Self::vars(video, &[("summary", summary)]);
        let mut completion = self.run(model, &self.prompts.artifacts.tags, vars).await?;
        completion.text = normalize_tags(&completion.text);
        Ok(completion)
    }

    /// Review an SRT for accessibility problems. The reply is either a full
    /// corrected SRT or [`NO_CHANGES`].
    #[instrument(skip(self, video, srt), fields(title = %video.title))]
    pub async fn suggest_corrected_captions(
        &self,
        model: &str,
        video: &VideoContext,
        srt: &str,
    ) -> Result<Completion> {
        let vars = Self::vars(video, &[("srt", srt)]);
        self.run(model, &self.prompts.captions.user, vars).await
    }

    /// Translate with the translation prompt.
    pub async fn translate(
        &self,
        model: &str,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Completion> {
        let mut vars = HashMap::new();
        vars.insert("text".to_string(), text.to_string());
        vars.insert("source_language".to_string(), source_language.to_string());
        vars.insert("target_language".to_string(), target_language.to_string());
        self.run(model, &self.prompts.translation.user, vars).await
    }
}

/// Reduce a model reply to at most five comma-separated tags.
pub fn normalize_tags(reply: &str) -> String {
    reply
        .split([',', '\n'])
        .map(|t| t.trim().trim_start_matches(['-', '*', '#']).trim())
        .filter(|t| !t.is_empty())
        .take(MAX_TAGS)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Echoes the prompt back and records what it saw.
    struct Echo {
        prompts: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl LanguageModel for Echo {
        async fn query(&self, model: &str, prompt: &str) -> Result<Completion> {
            self.prompts
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            Ok(Completion::new(format!("  {}  ", prompt), 10, 2))
        }
    }

    fn video() -> VideoContext {
        VideoContext {
            url: "https://www.youtube.com/watch?v=abc".to_string(),
            title: "Title".to_string(),
        }
    }

    #[test]
    fn test_normalize_tags() {
        assert_eq!(normalize_tags("a, b ,c,,d, e, f"), "a, b, c, d, e");
        assert_eq!(normalize_tags("- rust\n- cli\n"), "rust, cli");
        assert_eq!(normalize_tags(""), "");
    }

    #[tokio::test]
    async fn test_summary_renders_prompt() {
        let echo = Arc::new(Echo {
            prompts: Mutex::new(Vec::new()),
        });
        let generator = ArtifactGenerator::new(echo.clone(), Prompts::default());

        let out = generator.summary("m", &video(), "the transcript").await.unwrap();

        assert!(out.text.contains("the transcript"));
        assert!(out.text.contains("https://www.youtube.com/watch?v=abc"));
        assert!(!out.text.starts_with(' '));
        assert_eq!(out.input_tokens, 10);
        assert_eq!(echo.prompts.lock().unwrap()[0].0, "m");
    }

    #[tokio::test]
    async fn test_translate_prompt_names_languages() {
        let echo = Arc::new(Echo {
            prompts: Mutex::new(Vec::new()),
        });
        let generator = ArtifactGenerator::new(echo.clone(), Prompts::default());

        generator.translate("m", "hello", "en", "es").await.unwrap();

        let (_, prompt) = &echo.prompts.lock().unwrap()[0];
        assert!(prompt.contains("from en to es"));
        assert!(prompt.ends_with("hello"));
    }
}
