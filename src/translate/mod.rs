//! Translation of generated artifacts.
//!
//! [`TranslationService`] picks a backend from the model identifier:
//! `aws-translate` and `gcp-translate` are machine-translation services,
//! anything else is an LLM asked with the translation prompt.

mod chunk;
mod cloud;
mod mapper;

pub use chunk::{chunk_text, rejoin, Chunk, Measure};
pub use cloud::{AwsTranslate, GcpTranslate, AWS_MAX_BYTES, GCP_MAX_CHARS};
pub use mapper::{process_translate, ArtifactDirs, TranslationJob};

use crate::config::EndpointSettings;
use crate::error::{Result, YtDocsError};
use crate::llm::{ArtifactGenerator, Completion};
use crate::shorthand::DEFAULT_TRANSLATION_ALIAS;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Trait for translation backends.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target` with `model`.
    async fn translate(
        &self,
        text: &str,
        model: &str,
        target: &str,
        source: &str,
    ) -> Result<Completion>;
}

/// Routes translations to cloud services or an LLM.
pub struct TranslationService {
    generator: Arc<ArtifactGenerator>,
    aws: AwsTranslate,
    gcp: GcpTranslate,
    default_model: String,
}

impl TranslationService {
    /// `default_model` is the LLM behind the bare `gemini` alias.
    pub fn new(
        generator: Arc<ArtifactGenerator>,
        endpoints: &EndpointSettings,
        default_model: &str,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(endpoints.timeout_secs))
            .build()
            .map_err(|e| YtDocsError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            generator,
            aws: AwsTranslate::new(&endpoints.translate_region),
            gcp: GcpTranslate::new(http, &endpoints.gcp_translate_base),
            default_model: default_model.to_string(),
        })
    }
}

#[async_trait]
impl Translator for TranslationService {
    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn translate(
        &self,
        text: &str,
        model: &str,
        target: &str,
        source: &str,
    ) -> Result<Completion> {
        if text.trim().is_empty() || target == source {
            return Ok(Completion::new(text, 0, 0));
        }

        match model {
            "aws-translate" => Ok(Completion::new(
                self.aws.translate(text, target, source).await?,
                0,
                0,
            )),
            "gcp-translate" => Ok(Completion::new(
                self.gcp.translate(text, target, source).await?,
                0,
                0,
            )),
            _ => {
                let model = if model == DEFAULT_TRANSLATION_ALIAS {
                    self.default_model.as_str()
                } else {
                    model
                };
                debug!("Translating with {}", model);
                self.generator
                    .translate(model, text, source, target)
                    .await
                    .map_err(|e| YtDocsError::Translation(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::llm::LanguageModel;
    use std::sync::Mutex;

    struct Recorder {
        models: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LanguageModel for Recorder {
        async fn query(&self, model: &str, _prompt: &str) -> Result<Completion> {
            self.models.lock().unwrap().push(model.to_string());
            Ok(Completion::new("traducido", 4, 1))
        }
    }

    fn service(recorder: Arc<Recorder>) -> TranslationService {
        let generator = Arc::new(ArtifactGenerator::new(recorder, Prompts::default()));
        TranslationService::new(generator, &EndpointSettings::default(), "default-model").unwrap()
    }

    #[tokio::test]
    async fn test_shortcuts_skip_backend() {
        let recorder = Arc::new(Recorder {
            models: Mutex::new(Vec::new()),
        });
        let service = service(recorder.clone());

        let same = service.translate("hello", "m", "en", "en").await.unwrap();
        assert_eq!(same, Completion::new("hello", 0, 0));
        let empty = service.translate("  ", "m", "es", "en").await.unwrap();
        assert_eq!(empty.text, "  ");
        assert!(recorder.models.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gemini_alias_uses_default_model() {
        let recorder = Arc::new(Recorder {
            models: Mutex::new(Vec::new()),
        });
        let service = service(recorder.clone());

        let out = service.translate("hello", "gemini", "es", "en").await.unwrap();
        assert_eq!(out.text, "traducido");
        service.translate("hello", "bedrock-nova-2-lite-v1", "es", "en").await.unwrap();

        assert_eq!(
            *recorder.models.lock().unwrap(),
            vec!["default-model".to_string(), "bedrock-nova-2-lite-v1".to_string()]
        );
    }
}
