//! Language model access.
//!
//! A model identifier selects its backend by prefix:
//!
//! | Prefix      | Backend                                     |
//! |-------------|---------------------------------------------|
//! | `vertex-`   | Anthropic models on Vertex AI (`rawPredict`) |
//! | `bedrock-`  | Amazon Bedrock Converse API                  |
//! | `foundry-`  | Azure AI Foundry, OpenAI-compatible chat     |
//! | (none)      | Gemini REST API                              |

mod bedrock;
mod foundry;
mod gemini;
mod tasks;
mod vertex;

pub use bedrock::{bedrock_model_id, BedrockClient};
pub use foundry::FoundryClient;
pub use gemini::GeminiClient;
pub use tasks::{normalize_tags, ArtifactGenerator, VideoContext, NO_CHANGES};
pub use vertex::{gcloud_access_token, VertexClient};

use crate::config::EndpointSettings;
use crate::error::{Result, YtDocsError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// A model reply with its token usage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Completion {
    pub fn new(text: impl Into<String>, input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            text: text.into(),
            input_tokens,
            output_tokens,
        }
    }
}

/// Trait for anything that answers a single prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send `prompt` to `model` and return its reply.
    async fn query(&self, model: &str, prompt: &str) -> Result<Completion>;
}

/// Backend family of a model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Gemini,
    Vertex,
    Bedrock,
    Foundry,
}

impl ModelFamily {
    /// Split a model identifier into its family and the backend's own model name.
    pub fn parse(model: &str) -> (Self, &str) {
        if let Some(rest) = model.strip_prefix("vertex-") {
            (ModelFamily::Vertex, rest)
        } else if let Some(rest) = model.strip_prefix("bedrock-") {
            (ModelFamily::Bedrock, rest)
        } else if let Some(rest) = model.strip_prefix("foundry-") {
            (ModelFamily::Foundry, rest)
        } else {
            (ModelFamily::Gemini, model)
        }
    }

    /// Environment variables the backend needs.
    pub fn required_env(&self) -> &'static [&'static str] {
        match self {
            ModelFamily::Gemini => &["GEMINI_API_KEY"],
            ModelFamily::Vertex => &["GOOGLE_CLOUD_PROJECT"],
            ModelFamily::Bedrock => &["AWS_BEARER_TOKEN_BEDROCK"],
            ModelFamily::Foundry => &["AZURE_FOUNDRY_ENDPOINT", "AZURE_FOUNDRY_API_KEY"],
        }
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelFamily::Gemini => write!(f, "gemini"),
            ModelFamily::Vertex => write!(f, "vertex"),
            ModelFamily::Bedrock => write!(f, "bedrock"),
            ModelFamily::Foundry => write!(f, "foundry"),
        }
    }
}

/// Read a required, non-empty environment variable.
pub fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(YtDocsError::Config(format!("{} is not set", name))),
    }
}

/// Dispatches each query to the backend named by the model prefix.
pub struct LlmRouter {
    gemini: GeminiClient,
    vertex: VertexClient,
    bedrock: BedrockClient,
    foundry: FoundryClient,
}

impl LlmRouter {
    pub fn new(endpoints: &EndpointSettings) -> Result<Self> {
        let timeout = Duration::from_secs(endpoints.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| YtDocsError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            gemini: GeminiClient::new(http.clone(), &endpoints.gemini_api_base),
            vertex: VertexClient::new(http.clone(), &endpoints.vertex_location),
            bedrock: BedrockClient::new(http, &endpoints.bedrock_region),
            foundry: FoundryClient::new(timeout),
        })
    }
}

#[async_trait]
impl LanguageModel for LlmRouter {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn query(&self, model: &str, prompt: &str) -> Result<Completion> {
        let (family, name) = ModelFamily::parse(model);
        debug!("Routing {} to {}", model, family);

        let completion = match family {
            ModelFamily::Gemini => self.gemini.generate(name, prompt).await?,
            ModelFamily::Vertex => self.vertex.generate(name, prompt).await?,
            ModelFamily::Bedrock => self.bedrock.generate(name, prompt).await?,
            ModelFamily::Foundry => self.foundry.generate(name, prompt).await?,
        };

        debug!(
            "{} replied with {} chars ({} in / {} out tokens)",
            model,
            completion.text.len(),
            completion.input_tokens,
            completion.output_tokens
        );
        Ok(completion)
    }
}
