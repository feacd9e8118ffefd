//! Azure AI Foundry backend, spoken to through the OpenAI chat API.

use super::{required_env, Completion};
use crate::error::{Result, YtDocsError};
use crate::openai::create_foundry_client;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use std::time::Duration;

/// Client for Foundry deployments (`AZURE_FOUNDRY_ENDPOINT`, `AZURE_FOUNDRY_API_KEY`).
pub struct FoundryClient {
    timeout: Duration,
}

impl FoundryClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn generate(&self, model: &str, prompt: &str) -> Result<Completion> {
        let endpoint = required_env("AZURE_FOUNDRY_ENDPOINT")?;
        let api_key = required_env("AZURE_FOUNDRY_API_KEY")?;
        let client = create_foundry_client(&endpoint, &api_key, self.timeout)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| YtDocsError::Llm(e.to_string()))?
                .into()])
            .build()
            .map_err(|e| YtDocsError::Llm(e.to_string()))?;

        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e| YtDocsError::OpenAI(format!("Foundry {} failed: {}", model, e)))?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| YtDocsError::Llm(format!("Empty response from {}", model)))?;

        let (input, output) = response
            .usage
            .map(|u| (u64::from(u.prompt_tokens), u64::from(u.completion_tokens)))
            .unwrap_or((0, 0));

        Ok(Completion::new(text, input, output))
    }
}
