//! OpenAI-compatible client configuration with sensible defaults.

use crate::error::{Result, YtDocsError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client (key from `OPENAI_API_KEY`) with a request timeout.
pub fn create_client(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    with_timeout(OpenAIConfig::default(), timeout)
}

/// Create a client for an Azure AI Foundry deployment.
///
/// Foundry exposes the OpenAI chat API under `{endpoint}/openai/v1`.
pub fn create_foundry_client(
    endpoint: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let config = OpenAIConfig::new()
        .with_api_base(format!("{}/openai/v1", endpoint.trim_end_matches('/')))
        .with_api_key(api_key);
    with_timeout(config, timeout)
}

fn with_timeout(config: OpenAIConfig, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| YtDocsError::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Check if the OpenAI API key is configured.
pub fn is_api_key_configured() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty())
}
