//! Anthropic models on Vertex AI.

use super::{required_env, Completion};
use crate::error::{Result, YtDocsError};
use serde::Deserialize;
use tracing::debug;

const ANTHROPIC_VERSION: &str = "vertex-2023-10-16";
const MAX_TOKENS: u32 = 8192;

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Client for `rawPredict` on Anthropic publisher models.
///
/// The project comes from `GOOGLE_CLOUD_PROJECT`; the access token is
/// obtained from `gcloud auth print-access-token` for every call.
pub struct VertexClient {
    http: reqwest::Client,
    location: String,
}

impl VertexClient {
    pub fn new(http: reqwest::Client, location: &str) -> Self {
        Self {
            http,
            location: location.to_string(),
        }
    }

    fn endpoint(&self, project: &str, model: &str) -> String {
        format!(
            "https://{loc}-aiplatform.googleapis.com/v1/projects/{project}/locations/{loc}/publishers/anthropic/models/{model}:rawPredict",
            loc = self.location,
            project = project,
            model = model
        )
    }

    pub async fn generate(&self, model: &str, prompt: &str) -> Result<Completion> {
        let project = required_env("GOOGLE_CLOUD_PROJECT")?;
        let token = gcloud_access_token().await?;
        let url = self.endpoint(&project, model);
        debug!("Calling Vertex AI model {}", model);

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .json(&serde_json::json!({
                "anthropic_version": ANTHROPIC_VERSION,
                "max_tokens": MAX_TOKENS,
                "messages": [ { "role": "user", "content": prompt } ]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YtDocsError::Llm(format!("Vertex {} returned {}: {}", model, status, body)));
        }

        let parsed: MessagesResponse = response.json().await?;
        parse_response(model, parsed)
    }
}

fn parse_response(model: &str, parsed: MessagesResponse) -> Result<Completion> {
    let text: String = parsed
        .content
        .iter()
        .filter_map(|b| b.text.as_deref())
        .collect();
    if text.is_empty() {
        return Err(YtDocsError::Llm(format!("Empty response from {}", model)));
    }
    let (input, output) = parsed
        .usage
        .map(|u| (u.input_tokens, u.output_tokens))
        .unwrap_or((0, 0));
    Ok(Completion::new(text, input, output))
}

/// Ask gcloud for a short-lived access token.
pub async fn gcloud_access_token() -> Result<String> {
    let output = tokio::process::Command::new("gcloud")
        .args(["auth", "print-access-token"])
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                YtDocsError::ToolNotFound("gcloud".to_string())
            } else {
                YtDocsError::ToolFailed(format!("Failed to run gcloud: {}", e))
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(YtDocsError::Config(format!("gcloud could not issue a token: {}", stderr)));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let client = VertexClient::new(reqwest::Client::new(), "us-east5");
        assert_eq!(
            client.endpoint("proj", "claude-haiku-4-5@20251001"),
            "https://us-east5-aiplatform.googleapis.com/v1/projects/proj/locations/us-east5/publishers/anthropic/models/claude-haiku-4-5@20251001:rawPredict"
        );
    }

    #[test]
    fn test_parse_response() {
        let json = r#"{"content": [{"type": "text", "text": "hi"}], "usage": {"input_tokens": 5, "output_tokens": 1}}"#;
        let parsed: MessagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parse_response("m", parsed).unwrap(), Completion::new("hi", 5, 1));
    }
}
