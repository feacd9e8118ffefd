//! Amazon Bedrock Converse API backend.

use super::{required_env, Completion};
use crate::error::{Result, YtDocsError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ConverseResponse {
    output: ConverseOutput,
    usage: Option<ConverseUsage>,
}

#[derive(Debug, Deserialize)]
struct ConverseOutput {
    message: ConverseMessage,
}

#[derive(Debug, Deserialize)]
struct ConverseMessage {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConverseUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Map a short model name to a cross-region inference profile ID.
///
/// `claude-*` models are Anthropic's, `nova-*` Amazon's. Anything that
/// already looks like a full ID is passed through.
pub fn bedrock_model_id(model: &str) -> String {
    if model.contains('.') {
        model.to_string()
    } else if model.starts_with("claude") {
        format!("us.anthropic.{}:0", model)
    } else if model.starts_with("nova") {
        format!("us.amazon.{}:0", model)
    } else {
        model.to_string()
    }
}

/// Client for the Converse API, authenticated with a Bedrock API key
/// (`AWS_BEARER_TOKEN_BEDROCK`).
pub struct BedrockClient {
    http: reqwest::Client,
    region: String,
}

impl BedrockClient {
    pub fn new(http: reqwest::Client, region: &str) -> Self {
        Self {
            http,
            region: region.to_string(),
        }
    }

    fn endpoint(&self, model_id: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(model_id.as_bytes()).collect();
        format!(
            "https://bedrock-runtime.{}.amazonaws.com/model/{}/converse",
            self.region, encoded
        )
    }

    pub async fn generate(&self, model: &str, prompt: &str) -> Result<Completion> {
        let token = required_env("AWS_BEARER_TOKEN_BEDROCK")?;
        let model_id = bedrock_model_id(model);

        let response = self
            .http
            .post(self.endpoint(&model_id))
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .json(&serde_json::json!({
                "messages": [
                    { "role": "user", "content": [ { "text": prompt } ] }
                ]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YtDocsError::Llm(format!(
                "Bedrock {} returned {}: {}",
                model_id, status, body
            )));
        }

        let parsed: ConverseResponse = response.json().await?;
        parse_response(&model_id, parsed)
    }
}

fn parse_response(model: &str, parsed: ConverseResponse) -> Result<Completion> {
    let text = parsed
        .output
        .message
        .content
        .into_iter()
        .find_map(|b| b.text)
        .ok_or_else(|| YtDocsError::Llm(format!("Empty response from {}", model)))?;
    let (input, output) = parsed
        .usage
        .map(|u| (u.input_tokens, u.output_tokens))
        .unwrap_or((0, 0));
    Ok(Completion::new(text, input, output))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_ids() {
        assert_eq!(bedrock_model_id("nova-2-lite-v1"), "us.amazon.nova-2-lite-v1:0");
        assert_eq!(
            bedrock_model_id("claude-haiku-4-5-20251001-v1"),
            "us.anthropic.claude-haiku-4-5-20251001-v1:0"
        );
        assert_eq!(bedrock_model_id("us.amazon.nova-pro-v1:0"), "us.amazon.nova-pro-v1:0");
    }

    #[test]
    fn test_endpoint_encodes_colon() {
        let client = BedrockClient::new(reqwest::Client::new(), "us-east-1");
        assert_eq!(
            client.endpoint("us.amazon.nova-2-lite-v1:0"),
            "https://bedrock-runtime.us-east-1.amazonaws.com/model/us.amazon.nova-2-lite-v1%3A0/converse"
        );
    }

    #[test]
    fn test_parse_response() {
        let json = r#"{
            "output": {"message": {"role": "assistant", "content": [{"text": "ok"}]}},
            "usage": {"inputTokens": 7, "outputTokens": 2, "totalTokens": 9}
        }"#;
        let parsed: ConverseResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parse_response("m", parsed).unwrap(), Completion::new("ok", 7, 2));
    }
}
