//! Gemini REST API backend.

use super::{required_env, Completion};
use crate::error::{Result, YtDocsError};
use serde::Deserialize;

/// `generateContent` response (only the fields we read).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

/// Client for Gemini models, authenticated with `GEMINI_API_KEY`.
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_base: &str) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub async fn generate(&self, model: &str, prompt: &str) -> Result<Completion> {
        let api_key = required_env("GEMINI_API_KEY")?;
        let url = format!("{}/models/{}:generateContent", self.api_base, model);

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(&serde_json::json!({
                "contents": [
                    { "role": "user", "parts": [ { "text": prompt } ] }
                ]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YtDocsError::Llm(format!("Gemini {} returned {}: {}", model, status, body)));
        }

        let parsed: GenerateResponse = response.json().await?;
        parse_response(model, parsed)
    }
}

fn parse_response(model: &str, parsed: GenerateResponse) -> Result<Completion> {
    let text: String = parsed
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(YtDocsError::Llm(format!("Empty response from {}", model)));
    }

    let (input, output) = parsed
        .usage_metadata
        .map(|u| (u.prompt_token_count, u.candidates_token_count))
        .unwrap_or((0, 0));

    Ok(Completion::new(text, input, output))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let json = r#"{
            "candidates": [{"content": {"parts": [{"text": "Hello "}, {"text": "world"}]}}],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3}
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        let completion = parse_response("m", parsed).unwrap();
        assert_eq!(completion, Completion::new("Hello world", 12, 3));
    }

    #[test]
    fn test_parse_empty_response() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(parse_response("m", parsed).is_err());
    }
}
