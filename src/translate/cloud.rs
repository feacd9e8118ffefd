//! Cloud machine-translation services.

use super::chunk::{chunk_text, rejoin, Measure};
use crate::error::{Result, YtDocsError};
use serde::Deserialize;
use tracing::debug;

/// AWS Translate accepts 10,000 bytes per request; keep a margin.
pub const AWS_MAX_BYTES: usize = 9_500;
/// Cloud Translation v2 recommends at most 30,000 characters per request.
pub const GCP_MAX_CHARS: usize = 25_000;

/// AWS Translate through the `aws` CLI (credentials from the usual AWS chain).
pub struct AwsTranslate {
    region: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwsTranslateOutput {
    translated_text: String,
}

impl AwsTranslate {
    pub fn new(region: &str) -> Self {
        Self {
            region: region.to_string(),
        }
    }

    pub async fn translate(&self, text: &str, target: &str, source: &str) -> Result<String> {
        let chunks = chunk_text(text, AWS_MAX_BYTES, Measure::Bytes);
        debug!("AWS Translate: {} chunk(s) to {}", chunks.len(), target);

        let mut translated = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            translated.push(self.translate_chunk(&chunk.text, target, source).await?);
        }
        Ok(rejoin(&chunks, &translated))
    }

    async fn translate_chunk(&self, text: &str, target: &str, source: &str) -> Result<String> {
        let output = tokio::process::Command::new("aws")
            .args([
                "translate",
                "translate-text",
                "--region",
                &self.region,
                "--source-language-code",
                source,
                "--target-language-code",
                target,
                "--output",
                "json",
                "--text",
                text,
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    YtDocsError::ToolNotFound("aws".to_string())
                } else {
                    YtDocsError::ToolFailed(format!("Failed to run aws: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(YtDocsError::Translation(format!("AWS Translate failed: {}", stderr)));
        }

        let parsed: AwsTranslateOutput = serde_json::from_slice(&output.stdout)?;
        Ok(parsed.translated_text)
    }
}

#[derive(Debug, Deserialize)]
struct GcpResponse {
    data: GcpData,
}

#[derive(Debug, Deserialize)]
struct GcpData {
    translations: Vec<GcpTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GcpTranslation {
    translated_text: String,
}

/// Google Cloud Translation v2 over REST, authenticated with a gcloud token.
pub struct GcpTranslate {
    http: reqwest::Client,
    api_base: String,
}

impl GcpTranslate {
    pub fn new(http: reqwest::Client, api_base: &str) -> Self {
        Self {
            http,
            api_base: api_base.to_string(),
        }
    }

    pub async fn translate(&self, text: &str, target: &str, source: &str) -> Result<String> {
        let chunks = chunk_text(text, GCP_MAX_CHARS, Measure::Chars);
        debug!("Cloud Translation: {} chunk(s) to {}", chunks.len(), target);

        let token = crate::llm::gcloud_access_token().await?;
        let project = std::env::var("GOOGLE_CLOUD_PROJECT").ok();

        let mut translated = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let mut request = self
                .http
                .post(&self.api_base)
                .header("Authorization", format!("Bearer {}", token))
                .json(&serde_json::json!({
                    "q": [chunk.text],
                    "source": source,
                    "target": target,
                    "format": "text",
                }));
            if let Some(project) = &project {
                request = request.header("x-goog-user-project", project);
            }

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(YtDocsError::Translation(format!(
                    "Cloud Translation returned {}: {}",
                    status, body
                )));
            }

            let parsed: GcpResponse = response.json().await?;
            let text = parsed
                .data
                .translations
                .into_iter()
                .next()
                .map(|t| t.translated_text)
                .ok_or_else(|| YtDocsError::Translation("Empty translation response".to_string()))?;
            translated.push(text);
        }

        Ok(rejoin(&chunks, &translated))
    }
}
