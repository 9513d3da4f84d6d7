//! Claude gateway: the long/structured-text translation provider.
//!
//! Used as primary for HTML bodies and biographies because it can be
//! instructed to leave markup untouched. Same never-fails contract as the
//! DeepL gateway: every failure mode collapses to `None`.

use crate::language::Language;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 8192;

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: String,
}

/// System instruction: translate text content only, preserve markup verbatim.
fn build_system_prompt(source: Language, target: Language) -> String {
    format!(
        "You are a professional translator for an educational blog about early childhood \
         education. Translate the following content from {} to {}. \
         Preserve ALL HTML tags, structure, and formatting exactly as-is. \
         Only translate the text content between/around HTML tags. \
         Maintain the educational and professional tone. \
         Return ONLY the translated content, no explanations or wrapping.",
        source.name(),
        target.name()
    )
}

#[derive(Clone)]
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(
        api_key: Option<String>,
        api_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Claude HTTP client")?;
        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_url,
            model,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Translate `text`, returning `None` on any failure.
    pub async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Option<String> {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                warn!("Claude API key not configured, skipping translation");
                return None;
            }
        };

        match self.request(api_key, text, source, target).await {
            Ok(translated) => Some(translated),
            Err(e) => {
                warn!("Claude translation error: {}", e);
                None
            }
        }
    }

    async fn request(
        &self,
        api_key: &str,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String> {
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: build_system_prompt(source, target),
            messages: vec![Message {
                role: "user".to_string(),
                content: text.to_string(),
            }],
        };

        let response = self
            .http
            .post(&self.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .context("Failed to send Claude request")?;

        if !response.status().is_success() {
            anyhow::bail!("Claude API error ({})", response.status());
        }

        let body: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse Claude response")?;

        body.content
            .into_iter()
            .next()
            .map(|b| b.text)
            .context("Claude response contained no content blocks")
    }
}
