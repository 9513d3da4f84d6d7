//! DeepL gateway: the short-text translation provider.
//!
//! The public contract never fails: any problem (missing key, network
//! error, non-2xx status, unexpected payload) degrades to `None` so the
//! orchestrator can fall back to the other provider. The distinction
//! between "not configured" and "call failed" is visible only in logs.

use crate::language::Language;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

#[derive(Clone)]
pub struct DeepLClient {
    http: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
}

impl DeepLClient {
    pub fn new(api_key: Option<String>, api_url: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build DeepL HTTP client")?;
        Ok(Self {
            http,
            // Blank keys count as absent.
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_url,
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
                warn!("DeepL API key not configured, skipping translation");
                return None;
            }
        };

        match self.request(api_key, text, source, target).await {
            Ok(translated) => Some(translated),
            Err(e) => {
                let preview: String = text.chars().take(50).collect();
                warn!("DeepL translation error for text '{}...': {}", preview, e);
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
        let form = [
            ("text", text),
            ("source_lang", wire_lang(source)),
            ("target_lang", wire_lang(target)),
        ];

        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", api_key))
            .form(&form)
            .send()
            .await
            .context("Failed to send DeepL request")?;

        if !response.status().is_success() {
            anyhow::bail!("DeepL API error ({})", response.status());
        }

        let body: DeepLResponse = response
            .json()
            .await
            .context("Failed to parse DeepL response")?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .context("DeepL response contained no translations")
    }
}

/// Map the domain language to DeepL's wire codes. DeepL distinguishes
/// regional Portuguese variants; this content targets European Portuguese.
fn wire_lang(lang: Language) -> &'static str {
    match lang {
        Language::De => "DE",
        Language::En => "EN",
        Language::Pt => "PT-PT",
    }
}
