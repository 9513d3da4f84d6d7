//! Environment-driven configuration.
//!
//! Provider keys are optional: a missing key disables that provider
//! gracefully instead of failing startup, so the pipeline can run on
//! whichever providers are configured.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Master switch for the background translation pipeline.
    pub auto_translate: bool,
    pub deepl_api_key: Option<String>,
    pub deepl_api_url: String,
    pub claude_api_key: Option<String>,
    pub claude_api_url: String,
    pub claude_model: String,
    pub database_path: String,
    /// Upper bound on any single provider call. There is no retry layer;
    /// the cross-provider fallback is the only resilience mechanism.
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let auto_translate = env::var("AUTO_TRANSLATE")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        let timeout_secs: u64 = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("REQUEST_TIMEOUT_SECS must be a positive integer")?;

        Ok(Self {
            auto_translate,
            deepl_api_key: optional_env("DEEPL_API_KEY"),
            deepl_api_url: env::var("DEEPL_API_URL")
                .unwrap_or_else(|_| "https://api-free.deepl.com/v2/translate".to_string()),
            claude_api_key: optional_env("CLAUDE_API_KEY"),
            claude_api_url: env::var("CLAUDE_API_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".to_string()),
            claude_model: env::var("CLAUDE_MODEL")
                .unwrap_or_else(|_| "claude-haiku-4-5-20251001".to_string()),
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/content.db".to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Unset or blank environment variables count as absent.
fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; they stick to variables the
    // other tests never read and clean up after themselves.

    #[test]
    fn test_optional_env_treats_blank_as_absent() {
        env::set_var("TEST_OPTIONAL_BLANK", "   ");
        assert!(optional_env("TEST_OPTIONAL_BLANK").is_none());

        env::set_var("TEST_OPTIONAL_SET", "value");
        assert_eq!(optional_env("TEST_OPTIONAL_SET"), Some("value".to_string()));

        env::remove_var("TEST_OPTIONAL_BLANK");
        env::remove_var("TEST_OPTIONAL_SET");
        assert!(optional_env("TEST_OPTIONAL_BLANK").is_none());
    }
}
