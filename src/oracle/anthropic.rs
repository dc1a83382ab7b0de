//! Anthropic Messages API client
//!
//! Default [`ReasoningClient`] implementation. The API key is read from the
//! environment variable named in the `[oracle]` config section.

use super::decode::parse_json_payload;
use super::{OracleError, OraclePrompt, ReasoningClient};
use crate::config::OracleConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    config: OracleConfig,
    api_key: Option<String>,
    client: Client,
}

impl AnthropicClient {
    /// Builds a client, reading the API key from `config.api_key_env`
    ///
    /// A missing key is not an error here: every call then fails with
    /// [`OracleError::MissingApiKey`] and the pipeline runs on fallbacks.
    pub fn new(config: OracleConfig) -> Result<Self, reqwest::Error> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());

        if api_key.is_none() {
            tracing::warn!(
                "${} is not set; oracle decisions will use local fallbacks",
                config.api_key_env
            );
        }

        Self::with_api_key(config, api_key)
    }

    /// Builds a client with an explicit API key
    pub fn with_api_key(config: OracleConfig, api_key: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn build_payload(&self, prompt: &OraclePrompt) -> Value {
        let mut payload = json!({
            "model": self.config.model,
            "max_tokens": prompt.max_tokens.min(self.config.max_tokens),
            "messages": [{ "role": "user", "content": prompt.user }],
        });

        if let Some(system) = &prompt.system {
            payload["system"] = Value::String(system.clone());
        }

        payload
    }
}

#[async_trait]
impl ReasoningClient for AnthropicClient {
    async fn complete(&self, prompt: &OraclePrompt) -> Result<Value, OracleError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| OracleError::MissingApiKey(self.config.api_key_env.clone()))?;

        let url = format!("{}/messages", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.build_payload(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout
                } else {
                    OracleError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        let blocks = data
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| OracleError::Malformed("No content array in response".to_string()))?;

        let text: String = blocks
            .iter()
            .filter_map(|block| block.get("text").and_then(|t| t.as_str()))
            .collect();

        tracing::debug!("Oracle answered {} ({} chars)", prompt.task, text.len());

        parse_json_payload(&text)
    }
}
