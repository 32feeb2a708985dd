//! Anthropic Claude API provider implementation.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Result, SieveError};

use super::http;
use super::provider::{LlmConfig, SpecGenerator, SpecPrompt};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Claude over the Messages API.
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    config: LlmConfig,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, LlmConfig::default())
    }

    pub fn with_config(api_key: impl Into<String>, config: LlmConfig) -> Result<Self> {
        Ok(Self {
            client: http::client(config.timeout_secs)?,
            api_key: api_key.into(),
            config,
        })
    }

    /// Read the key from `ANTHROPIC_API_KEY`.
    pub fn from_env(config: LlmConfig) -> Result<Self> {
        Self::with_config(http::api_key("ANTHROPIC_API_KEY")?, config)
    }

    /// The system prompt travels as a top-level field, not a message.
    fn request_body(&self, prompt: &SpecPrompt) -> Value {
        json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": prompt.system,
            "messages": [{"role": "user", "content": prompt.user}]
        })
    }
}

impl SpecGenerator for AnthropicProvider {
    fn generate_spec(&self, prompt: &SpecPrompt) -> Result<String> {
        debug!(model = %self.config.model, "requesting specification from Anthropic");

        let headers = http::headers(&[
            ("x-api-key", self.api_key.as_str()),
            ("anthropic-version", API_VERSION),
        ])?;
        let reply: MessagesReply =
            http::post_json(&self.client, API_URL, headers, &self.request_body(prompt))
                .map_err(|e| e.into_llm("Anthropic"))?;

        reply
            .content
            .into_iter()
            .find_map(|block| (block.kind == "text").then_some(block.text))
            .ok_or_else(|| SieveError::Llm("Anthropic reply carried no text block".to_string()))
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

#[derive(Debug, Deserialize)]
struct MessagesReply {
    content: Vec<Block>,
}

#[derive(Debug, Deserialize)]
struct Block {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}
