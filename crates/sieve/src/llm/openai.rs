//! OpenAI chat completions provider.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Result, SieveError};

use super::http;
use super::provider::{LlmConfig, SpecGenerator, SpecPrompt};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// GPT models in JSON mode.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    config: LlmConfig,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, LlmConfig::with_model(DEFAULT_MODEL))
    }

    pub fn with_config(api_key: impl Into<String>, config: LlmConfig) -> Result<Self> {
        Ok(Self {
            client: http::client(config.timeout_secs)?,
            api_key: api_key.into(),
            config,
        })
    }

    /// Read the key from `OPENAI_API_KEY`.
    pub fn from_env(config: LlmConfig) -> Result<Self> {
        Self::with_config(http::api_key("OPENAI_API_KEY")?, config)
    }

    fn request_body(&self, prompt: &SpecPrompt) -> Value {
        json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ]
        })
    }
}

impl SpecGenerator for OpenAIProvider {
    fn generate_spec(&self, prompt: &SpecPrompt) -> Result<String> {
        debug!(model = %self.config.model, "requesting specification from OpenAI");

        let bearer = format!("Bearer {}", self.api_key);
        let headers = http::headers(&[("authorization", bearer.as_str())])?;
        let reply: CompletionReply =
            http::post_json(&self.client, API_URL, headers, &self.request_body(prompt))
                .map_err(|e| e.into_llm("OpenAI"))?;

        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| SieveError::Llm("OpenAI reply carried no choices".to_string()))
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Debug, Deserialize)]
struct CompletionReply {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}
