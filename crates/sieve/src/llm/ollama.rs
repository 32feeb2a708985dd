//! Ollama provider for locally served models. No API key needed.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Result, SieveError};

use super::http::{self, CallError};
use super::provider::{LlmConfig, SpecGenerator, SpecPrompt};

const DEFAULT_API_URL: &str = "http://localhost:11434/api/chat";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Local models answer slowly; never time out sooner than this.
const MIN_TIMEOUT_SECS: u64 = 120;

/// Chat endpoint of an Ollama server.
pub struct OllamaProvider {
    client: Client,
    api_url: String,
    config: LlmConfig,
}

impl OllamaProvider {
    /// Talk to `llama3.2`; pull it first with `ollama pull llama3.2`.
    pub fn new() -> Result<Self> {
        Self::with_config(LlmConfig::with_model(DEFAULT_MODEL))
    }

    /// `OLLAMA_HOST` overrides the local default endpoint.
    pub fn with_config(config: LlmConfig) -> Result<Self> {
        let api_url = std::env::var("OLLAMA_HOST")
            .map(|host| format!("{}/api/chat", host.trim_end_matches('/')))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self {
            client: http::client(config.timeout_secs.max(MIN_TIMEOUT_SECS))?,
            api_url,
            config,
        })
    }

    fn request_body(&self, prompt: &SpecPrompt) -> Value {
        json!({
            "model": self.config.model,
            "stream": false,
            "format": "json",
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens
            },
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ]
        })
    }

    /// Turn the two common setup mistakes into actionable messages.
    fn explain(&self, err: CallError) -> SieveError {
        match err {
            CallError::Transport(e) if e.is_connect() => SieveError::Llm(format!(
                "cannot reach Ollama at {}; start it with `ollama serve`",
                self.api_url
            )),
            CallError::Status(_, body) if body.contains("not found") => SieveError::Llm(format!(
                "model '{0}' is not installed; run `ollama pull {0}`",
                self.config.model
            )),
            other => other.into_llm("Ollama"),
        }
    }
}

impl SpecGenerator for OllamaProvider {
    fn generate_spec(&self, prompt: &SpecPrompt) -> Result<String> {
        debug!(model = %self.config.model, url = %self.api_url, "requesting specification from Ollama");

        let headers = http::headers(&[])?;
        let reply: ChatReply =
            http::post_json(&self.client, &self.api_url, headers, &self.request_body(prompt))
                .map_err(|e| self.explain(e))?;

        Ok(reply.message.content)
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: String,
}
