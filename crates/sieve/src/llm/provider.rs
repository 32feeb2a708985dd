//! Specification generator trait and configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A prompt ready to send: system instructions plus the user turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecPrompt {
    pub system: String,
    pub user: String,
    /// The bare question, kept for providers that route on it.
    pub question: String,
}

/// Configuration for LLM providers.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model to use (e.g., "claude-sonnet-4-20250514").
    pub model: String,

    /// Maximum tokens in response.
    pub max_tokens: usize,

    /// Temperature for generation (0.0-1.0). Kept low: the output is a spec, not prose.
    pub temperature: f64,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 2048,
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    /// Default configuration with a different model.
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}

/// Which provider to use, chosen explicitly by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmChoice {
    Anthropic,
    OpenAI,
    Ollama,
    /// Offline generator; see [`MockProvider`](super::MockProvider).
    Mock,
    /// No generator: questions must come with an explicit specification.
    #[default]
    None,
}

impl LlmChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmChoice::Anthropic => "anthropic",
            LlmChoice::OpenAI => "openai",
            LlmChoice::Ollama => "ollama",
            LlmChoice::Mock => "mock",
            LlmChoice::None => "none",
        }
    }
}

impl fmt::Display for LlmChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(LlmChoice::Anthropic),
            "openai" | "gpt" => Ok(LlmChoice::OpenAI),
            "ollama" => Ok(LlmChoice::Ollama),
            "mock" => Ok(LlmChoice::Mock),
            "none" | "" => Ok(LlmChoice::None),
            other => Err(format!(
                "unknown LLM provider '{}' (expected anthropic, openai, ollama, mock or none)",
                other
            )),
        }
    }
}

/// Turns a natural-language question into raw specification text.
///
/// Implementations must be thread-safe (Send + Sync) so one instance can be
/// shared across requests. The output is untrusted text; callers validate it.
pub trait SpecGenerator: Send + Sync {
    /// Generate specification text for a prompt.
    fn generate_spec(&self, prompt: &SpecPrompt) -> Result<String>;

    /// Get the configuration for this provider.
    fn config(&self) -> &LlmConfig;

    /// Get the name of this provider (for logging/debugging).
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_parsing() {
        assert_eq!("Claude".parse::<LlmChoice>().unwrap(), LlmChoice::Anthropic);
        assert_eq!("openai".parse::<LlmChoice>().unwrap(), LlmChoice::OpenAI);
        assert_eq!("".parse::<LlmChoice>().unwrap(), LlmChoice::None);
        assert!("gemini".parse::<LlmChoice>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.temperature, 0.2);
    }
}
