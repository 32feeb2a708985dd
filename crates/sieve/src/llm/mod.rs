//! LLM providers that translate questions into query specifications.
//!
//! The model only ever produces specification text. That text is untrusted
//! and goes through [`SpecParser`](crate::spec::SpecParser) before anything
//! runs, so a provider can be swapped without touching the engine.
//!
//! # Supported Providers
//!
//! - **Anthropic** - Claude models via API (requires `ANTHROPIC_API_KEY`)
//! - **OpenAI** - GPT models via API (requires `OPENAI_API_KEY`)
//! - **Ollama** - Local models, no API key needed (requires Ollama installed)
//! - **Mock** - Canned or scripted responses for offline use and tests
//!
//! # Example
//!
//! ```no_run
//! use sieve::{LlmChoice, LlmConfig, llm};
//!
//! let generator = llm::from_choice(LlmChoice::Anthropic, LlmConfig::default()).unwrap();
//! assert!(generator.is_some());
//! ```

mod anthropic;
mod http;
mod mock;
mod ollama;
mod openai;
pub mod prompts;
mod provider;

use tracing::info;

use crate::error::Result;

pub use anthropic::AnthropicProvider;
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
pub use provider::{LlmChoice, LlmConfig, SpecGenerator, SpecPrompt};

/// Build the provider named by `choice`. `LlmChoice::None` yields no provider.
///
/// API keys come from the environment.
pub fn from_choice(choice: LlmChoice, config: LlmConfig) -> Result<Option<Box<dyn SpecGenerator>>> {
    let generator: Option<Box<dyn SpecGenerator>> = match choice {
        LlmChoice::Anthropic => Some(Box::new(AnthropicProvider::from_env(config)?)),
        LlmChoice::OpenAI => Some(Box::new(OpenAIProvider::from_env(config)?)),
        LlmChoice::Ollama => Some(Box::new(OllamaProvider::with_config(config)?)),
        LlmChoice::Mock => Some(Box::new(MockProvider::new())),
        LlmChoice::None => None,
    };

    if let Some(generator) = &generator {
        info!(provider = generator.name(), model = %generator.config().model, "LLM provider ready");
    }
    Ok(generator)
}

/// Model used for `choice` when none is configured.
pub fn default_model(choice: LlmChoice) -> &'static str {
    match choice {
        LlmChoice::OpenAI => openai::DEFAULT_MODEL,
        LlmChoice::Ollama => ollama::DEFAULT_MODEL,
        LlmChoice::Mock => "mock",
        LlmChoice::Anthropic | LlmChoice::None => "claude-sonnet-4-20250514",
    }
}
