//! Mock LLM provider for testing.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, SieveError};

use super::provider::{LlmConfig, SpecGenerator, SpecPrompt};

/// Mock provider that returns predictable specification text.
///
/// Responses are chosen in this order: queued scripted responses, then the
/// first keyword rule found in the question, then the default (`{}`).
pub struct MockProvider {
    config: LlmConfig,
    default_response: String,
    rules: Vec<(String, String)>,
    script: Mutex<VecDeque<String>>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockProvider {
    /// Create a new mock provider that always answers `{}`.
    pub fn new() -> Self {
        Self {
            config: LlmConfig::with_model("mock"),
            default_response: "{}".to_string(),
            rules: Vec::new(),
            script: Mutex::new(VecDeque::new()),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answer with `text`.
    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.default_response = text.into();
        self
    }

    /// Answer with `text` when the question contains `keyword` (case-insensitive).
    pub fn with_rule(mut self, keyword: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules.push((keyword.into().to_lowercase(), text.into()));
        self
    }

    /// Queue responses returned once each, in order, before any rule applies.
    pub fn with_script<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = responses.into_iter().map(Into::into).collect();
        Self {
            script: Mutex::new(script),
            ..self
        }
    }

    /// Fail every call, as an unreachable provider would.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Number of times a specification was requested.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecGenerator for MockProvider {
    fn generate_spec(&self, prompt: &SpecPrompt) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.failure {
            return Err(SieveError::Llm(message.clone()));
        }

        let scripted = self
            .script
            .lock()
            .map_err(|_| SieveError::Llm("mock script lock poisoned".to_string()))?
            .pop_front();
        if let Some(text) = scripted {
            return Ok(text);
        }

        let question = prompt.question.to_lowercase();
        let response = self
            .rules
            .iter()
            .find(|(keyword, _)| question.contains(keyword.as_str()))
            .map(|(_, text)| text.clone())
            .unwrap_or_else(|| self.default_response.clone());
        Ok(response)
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(question: &str) -> SpecPrompt {
        SpecPrompt {
            system: String::new(),
            user: String::new(),
            question: question.to_string(),
        }
    }

    #[test]
    fn test_rules_and_default() {
        let mock = MockProvider::new().with_rule("samsung", r#"{"limit": 1}"#);

        assert_eq!(mock.generate_spec(&prompt("Average SAMSUNG price")).unwrap(), r#"{"limit": 1}"#);
        assert_eq!(mock.generate_spec(&prompt("Anything else")).unwrap(), "{}");
        assert_eq!(mock.calls(), 2);
    }

    #[test]
    fn test_script_is_consumed_in_order() {
        let mock = MockProvider::new().with_script(["first", "second"]);

        assert_eq!(mock.generate_spec(&prompt("q")).unwrap(), "first");
        assert_eq!(mock.generate_spec(&prompt("q")).unwrap(), "second");
        assert_eq!(mock.generate_spec(&prompt("q")).unwrap(), "{}");
    }

    #[test]
    fn test_failing_provider() {
        let mock = MockProvider::new().failing("offline");
        assert_eq!(mock.generate_spec(&prompt("q")).unwrap_err().kind(), "llm_error");
    }
}
