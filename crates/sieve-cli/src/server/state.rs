//! Application state for the web server.

use std::sync::Arc;

use sieve::Sieve;

/// Shared application state.
///
/// The dataset is read-only after startup, so handlers share one `Sieve`
/// without locking; the pseudonym table synchronizes itself.
#[derive(Clone)]
pub struct AppState {
    pub sieve: Arc<Sieve>,
}

impl AppState {
    pub fn new(sieve: Sieve) -> Self {
        Self {
            sieve: Arc::new(sieve),
        }
    }

    /// Whether questions can be sent to an LLM provider.
    pub fn has_llm(&self) -> bool {
        self.sieve.has_llm()
    }
}
