//! JSON-over-HTTP plumbing shared by the hosted providers.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, SieveError};

/// Blocking client with the request timeout applied.
pub(super) fn client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| SieveError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Headers every provider sends, plus any `extra` (name, value) pairs.
pub(super) fn headers(extra: &[(&'static str, &str)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in extra {
        let value = HeaderValue::from_str(value)
            .map_err(|e| SieveError::Config(format!("Invalid {} header: {}", name, e)))?;
        headers.insert(*name, value);
    }
    Ok(headers)
}

/// Read an API key from the environment.
pub(super) fn api_key(var: &str) -> Result<String> {
    std::env::var(var)
        .map_err(|_| SieveError::Config(format!("{} environment variable not set", var)))
}

/// Ways a provider call can fail before any text comes back.
#[derive(Debug)]
pub(super) enum CallError {
    /// The request never completed.
    Transport(reqwest::Error),
    /// The server answered with a non-success status.
    Status(StatusCode, String),
    /// The body did not have the expected shape.
    Decode(reqwest::Error),
}

impl CallError {
    pub(super) fn into_llm(self, vendor: &str) -> SieveError {
        SieveError::Llm(match self {
            CallError::Transport(e) => format!("{} request failed: {}", vendor, e),
            CallError::Status(status, body) => format!("{} API error ({}): {}", vendor, status, body),
            CallError::Decode(e) => format!("Failed to parse {} response: {}", vendor, e),
        })
    }
}

/// POST `body` and decode the JSON reply.
pub(super) fn post_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    headers: HeaderMap,
    body: &Value,
) -> std::result::Result<T, CallError> {
    let response = client
        .post(url)
        .headers(headers)
        .json(body)
        .send()
        .map_err(CallError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(CallError::Status(status, response.text().unwrap_or_default()));
    }
    response.json().map_err(CallError::Decode)
}
