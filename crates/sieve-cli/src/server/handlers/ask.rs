//! Question answering handler.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Deserialize;
use sieve::QueryResponse;
use tracing::info;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Request to answer a question.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// The question to answer.
    #[serde(default)]
    pub question: Option<String>,

    /// Specification to run instead of asking the LLM.
    #[serde(default)]
    pub spec: Option<String>,
}

/// POST /ask, POST /ask-api - Answer a question.
///
/// Failures inside the pipeline come back as a response payload with its
/// error field set; only malformed requests are rejected.
pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;

    let question = request
        .question
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Question is required".to_string()))?;

    let sieve = state.sieve.clone();
    let response = tokio::task::spawn_blocking(move || match request.spec {
        Some(spec) => sieve.answer_with_spec(&question, &spec),
        None => sieve.ask(&question),
    })
    .await?;

    info!(
        confidence = response.confidence.as_str(),
        sources = response.sources.len(),
        error = response.error.as_ref().map(|e| e.kind.as_str()),
        "question answered"
    );
    Ok(Json(response))
}
