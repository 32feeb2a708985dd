//! Liveness handler.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::server::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: String,
    pub total_records: usize,
    pub profile: String,
    pub llm: bool,
}

/// GET /health - Report that the dataset is loaded.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let sieve = &state.sieve;
    Json(HealthResponse {
        status: "ok",
        message: format!("Serving {} records", sieve.dataset().row_count()),
        total_records: sieve.dataset().row_count(),
        profile: sieve.profile().name.clone(),
        llm: state.has_llm(),
    })
}
