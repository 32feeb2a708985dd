//! Dataset statistics handler.

use axum::{Json, extract::State};
use sieve::DatasetStats;

use crate::server::state::AppState;

/// GET /stats - Summary over the profile's stats columns.
pub async fn stats(State(state): State<AppState>) -> Json<DatasetStats> {
    Json(state.sieve.stats())
}
