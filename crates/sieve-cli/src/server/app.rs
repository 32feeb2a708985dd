//! Axum application setup.

use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use super::state::AppState;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/ask", post(handlers::ask))
        .route("/ask-api", post(handlers::ask))
        .route("/stats", get(handlers::stats))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(state: AppState, addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use sieve::{Dataset, MockProvider, Sieve};
    use sieve::profile::default_profile;
    use tower::ServiceExt;

    fn state() -> AppState {
        let profile = default_profile();
        let headers = profile.schema.column_names();
        let rows = vec![
            vec![
                "1", "C001", "RF28", "Samsung", "28", "1299.99", "2024-01-15", "North",
                "1 Elm St", "Quiet", "Positive",
            ],
            vec![
                "2", "C002", "LFX", "LG", "22", "899.99", "2024-02-01", "South", "2 Oak Ave",
                "Noisy", "Negative",
            ],
        ];
        let dataset = Dataset::from_text_rows(&profile.schema, &headers, &rows);
        let sieve = Sieve::from_parts(profile, dataset)
            .unwrap()
            .with_llm(MockProvider::new().with_response(r#"{"select": ["BRAND"], "limit": 1}"#));
        AppState::new(sieve)
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = create_router(state()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["total_records"], 2);
        assert_eq!(body["profile"], "default_profile");
    }

    #[tokio::test]
    async fn test_ask_uses_provider() {
        let (status, body) = send(post_json("/ask", r#"{"question": "Which brand?"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sources"].as_array().unwrap().len(), 1);
        assert!(body["error"].is_null());
    }

    #[tokio::test]
    async fn test_ask_api_with_spec_censors_output() {
        let (status, body) = send(post_json(
            "/ask-api",
            r#"{"question": "Who bought?", "spec": "{\"select\": [\"CUSTOMER_ID\"]}"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        let first = body["sources"][0]["CUSTOMER_ID"].as_str().unwrap();
        assert!(first.starts_with("DEALER_"));
    }

    #[tokio::test]
    async fn test_ask_missing_question_is_bad_request() {
        for payload in [r#"{}"#, r#"{"question": "   "}"#, "not json"] {
            let (status, body) = send(post_json("/ask", payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "bad_request");
        }
    }

    #[tokio::test]
    async fn test_stats() {
        let (status, body) = send(Request::get("/stats").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_records"], 2);
    }
}
