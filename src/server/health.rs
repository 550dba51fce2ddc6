//! Health check endpoint for liveness probes.

use axum::http::StatusCode;

/// Returns 200 OK if the server is running.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
