//! Request logging middleware.
//!
//! Logs method, path, status and latency for every API request. Writes are
//! logged at `info`, reads at `debug`.

use std::time::Instant;

use axum::http::{Method, Request};
use axum::middleware::Next;
use axum::response::Response;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if method == Method::GET || method == Method::HEAD {
        tracing::debug!(%method, %path, status, elapsed_ms, "API request");
    } else if response.status().is_success() {
        tracing::info!(%method, %path, status, elapsed_ms, "API write");
    } else {
        tracing::warn!(%method, %path, status, elapsed_ms, "API write rejected");
    }

    response
}
