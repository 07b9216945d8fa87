use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::info;

/// Logs every request with its final status and handler latency. Runs inside
/// the TraceLayer, which carries the span-level instrumentation.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        target: "phonedir::http",
        method = %method,
        uri = %uri,
        status = %response.status(),
        latency_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
