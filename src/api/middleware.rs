// HTTP middleware

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::profiler;

/// Times each request and feeds the profiler. Requests that matched no route
/// share one label so arbitrary paths cannot blow up metric cardinality.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();

    tracing::debug!(
        "← {} {} {} ({:?})",
        method,
        route,
        status.as_u16(),
        elapsed
    );

    profiler::record_request(method.as_str(), &route, status.as_u16(), elapsed);

    response
}
