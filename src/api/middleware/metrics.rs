//! HTTP metrics middleware

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::infrastructure::observability::record_http_request;

/// Records count and latency of every routed request.
/// Unmatched paths are grouped under one label to bound cardinality.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = route_label(request.extensions().get::<MatchedPath>());

    let response = next.run(request).await;

    record_http_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed(),
    );

    response
}

fn route_label(matched: Option<&MatchedPath>) -> String {
    matched
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}
