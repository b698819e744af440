//! Request logging middleware with `x-request-id` propagation

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Logs every request and echoes its request id on the response.
///
/// A request without an `x-request-id` header gets a fresh UUID, which is
/// also inserted into the request so handlers see the same id.
/// No span is opened here; `TraceLayer` owns the request span.
pub async fn logging_middleware(mut request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = extract_path(&request);
    let request_id = ensure_request_id(&mut request);

    info!(
        method = %method,
        path = %path,
        query = request.uri().query().unwrap_or(""),
        request_id = ?request_id,
        "Incoming request"
    );

    let mut response = next.run(request).await;
    let status = response.status();
    let duration_ms = start.elapsed().as_millis();

    if status.is_client_error() {
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = %duration_ms,
            request_id = ?request_id,
            "Request rejected"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = %duration_ms,
            request_id = ?request_id,
            "Request completed"
        );
    }

    response
        .headers_mut()
        .insert(REQUEST_ID_HEADER, request_id);
    response
}

fn extract_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// The caller's request id, or a new one stored on the request
fn ensure_request_id(request: &mut Request<Body>) -> HeaderValue {
    if let Some(value) = request.headers().get(REQUEST_ID_HEADER) {
        return value.clone();
    }

    let generated = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
    request
        .headers_mut()
        .insert(REQUEST_ID_HEADER, generated.clone());
    generated
}
