//! Request ID middleware for request tracing and correlation.
//!
//! Every request gets an ID. It is recorded on the request span, tagged on
//! the Sentry scope and echoed back in the `x-request-id` response header.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Upstream IDs longer than this are replaced.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// Middleware that ensures every request has a unique request ID.
///
/// An `x-request-id` supplied by a reverse proxy is reused when it is short
/// printable ASCII. Otherwise a new UUID v4 is generated.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| is_acceptable_upstream_id(id))
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn is_acceptable_upstream_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_UPSTREAM_ID_LEN
        && id.bytes().all(|b| b.is_ascii_graphic())
}
