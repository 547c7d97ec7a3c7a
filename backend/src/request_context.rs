use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::Request,
    http::{header::HeaderName, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const TRACE_ID_HEADER: &str = "x-trace-id";
/// Longest caller-supplied id that is echoed back instead of replaced.
const MAX_FORWARDED_ID_LEN: usize = 128;

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Correlation ids for one request: taken from the caller when present,
/// generated otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RequestIds {
    request_id: String,
    trace_id: String,
}

impl RequestIds {
    fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            request_id: forwarded_id(headers, REQUEST_ID_HEADER).unwrap_or_else(|| generate_id("req")),
            trace_id: forwarded_id(headers, TRACE_ID_HEADER).unwrap_or_else(|| generate_id("trace")),
        }
    }

    fn write_to(&self, headers: &mut HeaderMap) {
        for (name, value) in [
            (REQUEST_ID_HEADER, &self.request_id),
            (TRACE_ID_HEADER, &self.trace_id),
        ] {
            if let Ok(value) = HeaderValue::from_str(value) {
                headers.insert(HeaderName::from_static(name), value);
            }
        }
    }
}

/// Runs every request inside an `http_request` span and echoes the
/// correlation ids on the response.
pub async fn request_context_middleware(request: Request, next: Next) -> Response {
    let ids = RequestIds::from_headers(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started_at = Instant::now();

    let span = tracing::info_span!(
        "http_request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path,
    );

    let mut response = next.run(request).instrument(span.clone()).await;
    ids.write_to(response.headers_mut());

    let status = response.status();
    let elapsed_ms = started_at.elapsed().as_millis();
    if status.is_server_error() {
        tracing::warn!(parent: &span, status = status.as_u16(), elapsed_ms, "request failed");
    } else {
        tracing::info!(parent: &span, status = status.as_u16(), elapsed_ms, "request completed");
    }

    response
}

fn forwarded_id(headers: &HeaderMap, header_name: &'static str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= MAX_FORWARDED_ID_LEN)
        .map(ToOwned::to_owned)
}

fn generate_id(prefix: &str) -> String {
    let now_ns = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_nanos())
        .unwrap_or_default();
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{now_ns:x}-{counter:x}")
}
