use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the request-correlation identifier.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Threads an opaque correlation identifier through one request.
///
/// A caller-supplied `X-Correlation-ID` is reused as-is; otherwise a UUID is
/// generated. The id is recorded on the request's tracing span, so every log
/// line inside the handler carries it, and echoed in the response headers.
pub async fn correlation_id(request: Request, next: Next) -> Response {
    let correlation_id = request
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!("request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }

    response
}
