//! API Middleware
//!
//! Caller identity resolution and request logging.

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::domain::OperationContext;
use crate::error::AppError;

/// Caller identity, resolved upstream by the authenticator
pub const CLIENT_ID_HEADER: &str = "x-client-id";

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

// =========================================================================
// Caller identity
// =========================================================================

/// Build the `OperationContext` for the request.
///
/// A missing `X-Client-Id` leaves the caller empty; a malformed one is
/// rejected. Each request gets a correlation id, taken from
/// `X-Correlation-Id` when it parses.
pub async fn client_identity_middleware(mut request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let context = context_from_headers(request.headers())?;
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

pub fn context_from_headers(headers: &HeaderMap) -> Result<OperationContext, AppError> {
    let mut context = OperationContext::new();

    if let Some(value) = headers.get(CLIENT_ID_HEADER) {
        let client_id = value
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or_else(|| AppError::InvalidHeader("Invalid X-Client-Id header format".to_string()))?;
        context = context.with_client(client_id);
    }

    if let Some(correlation_id) = headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
    {
        context = context.with_correlation_id(correlation_id);
    }
    context.ensure_correlation_id();

    Ok(context)
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie", "x-api-key"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();

    let headers = mask_headers_for_logging(request.headers());

    let context = request.extensions().get::<OperationContext>();
    let correlation_id = context.and_then(|ctx| ctx.correlation_id);
    let client_id = context.and_then(|ctx| ctx.client_id);

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        version = ?version,
        correlation_id = ?correlation_id,
        client_id = ?client_id,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        correlation_id = ?correlation_id,
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_headers_for_logging() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("authorization", "Bearer secret".parse().unwrap());
        headers.insert("x-client-id", "user-123".parse().unwrap());

        let masked = mask_headers_for_logging(&headers);

        let auth = masked.iter().find(|(k, _)| k == "authorization");
        let content_type = masked.iter().find(|(k, _)| k == "content-type");
        let client = masked.iter().find(|(k, _)| k == "x-client-id");

        assert_eq!(auth.unwrap().1, "[REDACTED]");
        assert_eq!(content_type.unwrap().1, "application/json");
        assert_eq!(client.unwrap().1, "user-123");
    }

    #[test]
    fn test_context_without_client() {
        let context = context_from_headers(&HeaderMap::new()).unwrap();

        assert!(context.client_id.is_none());
        assert!(context.correlation_id.is_some());
    }

    #[test]
    fn test_context_reads_client_and_correlation() {
        let client_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_ID_HEADER, client_id.to_string().parse().unwrap());
        headers.insert(CORRELATION_ID_HEADER, correlation_id.to_string().parse().unwrap());

        let context = context_from_headers(&headers).unwrap();

        assert_eq!(context.client_id, Some(client_id));
        assert_eq!(context.correlation_id, Some(correlation_id));
    }

    #[test]
    fn test_malformed_client_id_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_ID_HEADER, "not-a-uuid".parse().unwrap());

        assert!(matches!(context_from_headers(&headers), Err(AppError::InvalidHeader(_))));
    }
}
