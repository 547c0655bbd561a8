use rmc_http::HttpError;

/// Render an [`HttpError`] as a secret-free message prefixed with `prefix`.
///
/// Status errors report the status code only; response bodies are never
/// included.
#[must_use]
pub fn format_http_error(e: &HttpError, prefix: &str) -> String {
    match e {
        HttpError::HttpStatus { status, .. } => format!("{prefix} HTTP {status}"),
        HttpError::Json(err) => format!("{prefix} JSON error: {err}"),
        HttpError::Timeout(after) => format!("{prefix} request timed out after {after:?}"),
        HttpError::Transport(err) => format!("{prefix} transport error: {err}"),
        HttpError::Tls(err) => format!("{prefix} TLS error: {err}"),
        HttpError::BodyTooLarge { limit, actual } => {
            format!("{prefix} response too large: limit {limit} bytes, got {actual} bytes")
        }
        HttpError::Request(err) => format!("{prefix} request build failed: {err}"),
        HttpError::InvalidHeader(err) => format!("{prefix} invalid header: {err}"),
        HttpError::FormEncode(err) => format!("{prefix} form encode error: {err}"),
        HttpError::Overloaded => format!("{prefix} request rejected: client overloaded"),
        HttpError::ServiceClosed => format!("{prefix} HTTP client unavailable"),
        HttpError::InvalidUrl { url, reason, .. } => {
            format!("{prefix} invalid URL '{url}': {reason}")
        }
        HttpError::InvalidScheme { scheme, reason } => {
            format!("{prefix} invalid scheme '{scheme}': {reason}")
        }
        // Unknown variants may format sensitive data; keep it generic
        _ => format!("{prefix} request failed"),
    }
}
