use std::time::Duration;

use thiserror::Error;

/// Boxed error carried by transport and TLS failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What was wrong with a request URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum UrlProblem {
    Malformed,
    NoHost,
    /// Relative reference; the client only sends to absolute URLs.
    NotAbsolute,
}

/// Errors from building, sending or reading an HTTP request.
///
/// A non-2xx status is not an error of `send()`; it only becomes
/// [`HttpError::HttpStatus`] through the checked response readers.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    #[error("could not assemble request: {0}")]
    Request(#[from] http::Error),

    /// Header name or value rejected by `http`; the value itself is never kept.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Transport(#[source] BoxError),

    #[error("TLS setup failed: {0}")]
    Tls(#[source] BoxError),

    #[error("response body exceeds {limit} bytes (read {actual})")]
    BodyTooLarge { limit: usize, actual: usize },

    /// Non-2xx status with at most
    /// [`ERROR_BODY_PREVIEW_LIMIT`](crate::security::ERROR_BODY_PREVIEW_LIMIT)
    /// bytes of the body.
    #[error("HTTP {status}: {body_preview}")]
    HttpStatus {
        status: http::StatusCode,
        body_preview: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("form encoding error: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),

    /// Request buffer full; nothing was sent.
    #[error("client busy: too many requests in flight")]
    Overloaded,

    #[error("client shut down")]
    ServiceClosed,

    /// Match on `problem`; `reason` is for diagnostics only.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        url: String,
        problem: UrlProblem,
        reason: String,
    },

    /// Scheme not permitted by the configured
    /// [`TransportSecurity`](crate::TransportSecurity).
    #[error("scheme '{scheme}' rejected: {reason}")]
    InvalidScheme { scheme: String, reason: String },
}

impl HttpError {
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        if let Self::HttpStatus { status, .. } = self {
            Some(*status)
        } else {
            None
        }
    }
}

impl From<http::header::InvalidHeaderName> for HttpError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for HttpError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}
