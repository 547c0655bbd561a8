use http::StatusCode;
use rmc_auth::AuthError;
use thiserror::Error;

/// Errors returned by [`CatalogClient`](crate::CatalogClient).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// No token could be obtained.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The API answered with a non-2xx status (after the single retry on 401).
    #[error("catalog API returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Transport failure talking to the API.
    #[error("{0}")]
    Http(String),

    /// The query was rejected locally; nothing was sent.
    #[error("invalid catalog query: {0}")]
    InvalidRequest(String),

    /// 2xx response whose body is not the expected JSON.
    #[error("invalid catalog response: {0}")]
    InvalidResponse(String),

    #[error("catalog client config error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of a rejected API call.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
