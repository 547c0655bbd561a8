use http::StatusCode;
use thiserror::Error;

/// Errors raised while obtaining a token.
///
/// No variant ever carries `client_secret`, an access token or a raw
/// response body.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// Transport failure talking to the token endpoint.
    ///
    /// Produced by [`format_http_error`](crate::http_error::format_http_error).
    #[error("{0}")]
    Http(String),

    /// The token endpoint answered with a non-2xx status.
    #[error("token endpoint returned HTTP {status}{}", oauth_detail(.error.as_deref(), .description.as_deref()))]
    Status {
        status: StatusCode,
        /// RFC 6749 §5.2 `error` code, when the body carried one.
        error: Option<String>,
        /// RFC 6749 §5.2 `error_description`, when the body carried one.
        description: Option<String>,
    },

    /// The response was 2xx but not a usable token response.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// `token_type` was present and not `Bearer`.
    #[error("unsupported token type: {0}")]
    UnsupportedTokenType(String),

    #[error("OAuth2 config error: {0}")]
    Config(String),
}

impl AuthError {
    /// HTTP status of a rejected token request.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn oauth_detail(error: Option<&str>, description: Option<&str>) -> String {
    match (error, description) {
        (Some(e), Some(d)) => format!(": {e} ({d})"),
        (Some(e), None) => format!(": {e}"),
        (None, Some(d)) => format!(": {d}"),
        (None, None) => String::new(),
    }
}
