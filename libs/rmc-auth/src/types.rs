use serde::{Deserialize, Serialize};

pub use rmc_utils::SecretString;

/// `OAuth2` client authentication method.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientAuthMethod {
    /// `client_id` and `client_secret` as form fields next to the grant.
    #[default]
    Form,
    /// HTTP Basic authentication (RFC 6749 §2.3.1).
    /// `Authorization: Basic base64(client_id:client_secret)`
    Basic,
}

/// Successful token endpoint response.
///
/// `Deserialize`-only so an access token can't be serialized into logs.
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Must be `Bearer` (any case) when present.
    #[serde(default)]
    pub token_type: Option<String>,
}

/// RFC 6749 §5.2 error response body.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct OAuthErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}
