use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::AuthError;
use crate::types::{ClientAuthMethod, SecretString};

/// Scope requested when none is configured.
pub const DEFAULT_SCOPE: &str = "rmcapi/read";

/// Path of the token endpoint below the authorization base URL.
pub const TOKEN_ENDPOINT_PATH: [&str; 2] = ["oauth2", "token"];

/// Configuration of a [`TokenProvider`](crate::TokenProvider).
///
/// `Debug` redacts the secret and the values of `extra_headers`.
#[derive(Clone)]
pub struct TokenProviderConfig {
    /// Authorization server base URL; the token endpoint is
    /// `<base_url>/oauth2/token`.
    pub base_url: Option<Url>,

    pub client_id: String,

    pub client_secret: SecretString,

    /// Space-joined into the `scope` form field. Empty omits the field.
    pub scopes: Vec<String>,

    pub auth_method: ClientAuthMethod,

    /// Static headers added to every token request.
    pub extra_headers: Vec<(String, String)>,

    /// Taken off every token lifetime before it is cached (default 60 s).
    pub refresh_margin: Duration,

    /// Lifetime assumed when the response omits `expires_in` (default 1 h).
    pub default_ttl: Duration,

    /// HTTP client settings; `None` uses
    /// [`HttpClientConfig::token_endpoint`](rmc_http::HttpClientConfig::token_endpoint).
    pub http_config: Option<rmc_http::HttpClientConfig>,
}

impl TokenProviderConfig {
    /// Check the configuration without touching the network.
    ///
    /// # Errors
    /// Returns `AuthError::Config` on a missing base URL or blank credentials.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::Config("client_id must not be empty".into()));
        }
        if self.client_secret.is_blank() {
            return Err(AuthError::Config("client_secret must not be empty".into()));
        }
        self.token_endpoint().map(|_| ())
    }

    /// Resolve `<base_url>/oauth2/token`.
    ///
    /// # Errors
    /// Returns `AuthError::Config` if `base_url` is unset, not `http(s)`, or
    /// cannot carry a path.
    pub fn token_endpoint(&self) -> Result<Url, AuthError> {
        let base = self
            .base_url
            .as_ref()
            .ok_or_else(|| AuthError::Config("auth base_url is required".into()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(AuthError::Config(format!(
                "auth base_url must be http(s), got '{}'",
                base.scheme()
            )));
        }
        rmc_utils::append_path(base, &TOKEN_ENDPOINT_PATH)
            .map_err(|e| AuthError::Config(e.to_string()))
    }

    /// Scopes as the single `scope` form value.
    #[must_use]
    pub fn scope_param(&self) -> Option<String> {
        let joined = self
            .scopes
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!joined.is_empty()).then_some(joined)
    }
}

impl Default for TokenProviderConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            client_id: String::new(),
            client_secret: SecretString::default(),
            scopes: vec![DEFAULT_SCOPE.to_owned()],
            auth_method: ClientAuthMethod::default(),
            extra_headers: Vec::new(),
            refresh_margin: Duration::from_secs(60),
            default_ttl: Duration::from_secs(3600),
            http_config: None,
        }
    }
}

impl fmt::Debug for TokenProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<_> = self
            .extra_headers
            .iter()
            .map(|(name, _)| (name.as_str(), "[REDACTED]"))
            .collect();
        f.debug_struct("TokenProviderConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret)
            .field("scopes", &self.scopes)
            .field("auth_method", &self.auth_method)
            .field("extra_headers", &headers)
            .field("refresh_margin", &self.refresh_margin)
            .field("default_ttl", &self.default_ttl)
            .field("http_config", &self.http_config)
            .finish()
    }
}
