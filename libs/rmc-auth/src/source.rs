use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use http::header::AUTHORIZATION;
use url::Url;
use zeroize::Zeroizing;

use crate::config::TokenProviderConfig;
use crate::credential::MAX_TOKEN_LIFETIME;
use crate::error::AuthError;
use crate::http_error::format_http_error;
use crate::types::{ClientAuthMethod, OAuthErrorBody, SecretString, TokenResponse};

const HTTP_ERROR_PREFIX: &str = "OAuth2 token";

/// A freshly issued access token and its lifetime.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: SecretString,
    pub lifetime: Duration,
}

/// Something that can issue access tokens.
///
/// [`TokenProvider`](crate::TokenProvider) calls this only when its cache
/// cannot answer.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Request one new token.
    ///
    /// # Errors
    /// Returns an [`AuthError`] describing why no token was issued.
    async fn request_token(&self) -> Result<IssuedToken, AuthError>;
}

/// Client-credentials grant against `<base_url>/oauth2/token`.
pub struct OAuthTokenSource {
    client: rmc_http::HttpClient,
    token_endpoint: Url,
    client_id: String,
    client_secret: SecretString,
    scope: Option<String>,
    auth_method: ClientAuthMethod,
    extra_headers: Vec<(String, String)>,
    default_ttl: Duration,
}

impl OAuthTokenSource {
    /// Build a source from validated configuration.
    ///
    /// # Errors
    /// Returns `AuthError::Config` for invalid configuration or
    /// `AuthError::Http` if the HTTP client cannot be built.
    pub fn new(config: &TokenProviderConfig) -> Result<Self, AuthError> {
        config.validate()?;
        let token_endpoint = config.token_endpoint()?;

        let http_config = config
            .http_config
            .clone()
            .unwrap_or_else(rmc_http::HttpClientConfig::token_endpoint);
        let client = rmc_http::HttpClientBuilder::with_config(http_config)
            .build()
            .map_err(|e| AuthError::Http(format_http_error(&e, HTTP_ERROR_PREFIX)))?;

        Ok(Self {
            client,
            token_endpoint,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scope_param(),
            auth_method: config.auth_method,
            extra_headers: config.extra_headers.clone(),
            default_ttl: config.default_ttl,
        })
    }

    #[must_use]
    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }
}

#[async_trait]
impl TokenSource for OAuthTokenSource {
    async fn request_token(&self) -> Result<IssuedToken, AuthError> {
        let http_err = |e: rmc_http::HttpError| AuthError::Http(format_http_error(&e, HTTP_ERROR_PREFIX));

        let mut fields: Vec<(&str, &str)> = vec![("grant_type", "client_credentials")];

        // Scrubbed on drop
        let secret;
        if self.auth_method == ClientAuthMethod::Form {
            secret = Zeroizing::new(self.client_secret.expose().to_owned());
            fields.push(("client_id", &self.client_id));
            fields.push(("client_secret", &secret));
        }
        if let Some(ref scope) = self.scope {
            fields.push(("scope", scope));
        }

        let mut request = self.client.post(self.token_endpoint.as_str());
        if self.auth_method == ClientAuthMethod::Basic {
            let credentials = Zeroizing::new(format!(
                "{}:{}",
                self.client_id,
                self.client_secret.expose()
            ));
            let header = Zeroizing::new(format!(
                "Basic {}",
                general_purpose::STANDARD.encode(credentials.as_bytes())
            ));
            request = request.sensitive_header(AUTHORIZATION.as_str(), &header);
        }
        for (name, value) in &self.extra_headers {
            request = request.sensitive_header(name, value);
        }

        tracing::debug!(endpoint = %self.token_endpoint, "requesting access token");
        let response = request
            .form(&fields)
            .map_err(http_err)?
            .send()
            .await
            .map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            // Only the RFC 6749 error fields leave this function, never the body
            let body = response.bytes().await.unwrap_or_default();
            let oauth: OAuthErrorBody = serde_json::from_slice(&body).unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                error = oauth.error.as_deref().unwrap_or(""),
                "token endpoint rejected the request"
            );
            return Err(AuthError::Status {
                status,
                error: oauth.error,
                description: oauth.error_description,
            });
        }

        let body = response.bytes().await.map_err(http_err)?;
        let token: TokenResponse = serde_json::from_slice(&body).map_err(|e| {
            AuthError::InvalidResponse(format!("token response is not valid JSON: {e}"))
        })?;

        if let Some(ref tt) = token.token_type
            && !tt.eq_ignore_ascii_case("bearer")
        {
            return Err(AuthError::UnsupportedTokenType(tt.clone()));
        }
        if token.access_token.is_empty() {
            return Err(AuthError::InvalidResponse("access_token is empty".into()));
        }

        let lifetime = token
            .expires_in
            .map_or(self.default_ttl, Duration::from_secs);
        if lifetime > MAX_TOKEN_LIFETIME {
            return Err(AuthError::InvalidResponse(format!(
                "expires_in of {}s exceeds the {}s maximum",
                lifetime.as_secs(),
                MAX_TOKEN_LIFETIME.as_secs()
            )));
        }
        tracing::info!(
            expires_in = lifetime.as_secs(),
            defaulted = token.expires_in.is_none(),
            "access token issued"
        );

        Ok(IssuedToken {
            access_token: SecretString::new(token.access_token),
            lifetime,
        })
    }
}
