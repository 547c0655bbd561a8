use http::{StatusCode, header::AUTHORIZATION};
use rmc_auth::TokenProvider;
use rmc_auth::http_error::format_http_error;
use rmc_http::{HttpClient, HttpError, HttpResponse};
use rmc_utils::SecretString;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::CatalogClientConfig;
use crate::error::ApiError;
use crate::model::CatalogQuery;

const HTTP_ERROR_PREFIX: &str = "catalog query";

/// Catalog API client.
///
/// Cheap to clone; clones share the HTTP connection pool and the token cache.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: HttpClient,
    endpoint: Url,
    tokens: TokenProvider,
}

impl CatalogClient {
    /// # Errors
    /// Returns `ApiError::Config` for an unusable base URL or `ApiError::Http`
    /// if the HTTP client cannot be built.
    pub fn new(config: &CatalogClientConfig, tokens: TokenProvider) -> Result<Self, ApiError> {
        let endpoint = config.query_endpoint()?;
        let http_config = config
            .http_config
            .clone()
            .unwrap_or_else(rmc_http::HttpClientConfig::catalog_api);
        let http = rmc_http::HttpClientBuilder::with_config(http_config)
            .build()
            .map_err(|e| ApiError::Http(format_http_error(&e, HTTP_ERROR_PREFIX)))?;
        Ok(Self {
            http,
            endpoint,
            tokens,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub fn token_provider(&self) -> &TokenProvider {
        &self.tokens
    }

    /// Run `query` and return the response body as JSON.
    ///
    /// Sends with the cached token; on `401` forces one token refresh and
    /// sends exactly once more. No other status is retried.
    ///
    /// # Errors
    /// - `ApiError::InvalidRequest` before any network call for an empty or
    ///   oversized batch
    /// - `ApiError::Auth` if no token could be obtained
    /// - `ApiError::Status` for a non-2xx final response
    /// - `ApiError::Http` / `ApiError::InvalidResponse` for transport and
    ///   decoding failures
    pub async fn query(&self, query: &CatalogQuery) -> Result<serde_json::Value, ApiError> {
        self.query_as(query).await
    }

    /// Like [`query`](Self::query), deserializing into `T`.
    ///
    /// # Errors
    /// Same as [`query`](Self::query).
    pub async fn query_as<T: DeserializeOwned>(&self, query: &CatalogQuery) -> Result<T, ApiError> {
        query.validate()?;
        tracing::debug!(
            parts = query.part_number.len(),
            pn_matching = %query.pn_matching,
            test_mode = query.test_mode,
            "sending catalog query"
        );

        let token = self.tokens.get_token(false).await?;
        let mut response = self.send(query, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::info!("catalog API rejected the access token; refreshing and retrying once");
            let token = self.tokens.get_token(true).await?;
            response = self.send(query, &token).await?;
            tracing::debug!(status = response.status().as_u16(), "catalog query retried");
        }

        let body = response.checked_bytes().await.map_err(|e| match e {
            HttpError::HttpStatus {
                status,
                body_preview,
                ..
            } => {
                tracing::warn!(status = status.as_u16(), "catalog query failed");
                ApiError::Status {
                    status,
                    body: body_preview,
                }
            }
            other => ApiError::Http(format_http_error(&other, HTTP_ERROR_PREFIX)),
        })?;

        serde_json::from_slice(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("response body is not the expected JSON: {e}")))
    }

    /// One attempt; the token goes into `Authorization` as is, without a scheme.
    async fn send(&self, query: &CatalogQuery, token: &SecretString) -> Result<HttpResponse, ApiError> {
        let http_err = |e: HttpError| ApiError::Http(format_http_error(&e, HTTP_ERROR_PREFIX));
        self.http
            .post(self.endpoint.as_str())
            .sensitive_header(AUTHORIZATION.as_str(), token.expose())
            .json(query)
            .map_err(http_err)?
            .send()
            .await
            .map_err(http_err)
    }
}
