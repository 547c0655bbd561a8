use url::Url;

use crate::error::ApiError;

/// Path of the query endpoint below the API base URL.
pub const CATALOG_QUERY_PATH: [&str; 3] = ["v1", "catalog", "query"];

/// Configuration of a [`CatalogClient`](crate::CatalogClient).
#[derive(Debug, Clone, Default)]
pub struct CatalogClientConfig {
    /// API base URL; queries go to `<base_url>/v1/catalog/query`.
    pub base_url: Option<Url>,

    /// HTTP client settings; `None` uses
    /// [`HttpClientConfig::catalog_api`](rmc_http::HttpClientConfig::catalog_api).
    pub http_config: Option<rmc_http::HttpClientConfig>,
}

impl CatalogClientConfig {
    /// Resolve `<base_url>/v1/catalog/query`.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if `base_url` is unset, not `http(s)`, or
    /// cannot carry a path.
    pub fn query_endpoint(&self) -> Result<Url, ApiError> {
        let base = self
            .base_url
            .as_ref()
            .ok_or_else(|| ApiError::Config("api base_url is required".into()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "api base_url must be http(s), got '{}'",
                base.scheme()
            )));
        }
        rmc_utils::append_path(base, &CATALOG_QUERY_PATH).map_err(|e| ApiError::Config(e.to_string()))
    }
}
