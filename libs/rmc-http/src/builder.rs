use crate::client::{BufferedService, HttpClient};
use crate::config::{HttpClientConfig, TlsRootConfig, TransportSecurity};
use crate::error::HttpError;
use crate::layers::UserAgentLayer;
use crate::response::ResponseBody;
use crate::tls;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::{ServiceBuilder, ServiceExt};

/// Builder for [`HttpClient`]
#[derive(Debug, Clone, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a preset such as [`HttpClientConfig::token_endpoint`].
    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Clamped to at least 1.
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity.max(1);
        self
    }

    /// Assemble `Buffer -> Timeout -> UserAgent -> hyper` (outer to inner).
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails or the user agent is not
    /// a valid header value
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let config = self.config;
        if config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!("plain HTTP allowed; traffic will not be encrypted");
        }

        let https = https_connector(config.tls_roots, config.transport)?;

        let mut pool = Client::builder(TokioExecutor::new());
        // pool_idle_timeout has no effect without a timer
        pool.pool_timer(TokioTimer::new())
            .pool_max_idle_per_host(config.pool_max_idle_per_host);
        if let Some(idle) = config.pool_idle_timeout {
            pool.pool_idle_timeout(idle);
        }
        let hyper_client = pool.build::<_, Full<Bytes>>(https);

        let timeout = config.request_timeout;
        let service = ServiceBuilder::new()
            .layer(TimeoutLayer::new(timeout))
            .layer(UserAgentLayer::try_new(&config.user_agent)?)
            .service(hyper_client)
            .map_response(|resp: http::Response<hyper::body::Incoming>| {
                resp.map(|body| -> ResponseBody { body.map_err(Into::into).boxed() })
            })
            .map_err(move |e: tower::BoxError| map_tower_error(e, timeout))
            .boxed();

        let buffered: BufferedService = Buffer::new(service, config.buffer_capacity.max(1));

        Ok(HttpClient {
            service: buffered,
            max_body_size: config.max_body_size,
            request_timeout: config.request_timeout,
            transport: config.transport,
        })
    }
}

fn map_tower_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }
    match err.downcast::<hyper_util::client::legacy::Error>() {
        Ok(hyper_err) => HttpError::from(*hyper_err),
        Err(other) => HttpError::Transport(other),
    }
}

fn https_connector(
    roots: TlsRootConfig,
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let builder = match roots {
        TlsRootConfig::WebPki => hyper_rustls::HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(tls::crypto_provider())
            .map_err(|e| HttpError::Tls(Box::new(e)))?,
        TlsRootConfig::Native => hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls::native_roots_client_config().map_err(|e| HttpError::Tls(e.into()))?),
    };

    let connector = match transport {
        TransportSecurity::AllowInsecureHttp => builder.https_or_http().enable_all_versions().build(),
        TransportSecurity::TlsOnly => builder.https_only().enable_all_versions().build(),
    };
    Ok(connector)
}
