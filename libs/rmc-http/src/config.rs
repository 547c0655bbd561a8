use std::time::Duration;

/// `User-Agent` sent when the configuration does not name one.
pub const DEFAULT_USER_AGENT: &str = concat!("rmc-http/", env!("CARGO_PKG_VERSION"));

const KIB: usize = 1024;
const MIB: usize = 1024 * KIB;

/// Where trusted root certificates come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Bundled Mozilla roots (`webpki-roots`).
    #[default]
    WebPki,
    /// The operating system's certificate store.
    Native,
}

/// Which URL schemes a client may talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    #[default]
    TlsOnly,
    /// Also accept `http://`; meant for local mock servers.
    AllowInsecureHttp,
}

/// Settings for one [`HttpClient`](crate::HttpClient).
///
/// There is no retry setting: every `send()` is a single attempt on the wire
/// and callers decide what a `401` means.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Bound on one request, connect through last header byte.
    pub request_timeout: Duration,
    /// Response bodies larger than this fail with `BodyTooLarge`.
    pub max_body_size: usize,
    pub user_agent: String,
    pub transport: TransportSecurity,
    pub tls_roots: TlsRootConfig,
    /// Queue depth in front of the connection pool; a full queue fails fast
    /// with `Overloaded`.
    pub buffer_capacity: usize,
    /// `None` keeps hyper-util's default.
    pub pool_idle_timeout: Option<Duration>,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_size: 10 * MIB,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::default(),
            tls_roots: TlsRootConfig::default(),
            buffer_capacity: 1024,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }
}

impl HttpClientConfig {
    /// Preset for the `OAuth2` token endpoint: one small request per token
    /// lifetime, so a tiny pool and a 64 KiB body cap.
    #[must_use]
    pub fn token_endpoint() -> Self {
        Self {
            max_body_size: 64 * KIB,
            buffer_capacity: 64,
            pool_idle_timeout: Some(Duration::from_secs(60)),
            pool_max_idle_per_host: 2,
            ..Self::default()
        }
    }

    /// Preset for catalog queries; a full 100-part batch answer can be large.
    #[must_use]
    pub fn catalog_api() -> Self {
        Self {
            max_body_size: 32 * MIB,
            ..Self::default()
        }
    }

    /// Plain-HTTP preset with short timeouts for local mock servers.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_body_size: MIB,
            transport: TransportSecurity::AllowInsecureHttp,
            buffer_capacity: 256,
            pool_idle_timeout: Some(Duration::from_secs(10)),
            pool_max_idle_per_host: 4,
            ..Self::default()
        }
    }
}
