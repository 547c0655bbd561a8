use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use rmc_auth::{ClientAuthMethod, TokenProviderConfig};
use rmc_catalog::CatalogClientConfig;
use rmc_http::{HttpClientConfig, TransportSecurity};
use rmc_utils::SecretString;
use serde::{Deserialize, Serialize, Serializer};
use url::Url;

/// Environment prefix; `RMC__AUTH__CLIENT_ID` sets `auth.client_id`.
pub const ENV_PREFIX: &str = "RMC__";

const DEFAULT_USER_AGENT: &str = concat!("rmc-query/", env!("CARGO_PKG_VERSION"));

/// Application configuration.
///
/// Layered as defaults, then the YAML file, then `RMC__` environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub auth: AuthSection,
    pub api: ApiSection,
    pub http: HttpSection,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub base_url: String,
    pub client_id: String,
    #[serde(serialize_with = "redact")]
    pub client_secret: SecretString,
    pub scopes: Vec<String>,
    pub auth_method: ClientAuthMethod,
    #[serde(with = "rmc_utils::humantime_serde")]
    pub refresh_margin: Duration,
    #[serde(with = "rmc_utils::humantime_serde")]
    pub default_ttl: Duration,
}

impl Default for AuthSection {
    fn default() -> Self {
        let provider = TokenProviderConfig::default();
        Self {
            base_url: String::new(),
            client_id: provider.client_id,
            client_secret: provider.client_secret,
            scopes: provider.scopes,
            auth_method: provider.auth_method,
            refresh_margin: provider.refresh_margin,
            default_ttl: provider.default_ttl,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    #[serde(with = "rmc_utils::humantime_serde")]
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Permit plain `http://` base URLs (local mock servers only).
    pub allow_insecure_http: bool,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            request_timeout: HttpClientConfig::default().request_timeout,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            allow_insecure_http: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::default(),
        }
    }
}

fn redact<S: Serializer>(secret: &SecretString, s: S) -> Result<S::Ok, S::Error> {
    if secret.is_blank() {
        s.serialize_str("")
    } else {
        s.serialize_str("[REDACTED]")
    }
}

impl AppConfig {
    /// Load the layered configuration.
    ///
    /// # Errors
    /// Fails when an explicit `path` does not exist or a layer does not
    /// deserialize.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("failed to load configuration")
    }

    /// Check everything a query needs, without touching the network.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.token_provider_config()?
            .validate()
            .context("invalid auth configuration")?;
        self.catalog_client_config()?
            .query_endpoint()
            .context("invalid api configuration")?;
        Ok(())
    }

    /// # Errors
    /// Fails if `auth.base_url` is not an absolute URL.
    pub fn token_provider_config(&self) -> anyhow::Result<TokenProviderConfig> {
        let auth = &self.auth;
        Ok(TokenProviderConfig {
            base_url: parse_base_url("auth.base_url", &auth.base_url)?,
            client_id: auth.client_id.clone(),
            client_secret: auth.client_secret.clone(),
            scopes: auth.scopes.clone(),
            auth_method: auth.auth_method,
            refresh_margin: auth.refresh_margin,
            default_ttl: auth.default_ttl,
            http_config: Some(self.http_config(HttpClientConfig::token_endpoint())),
            ..TokenProviderConfig::default()
        })
    }

    /// # Errors
    /// Fails if `api.base_url` is not an absolute URL.
    pub fn catalog_client_config(&self) -> anyhow::Result<CatalogClientConfig> {
        Ok(CatalogClientConfig {
            base_url: parse_base_url("api.base_url", &self.api.base_url)?,
            http_config: Some(self.http_config(HttpClientConfig::catalog_api())),
        })
    }

    /// The configuration as pretty JSON with the client secret masked.
    ///
    /// # Errors
    /// Propagates serialization failures.
    pub fn to_redacted_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to render configuration")
    }

    fn http_config(&self, preset: HttpClientConfig) -> HttpClientConfig {
        HttpClientConfig {
            request_timeout: self.http.request_timeout,
            user_agent: self.http.user_agent.clone(),
            transport: if self.http.allow_insecure_http {
                TransportSecurity::AllowInsecureHttp
            } else {
                TransportSecurity::TlsOnly
            },
            ..preset
        }
    }
}

fn parse_base_url(key: &str, raw: &str) -> anyhow::Result<Option<Url>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Url::parse(raw)
        .map(Some)
        .with_context(|| format!("{key} is not an absolute URL: '{raw}'"))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r"
auth:
  base_url: https://auth.example.com
  client_id: my-client
  client_secret: my-secret
  auth_method: basic
  refresh_margin: 2m
api:
  base_url: https://api.example.com/stage
http:
  request_timeout: 5s
logging:
  level: debug
  format: json
";

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn load_isolated(path: Option<&Path>) -> anyhow::Result<AppConfig> {
        temp_env::with_vars_unset(
            [
                "RMC__AUTH__CLIENT_ID",
                "RMC__AUTH__CLIENT_SECRET",
                "RMC__API__BASE_URL",
            ],
            || AppConfig::load(path),
        )
    }

    #[test]
    fn defaults_without_file() {
        let cfg = load_isolated(None).unwrap();
        assert_eq!(cfg.auth.scopes, vec!["rmcapi/read".to_owned()]);
        assert_eq!(cfg.auth.auth_method, ClientAuthMethod::Form);
        assert_eq!(cfg.auth.refresh_margin, Duration::from_secs(60));
        assert_eq!(cfg.auth.default_ttl, Duration::from_secs(3600));
        assert_eq!(cfg.http.request_timeout, Duration::from_secs(30));
        assert!(cfg.http.user_agent.starts_with("rmc-query/"));
        assert_eq!(cfg.logging.format, LogFormat::Text);
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let file = write_config(SAMPLE);
        let cfg = load_isolated(Some(file.path())).unwrap();
        assert_eq!(cfg.auth.client_id, "my-client");
        assert_eq!(cfg.auth.client_secret.expose(), "my-secret");
        assert_eq!(cfg.auth.auth_method, ClientAuthMethod::Basic);
        assert_eq!(cfg.auth.refresh_margin, Duration::from_secs(120));
        assert_eq!(cfg.auth.default_ttl, Duration::from_secs(3600));
        assert_eq!(cfg.http.request_timeout, Duration::from_secs(5));
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        cfg.validate().unwrap();
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config(SAMPLE);
        let cfg = temp_env::with_vars(
            [
                ("RMC__AUTH__CLIENT_ID", Some("from-env")),
                ("RMC__API__BASE_URL", Some("https://other.example.com")),
            ],
            || AppConfig::load(Some(file.path())),
        )
        .unwrap();
        assert_eq!(cfg.auth.client_id, "from-env");
        assert_eq!(cfg.api.base_url, "https://other.example.com");
        assert_eq!(cfg.auth.client_secret.expose(), "my-secret");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(err.to_string().contains("config file does not exist"));
    }

    #[test]
    fn bad_duration_is_rejected() {
        let file = write_config("auth:\n  refresh_margin: soon\n");
        assert!(load_isolated(Some(file.path())).is_err());
    }

    #[test]
    fn validation_requires_credentials_and_urls() {
        let file = write_config(SAMPLE);
        let mut cfg = load_isolated(Some(file.path())).unwrap();

        cfg.auth.client_secret = SecretString::new("  ");
        assert!(cfg.validate().is_err());

        cfg.auth.client_secret = SecretString::new("s");
        cfg.api.base_url = "not a url".into();
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err:#}").contains("api.base_url"));

        cfg.api.base_url = String::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn redacted_json_hides_the_secret() {
        let file = write_config(SAMPLE);
        let cfg = load_isolated(Some(file.path())).unwrap();
        let rendered = cfg.to_redacted_json().unwrap();
        assert!(!rendered.contains("my-secret"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(rendered.contains("\"refresh_margin\": \"2m\""));
    }

    #[test]
    fn insecure_flag_selects_transport() {
        let mut cfg = AppConfig {
            auth: AuthSection {
                base_url: "http://127.0.0.1:1".into(),
                ..AuthSection::default()
            },
            ..AppConfig::default()
        };
        let tls = cfg.token_provider_config().unwrap();
        assert_eq!(
            tls.http_config.unwrap().transport,
            TransportSecurity::TlsOnly
        );

        cfg.http.allow_insecure_http = true;
        let api = cfg.catalog_client_config().unwrap().http_config.unwrap();
        assert_eq!(api.transport, TransportSecurity::AllowInsecureHttp);
        assert_eq!(api.max_body_size, HttpClientConfig::catalog_api().max_body_size);
    }
}
