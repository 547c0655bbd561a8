#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Outbound HTTP client for the catalog crates
//!
//! A hyper-based client with:
//! - TLS via rustls (HTTPS only unless plain HTTP is allowed explicitly)
//! - Connection pooling
//! - A per-request timeout
//! - User-Agent header injection
//! - Fail-fast buffering for concurrent callers
//!
//! The client issues exactly one attempt per `send()`; retry policy belongs
//! to the caller.
//!
//! ```ignore
//! use rmc_http::{HttpClientBuilder, HttpClientConfig};
//! use std::time::Duration;
//!
//! let client = HttpClientBuilder::with_config(HttpClientConfig::catalog_api())
//!     .timeout(Duration::from_secs(10))
//!     .build()?;
//!
//! let resp = client
//!     .post("https://api.example.com/v1/catalog/query")
//!     .json(&body)?
//!     .send()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod layers;
mod request;
mod response;
pub mod security;
mod tls;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{DEFAULT_USER_AGENT, HttpClientConfig, TlsRootConfig, TransportSecurity};
pub use error::{BoxError, HttpError, UrlProblem};
pub use layers::{UserAgentLayer, UserAgentService};
pub use request::RequestBuilder;
pub use response::{HttpResponse, ResponseBody};
