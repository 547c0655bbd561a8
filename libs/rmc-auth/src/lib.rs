#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Outbound `OAuth2` client-credentials authentication.
//!
//! [`TokenProvider`] owns a single [`CachedCredential`]. A token is fetched
//! from `<base_url>/oauth2/token` on first use, reused while it is valid and
//! fetched again once it expires or when the caller forces a refresh
//! (typically after the API answered `401`).
//!
//! ```ignore
//! use rmc_auth::{TokenProvider, TokenProviderConfig};
//!
//! let provider = TokenProvider::new(&config)?;
//! let token = provider.get_token(false).await?;
//! ```

pub mod clock;
pub mod config;
pub mod credential;
pub mod error;
pub mod http_error;
pub mod provider;
pub mod source;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TokenProviderConfig;
pub use credential::{CachedCredential, MAX_TOKEN_LIFETIME};
pub use error::AuthError;
pub use provider::TokenProvider;
pub use source::{IssuedToken, OAuthTokenSource, TokenSource};
pub use types::{ClientAuthMethod, SecretString};
