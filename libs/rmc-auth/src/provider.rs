use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use tokio::sync::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::config::TokenProviderConfig;
use crate::credential::CachedCredential;
use crate::error::AuthError;
use crate::source::{OAuthTokenSource, TokenSource};
use crate::types::SecretString;

/// Hands out bearer tokens from a single cached credential.
///
/// Clones share the cache. Reads are lock-free; fetching a new token is
/// serialized so that any number of concurrent callers that find the cache
/// empty or expired cause exactly one token request.
#[derive(Clone)]
pub struct TokenProvider {
    inner: Arc<Inner>,
}

struct Inner {
    source: Box<dyn TokenSource>,
    clock: Arc<dyn Clock>,
    refresh_margin: Duration,
    cache: ArcSwapOption<CachedCredential>,
    refresh_lock: Mutex<()>,
    /// Bumped after every stored credential.
    generation: AtomicU64,
}

impl TokenProvider {
    /// Provider backed by the client-credentials grant and the system clock.
    ///
    /// # Errors
    /// Returns `AuthError::Config` for invalid configuration or
    /// `AuthError::Http` if the HTTP client cannot be built.
    pub fn new(config: &TokenProviderConfig) -> Result<Self, AuthError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`new`](Self::new) with an explicit time source.
    ///
    /// # Errors
    /// Same as [`new`](Self::new).
    pub fn with_clock(config: &TokenProviderConfig, clock: Arc<dyn Clock>) -> Result<Self, AuthError> {
        let source = OAuthTokenSource::new(config)?;
        Ok(Self::from_source(source, clock, config.refresh_margin))
    }

    /// Provider over any [`TokenSource`].
    #[must_use]
    pub fn from_source(
        source: impl TokenSource + 'static,
        clock: Arc<dyn Clock>,
        refresh_margin: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source: Box::new(source),
                clock,
                refresh_margin,
                cache: ArcSwapOption::empty(),
                refresh_lock: Mutex::new(()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Return a valid token, fetching a new one when needed.
    ///
    /// With `force_refresh == false` a valid cached credential is returned
    /// without any network call. With `force_refresh == true` a new token is
    /// requested, unless another caller finished a refresh while this one was
    /// waiting; that fresh token is returned instead.
    ///
    /// On failure the previous credential (if any) stays cached.
    ///
    /// # Errors
    /// Propagates the [`AuthError`] of the failed token request.
    pub async fn get_token(&self, force_refresh: bool) -> Result<SecretString, AuthError> {
        let inner = &*self.inner;
        let seen_generation = inner.generation.load(Ordering::Acquire);

        if !force_refresh && let Some(token) = inner.valid_cached() {
            tracing::trace!("token cache hit");
            return Ok(token);
        }

        let _guard = inner.refresh_lock.lock().await;

        let refreshed_while_waiting = inner.generation.load(Ordering::Acquire) != seen_generation;
        if (!force_refresh || refreshed_while_waiting)
            && let Some(token) = inner.valid_cached()
        {
            tracing::trace!("token refreshed by a concurrent caller");
            return Ok(token);
        }

        tracing::debug!(force_refresh, "fetching new access token");
        let issued = inner.source.request_token().await.inspect_err(|e| {
            tracing::warn!(error = %e, "access token request failed");
        })?;

        let credential = CachedCredential::new(
            issued.access_token,
            inner.clock.now(),
            issued.lifetime,
            inner.refresh_margin,
        );
        let token = credential.token().clone();
        inner.cache.store(Some(Arc::new(credential)));
        inner.generation.fetch_add(1, Ordering::AcqRel);

        Ok(token)
    }

    /// Drop the cached credential; the next call fetches a new token.
    pub fn invalidate(&self) {
        self.inner.cache.store(None);
    }

    /// Expiry (margin applied) of the cached credential, if there is one.
    #[must_use]
    pub fn cached_expiry(&self) -> Option<Instant> {
        self.inner.cache.load().as_ref().map(|c| c.expires_at())
    }

    /// Snapshot of the cached credential.
    #[must_use]
    pub fn cached(&self) -> Option<Arc<CachedCredential>> {
        self.inner.cache.load_full()
    }
}

impl Inner {
    fn valid_cached(&self) -> Option<SecretString> {
        let now = self.clock.now();
        self.cache
            .load()
            .as_ref()
            .filter(|c| c.is_valid_at(now))
            .map(|c| c.token().clone())
    }
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenProvider")
            .field("refresh_margin", &self.inner.refresh_margin)
            .field("cached_expiry", &self.cached_expiry())
            .finish_non_exhaustive()
    }
}
