use std::time::{Duration, Instant};

use rmc_utils::SecretString;

/// Longest lifetime a credential is cached for; token responses claiming
/// more are rejected.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(366 * 24 * 60 * 60);

/// The single cached bearer token.
///
/// `expires_at` already has the safety margin taken off, so validity is a
/// plain comparison against the current time.
#[derive(Debug, Clone)]
pub struct CachedCredential {
    token: SecretString,
    issued_at: Instant,
    expires_at: Instant,
}

impl CachedCredential {
    /// `expires_at = issued_at + lifetime - margin`, never earlier than `issued_at`.
    ///
    /// `lifetime` is capped at [`MAX_TOKEN_LIFETIME`]; an expiry the clock
    /// cannot represent leaves the credential already expired.
    #[must_use]
    pub fn new(token: SecretString, issued_at: Instant, lifetime: Duration, margin: Duration) -> Self {
        let usable = lifetime.min(MAX_TOKEN_LIFETIME).saturating_sub(margin);
        Self {
            token,
            issued_at,
            expires_at: issued_at.checked_add(usable).unwrap_or(issued_at),
        }
    }

    #[must_use]
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    #[must_use]
    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    #[must_use]
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Valid iff `now` is strictly before the expiry.
    #[must_use]
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const MARGIN: Duration = Duration::from_secs(60);

    #[test]
    fn expiry_subtracts_margin() {
        let t0 = Instant::now();
        let c = CachedCredential::new(SecretString::new("abc"), t0, Duration::from_secs(3600), MARGIN);
        assert_eq!(c.expires_at() - c.issued_at(), Duration::from_secs(3540));
    }

    #[test]
    fn validity_is_strict() {
        let t0 = Instant::now();
        let c = CachedCredential::new(SecretString::new("abc"), t0, Duration::from_secs(120), MARGIN);
        assert!(c.is_valid_at(t0 + Duration::from_secs(59)));
        assert!(!c.is_valid_at(t0 + Duration::from_secs(60)));
        assert!(!c.is_valid_at(t0 + Duration::from_secs(61)));
    }

    #[test]
    fn short_lifetime_saturates_at_issue_time() {
        let t0 = Instant::now();
        let c = CachedCredential::new(SecretString::new("abc"), t0, Duration::from_secs(30), MARGIN);
        assert_eq!(c.expires_at(), t0);
        assert!(!c.is_valid_at(t0));
    }

    #[test]
    fn huge_lifetime_is_capped_without_overflow() {
        let t0 = Instant::now();
        let c = CachedCredential::new(SecretString::new("abc"), t0, Duration::MAX, MARGIN);
        assert_eq!(c.expires_at().duration_since(t0), MAX_TOKEN_LIFETIME.saturating_sub(MARGIN));
        assert!(c.is_valid_at(t0));
    }

    #[test]
    fn debug_redacts_token() {
        let c = CachedCredential::new(
            SecretString::new("super-secret-token"),
            Instant::now(),
            Duration::from_secs(3600),
            MARGIN,
        );
        assert!(!format!("{c:?}").contains("super-secret-token"));
    }
}
