//! Serde helpers for human-readable durations (`"30s"`, `"1h 5m"`).
//!
//! ```
//! use serde::Deserialize;
//! use std::time::Duration;
//!
//! #[derive(Deserialize)]
//! struct Timeouts {
//!     #[serde(with = "rmc_utils::humantime_serde")]
//!     request: Duration,
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer, de};

/// Deserialize a `Duration` from a humantime string.
///
/// # Errors
///
/// Returns a deserialization error if the string is not a valid duration.
pub fn deserialize<'de, D>(d: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(d)?;
    humantime::parse_duration(raw.trim()).map_err(|e| de::Error::custom(format!("{raw:?}: {e}")))
}

/// Serialize a `Duration` as a humantime string.
///
/// # Errors
///
/// Propagates serializer errors.
#[allow(clippy::trivially_copy_pass_by_ref)] // serde `with` signature
pub fn serialize<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.collect_str(&humantime::format_duration(*d))
}
