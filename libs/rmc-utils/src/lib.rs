#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Small building blocks shared by the catalog client crates.

#[cfg(feature = "serde")]
pub mod humantime_serde;
mod secret_string;
mod url_path;

pub use secret_string::SecretString;
pub use url_path::{UrlPathError, append_path};
