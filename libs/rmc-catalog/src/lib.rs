#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Client for the parts catalog query API.
//!
//! [`CatalogClient::query`] sends a [`CatalogQuery`] to
//! `<base_url>/v1/catalog/query` with the current access token in the
//! `Authorization` header. A `401` triggers one forced token refresh and one
//! retry; everything else is returned as is.

mod client;
mod config;
mod error;
mod model;

pub use client::CatalogClient;
pub use config::{CATALOG_QUERY_PATH, CatalogClientConfig};
pub use error::ApiError;
pub use model::{CatalogQuery, MAX_PART_NUMBERS, PnMatching};
