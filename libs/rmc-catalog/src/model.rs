use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ApiError;

/// Most part numbers one query may carry.
pub const MAX_PART_NUMBERS: usize = 100;

/// How the API matches part numbers against the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PnMatching {
    /// Compare only letters and digits (the API default).
    #[default]
    Alphanumeric,
    /// Compare the part number verbatim.
    Exact,
    /// A mode this client does not know yet; sent as given.
    Other(String),
}

impl PnMatching {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Alphanumeric => "alphanumeric",
            Self::Exact => "exact",
            Self::Other(s) => s,
        }
    }
}

impl FromStr for PnMatching {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = s.trim();
        Ok(if mode.eq_ignore_ascii_case("alphanumeric") {
            Self::Alphanumeric
        } else if mode.eq_ignore_ascii_case("exact") {
            Self::Exact
        } else {
            Self::Other(s.to_owned())
        })
    }
}

impl fmt::Display for PnMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PnMatching {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PnMatching {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(raw.parse().unwrap_or_default())
    }
}

/// Body of `POST /v1/catalog/query`.
///
/// Part numbers are sent verbatim; normalization is the API's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub part_number: Vec<String>,
    #[serde(default)]
    pub pn_matching: PnMatching,
    #[serde(default)]
    pub apply_filter_quantity: bool,
    #[serde(default)]
    pub ignore_empty_parts: bool,
    /// Query the test dataset instead of the live catalog.
    #[serde(default)]
    pub test_mode: bool,
}

impl CatalogQuery {
    /// Query for `part_numbers` with every option at its default.
    pub fn new<I, S>(part_numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            part_number: part_numbers.into_iter().map(Into::into).collect(),
            pn_matching: PnMatching::default(),
            apply_filter_quantity: false,
            ignore_empty_parts: false,
            test_mode: false,
        }
    }

    #[must_use]
    pub fn with_pn_matching(mut self, pn_matching: PnMatching) -> Self {
        self.pn_matching = pn_matching;
        self
    }

    #[must_use]
    pub fn with_apply_filter_quantity(mut self, on: bool) -> Self {
        self.apply_filter_quantity = on;
        self
    }

    #[must_use]
    pub fn with_ignore_empty_parts(mut self, on: bool) -> Self {
        self.ignore_empty_parts = on;
        self
    }

    #[must_use]
    pub fn with_test_mode(mut self, on: bool) -> Self {
        self.test_mode = on;
        self
    }

    /// Check the batch size before anything is sent.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidRequest` for an empty batch or one larger
    /// than [`MAX_PART_NUMBERS`].
    pub fn validate(&self) -> Result<(), ApiError> {
        match self.part_number.len() {
            0 => Err(ApiError::InvalidRequest(
                "at least one part number is required".into(),
            )),
            n if n > MAX_PART_NUMBERS => Err(ApiError::InvalidRequest(format!(
                "{n} part numbers given, at most {MAX_PART_NUMBERS} are allowed per query"
            ))),
            _ => Ok(()),
        }
    }
}
