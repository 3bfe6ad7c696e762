//! # Temporal Types: Write Dates
//!
//! Defines `UpdatedDate`, the UTC calendar date stamped on every row at
//! write time. It is never sourced from upstream data: re-ingesting
//! unchanged content still moves `updated_date` forward, while the record
//! checksum stays put.
//!
//! Serialized as `YYYY-MM-DD`, which also makes it usable inside sort keys
//! (`SNAPSHOT#2025-08-01`) where lexicographic order equals date order.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC calendar date recorded when a row is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdatedDate(NaiveDate);

impl UpdatedDate {
    /// Today's date in UTC.
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    /// Wrap an explicit date. Used by tests and by callers that pin a run date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse a `YYYY-MM-DD` string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| CoreError::Invalid {
                kind: "date",
                value: s.to_string(),
            })
    }
}

impl std::fmt::Display for UpdatedDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}
