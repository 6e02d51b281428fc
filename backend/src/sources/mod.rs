//! Upstream flight sources.
//!
//! A [`FlightSource`] returns raw upstream records for a [`FlightQuery`]; the
//! pipeline in [`crate::services::dashboard`] does the rest.

pub mod error;
#[cfg(feature = "schiphol-api")]
pub mod schiphol;
pub mod static_source;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use error::{ErrorContext, SourceError, SourceResult};
#[cfg(feature = "schiphol-api")]
pub use schiphol::SchipholApiSource;
pub use static_source::StaticFlightSource;

use crate::models::Direction;

/// Query parameters shared by sources, the cache key and the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct FlightQuery {
    /// Local calendar date of the scheduled time.
    pub date: Option<NaiveDate>,
    pub direction: Option<Direction>,
    /// Operating carrier prefix, e.g. `KL`.
    pub carrier: Option<String>,
}

impl FlightQuery {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    /// Canonical form used as cache key: carrier upper-cased, blanks dropped.
    pub fn normalized(&self) -> Self {
        let carrier = self
            .carrier
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_ascii_uppercase);
        Self {
            date: self.date,
            direction: self.direction,
            carrier,
        }
    }
}

/// Provider of raw flight records.
#[async_trait]
pub trait FlightSource: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Fetch raw flight records matching `query` as closely as the source allows.
    ///
    /// Sources may return a superset; the pipeline filters again.
    async fn fetch_flights(&self, query: &FlightQuery) -> SourceResult<Vec<Value>>;
}
