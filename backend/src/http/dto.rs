//! Data Transfer Objects for the HTTP API.
//!
//! Response bodies are mostly the route types re-exported from [`crate::api`];
//! this module adds query parameters and the few HTTP-only envelopes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::AppError;
use crate::models::Direction;
use crate::sources::FlightQuery;

pub use crate::api::{
    DashboardSnapshot, DelayReport, GateOverviewData, GateSnapshot, GateTimeline,
    GateTimelineData,
};

/// Query parameters shared by the dashboard endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardQuery {
    /// Local date, `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
    /// `departure`/`arrival` or `D`/`A`
    #[serde(default)]
    pub direction: Option<String>,
    /// Operating carrier prefix
    #[serde(default)]
    pub carrier: Option<String>,
}

impl DashboardQuery {
    pub fn to_flight_query(&self) -> Result<FlightQuery, AppError> {
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                AppError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
            })?),
        };
        let direction = match self.direction.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(Direction::parse(raw).ok_or_else(|| {
                AppError::BadRequest(format!("Invalid direction '{}'", raw))
            })?),
        };
        Ok(FlightQuery {
            date,
            direction,
            carrier: self.carrier.clone(),
        }
        .normalized())
    }
}

/// Query parameters for the delay endpoint.
///
/// Fields are repeated rather than flattened; urlencoded numbers do not survive `flatten`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DelayQuery {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    /// Number of worst delays to return
    #[serde(default)]
    pub limit: Option<usize>,
}

impl DelayQuery {
    pub fn filter(&self) -> DashboardQuery {
        DashboardQuery {
            date: self.date.clone(),
            direction: self.direction.clone(),
            carrier: self.carrier.clone(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Configured upstream source kind
    pub source: String,
    /// Generation time of the default query's snapshot, if any
    pub last_snapshot_at: Option<DateTime<Utc>>,
    /// Whether that snapshot is being served after an upstream failure
    pub stale: bool,
}

/// Single gate with its timeline row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDetailResponse {
    pub gate: GateSnapshot,
    pub timeline: Option<GateTimeline>,
    pub generated_at: DateTime<Utc>,
    pub stale: bool,
}
