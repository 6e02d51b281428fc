use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =========================================================
// Delay analysis types
// =========================================================

/// Delay figures for a single flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightDelay {
    pub flight_name: String,
    pub flight_number: i64,
    pub gate: String,
    pub scheduled_time: DateTime<Utc>,
    /// Time the delay was measured against (actual, estimated or scheduled).
    pub reference_time: DateTime<Utc>,
    /// Signed; early flights are negative.
    pub delay_minutes: i64,
    pub is_delayed: bool,
}

/// Aggregate delay statistics over a flight set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DelaySummary {
    pub flight_count: usize,
    pub delayed_count: usize,
    /// Mean over delayed flights only.
    pub mean_delay_minutes: f64,
    /// Sum of positive delay over delayed flights.
    pub total_delay_minutes: i64,
    pub max_delay: Option<FlightDelay>,
}

/// Delay report dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayReport {
    pub summary: DelaySummary,
    pub worst_delays: Vec<FlightDelay>,
}

/// Route function name constant for the delay report
pub const GET_DELAY_REPORT: &str = "get_delay_report";
