use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::delays::{DelaySummary, FlightDelay};
use super::gates::{GateSnapshot, PierSummary};
use super::timeline::GateTimeline;
use crate::sources::FlightQuery;

// =========================================================
// Dashboard snapshot
// =========================================================

/// Everything the dashboard renders for one refresh.
///
/// Built from scratch by the pipeline and shared read-only behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub snapshot_id: uuid::Uuid,
    pub generated_at: DateTime<Utc>,
    /// Hex digest of the normalized flight set the snapshot was built from.
    pub fingerprint: String,
    pub query: FlightQuery,
    pub flight_count: usize,
    pub gates: Vec<GateSnapshot>,
    pub piers: Vec<PierSummary>,
    pub timelines: Vec<GateTimeline>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub delay_summary: DelaySummary,
    pub worst_delays: Vec<FlightDelay>,
    /// Set when an upstream failure forced the cache to serve an older snapshot.
    #[serde(default)]
    pub stale: bool,
}

impl DashboardSnapshot {
    pub fn gate(&self, gate_id: &str) -> Option<&GateSnapshot> {
        self.gates
            .iter()
            .find(|g| g.gate_id.eq_ignore_ascii_case(gate_id))
    }

    pub fn timeline(&self, gate_id: &str) -> Option<&GateTimeline> {
        self.timelines
            .iter()
            .find(|t| t.gate_id.eq_ignore_ascii_case(gate_id))
    }
}

/// Route function name constant for the full dashboard
pub const GET_DASHBOARD: &str = "get_dashboard";
