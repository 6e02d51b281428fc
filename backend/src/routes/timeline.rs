use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// =========================================================
// Gate timeline types
// =========================================================

/// Gate-occupation interval of one flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateInterval {
    pub flight_name: String,
    pub flight_number: i64,
    /// Gate-open time.
    pub start_time: DateTime<Utc>,
    /// Gate-close time. May precede `start_time` on bad data.
    pub end_time: DateTime<Utc>,
    pub scheduled_time: DateTime<Utc>,
    pub actual_or_estimated_departure: DateTime<Utc>,
    pub is_shifted: bool,
    pub is_cancelled: bool,
}

impl GateInterval {
    /// End time widened so the interval spans at least `min_width`.
    pub fn display_end(&self, min_width: Duration) -> DateTime<Utc> {
        let widened = self
            .start_time
            .checked_add_signed(min_width)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.end_time.max(widened)
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}

/// Intervals of one gate partitioned into collision-free lanes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LaneAssignment {
    pub lanes: Vec<Vec<GateInterval>>,
}

impl LaneAssignment {
    /// Peak number of simultaneously open intervals, used for row height.
    pub fn max_concurrency(&self) -> usize {
        self.lanes.len()
    }

    pub fn interval_count(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }
}

/// Timeline rows for one gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateTimeline {
    pub gate_id: String,
    pub pier: String,
    pub layout: LaneAssignment,
    pub max_concurrency: usize,
}

/// Gate timeline dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateTimelineData {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub gates: Vec<GateTimeline>,
}

/// Route function name constant for the gate timeline
pub const GET_GATE_TIMELINE: &str = "get_gate_timeline";
