use serde::{Deserialize, Serialize};

use crate::models::FlightRecord;

// =========================================================
// Gate status types
// =========================================================

/// Discrete operational status of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    Scheduled,
    Occupied,
    Departed,
    Maintenance,
    Unknown,
}

impl GateStatus {
    /// Operational urgency; the higher value wins when flights disagree.
    pub fn urgency(&self) -> u8 {
        match self {
            GateStatus::Occupied => 4,
            GateStatus::Departed => 3,
            GateStatus::Scheduled => 2,
            GateStatus::Maintenance => 1,
            GateStatus::Unknown => 0,
        }
    }
}

/// Where the gate sits in its daily cycle relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalPhase {
    DeadZone,
    PreOperational,
    Active,
    PostOperational,
}

/// Utilization figures for one gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Utilization {
    /// Short-window occupancy, 0-100.
    pub current: u8,
    /// Capacity-normalized flight count over the operating day, 0-100.
    pub daily: u8,
    /// Raw flight count.
    pub logical: usize,
    pub temporal_phase: TemporalPhase,
}

/// Derived view of one gate for a single refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSnapshot {
    pub gate_id: String,
    pub pier: String,
    pub flights: Vec<FlightRecord>,
    pub status: GateStatus,
    pub utilization: Utilization,
}

/// Per-pier roll-up of gate snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PierSummary {
    pub pier: String,
    pub gate_count: usize,
    pub occupied_gates: usize,
    pub flight_count: usize,
}

/// Gate overview dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateOverviewData {
    pub gates: Vec<GateSnapshot>,
    pub piers: Vec<PierSummary>,
    pub total_gates: usize,
    pub occupied_count: usize,
}

/// Route function name constant for the gate overview
pub const GET_GATE_OVERVIEW: &str = "get_gate_overview";
/// Route function name constant for a single gate
pub const GET_GATE_DETAIL: &str = "get_gate_detail";
