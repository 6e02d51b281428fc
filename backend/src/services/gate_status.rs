//! Gate state classification and utilization.
//!
//! Status precedence lives in two tables: [`STATUS_RULES`] is evaluated in
//! order for each flight (first match wins), and [`PRIMARY_STATUS_MAP`] is the
//! fallback for a flight's primary state. When flights at one gate disagree,
//! the most urgent status wins.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{minutes_between, FlightRecord, StateCode, ACTIVE_STATES, OCCUPIED_STATES};
use crate::routes::gates::{GateStatus, TemporalPhase, Utilization};

/// Minutes after the scheduled time during which a `DEP` flight marks the gate departed.
pub const DEPARTED_WINDOW_MINUTES: i64 = 60;

/// Tunable constants for utilization figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilizationParams {
    /// Operations a gate is assumed to handle at once. Heuristic, not an airport figure.
    pub simultaneous_capacity: u32,
    pub operational_hours: f64,
    pub average_turnaround_hours: f64,
    /// Half-width of the window around `now` in which active flights count.
    pub active_window_hours: f64,
    /// Gap to the next flight below which the gate is pre-operational.
    pub pre_operational_hours: f64,
}

impl Default for UtilizationParams {
    fn default() -> Self {
        Self {
            simultaneous_capacity: 3,
            operational_hours: 16.0,
            average_turnaround_hours: 1.0,
            active_window_hours: 2.0,
            pre_operational_hours: 1.5,
        }
    }
}

impl UtilizationParams {
    /// Flights a gate can turn around over one operating day.
    pub fn daily_capacity(&self) -> f64 {
        if self.average_turnaround_hours > 0.0 {
            self.operational_hours / self.average_turnaround_hours
        } else {
            0.0
        }
    }
}

/// Predicate over one flight at a reference time.
pub type FlightRule = fn(&FlightRecord, DateTime<Utc>) -> bool;

fn is_occupying(flight: &FlightRecord, _now: DateTime<Utc>) -> bool {
    flight.has_any_state(OCCUPIED_STATES)
}

fn is_recently_departed(flight: &FlightRecord, now: DateTime<Utc>) -> bool {
    if !flight.has_state(&StateCode::Dep) {
        return false;
    }
    let since = now - flight.scheduled_time;
    since >= Duration::zero() && since <= Duration::minutes(DEPARTED_WINDOW_MINUTES)
}

/// Per-flight rules, highest precedence first.
pub const STATUS_RULES: &[(FlightRule, GateStatus)] = &[
    (is_occupying, GateStatus::Occupied),
    (is_recently_departed, GateStatus::Departed),
];

/// Fallback from a flight's primary state.
pub const PRIMARY_STATUS_MAP: &[(StateCode, GateStatus)] = &[
    (StateCode::Sch, GateStatus::Scheduled),
    (StateCode::Del, GateStatus::Scheduled),
    (StateCode::Gch, GateStatus::Scheduled),
];

/// Status implied by a single flight, if any rule applies.
pub fn flight_status(flight: &FlightRecord, now: DateTime<Utc>) -> Option<GateStatus> {
    STATUS_RULES
        .iter()
        .find(|(rule, _)| rule(flight, now))
        .map(|(_, status)| *status)
        .or_else(|| {
            PRIMARY_STATUS_MAP
                .iter()
                .find(|(code, _)| code == flight.primary_state())
                .map(|(_, status)| *status)
        })
}

/// Classify a gate from all flights currently assigned to it.
///
/// An empty gate is `Unknown`; a gate whose flights match no rule is `Scheduled`.
pub fn classify_gate(flights: &[FlightRecord], now: DateTime<Utc>) -> GateStatus {
    if flights.is_empty() {
        return GateStatus::Unknown;
    }

    let mut ordered: Vec<&FlightRecord> = flights.iter().collect();
    ordered.sort_by_key(|f| f.scheduled_time);

    let mut status: Option<GateStatus> = None;
    for flight in ordered {
        let Some(candidate) = flight_status(flight, now) else {
            continue;
        };
        if candidate == GateStatus::Occupied {
            return GateStatus::Occupied;
        }
        if status.map_or(true, |current| candidate.urgency() > current.urgency()) {
            status = Some(candidate);
        }
    }

    status.unwrap_or(GateStatus::Scheduled)
}

fn is_active_now(flight: &FlightRecord, now: DateTime<Utc>, params: &UtilizationParams) -> bool {
    let window_minutes = params.active_window_hours * 60.0;
    flight.has_any_state(ACTIVE_STATES)
        && minutes_between(flight.scheduled_time, now).abs() <= window_minutes
}

fn percentage(value: f64) -> u8 {
    if value.is_finite() {
        value.round().clamp(0.0, 100.0) as u8
    } else {
        0
    }
}

/// Compute utilization figures for one gate.
pub fn compute_utilization(
    flights: &[FlightRecord],
    now: DateTime<Utc>,
    params: &UtilizationParams,
) -> Utilization {
    let active_count = flights
        .iter()
        .filter(|f| is_active_now(f, now, params))
        .count();

    let current = if params.simultaneous_capacity > 0 {
        percentage(active_count as f64 / params.simultaneous_capacity as f64 * 100.0)
    } else {
        0
    };

    let daily_capacity = params.daily_capacity();
    let daily = if daily_capacity > 0.0 {
        percentage(flights.len() as f64 / daily_capacity * 100.0)
    } else {
        0
    };

    Utilization {
        current,
        daily,
        logical: flights.len(),
        temporal_phase: temporal_phase(flights, now, active_count > 0, params),
    }
}

fn temporal_phase(
    flights: &[FlightRecord],
    now: DateTime<Utc>,
    any_active: bool,
    params: &UtilizationParams,
) -> TemporalPhase {
    if any_active {
        return TemporalPhase::Active;
    }

    let next_flight = flights
        .iter()
        .map(|f| f.scheduled_time)
        .filter(|t| *t > now)
        .min();

    match next_flight {
        None => TemporalPhase::PostOperational,
        Some(next) => {
            let hours_until = minutes_between(now, next) / 60.0;
            if hours_until > params.pre_operational_hours {
                TemporalPhase::DeadZone
            } else {
                TemporalPhase::PreOperational
            }
        }
    }
}
