//! Gate-occupation intervals for the timeline view.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::delays::is_delayed;
use crate::models::{FlightRecord, RouteRegion, StateCode};
use crate::routes::timeline::GateInterval;

/// Gate lead-time class of a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaulType {
    ShortHaul,
    LongHaul,
}

impl HaulType {
    /// Minutes before the scheduled time at which the gate opens.
    pub fn lead_time_minutes(&self) -> i64 {
        match self {
            HaulType::ShortHaul => 45,
            HaulType::LongHaul => 60,
        }
    }

    /// Schengen and EU routes are short-haul; unknown routes get the longer lead.
    pub fn for_flight(flight: &FlightRecord) -> HaulType {
        match flight.route_region {
            RouteRegion::Schengen | RouteRegion::Eu => HaulType::ShortHaul,
            RouteRegion::NonEu | RouteRegion::Unknown => HaulType::LongHaul,
        }
    }
}

/// Time the flight leaves (or left) the gate.
///
/// Cancelled flights stay on their original schedule.
pub fn departure_time(flight: &FlightRecord) -> DateTime<Utc> {
    if let Some(actual) = flight.actual_time {
        return actual;
    }
    if flight.is_cancelled() {
        return flight.scheduled_time;
    }
    flight.estimated_time.unwrap_or(flight.scheduled_time)
}

/// Gate-open time, anchored to the original schedule.
pub fn gate_open_time(flight: &FlightRecord, haul: HaulType) -> DateTime<Utc> {
    flight
        .scheduled_time
        .checked_sub_signed(Duration::minutes(haul.lead_time_minutes()))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Gate-close time. A closed gate without an off-block time keeps growing until `now`.
pub fn gate_close_time(flight: &FlightRecord, now: DateTime<Utc>) -> DateTime<Utc> {
    let departure = departure_time(flight);
    let held_at_gate = *flight.primary_state() == StateCode::Gtd
        && flight.actual_time.is_none()
        && now > departure;
    if held_at_gate {
        now
    } else {
        departure
    }
}

/// Build the gate-occupation interval of one flight.
pub fn build_interval(flight: &FlightRecord, haul: HaulType, now: DateTime<Utc>) -> GateInterval {
    GateInterval {
        flight_name: flight.flight_name.clone(),
        flight_number: flight.flight_number,
        start_time: gate_open_time(flight, haul),
        end_time: gate_close_time(flight, now),
        scheduled_time: flight.scheduled_time,
        actual_or_estimated_departure: departure_time(flight),
        is_shifted: is_delayed(flight) && flight.estimated_time.is_some(),
        is_cancelled: flight.is_cancelled(),
    }
}

/// Intervals for a gate's flights, using each flight's own haul type.
pub fn build_intervals(flights: &[FlightRecord], now: DateTime<Utc>) -> Vec<GateInterval> {
    flights
        .iter()
        .map(|f| build_interval(f, HaulType::for_flight(f), now))
        .collect()
}

/// Keep intervals that touch `[window_start, window_end]`.
pub fn clip_to_window(
    intervals: Vec<GateInterval>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<GateInterval> {
    intervals
        .into_iter()
        .filter(|i| i.start_time <= window_end && i.end_time.max(i.start_time) >= window_start)
        .collect()
}
