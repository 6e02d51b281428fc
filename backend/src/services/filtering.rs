//! Flight filtering, deduplication and staleness pruning.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;

use crate::models::{local_date, Direction, FlightRecord, AIRPORT_TZ, CANCELLED_STATES};

/// Criteria for [`filter_flights`]. Unset criteria match everything.
#[derive(Debug, Clone)]
pub struct FlightFilter {
    /// Operating carrier prefix (e.g. `KL`). Codeshare records never match.
    pub carrier_prefix: Option<String>,
    /// Local calendar date of the scheduled time.
    pub date: Option<NaiveDate>,
    pub direction: Option<Direction>,
    /// Drop flights whose every state is a cancelled state.
    pub operational_only: bool,
    pub timezone: Tz,
}

impl Default for FlightFilter {
    fn default() -> Self {
        Self {
            carrier_prefix: None,
            date: None,
            direction: None,
            operational_only: false,
            timezone: AIRPORT_TZ,
        }
    }
}

impl FlightFilter {
    pub fn with_carrier(mut self, prefix: impl Into<String>) -> Self {
        self.carrier_prefix = Some(prefix.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn operational_only(mut self) -> Self {
        self.operational_only = true;
        self
    }

    pub fn matches(&self, flight: &FlightRecord) -> bool {
        if let Some(prefix) = &self.carrier_prefix {
            if !is_operated_by(flight, prefix) {
                return false;
            }
        }

        if let Some(date) = self.date {
            if local_date(flight.scheduled_time, self.timezone) != date {
                return false;
            }
        }

        if let Some(direction) = self.direction {
            if flight.direction != direction {
                return false;
            }
        }

        !(self.operational_only && is_non_operational(flight))
    }
}

/// A record is a codeshare when it names a different main (operating) flight.
pub fn is_codeshare(flight: &FlightRecord) -> bool {
    let main = flight.main_flight.trim();
    !main.is_empty() && !main.eq_ignore_ascii_case(flight.flight_name.trim())
}

/// Match on the operating carrier field, never on the marketing flight name.
pub fn is_operated_by(flight: &FlightRecord, prefix: &str) -> bool {
    flight
        .operating_carrier_prefix
        .eq_ignore_ascii_case(prefix.trim())
        && !is_codeshare(flight)
}

/// True when every state code of the flight is a cancelled state.
pub fn is_non_operational(flight: &FlightRecord) -> bool {
    !flight.state_codes.is_empty()
        && flight
            .state_codes
            .iter()
            .all(|code| CANCELLED_STATES.contains(code))
}

/// Keep flights matching all criteria of `filter`.
pub fn filter_flights(flights: &[FlightRecord], filter: &FlightFilter) -> Vec<FlightRecord> {
    flights
        .iter()
        .filter(|f| filter.matches(f))
        .cloned()
        .collect()
}

/// Keep the most recently updated record per flight number.
///
/// Records without `last_updated_at` lose against any timestamped record; among
/// equals the first one seen wins. The result is ordered by scheduled time then
/// flight number, so applying this twice gives the same output.
pub fn deduplicate(flights: &[FlightRecord]) -> Vec<FlightRecord> {
    let mut latest: HashMap<i64, &FlightRecord> = HashMap::with_capacity(flights.len());

    for flight in flights {
        latest
            .entry(flight.flight_number)
            .and_modify(|kept| {
                if flight.last_updated_at > kept.last_updated_at {
                    *kept = flight;
                }
            })
            .or_insert(flight);
    }

    let mut unique: Vec<FlightRecord> = latest.into_values().cloned().collect();
    unique.sort_by(|a, b| {
        a.scheduled_time
            .cmp(&b.scheduled_time)
            .then(a.flight_number.cmp(&b.flight_number))
    });
    unique
}

/// Drop flights last updated strictly before `now - max_age_hours`.
///
/// A flight exactly `max_age_hours` old is kept; flights without an update
/// timestamp are treated as fresh. Negative ages count as zero, and an age
/// reaching past chrono's range keeps everything.
pub fn remove_stale(
    flights: &[FlightRecord],
    max_age_hours: i64,
    now: DateTime<Utc>,
) -> Vec<FlightRecord> {
    let cutoff = Duration::try_hours(max_age_hours.max(0))
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    flights
        .iter()
        .filter(|f| f.last_updated_at.map_or(true, |updated| updated >= cutoff))
        .cloned()
        .collect()
}
