use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{StateCode, CANCELLED_STATES};

/// Flight direction relative to the airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Departure,
    Arrival,
}

impl Direction {
    /// Single-letter code used by the upstream API.
    pub fn api_code(&self) -> &'static str {
        match self {
            Direction::Departure => "D",
            Direction::Arrival => "A",
        }
    }

    /// Lenient parse of `D`/`A`/`departure`/`arrival`.
    pub fn parse(raw: &str) -> Option<Direction> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "d" | "dep" | "departure" | "departures" => Some(Direction::Departure),
            "a" | "arr" | "arrival" | "arrivals" => Some(Direction::Arrival),
            _ => None,
        }
    }
}

/// Route classification used to pick the gate lead time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteRegion {
    Schengen,
    Eu,
    NonEu,
    #[default]
    Unknown,
}

impl RouteRegion {
    /// Parse the upstream `route.eu` marker (`S`, `E`, `N`).
    pub fn parse(raw: &str) -> RouteRegion {
        match raw.trim().to_ascii_uppercase().as_str() {
            "S" | "SCHENGEN" => RouteRegion::Schengen,
            "E" | "EU" => RouteRegion::Eu,
            "N" | "NON_EU" | "NONEU" => RouteRegion::NonEu,
            _ => RouteRegion::Unknown,
        }
    }
}

/// Canonical flight record produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub flight_name: String,
    pub flight_number: i64,
    /// Flight number of the operating flight when this record is a codeshare.
    pub main_flight: String,
    pub direction: Direction,
    pub scheduled_time: DateTime<Utc>,
    pub estimated_time: Option<DateTime<Utc>>,
    pub actual_time: Option<DateTime<Utc>>,
    pub state_codes: Vec<StateCode>,
    pub aircraft_type: String,
    pub destination: String,
    pub gate: String,
    pub pier: String,
    pub route_region: RouteRegion,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub operating_carrier_prefix: String,
}

impl FlightRecord {
    /// Minimal record with a scheduled time and nothing else.
    pub fn new(flight_name: impl Into<String>, flight_number: i64, scheduled_time: DateTime<Utc>) -> Self {
        Self {
            flight_name: flight_name.into(),
            flight_number,
            main_flight: String::new(),
            direction: Direction::Departure,
            scheduled_time,
            estimated_time: None,
            actual_time: None,
            state_codes: vec![StateCode::Unknown],
            aircraft_type: String::new(),
            destination: String::new(),
            gate: String::new(),
            pier: String::new(),
            route_region: RouteRegion::Unknown,
            last_updated_at: None,
            operating_carrier_prefix: String::new(),
        }
    }

    /// First state code; `Unknown` when the list is empty.
    pub fn primary_state(&self) -> &StateCode {
        self.state_codes.first().unwrap_or(&StateCode::Unknown)
    }

    pub fn has_state(&self, code: &StateCode) -> bool {
        self.state_codes.contains(code)
    }

    pub fn has_any_state(&self, codes: &[StateCode]) -> bool {
        self.state_codes.iter().any(|c| codes.contains(c))
    }

    pub fn is_cancelled(&self) -> bool {
        self.has_any_state(CANCELLED_STATES)
    }

    /// Gate is set and is not a placeholder.
    pub fn has_assigned_gate(&self) -> bool {
        let gate = self.gate.trim();
        !gate.is_empty() && !gate.eq_ignore_ascii_case("TBD")
    }

    /// Best known off-block (or on-block) time: actual, then estimated, then scheduled.
    pub fn best_known_time(&self) -> DateTime<Utc> {
        self.actual_time
            .or(self.estimated_time)
            .unwrap_or(self.scheduled_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("D"), Some(Direction::Departure));
        assert_eq!(Direction::parse("arrival"), Some(Direction::Arrival));
        assert_eq!(Direction::parse("x"), None);
        assert_eq!(Direction::Arrival.api_code(), "A");
    }

    #[test]
    fn test_route_region_parse() {
        assert_eq!(RouteRegion::parse("s"), RouteRegion::Schengen);
        assert_eq!(RouteRegion::parse("E"), RouteRegion::Eu);
        assert_eq!(RouteRegion::parse("N"), RouteRegion::NonEu);
        assert_eq!(RouteRegion::parse("?"), RouteRegion::Unknown);
    }

    #[test]
    fn test_primary_state_of_empty_list() {
        let mut flight = FlightRecord::new("KL1001", 1001, at(10, 0));
        flight.state_codes.clear();
        assert_eq!(flight.primary_state(), &StateCode::Unknown);
    }

    #[test]
    fn test_assigned_gate() {
        let mut flight = FlightRecord::new("KL1001", 1001, at(10, 0));
        assert!(!flight.has_assigned_gate());
        flight.gate = "tbd".to_string();
        assert!(!flight.has_assigned_gate());
        flight.gate = "D7".to_string();
        assert!(flight.has_assigned_gate());
    }

    #[test]
    fn test_best_known_time_order() {
        let mut flight = FlightRecord::new("KL1001", 1001, at(10, 0));
        assert_eq!(flight.best_known_time(), at(10, 0));
        flight.estimated_time = Some(at(10, 20));
        assert_eq!(flight.best_known_time(), at(10, 20));
        flight.actual_time = Some(at(10, 25));
        assert_eq!(flight.best_known_time(), at(10, 25));
    }

    #[test]
    fn test_is_cancelled() {
        let mut flight = FlightRecord::new("KL1001", 1001, at(10, 0));
        assert!(!flight.is_cancelled());
        flight.state_codes = vec![StateCode::Del, StateCode::Cnx];
        assert!(flight.is_cancelled());
    }
}
