//! Flight normalizer.
//!
//! Turns loosely-shaped upstream flight objects into [`FlightRecord`]s. Every
//! accessor is total: missing or malformed fields fall back to a typed default
//! and normalization never fails.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;

use crate::models::{
    combine_local, parse_timestamp, Direction, FlightRecord, RouteRegion, StateCode,
};

/// Walk a nested object path.
fn lookup<'a>(record: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(record, |node, key| node.get(key))
}

/// First non-empty string found among candidate paths.
fn first_str<'a>(record: &'a Value, candidates: &[&[&str]]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|path| lookup(record, path))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn string_or_default(record: &Value, candidates: &[&[&str]]) -> String {
    first_str(record, candidates).unwrap_or_default().to_string()
}

/// First candidate that parses as a timestamp. Unparseable values are skipped.
fn first_timestamp(record: &Value, candidates: &[&[&str]], tz: Tz) -> Option<DateTime<Utc>> {
    candidates
        .iter()
        .filter_map(|path| lookup(record, path))
        .filter_map(Value::as_str)
        .find_map(|raw| parse_timestamp(raw, tz))
}

/// Integral floats (`1001.0`) are accepted; fractional or out-of-range values are not.
fn whole_number(value: f64) -> Option<i64> {
    let in_range = value.is_finite() && value.abs() < i64::MAX as f64;
    (in_range && value.fract() == 0.0).then_some(value as i64)
}

fn flight_number(record: &Value, flight_name: &str) -> i64 {
    let from_field = ["flightNumber", "flight_number"]
        .iter()
        .filter_map(|key| record.get(key))
        .find_map(|v| match v {
            Value::Number(n) => n.as_i64().or_else(|| whole_number(n.as_f64()?)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });

    from_field.unwrap_or_else(|| {
        let digits: String = flight_name
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        digits.parse().unwrap_or(0)
    })
}

fn state_codes(record: &Value) -> Vec<StateCode> {
    let raw = lookup(record, &["publicFlightState", "flightStates"])
        .or_else(|| record.get("flightStates"))
        .or_else(|| record.get("stateCodes"));

    let codes: Vec<StateCode> = match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(StateCode::parse)
            .filter(|c| *c != StateCode::Unknown)
            .collect(),
        Some(Value::String(single)) => single
            .split(',')
            .map(StateCode::parse)
            .filter(|c| *c != StateCode::Unknown)
            .collect(),
        _ => Vec::new(),
    };

    if codes.is_empty() {
        vec![StateCode::Unknown]
    } else {
        codes
    }
}

fn aircraft_type(record: &Value) -> String {
    match record.get("aircraftType") {
        Some(Value::Object(_)) => string_or_default(
            record,
            &[&["aircraftType", "iataMain"], &["aircraftType", "iataSub"]],
        ),
        Some(Value::String(s)) => s.trim().to_string(),
        _ => string_or_default(record, &[&["aircraft_type"], &["aircraft"]]),
    }
}

fn destination(record: &Value) -> String {
    if let Some(first) = lookup(record, &["route", "destinations"])
        .and_then(Value::as_array)
        .and_then(|d| d.iter().filter_map(Value::as_str).next())
    {
        return first.trim().to_string();
    }
    string_or_default(record, &[&["destination"], &["route", "destination"]])
}

fn scheduled_time(record: &Value, tz: Tz) -> DateTime<Utc> {
    first_timestamp(
        record,
        &[&["scheduleDateTime"], &["scheduledTime"], &["scheduled_time"]],
        tz,
    )
    .or_else(|| {
        let date = first_str(record, &[&["scheduleDate"]])?;
        let time = first_str(record, &[&["scheduleTime"]])?;
        combine_local(date, time, tz)
    })
    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Airline designator at the front of a flight code.
///
/// `KL1001` -> `KL`, `KLM1001` -> `KLM`. Designators with a digit (`U21234`,
/// `9W123`) fall back to the two-character IATA form.
fn airline_prefix(code: &str) -> Option<String> {
    let code = code.trim();
    let letters: String = code.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    if letters.len() >= 2 {
        return Some(letters);
    }
    let iata: String = code.chars().take(2).collect();
    (iata.len() == 2 && iata.chars().all(|c| c.is_ascii_alphanumeric())).then_some(iata)
}

/// Operating carrier: explicit field, else the main flight's designator, else
/// the record's own IATA prefix, else the designator of its flight name.
fn operating_carrier(record: &Value, flight_name: &str) -> String {
    first_str(record, &[&["operatingCarrier"], &["operating_carrier"]])
        .map(str::to_string)
        .or_else(|| {
            first_str(record, &[&["mainFlight"], &["main_flight"]]).and_then(airline_prefix)
        })
        .or_else(|| first_str(record, &[&["prefixIATA"]]).map(str::to_string))
        .or_else(|| airline_prefix(flight_name))
        .unwrap_or_default()
        .to_ascii_uppercase()
}

/// Normalize one raw flight object, reading offset-less times in `tz`.
pub fn normalize_flight(record: &Value, tz: Tz) -> FlightRecord {
    let flight_name = string_or_default(record, &[&["flightName"], &["flight_name"], &["name"]]);
    let direction = first_str(record, &[&["flightDirection"], &["direction"]])
        .and_then(Direction::parse)
        .unwrap_or_default();

    let estimated_paths: &[&[&str]] = match direction {
        Direction::Departure => &[&["publicEstimatedOffBlockTime"], &["estimatedTime"]],
        Direction::Arrival => &[&["estimatedLandingTime"], &["estimatedTime"]],
    };
    let actual_paths: &[&[&str]] = match direction {
        Direction::Departure => &[&["actualOffBlockTime"], &["actualTime"]],
        Direction::Arrival => &[&["actualLandingTime"], &["actualOnBlockTime"], &["actualTime"]],
    };

    FlightRecord {
        flight_number: flight_number(record, &flight_name),
        main_flight: string_or_default(record, &[&["mainFlight"], &["main_flight"]]),
        direction,
        scheduled_time: scheduled_time(record, tz),
        estimated_time: first_timestamp(record, estimated_paths, tz),
        actual_time: first_timestamp(record, actual_paths, tz),
        state_codes: state_codes(record),
        aircraft_type: aircraft_type(record),
        destination: destination(record),
        gate: string_or_default(record, &[&["gate"]]),
        pier: string_or_default(record, &[&["pier"]]),
        route_region: first_str(record, &[&["route", "eu"], &["routeRegion"]])
            .map(RouteRegion::parse)
            .unwrap_or_default(),
        last_updated_at: first_timestamp(
            record,
            &[&["lastUpdatedAt"], &["last_updated_at"]],
            tz,
        ),
        operating_carrier_prefix: operating_carrier(record, &flight_name),
        flight_name,
    }
}

/// Normalize a list of raw flight objects.
pub fn normalize_flights(records: &[Value], tz: Tz) -> Vec<FlightRecord> {
    records.iter().map(|r| normalize_flight(r, tz)).collect()
}

/// Normalize an API page: either a bare array or an object with a `flights` array.
pub fn normalize_payload(payload: &Value, tz: Tz) -> Vec<FlightRecord> {
    match payload {
        Value::Array(items) => normalize_flights(items, tz),
        Value::Object(_) => payload
            .get("flights")
            .and_then(Value::as_array)
            .map(|items| normalize_flights(items, tz))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AIRPORT_TZ;
    use chrono::{TimeZone, Timelike};
    use serde_json::json;

    fn schiphol_departure() -> Value {
        json!({
            "flightName": "KL1001",
            "flightNumber": 1001,
            "mainFlight": "KL1001",
            "prefixIATA": "KL",
            "flightDirection": "D",
            "scheduleDateTime": "2024-05-01T10:00:00.000+02:00",
            "scheduleDate": "2024-05-01",
            "scheduleTime": "10:00:00",
            "publicEstimatedOffBlockTime": "2024-05-01T10:20:00.000+02:00",
            "actualOffBlockTime": null,
            "lastUpdatedAt": "2024-05-01T09:50:12.000+02:00",
            "publicFlightState": { "flightStates": ["BRD", "DEL"] },
            "aircraftType": { "iataMain": "73H", "iataSub": "73W" },
            "route": { "destinations": ["LHR"], "eu": "E" },
            "gate": "D7",
            "pier": "D"
        })
    }

    #[test]
    fn test_normalize_nested_shape() {
        let flight = normalize_flight(&schiphol_departure(), AIRPORT_TZ);

        assert_eq!(flight.flight_name, "KL1001");
        assert_eq!(flight.flight_number, 1001);
        assert_eq!(flight.direction, Direction::Departure);
        assert_eq!(flight.scheduled_time, Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap());
        assert_eq!(flight.estimated_time.unwrap().minute(), 20);
        assert!(flight.actual_time.is_none());
        assert_eq!(flight.state_codes, vec![StateCode::Brd, StateCode::Del]);
        assert_eq!(flight.aircraft_type, "73H");
        assert_eq!(flight.destination, "LHR");
        assert_eq!(flight.gate, "D7");
        assert_eq!(flight.pier, "D");
        assert_eq!(flight.route_region, RouteRegion::Eu);
        assert_eq!(flight.operating_carrier_prefix, "KL");
        assert!(flight.last_updated_at.is_some());
    }

    #[test]
    fn test_normalize_flat_shape() {
        let raw = json!({
            "flightName": "HV5131",
            "flightNumber": "5131",
            "direction": "departure",
            "scheduledTime": "2024-05-01T07:30:00Z",
            "estimatedTime": "2024-05-01T07:45:00Z",
            "actualTime": "2024-05-01T07:50:00Z",
            "flightStates": ["DEP"],
            "aircraftType": "320",
            "destination": "BCN",
            "operatingCarrier": "hv"
        });
        let flight = normalize_flight(&raw, AIRPORT_TZ);

        assert_eq!(flight.flight_number, 5131);
        assert_eq!(flight.state_codes, vec![StateCode::Dep]);
        assert_eq!(flight.aircraft_type, "320");
        assert_eq!(flight.destination, "BCN");
        assert_eq!(flight.operating_carrier_prefix, "HV");
        assert_eq!(flight.actual_time.unwrap().minute(), 50);
        assert_eq!(flight.estimated_time.unwrap().minute(), 45);
    }

    #[test]
    fn test_normalize_empty_object_uses_defaults() {
        let flight = normalize_flight(&json!({}), AIRPORT_TZ);

        assert_eq!(flight.flight_name, "");
        assert_eq!(flight.flight_number, 0);
        assert_eq!(flight.scheduled_time, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(flight.state_codes, vec![StateCode::Unknown]);
        assert_eq!(flight.gate, "");
        assert_eq!(flight.pier, "");
        assert_eq!(flight.route_region, RouteRegion::Unknown);
        assert!(flight.last_updated_at.is_none());
    }

    #[test]
    fn test_normalize_non_object_input() {
        let flight = normalize_flight(&json!("garbage"), AIRPORT_TZ);
        assert_eq!(flight.state_codes, vec![StateCode::Unknown]);
        assert_eq!(flight.scheduled_time, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_schedule_from_date_and_time_fields() {
        let raw = json!({
            "flightName": "KL0601",
            "scheduleDate": "2024-01-10",
            "scheduleTime": "09:15:00"
        });
        let flight = normalize_flight(&raw, AIRPORT_TZ);
        assert_eq!(flight.scheduled_time, Utc.with_ymd_and_hms(2024, 1, 10, 8, 15, 0).unwrap());
        // Flight number derived from the trailing digits of the name
        assert_eq!(flight.flight_number, 601);
    }

    #[test]
    fn test_invalid_timestamps_treated_as_absent() {
        let raw = json!({
            "flightName": "KL1",
            "scheduleDateTime": "2024-05-01T10:00:00+02:00",
            "publicEstimatedOffBlockTime": "soon",
            "actualOffBlockTime": "",
            "lastUpdatedAt": 12345
        });
        let flight = normalize_flight(&raw, AIRPORT_TZ);
        assert!(flight.estimated_time.is_none());
        assert!(flight.actual_time.is_none());
        assert!(flight.last_updated_at.is_none());
    }

    #[test]
    fn test_arrival_uses_landing_times() {
        let raw = json!({
            "flightName": "KL0642",
            "flightDirection": "A",
            "scheduleDateTime": "2024-05-01T06:00:00+02:00",
            "estimatedLandingTime": "2024-05-01T06:10:00+02:00",
            "actualLandingTime": "2024-05-01T06:08:00+02:00",
            "publicEstimatedOffBlockTime": "2024-05-01T23:00:00+02:00"
        });
        let flight = normalize_flight(&raw, AIRPORT_TZ);
        assert_eq!(flight.direction, Direction::Arrival);
        assert_eq!(flight.estimated_time.unwrap().minute(), 10);
        assert_eq!(flight.actual_time.unwrap().minute(), 8);
    }

    #[test]
    fn test_blank_states_fall_back_to_unknown() {
        let raw = json!({ "publicFlightState": { "flightStates": ["", null] } });
        let flight = normalize_flight(&raw, AIRPORT_TZ);
        assert_eq!(flight.state_codes, vec![StateCode::Unknown]);
    }

    #[test]
    fn test_normalize_payload_shapes() {
        let page = json!({ "flights": [schiphol_departure(), schiphol_departure()] });
        assert_eq!(normalize_payload(&page, AIRPORT_TZ).len(), 2);

        let bare = json!([schiphol_departure()]);
        assert_eq!(normalize_payload(&bare, AIRPORT_TZ).len(), 1);

        assert!(normalize_payload(&json!({ "other": 1 }), AIRPORT_TZ).is_empty());
        assert!(normalize_payload(&json!(42), AIRPORT_TZ).is_empty());
    }

    #[test]
    fn test_codeshare_takes_operating_carrier_from_main_flight() {
        let raw = json!({
            "flightName": "DL9361",
            "mainFlight": "KL1001",
            "prefixIATA": "DL",
            "flightDirection": "D"
        });
        let flight = normalize_flight(&raw, AIRPORT_TZ);
        assert_eq!(flight.operating_carrier_prefix, "KL");
        assert_eq!(flight.main_flight, "KL1001");
    }

    #[test]
    fn test_operating_carrier_fallbacks() {
        let explicit = json!({ "flightName": "DL9361", "mainFlight": "KL1001", "operatingCarrier": "af" });
        assert_eq!(normalize_flight(&explicit, AIRPORT_TZ).operating_carrier_prefix, "AF");

        let prefix_only = json!({ "flightName": "HV5131", "prefixIATA": "hv" });
        assert_eq!(normalize_flight(&prefix_only, AIRPORT_TZ).operating_carrier_prefix, "HV");

        let numeric_designator = json!({ "flightName": "U21234", "mainFlight": "U21234" });
        assert_eq!(normalize_flight(&numeric_designator, AIRPORT_TZ).operating_carrier_prefix, "U2");

        let icao = json!({ "flightName": "KLM1001" });
        assert_eq!(normalize_flight(&icao, AIRPORT_TZ).operating_carrier_prefix, "KLM");

        assert_eq!(normalize_flight(&json!({}), AIRPORT_TZ).operating_carrier_prefix, "");
    }

    #[test]
    fn test_fractional_flight_number_is_not_truncated() {
        let whole = json!({ "flightName": "KL1001", "flightNumber": 1001.0 });
        assert_eq!(normalize_flight(&whole, AIRPORT_TZ).flight_number, 1001);

        // Falls back to the digits of the flight name
        let fractional = json!({ "flightName": "KL1001", "flightNumber": 7.5 });
        assert_eq!(normalize_flight(&fractional, AIRPORT_TZ).flight_number, 1001);

        let huge = json!({ "flightName": "KL1001", "flightNumber": 1.0e30 });
        assert_eq!(normalize_flight(&huge, AIRPORT_TZ).flight_number, 1001);
    }
}
