//! Delay analysis.

use chrono::{DateTime, Utc};

use crate::models::{minutes_between, FlightRecord, StateCode};
use crate::routes::delays::{DelayReport, DelaySummary, FlightDelay};

/// Delay beyond which a flight counts as delayed even without a `DEL` state.
pub const DELAY_THRESHOLD_MINUTES: i64 = 15;

/// Rounded minutes from `scheduled` to `reference`.
pub fn delay_minutes(scheduled: DateTime<Utc>, reference: DateTime<Utc>) -> i64 {
    minutes_between(scheduled, reference).round() as i64
}

/// Delay of a flight against its best known time (actual, then estimated).
pub fn flight_delay_minutes(flight: &FlightRecord) -> i64 {
    delay_minutes(flight.scheduled_time, flight.best_known_time())
}

/// Delayed when flagged `DEL` or running more than the threshold late.
pub fn is_delayed(flight: &FlightRecord) -> bool {
    *flight.primary_state() == StateCode::Del
        || flight_delay_minutes(flight) > DELAY_THRESHOLD_MINUTES
}

pub fn flight_delay(flight: &FlightRecord) -> FlightDelay {
    FlightDelay {
        flight_name: flight.flight_name.clone(),
        flight_number: flight.flight_number,
        gate: flight.gate.clone(),
        scheduled_time: flight.scheduled_time,
        reference_time: flight.best_known_time(),
        delay_minutes: flight_delay_minutes(flight),
        is_delayed: is_delayed(flight),
    }
}

/// Delays in canonical order (scheduled time, then flight number).
fn canonical_delays(flights: &[FlightRecord]) -> Vec<FlightDelay> {
    let mut delays: Vec<FlightDelay> = flights.iter().map(flight_delay).collect();
    delays.sort_by(|a, b| {
        a.scheduled_time
            .cmp(&b.scheduled_time)
            .then(a.flight_number.cmp(&b.flight_number))
    });
    delays
}

/// Aggregate delay statistics. The result does not depend on input order.
pub fn summarize_delays(flights: &[FlightRecord]) -> DelaySummary {
    let delays = canonical_delays(flights);
    let delayed: Vec<&FlightDelay> = delays.iter().filter(|d| d.is_delayed).collect();

    let mean_delay_minutes = if delayed.is_empty() {
        0.0
    } else {
        delayed.iter().map(|d| d.delay_minutes as f64).sum::<f64>() / delayed.len() as f64
    };

    let total_delay_minutes: i64 = delayed.iter().map(|d| d.delay_minutes.max(0)).sum();

    // The earlier best is kept on ties
    let max_delay = delayed
        .iter()
        .copied()
        .fold(None::<&FlightDelay>, |best, d| match best {
            Some(b) if b.delay_minutes >= d.delay_minutes => Some(b),
            _ => Some(d),
        })
        .cloned();

    DelaySummary {
        flight_count: delays.len(),
        delayed_count: delayed.len(),
        mean_delay_minutes,
        total_delay_minutes,
        max_delay,
    }
}

/// Delayed flights sorted by delay, largest first.
pub fn worst_delays(flights: &[FlightRecord], limit: usize) -> Vec<FlightDelay> {
    let mut delays: Vec<FlightDelay> = canonical_delays(flights)
        .into_iter()
        .filter(|d| d.is_delayed)
        .collect();
    // Stable sort keeps canonical order among equal delays
    delays.sort_by(|a, b| b.delay_minutes.cmp(&a.delay_minutes));
    delays.truncate(limit);
    delays
}

pub fn delay_report(flights: &[FlightRecord], limit: usize) -> DelayReport {
    DelayReport {
        summary: summarize_delays(flights),
        worst_delays: worst_delays(flights, limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, 0).unwrap()
    }

    fn flight(number: i64, scheduled: DateTime<Utc>) -> FlightRecord {
        let mut f = FlightRecord::new(format!("KL{}", number), number, scheduled);
        f.state_codes = vec![StateCode::Sch];
        f
    }

    #[test]
    fn test_estimated_fifteen_minutes_late() {
        let mut f = flight(1, at(10, 0));
        f.estimated_time = Some(at(10, 15));
        assert_eq!(flight_delay_minutes(&f), 15);
        // Exactly at the threshold is not delayed
        assert!(!is_delayed(&f));
    }

    #[test]
    fn test_early_flight_is_not_delayed() {
        let mut f = flight(1, at(10, 0));
        f.estimated_time = Some(at(9, 45));
        assert_eq!(flight_delay_minutes(&f), -15);
        assert!(!is_delayed(&f));
    }

    #[test]
    fn test_actual_time_takes_precedence() {
        let mut f = flight(1, at(10, 0));
        f.estimated_time = Some(at(10, 5));
        f.actual_time = Some(at(10, 40));
        assert_eq!(flight_delay_minutes(&f), 40);
        assert!(is_delayed(&f));
    }

    #[test]
    fn test_delay_rounds_to_nearest_minute() {
        let scheduled = at(10, 0);
        assert_eq!(delay_minutes(scheduled, scheduled + chrono::Duration::seconds(89)), 1);
        assert_eq!(delay_minutes(scheduled, scheduled + chrono::Duration::seconds(90)), 2);
    }

    #[test]
    fn test_del_state_counts_without_time_shift() {
        let mut f = flight(1, at(10, 0));
        f.state_codes = vec![StateCode::Del];
        assert_eq!(flight_delay_minutes(&f), 0);
        assert!(is_delayed(&f));
    }

    #[test]
    fn test_summary_over_delayed_only() {
        let mut a = flight(1, at(10, 0));
        a.estimated_time = Some(at(10, 30));
        let mut b = flight(2, at(11, 0));
        b.actual_time = Some(at(11, 50));
        let on_time = flight(3, at(12, 0));
        let mut early = flight(4, at(13, 0));
        early.estimated_time = Some(at(12, 50));

        let summary = summarize_delays(&[a, b, on_time, early]);
        assert_eq!(summary.flight_count, 4);
        assert_eq!(summary.delayed_count, 2);
        assert_eq!(summary.mean_delay_minutes, 40.0);
        assert_eq!(summary.total_delay_minutes, 80);
        assert_eq!(summary.max_delay.unwrap().flight_number, 2);
    }

    #[test]
    fn test_summary_independent_of_order() {
        let mut a = flight(1, at(10, 0));
        a.estimated_time = Some(at(10, 30));
        let mut b = flight(2, at(11, 0));
        b.estimated_time = Some(at(11, 30));

        let forward = summarize_delays(&[a.clone(), b.clone()]);
        let backward = summarize_delays(&[b, a]);
        assert_eq!(forward, backward);
        // Tie on 30 minutes: the earlier scheduled flight wins
        assert_eq!(forward.max_delay.unwrap().flight_number, 1);
    }

    #[test]
    fn test_summary_of_empty_set() {
        let summary = summarize_delays(&[]);
        assert_eq!(summary, DelaySummary::default());
    }

    #[test]
    fn test_worst_delays_sorted_and_limited() {
        let flights: Vec<FlightRecord> = [(1, 20), (2, 60), (3, 5), (4, 45)]
            .iter()
            .map(|(n, late)| {
                let mut f = flight(*n, at(10, 0));
                f.estimated_time = Some(at(10, 0) + chrono::Duration::minutes(*late));
                f
            })
            .collect();

        let worst = worst_delays(&flights, 2);
        let numbers: Vec<i64> = worst.iter().map(|d| d.flight_number).collect();
        assert_eq!(numbers, vec![2, 4]);

        let report = delay_report(&flights, 10);
        assert_eq!(report.worst_delays.len(), 3);
        assert_eq!(report.summary.delayed_count, 3);
    }
}
