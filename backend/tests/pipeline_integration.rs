//! End-to-end pipeline tests over the captured fixture payload.

mod support;

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

use gate_ops::api::{GateStatus, TemporalPhase};
use gate_ops::services::snapshot_cache::FixedClock;
use gate_ops::sources::{FlightQuery, StaticFlightSource};
use support::{cache_for, fixture_cache, fixture_now, fixture_path};

#[tokio::test]
async fn test_fixture_dashboard() {
    let (cache, _clock) = fixture_cache();
    let snapshot = cache.get(&FlightQuery::default()).await.unwrap();

    // Duplicate, codeshare, other carrier, stale record and arrival are gone
    assert_eq!(snapshot.flight_count, 5);

    let gate_ids: Vec<&str> = snapshot.gates.iter().map(|g| g.gate_id.as_str()).collect();
    assert_eq!(gate_ids, vec!["D7", "D8", "E18"]);

    let d7 = snapshot.gate("D7").unwrap();
    assert_eq!(d7.status, GateStatus::Occupied);
    assert_eq!(d7.flights.len(), 2);
    assert_eq!(d7.utilization.current, 33);
    assert_eq!(d7.utilization.daily, 13);
    assert_eq!(d7.utilization.temporal_phase, TemporalPhase::Active);

    assert_eq!(snapshot.gate("D8").unwrap().status, GateStatus::Departed);
    assert_eq!(snapshot.gate("E18").unwrap().status, GateStatus::Scheduled);
}

#[tokio::test]
async fn test_fixture_delays_and_piers() {
    let (cache, _clock) = fixture_cache();
    let snapshot = cache.get(&FlightQuery::default()).await.unwrap();

    assert_eq!(snapshot.delay_summary.delayed_count, 1);
    assert_eq!(snapshot.delay_summary.mean_delay_minutes, 40.0);
    let worst = snapshot.delay_summary.max_delay.as_ref().unwrap();
    assert_eq!(worst.flight_name, "KL1002");
    assert_eq!(worst.delay_minutes, 40);

    assert_eq!(snapshot.piers.len(), 2);
    assert_eq!(snapshot.piers[0].pier, "D");
    assert_eq!(snapshot.piers[0].gate_count, 2);
    assert_eq!(snapshot.piers[0].occupied_gates, 1);
    assert_eq!(snapshot.piers[0].flight_count, 3);
}

#[tokio::test]
async fn test_fixture_timeline_lanes() {
    let (cache, _clock) = fixture_cache();
    let snapshot = cache.get(&FlightQuery::default()).await.unwrap();

    let d7 = snapshot.timeline("D7").unwrap();
    assert_eq!(d7.max_concurrency, 2);
    let first = &d7.layout.lanes[0][0];
    // Schengen flight opens 45 minutes before its 10:00 UTC slot
    assert_eq!(first.flight_name, "KL1001");
    assert_eq!(first.start_time, Utc.with_ymd_and_hms(2024, 5, 1, 9, 15, 0).unwrap());

    let delayed = &d7.layout.lanes[1][0];
    assert_eq!(delayed.flight_name, "KL1002");
    assert!(delayed.is_shifted);
    assert_eq!(delayed.end_time, Utc.with_ymd_and_hms(2024, 5, 1, 11, 10, 0).unwrap());

    let e18 = snapshot.timeline("E18").unwrap();
    assert!(e18.layout.lanes[0][0].is_cancelled);
}

#[tokio::test]
async fn test_query_overrides_configured_carrier() {
    let (cache, _clock) = fixture_cache();
    let query = FlightQuery {
        carrier: Some("hv".to_string()),
        ..FlightQuery::default()
    };
    let snapshot = cache.get(&query).await.unwrap();
    assert_eq!(snapshot.flight_count, 1);
    assert_eq!(snapshot.gates[0].gate_id, "D9");
}

#[tokio::test]
async fn test_date_filter_uses_local_calendar() {
    let (cache, _clock) = fixture_cache();
    let other_day = FlightQuery::for_date(chrono::NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    let snapshot = cache.get(&other_day).await.unwrap();
    assert_eq!(snapshot.flight_count, 0);
    assert!(snapshot.gates.is_empty());
}

#[tokio::test]
async fn test_missing_fixture_serves_stale_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flights.json");
    std::fs::copy(fixture_path(), &path).unwrap();

    let clock = Arc::new(FixedClock::new(fixture_now()));
    let cache = cache_for(Arc::new(StaticFlightSource::from_file(&path)), clock.clone());

    let fresh = cache.get(&FlightQuery::default()).await.unwrap();
    assert!(!fresh.stale);

    std::fs::remove_file(&path).unwrap();
    clock.advance(Duration::minutes(10));

    let stale = cache.get(&FlightQuery::default()).await.unwrap();
    assert!(stale.stale);
    assert_eq!(stale.snapshot_id, fresh.snapshot_id);
    assert_eq!(stale.flight_count, fresh.flight_count);
}
