#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use gate_ops::models::Direction;
use gate_ops::services::dashboard::DashboardParams;
use gate_ops::services::snapshot_cache::{CachePolicy, FixedClock, SnapshotCache};
use gate_ops::sources::{FlightSource, StaticFlightSource};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Captured upstream payload for 2024-05-01.
pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("flights.json")
}

/// 11:30 local time on the fixture day.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
}

/// KL departures, as the sample configuration sets up.
pub fn fixture_params() -> DashboardParams {
    DashboardParams {
        default_carrier: Some("KL".to_string()),
        default_direction: Some(Direction::Departure),
        ..DashboardParams::default()
    }
}

pub fn cache_for(source: Arc<dyn FlightSource>, clock: Arc<FixedClock>) -> Arc<SnapshotCache> {
    Arc::new(SnapshotCache::new(
        source,
        clock,
        fixture_params(),
        CachePolicy::default(),
    ))
}

/// Cache over the fixture file with the clock frozen at [`fixture_now`].
pub fn fixture_cache() -> (Arc<SnapshotCache>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(fixture_now()));
    let source = Arc::new(StaticFlightSource::from_file(fixture_path()));
    (cache_for(source, clock.clone()), clock)
}

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to process-global env
/// vars, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}
