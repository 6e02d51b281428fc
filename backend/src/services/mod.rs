//! Service layer for gate operations logic.
//!
//! Everything here except [`snapshot_cache`] is a pure function of its inputs
//! and an explicit `now`. The cache owns the only shared state: the upstream
//! source, the clock and the latest snapshot per query.

pub mod dashboard;
pub mod delays;
pub mod filtering;
pub mod fingerprint;
pub mod gate_status;
pub mod normalizer;
pub mod snapshot_cache;
pub mod stacking;
pub mod timeline;

pub use dashboard::{build_dashboard, prepare_flights, run_pipeline, DashboardParams};
pub use delays::{delay_report, summarize_delays, worst_delays};
pub use filtering::{deduplicate, filter_flights, remove_stale, FlightFilter};
pub use gate_status::{classify_gate, compute_utilization, UtilizationParams};
pub use normalizer::{normalize_flight, normalize_flights, normalize_payload};
pub use snapshot_cache::{CachePolicy, Clock, FixedClock, SnapshotCache, SystemClock};
pub use stacking::stack_intervals;
pub use timeline::{build_interval, clip_to_window, departure_time, HaulType};
