//! # Gate Operations Backend
//!
//! Gate occupancy classification and timeline layout for airline operations
//! at Amsterdam Schiphol.
//!
//! Raw records from the Schiphol public flight API are normalized into
//! [`models::FlightRecord`]s, filtered and deduplicated, and turned into a
//! [`routes::dashboard::DashboardSnapshot`]: per-gate status and utilization,
//! delay statistics, and Gantt-style gate timelines stacked into lanes.
//!
//! ## Architecture
//!
//! - [`models`]: Canonical flight record, state codes, time helpers
//! - [`routes`]: Serializable view types, one module per view
//! - [`api`]: Flat re-export of the public DTOs
//! - [`services`]: The pipeline stages and the snapshot cache
//! - [`sources`]: Upstream flight sources (Schiphol API, static fixtures)
//! - [`config`]: `gate-ops.toml` loading and validation
//! - [`http`]: Axum-based HTTP server (feature `http-server`)
//!
//! ## Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use gate_ops::services::{run_pipeline, DashboardParams};
//! use gate_ops::sources::FlightQuery;
//! use serde_json::json;
//!
//! let raw = vec![json!({
//!     "flightName": "KL1001",
//!     "flightNumber": 1001,
//!     "scheduleDateTime": "2024-05-01T12:00:00.000+02:00",
//!     "publicFlightState": {"flightStates": ["BRD"]},
//!     "gate": "D7",
//!     "prefixIATA": "KL"
//! })];
//! let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 45, 0).unwrap();
//! let snapshot = run_pipeline(&raw, &FlightQuery::default(), now, &DashboardParams::default());
//! assert_eq!(snapshot.gates.len(), 1);
//! ```

pub mod api;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
pub mod sources;

#[cfg(feature = "http-server")]
pub mod http;
