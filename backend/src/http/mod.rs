//! HTTP server module for the gate operations backend.
//!
//! Exposes the snapshot cache as a read-only REST API plus an SSE stream of
//! refreshed snapshots.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Query parsing and validation                           │
//! │  - JSON / SSE responses                                   │
//! │  - CORS, compression, error handling                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  SnapshotCache (services::snapshot_cache)                 │
//! │  - TTL, stale fallback, background refresh                │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  FlightSource (sources/)                                  │
//! │  - SchipholApiSource / StaticFlightSource                 │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
