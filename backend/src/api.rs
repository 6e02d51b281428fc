//! Public API surface for the gate operations backend.
//!
//! This file consolidates the DTO types for the HTTP API.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::models::{Direction, FlightRecord, RouteRegion, StateCode};
pub use crate::routes::dashboard::DashboardSnapshot;
pub use crate::routes::delays::DelayReport;
pub use crate::routes::delays::DelaySummary;
pub use crate::routes::delays::FlightDelay;
pub use crate::routes::gates::GateOverviewData;
pub use crate::routes::gates::GateSnapshot;
pub use crate::routes::gates::GateStatus;
pub use crate::routes::gates::PierSummary;
pub use crate::routes::gates::TemporalPhase;
pub use crate::routes::gates::Utilization;
pub use crate::routes::timeline::GateInterval;
pub use crate::routes::timeline::GateTimeline;
pub use crate::routes::timeline::GateTimelineData;
pub use crate::routes::timeline::LaneAssignment;
pub use crate::sources::FlightQuery;
