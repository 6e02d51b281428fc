//! HTTP handlers for the REST API.
//!
//! Each handler resolves its query to a snapshot through the cache and
//! returns a slice of it. Handlers never compute; the pipeline already did.

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use super::dto::{
    DashboardQuery, DashboardSnapshot, DelayQuery, DelayReport, GateDetailResponse,
    GateOverviewData, GateTimeline, GateTimelineData, HealthResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::routes::gates::GateStatus;
use crate::sources::FlightQuery;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

async fn snapshot_for(
    state: &AppState,
    query: &DashboardQuery,
) -> Result<Arc<DashboardSnapshot>, AppError> {
    let flight_query = query.to_flight_query()?;
    Ok(state.cache.get(&flight_query).await?)
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Reports the configured source and the age of the default snapshot without
/// triggering a fetch.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let cached = state.cache.cached(&FlightQuery::default());
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        source: state.config.source.kind.clone(),
        last_snapshot_at: cached.as_ref().map(|s| s.generated_at),
        stale: cached.map(|s| s.stale).unwrap_or(false),
    }))
}

// =============================================================================
// Dashboard
// =============================================================================

/// GET /v1/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> HandlerResult<Arc<DashboardSnapshot>> {
    Ok(Json(snapshot_for(&state, &query).await?))
}

// =============================================================================
// Gates
// =============================================================================

/// GET /v1/gates
pub async fn list_gates(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> HandlerResult<GateOverviewData> {
    let snapshot = snapshot_for(&state, &query).await?;
    let occupied_count = snapshot
        .gates
        .iter()
        .filter(|g| g.status == GateStatus::Occupied)
        .count();

    Ok(Json(GateOverviewData {
        gates: snapshot.gates.clone(),
        piers: snapshot.piers.clone(),
        total_gates: snapshot.gates.len(),
        occupied_count,
    }))
}

/// GET /v1/gates/{gate_id}
pub async fn get_gate(
    State(state): State<AppState>,
    Path(gate_id): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> HandlerResult<GateDetailResponse> {
    let snapshot = snapshot_for(&state, &query).await?;
    let gate = snapshot
        .gate(&gate_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Gate {} not found", gate_id)))?;

    Ok(Json(GateDetailResponse {
        gate,
        timeline: snapshot.timeline(&gate_id).cloned(),
        generated_at: snapshot.generated_at,
        stale: snapshot.stale,
    }))
}

// =============================================================================
// Delays
// =============================================================================

/// GET /v1/delays
///
/// `limit` is capped by the configured worst-delay limit.
pub async fn get_delays(
    State(state): State<AppState>,
    Query(query): Query<DelayQuery>,
) -> HandlerResult<DelayReport> {
    let snapshot = snapshot_for(&state, &query.filter()).await?;
    let limit = query.limit.unwrap_or(snapshot.worst_delays.len());

    Ok(Json(DelayReport {
        summary: snapshot.delay_summary.clone(),
        worst_delays: snapshot.worst_delays.iter().take(limit).cloned().collect(),
    }))
}

// =============================================================================
// Timeline
// =============================================================================

/// GET /v1/timeline
pub async fn get_timeline(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> HandlerResult<GateTimelineData> {
    let snapshot = snapshot_for(&state, &query).await?;
    Ok(Json(GateTimelineData {
        window_start: snapshot.window_start,
        window_end: snapshot.window_end,
        gates: snapshot.timelines.clone(),
    }))
}

/// GET /v1/timeline/{gate_id}
pub async fn get_gate_timeline(
    State(state): State<AppState>,
    Path(gate_id): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> HandlerResult<GateTimeline> {
    let snapshot = snapshot_for(&state, &query).await?;
    snapshot
        .timeline(&gate_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No timeline for gate {}", gate_id)))
}

// =============================================================================
// Streaming
// =============================================================================

/// GET /v1/stream
///
/// Server-Sent Events stream of the snapshots for one query (same parameters
/// as `/v1/dashboard`), starting with the current one.
pub async fn stream_snapshots(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let flight_query = query.to_flight_query()?;
    // Ensure the first event is available immediately
    state.cache.get(&flight_query).await?;

    let stream = state
        .cache
        .watch_query(&flight_query)
        .map(|snapshot| Ok(snapshot_event(&snapshot)));

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

fn snapshot_event(snapshot: &DashboardSnapshot) -> Event {
    Event::default()
        .event("snapshot")
        .id(snapshot.snapshot_id.to_string())
        .data(serde_json::to_string(snapshot).unwrap_or_default())
}
