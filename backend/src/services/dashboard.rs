//! Dashboard pipeline.
//!
//! Composes the pure stages into one [`DashboardSnapshot`]:
//! normalize, prune stale records, deduplicate, filter, then derive gate
//! snapshots, pier roll-ups, delay statistics and stacked timelines.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;

use super::delays::{summarize_delays, worst_delays};
use super::filtering::{deduplicate, filter_flights, remove_stale, FlightFilter};
use super::fingerprint::flight_set_fingerprint;
use super::gate_status::{classify_gate, compute_utilization, UtilizationParams};
use super::normalizer::normalize_flights;
use super::stacking::{stack_intervals, DEFAULT_MIN_VISUAL_WIDTH_SECS};
use super::timeline::{build_intervals, clip_to_window};
use crate::models::{Direction, FlightRecord, AIRPORT_TZ};
use crate::routes::dashboard::DashboardSnapshot;
use crate::routes::gates::{GateSnapshot, GateStatus, PierSummary};
use crate::routes::timeline::GateTimeline;
use crate::sources::FlightQuery;

/// Tunables for one pipeline run.
#[derive(Debug, Clone)]
pub struct DashboardParams {
    pub utilization: UtilizationParams,
    pub timezone: Tz,
    /// Carrier used when the query names none.
    pub default_carrier: Option<String>,
    /// Direction used when the query names none.
    pub default_direction: Option<Direction>,
    pub max_age_hours: i64,
    /// Drop purely cancelled flights. Off by default: the timeline shows them.
    pub operational_only: bool,
    /// Width of the timeline window, centred on `now`.
    pub display_window_hours: f64,
    pub min_visual_width: Duration,
    /// Gates forced into `Maintenance`.
    pub maintenance_gates: Vec<String>,
    pub worst_delay_limit: usize,
}

impl Default for DashboardParams {
    fn default() -> Self {
        Self {
            utilization: UtilizationParams::default(),
            timezone: AIRPORT_TZ,
            default_carrier: None,
            default_direction: None,
            max_age_hours: 24,
            operational_only: false,
            display_window_hours: 12.0,
            min_visual_width: Duration::seconds(DEFAULT_MIN_VISUAL_WIDTH_SECS),
            maintenance_gates: Vec::new(),
            worst_delay_limit: 10,
        }
    }
}

impl DashboardParams {
    /// Filter for `query`, falling back to the configured defaults.
    pub fn filter_for(&self, query: &FlightQuery) -> FlightFilter {
        let mut filter = FlightFilter {
            timezone: self.timezone,
            date: query.date,
            direction: query.direction.or(self.default_direction),
            operational_only: self.operational_only,
            ..FlightFilter::default()
        };
        if let Some(carrier) = query.carrier.as_ref().or(self.default_carrier.as_ref()) {
            filter = filter.with_carrier(carrier.clone());
        }
        filter
    }

    pub fn is_under_maintenance(&self, gate_id: &str) -> bool {
        self.maintenance_gates
            .iter()
            .any(|g| g.trim().eq_ignore_ascii_case(gate_id))
    }

    /// `[now - w/2, now + w/2]` for display window width `w`, clamped to
    /// chrono's representable range. Negative or NaN widths collapse to `now`.
    pub fn display_window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        // `as` saturates, so an infinite width fails `try_seconds` below
        let half_secs = (self.display_window_hours.max(0.0) * 1800.0).round() as i64;
        let half = Duration::try_seconds(half_secs);
        let start = half
            .and_then(|h| now.checked_sub_signed(h))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let end = half
            .and_then(|h| now.checked_add_signed(h))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (start, end)
    }
}

/// Normalize, prune, deduplicate and filter a raw upstream payload.
pub fn prepare_flights(
    raw: &[Value],
    query: &FlightQuery,
    now: DateTime<Utc>,
    params: &DashboardParams,
) -> Vec<FlightRecord> {
    let normalized = normalize_flights(raw, params.timezone);
    let fresh = remove_stale(&normalized, params.max_age_hours, now);
    let unique = deduplicate(&fresh);
    let kept = filter_flights(&unique, &params.filter_for(query));
    debug!(
        "Prepared flights: {} raw, {} fresh, {} unique, {} kept",
        raw.len(),
        fresh.len(),
        unique.len(),
        kept.len()
    );
    kept
}

/// Group flights by gate. Flights without an assigned gate are skipped.
pub fn group_by_gate(flights: &[FlightRecord]) -> BTreeMap<GateKey, Vec<FlightRecord>> {
    let mut gates: BTreeMap<GateKey, Vec<FlightRecord>> = BTreeMap::new();
    for flight in flights.iter().filter(|f| f.has_assigned_gate()) {
        gates
            .entry(GateKey::new(&flight.gate))
            .or_default()
            .push(flight.clone());
    }
    gates
}

/// Gate identifier with natural ordering (`D2` before `D10`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GateKey {
    prefix: String,
    number: u32,
    id: String,
}

impl GateKey {
    pub fn new(raw: &str) -> Self {
        let id = raw.trim().to_ascii_uppercase();
        let prefix: String = id.chars().take_while(|c| !c.is_ascii_digit()).collect();
        let number = id[prefix.len()..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect::<String>()
            .parse()
            .unwrap_or(0);
        Self { prefix, number, id }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Pier letter implied by the gate id, e.g. `D` for `D7`.
    pub fn implied_pier(&self) -> &str {
        &self.prefix
    }
}

fn gate_pier(key: &GateKey, flights: &[FlightRecord]) -> String {
    flights
        .iter()
        .map(|f| f.pier.trim())
        .find(|p| !p.is_empty())
        .unwrap_or_else(|| key.implied_pier())
        .to_ascii_uppercase()
}

/// Status and utilization of every gate with at least one flight.
pub fn build_gate_snapshots(
    flights: &[FlightRecord],
    now: DateTime<Utc>,
    params: &DashboardParams,
) -> Vec<GateSnapshot> {
    group_by_gate(flights)
        .into_iter()
        .map(|(key, gate_flights)| {
            let status = if params.is_under_maintenance(key.id()) {
                GateStatus::Maintenance
            } else {
                classify_gate(&gate_flights, now)
            };
            GateSnapshot {
                gate_id: key.id().to_string(),
                pier: gate_pier(&key, &gate_flights),
                utilization: compute_utilization(&gate_flights, now, &params.utilization),
                status,
                flights: gate_flights,
            }
        })
        .collect()
}

/// Roll gate snapshots up per pier, ordered by pier name.
pub fn pier_summaries(gates: &[GateSnapshot]) -> Vec<PierSummary> {
    let mut piers: BTreeMap<&str, PierSummary> = BTreeMap::new();
    for gate in gates {
        let summary = piers.entry(gate.pier.as_str()).or_insert_with(|| PierSummary {
            pier: gate.pier.clone(),
            gate_count: 0,
            occupied_gates: 0,
            flight_count: 0,
        });
        summary.gate_count += 1;
        summary.flight_count += gate.flights.len();
        if gate.status == GateStatus::Occupied {
            summary.occupied_gates += 1;
        }
    }
    piers.into_values().collect()
}

/// Stacked timeline rows for each gate, clipped to the display window.
pub fn build_gate_timelines(
    gates: &[GateSnapshot],
    now: DateTime<Utc>,
    params: &DashboardParams,
) -> Vec<GateTimeline> {
    let (window_start, window_end) = params.display_window(now);
    gates
        .iter()
        .map(|gate| {
            let intervals = clip_to_window(
                build_intervals(&gate.flights, now),
                window_start,
                window_end,
            );
            let layout = stack_intervals(intervals, params.min_visual_width);
            GateTimeline {
                gate_id: gate.gate_id.clone(),
                pier: gate.pier.clone(),
                max_concurrency: layout.max_concurrency(),
                layout,
            }
        })
        .collect()
}

/// Derive a full snapshot from prepared flights.
pub fn build_dashboard(
    flights: &[FlightRecord],
    query: &FlightQuery,
    now: DateTime<Utc>,
    params: &DashboardParams,
) -> DashboardSnapshot {
    let gates = build_gate_snapshots(flights, now, params);
    let piers = pier_summaries(&gates);
    let timelines = build_gate_timelines(&gates, now, params);
    let (window_start, window_end) = params.display_window(now);

    debug!(
        "Built dashboard: {} flights over {} gates in {} piers",
        flights.len(),
        gates.len(),
        piers.len()
    );

    DashboardSnapshot {
        snapshot_id: uuid::Uuid::new_v4(),
        generated_at: now,
        fingerprint: flight_set_fingerprint(flights),
        query: query.clone(),
        flight_count: flights.len(),
        gates,
        piers,
        timelines,
        window_start,
        window_end,
        delay_summary: summarize_delays(flights),
        worst_delays: worst_delays(flights, params.worst_delay_limit),
        stale: false,
    }
}

/// Full pipeline from raw upstream records.
pub fn run_pipeline(
    raw: &[Value],
    query: &FlightQuery,
    now: DateTime<Utc>,
    params: &DashboardParams,
) -> DashboardSnapshot {
    let flights = prepare_flights(raw, query, now, params);
    build_dashboard(&flights, query, now, params)
}
