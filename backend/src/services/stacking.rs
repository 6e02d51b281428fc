//! Lane layout for overlapping gate intervals.

use chrono::Duration;

use crate::routes::timeline::{GateInterval, LaneAssignment};

/// Default minimum rendered width for degenerate intervals.
pub const DEFAULT_MIN_VISUAL_WIDTH_SECS: i64 = 60;

/// Partition intervals into lanes of mutually non-overlapping intervals.
///
/// Greedy first-fit: intervals are taken in start order and placed in the
/// earliest-created lane whose last interval has ended. Lanes are never
/// re-ordered, which keeps the layout stable between refreshes. Degenerate
/// intervals occupy at least `min_width`.
pub fn stack_intervals(mut intervals: Vec<GateInterval>, min_width: Duration) -> LaneAssignment {
    // Stable: equal starts keep input order
    intervals.sort_by_key(|i| i.start_time);

    let mut lanes: Vec<Vec<GateInterval>> = Vec::new();
    for interval in intervals {
        let slot = lanes.iter().position(|lane| {
            lane.last()
                .map_or(true, |last| last.display_end(min_width) <= interval.start_time)
        });
        match slot {
            Some(idx) => lanes[idx].push(interval),
            None => lanes.push(vec![interval]),
        }
    }

    LaneAssignment { lanes }
}
