use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Timezone of the airport whose flight board is being analysed.
pub const AIRPORT_TZ: Tz = chrono_tz::Europe::Amsterdam;

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%z"];
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse an upstream timestamp.
///
/// Accepts RFC 3339 (with or without fractional seconds), `+hhmm` offsets, and
/// offset-less local timestamps which are interpreted in `tz`. Anything else
/// yields `None` so callers fall through to the next-best time.
pub fn parse_timestamp(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::<FixedOffset>::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| local_to_utc(naive, tz))
}

/// Combine a calendar date and a wall-clock time (`HH:MM[:SS]`) in `tz`.
pub fn combine_local(date: &str, time: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M"))
        .ok()?;
    local_to_utc(date.and_time(time), tz)
}

/// Resolve a local wall-clock time, taking the earlier instant across a DST fold.
pub fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Calendar date of `dt` as seen on the airport's local clock.
pub fn local_date(dt: DateTime<Utc>, tz: Tz) -> NaiveDate {
    dt.with_timezone(&tz).date_naive()
}

/// Signed difference `later - earlier` in fractional minutes.
pub fn minutes_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_seconds() as f64 / 60.0
}
