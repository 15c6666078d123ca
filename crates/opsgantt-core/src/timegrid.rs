//! Time grid: instant normalization, step alignment and tick generation
//!
//! Everything here is pure. Unparseable input becomes `None` and is treated
//! as absent downstream; nothing in this module fails or panics.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::warn;

use crate::{Group, RawInstant, Timestamp};

/// The aligned time axis for one render pass
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
    pub step_minutes: u32,
    /// `start..=end` spaced `step_minutes` apart
    pub ticks: Vec<Timestamp>,
}

impl TimeRange {
    /// Build a range from already aligned bounds
    pub fn new(start: Timestamp, end: Timestamp, step_minutes: u32) -> Self {
        Self {
            ticks: build_ticks(start, end, step_minutes),
            start,
            end,
            step_minutes,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// One header column per tick
    pub fn column_count(&self) -> usize {
        self.ticks.len()
    }

    pub fn grid_width(&self, col_width: f64) -> f64 {
        self.column_count() as f64 * col_width
    }

    pub fn contains(&self, t: Timestamp) -> bool {
        t >= self.start && t <= self.end
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Years an instant may fall in; anything outside is treated as invalid
pub const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Normalize a raw instant; `None` means invalid or absent
pub fn parse_instant(raw: &RawInstant, assumed_offset: FixedOffset) -> Option<Timestamp> {
    let parsed = match raw {
        RawInstant::Missing => None,
        RawInstant::Native(t) => Some(*t),
        RawInstant::EpochMillis(ms) => Utc.timestamp_millis_opt(*ms).single(),
        RawInstant::Text(s) => parse_instant_str(s, assumed_offset),
    };
    parsed.filter(|t| SUPPORTED_YEARS.contains(&t.year()))
}

/// Parse a textual timestamp.
///
/// "date time" becomes "dateTtime". Text without a zone suffix (`Z` or
/// `±HH:MM`) is read in `assumed_offset`.
pub fn parse_instant_str(raw: &str, assumed_offset: FixedOffset) -> Option<Timestamp> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = if trimmed.contains(' ') && !trimmed.contains('T') {
        trimmed.replacen(' ', "T", 1)
    } else {
        trimmed.to_string()
    };

    let (local, offset) = match split_zone(&normalized) {
        Some((local, offset)) => (local, offset),
        None => (normalized.as_str(), assumed_offset),
    };
    let naive = parse_naive(local)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt: DateTime<FixedOffset>| dt.with_timezone(&Utc))
}

/// Split a trailing zone designator off a normalized timestamp
fn split_zone(s: &str) -> Option<(&str, FixedOffset)> {
    if let Some(local) = s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        return Some((local, FixedOffset::east_opt(0)?));
    }
    // The sign must come after the time separator, never inside the date
    let time_start = s.find('T')?;
    let sign_at = s.rfind(['+', '-'])?;
    if sign_at <= time_start {
        return None;
    }
    let offset = crate::config::parse_offset(&s[sign_at..])?;
    Some((&s[..sign_at], offset))
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

// ============================================================================
// Alignment
// ============================================================================

fn step_duration(step_minutes: u32) -> Duration {
    Duration::minutes(i64::from(step_minutes.max(1)))
}

/// Round down to a multiple of `step_minutes` since the Unix epoch
pub fn floor_to_step(t: Timestamp, step_minutes: u32) -> Timestamp {
    let step_secs = i64::from(step_minutes.max(1)) * 60;
    let secs = t.timestamp();
    Utc.timestamp_opt(secs - secs.rem_euclid(step_secs), 0)
        .single()
        .unwrap_or(t)
}

/// Round up to a multiple of `step_minutes` since the Unix epoch.
///
/// Saturates at the floored instant when the next step is not representable.
pub fn ceil_to_step(t: Timestamp, step_minutes: u32) -> Timestamp {
    let floored = floor_to_step(t, step_minutes);
    if floored == t {
        t
    } else {
        floored
            .checked_add_signed(step_duration(step_minutes))
            .unwrap_or(floored)
    }
}

/// Inclusive ticks from `start` to `end`.
///
/// `start == end` yields one tick; `end < start` yields none.
pub fn build_ticks(start: Timestamp, end: Timestamp, step_minutes: u32) -> Vec<Timestamp> {
    if end < start {
        return Vec::new();
    }
    let step = step_duration(step_minutes);
    let count = (end - start).num_seconds() / step.num_seconds();
    let mut ticks = Vec::new();
    let mut tick = start;
    for _ in 0..count {
        ticks.push(tick);
        match tick.checked_add_signed(step) {
            Some(next) => tick = next,
            None => return ticks,
        }
    }
    ticks.push(tick);
    ticks
}

// ============================================================================
// Range derivation
// ============================================================================

/// Derive the visible range for a set of groups.
///
/// Only tasks with a drawable interval contribute. With none, the window is
/// `[floor(now), ceil(now + fallback)]`. A range that collapses after
/// alignment is widened to `ceil(start + fallback)`. The end is then pulled
/// in so the range spans at most `max_columns` ticks.
pub fn derive_time_range(
    groups: &[Group],
    step_minutes: u32,
    fallback: Duration,
    now: Timestamp,
    max_columns: usize,
) -> TimeRange {
    let bounds = groups
        .iter()
        .flat_map(|g| g.tasks())
        .filter_map(|task| task.interval())
        .fold(None, |acc: Option<(Timestamp, Timestamp)>, (s, e)| {
            Some(match acc {
                Some((min, max)) => (min.min(s), max.max(e)),
                None => (s, e),
            })
        });

    let (start, end) = match bounds {
        Some((min, max)) => {
            let start = floor_to_step(min, step_minutes);
            let mut end = ceil_to_step(max, step_minutes);
            if end <= start {
                end = ceil_after(start, fallback, step_minutes);
            }
            (start, end)
        }
        None => (
            floor_to_step(now, step_minutes),
            ceil_after(now, fallback, step_minutes),
        ),
    };

    let end = cap_columns(start, end, step_minutes, max_columns);
    TimeRange::new(start, end, step_minutes)
}

/// `ceil(t + span)`, saturating at `ceil(t)`
fn ceil_after(t: Timestamp, span: Duration, step_minutes: u32) -> Timestamp {
    let target = t.checked_add_signed(span).unwrap_or(t);
    ceil_to_step(target, step_minutes)
}

/// Pull `end` in so `start..=end` holds at most `max_columns` ticks
fn cap_columns(
    start: Timestamp,
    end: Timestamp,
    step_minutes: u32,
    max_columns: usize,
) -> Timestamp {
    let step_secs = step_duration(step_minutes).num_seconds();
    let columns = (end - start).num_seconds() / step_secs + 1;
    let max = i64::try_from(max_columns.max(2)).unwrap_or(i64::MAX);
    if columns <= max {
        return end;
    }
    // columns > max, so the shortened span fits in the original one
    let capped = start
        .checked_add_signed(Duration::seconds(step_secs * (max - 1)))
        .unwrap_or(end);
    warn!(
        columns,
        max_columns,
        requested_end = %end,
        capped_end = %capped,
        "time range exceeds the column cap; cutting it off"
    );
    capped
}
