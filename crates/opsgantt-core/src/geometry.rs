//! Bar geometry: task intervals to clamped pixel spans

use serde::Serialize;

use crate::{Task, Timestamp};

/// Horizontal pixel span of one bar, relative to the grid origin
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BarSpan {
    pub left: f64,
    pub width: f64,
}

impl BarSpan {
    /// A bar that is not drawn; its row is still laid out
    pub const HIDDEN: Self = Self {
        left: 0.0,
        width: 0.0,
    };

    pub fn is_visible(&self) -> bool {
        self.width > 0.0
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Grid scale shared by every bar of a render pass
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BarMetrics {
    pub step_minutes: u32,
    pub px_per_column: f64,
    pub total_width: f64,
    /// Visible bars narrower than this are widened to it
    pub min_width: f64,
}

impl BarMetrics {
    pub fn px_per_minute(&self) -> f64 {
        self.px_per_column / f64::from(self.step_minutes.max(1))
    }

    /// Unclamped x coordinate of an instant
    pub fn x_of(&self, t: Timestamp, range_start: Timestamp) -> f64 {
        minutes_between(range_start, t) * self.px_per_minute()
    }
}

fn minutes_between(from: Timestamp, to: Timestamp) -> f64 {
    (to - from).num_milliseconds() as f64 / 60_000.0
}

/// Lay out one task's bar
pub fn layout_bar(task: &Task, range_start: Timestamp, metrics: &BarMetrics) -> BarSpan {
    layout_interval(task.start_at, task.end_at, range_start, metrics)
}

/// Lay out an interval against the grid.
///
/// Invalid ends, `end <= start` and spans entirely outside the grid give
/// `BarSpan::HIDDEN`. Visible spans satisfy `left >= 0` and
/// `left + width <= total_width`.
pub fn layout_interval(
    start: Option<Timestamp>,
    end: Option<Timestamp>,
    range_start: Timestamp,
    metrics: &BarMetrics,
) -> BarSpan {
    let (Some(start), Some(end)) = (start, end) else {
        return BarSpan::HIDDEN;
    };
    if end <= start || metrics.total_width <= 0.0 {
        return BarSpan::HIDDEN;
    }

    let raw_left = metrics.x_of(start, range_start);
    let raw_width = minutes_between(start, end) * metrics.px_per_minute();

    let visible_left = raw_left.max(0.0);
    let visible_right = (raw_left + raw_width).min(metrics.total_width);
    let width = (visible_right - visible_left).max(0.0);
    if width <= 0.0 || !width.is_finite() {
        return BarSpan::HIDDEN;
    }

    if width >= metrics.min_width {
        return BarSpan {
            left: visible_left,
            width,
        };
    }

    // Widen sub-minimum bars, pulling them back inside the right edge
    let width = metrics.min_width.min(metrics.total_width);
    let left = visible_left.min(metrics.total_width - width).max(0.0);
    BarSpan { left, width }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn origin() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 1, 28, 0, 0, 0).unwrap()
    }

    fn metrics() -> BarMetrics {
        BarMetrics {
            step_minutes: 60,
            px_per_column: 120.0,
            total_width: 1200.0,
            min_width: 2.0,
        }
    }

    fn span(start_min: i64, end_min: i64) -> BarSpan {
        layout_interval(
            Some(origin() + Duration::minutes(start_min)),
            Some(origin() + Duration::minutes(end_min)),
            origin(),
            &metrics(),
        )
    }

    #[test]
    fn in_range_bar() {
        let bar = span(90, 150);
        assert_eq!(bar.left, 180.0);
        assert_eq!(bar.width, 120.0);
    }

    #[test]
    fn clipped_on_both_sides() {
        let left_clip = span(-60, 60);
        assert_eq!(left_clip, BarSpan { left: 0.0, width: 120.0 });

        let right_clip = span(540, 720);
        assert_eq!(right_clip.left, 1080.0);
        assert_eq!(right_clip.right(), 1200.0);
    }

    #[test]
    fn outside_grid_is_hidden() {
        assert_eq!(span(-180, -60), BarSpan::HIDDEN);
        assert_eq!(span(700, 800), BarSpan::HIDDEN);
    }

    #[test]
    fn zero_and_negative_durations_are_hidden() {
        assert_eq!(span(60, 60).width, 0.0);
        assert!(!span(120, 60).is_visible());
    }

    #[test]
    fn invalid_ends_are_hidden() {
        let bar = layout_interval(None, Some(origin()), origin(), &metrics());
        assert_eq!(bar, BarSpan::HIDDEN);
    }

    #[test]
    fn tiny_bars_get_minimum_width() {
        // 30 seconds is half a pixel at 2px/min
        let bar = layout_interval(
            Some(origin() + Duration::minutes(60)),
            Some(origin() + Duration::minutes(60) + Duration::seconds(30)),
            origin(),
            &metrics(),
        );
        assert_eq!(bar.width, 2.0);
        assert_eq!(bar.left, 120.0);

        // Near the right edge the widened bar stays on the canvas
        let edge = layout_interval(
            Some(origin() + Duration::minutes(600) - Duration::seconds(15)),
            Some(origin() + Duration::minutes(601)),
            origin(),
            &metrics(),
        );
        assert_eq!(edge.width, 2.0);
        assert!(edge.right() <= 1200.0);
    }

    #[test]
    fn clamp_law_holds_over_a_sweep() {
        let m = metrics();
        for start in (-900..1500).step_by(37) {
            for len in [0, 1, 13, 59, 240, 2000] {
                let bar = span(start, start + len);
                assert!(bar.left >= 0.0, "left {} for start {}", bar.left, start);
                assert!(bar.width >= 0.0);
                assert!(bar.right() <= m.total_width + 1e-9);
            }
        }
    }
}
