//! Time-axis header row
//!
//! One fixed-width column per tick. The header is not a scroll container:
//! its content is shifted by the layout's header offset.

use chrono::{FixedOffset, Timelike};
use svg::node::element::{Group, Line, Rectangle, Text};
use svg::Document;

use opsgantt_core::{BoardLayout, RenderError, Renderer, Timestamp};

use crate::{clock_label, write_document, PanelTheme};

/// SVG renderer for the header row
#[derive(Clone, Debug, Default)]
pub struct HeaderRenderer {
    pub theme: PanelTheme,
}

impl HeaderRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn theme(mut self, theme: PanelTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Build the header as an SVG group, shifted by the header offset
    pub fn group(&self, layout: &BoardLayout<'_>) -> Group {
        let height = layout.header_height;
        let mut group = Group::new()
            .set("class", "header")
            .set("transform", format!("translate({},0)", layout.header_offset));

        group = group.add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", layout.grid_width)
                .set("height", height)
                .set("fill", self.theme.group_header_bg.as_str()),
        );

        for (i, tick) in layout.range.ticks.iter().enumerate() {
            let x = i as f64 * layout.col_width;

            group = group.add(
                Line::new()
                    .set("x1", x)
                    .set("y1", 0)
                    .set("x2", x)
                    .set("y2", height)
                    .set("stroke", self.theme.grid_color.as_str())
                    .set("stroke-width", 1),
            );

            let mut label = Text::new(tick_label(*tick, i == 0, layout.display_offset))
                .set("x", x + 6.0)
                .set("y", height / 2.0 + 4.0)
                .set("font-family", self.theme.font_family.as_str())
                .set("font-size", self.theme.font_size)
                .set("fill", self.theme.text_color.as_str());
            if is_local_midnight(*tick, layout.display_offset) {
                label = label.set("font-weight", "bold");
            }
            group = group.add(label);
        }

        group.add(
            Line::new()
                .set("x1", 0)
                .set("y1", height)
                .set("x2", layout.grid_width)
                .set("y2", height)
                .set("stroke", self.theme.grid_color.as_str())
                .set("stroke-width", 1),
        )
    }
}

impl Renderer for HeaderRenderer {
    type Output = String;

    fn render(&self, layout: &BoardLayout<'_>) -> Result<String, RenderError> {
        let document = Document::new()
            .set("xmlns", "http://www.w3.org/2000/svg")
            .set("viewBox", (0, 0, layout.grid_width, layout.header_height))
            .set("width", layout.grid_width)
            .set("height", layout.header_height)
            .add(self.group(layout));
        write_document(&document)
    }
}

fn is_local_midnight(tick: Timestamp, offset: FixedOffset) -> bool {
    let local = tick.with_timezone(&offset);
    local.hour() == 0 && local.minute() == 0
}

/// `HH:MM`, prefixed with `MM/DD` on the first tick and at local midnight
pub fn tick_label(tick: Timestamp, first: bool, offset: FixedOffset) -> String {
    let time = clock_label(tick, offset);
    if first || is_local_midnight(tick, offset) {
        format!("{} {}", tick.with_timezone(&offset).format("%m/%d"), time)
    } else {
        time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn kst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn tick_labels() {
        // 2026-01-28 23:00 KST
        let late = Utc.with_ymd_and_hms(2026, 1, 28, 14, 0, 0).unwrap();
        let midnight = Utc.with_ymd_and_hms(2026, 1, 28, 15, 0, 0).unwrap();

        assert_eq!(tick_label(late, false, kst()), "23:00");
        assert_eq!(tick_label(late, true, kst()), "01/28 23:00");
        assert_eq!(tick_label(midnight, false, kst()), "01/29 00:00");
    }

    #[test]
    fn midnight_depends_on_display_offset() {
        let t = Utc.with_ymd_and_hms(2026, 1, 28, 0, 0, 0).unwrap();
        assert!(is_local_midnight(t, FixedOffset::east_opt(0).unwrap()));
        assert!(!is_local_midnight(t, kst()));
    }
}
