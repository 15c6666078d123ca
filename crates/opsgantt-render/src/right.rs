//! Bar panel
//!
//! Same rows and heights as the label panel. Task rows carry a bar when the
//! task has a drawable span; the row itself is always emitted.

use svg::node::element::{Group, Line, Rectangle, Text};
use svg::Document;

use opsgantt_core::{BoardLayout, RenderError, Renderer, Row, RowKind};

use crate::{bar_label, clock_label, truncate, write_document, PanelTheme};

/// Fraction of the row height taken by a bar
const BAR_FILL: f64 = 0.6;

/// Configuration for the vertical "now" marker
#[derive(Clone, Debug)]
pub struct NowMarker {
    pub enabled: bool,
    /// Draw the `HH:MM` label at the top of the line
    pub show_label: bool,
}

impl Default for NowMarker {
    fn default() -> Self {
        Self {
            enabled: true,
            show_label: true,
        }
    }
}

impl NowMarker {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            show_label: false,
        }
    }
}

/// SVG renderer for the bar panel
#[derive(Clone, Debug, Default)]
pub struct RightPanelRenderer {
    pub theme: PanelTheme,
    pub now_marker: NowMarker,
}

impl RightPanelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn theme(mut self, theme: PanelTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_now_marker(mut self, marker: NowMarker) -> Self {
        self.now_marker = marker;
        self
    }

    /// Build the grid, rows and bars as an SVG group
    pub fn group(&self, layout: &BoardLayout<'_>) -> Group {
        let mut group = Group::new()
            .set("class", "right-panel")
            .add(self.render_grid(layout));

        for row in &layout.rows {
            group = group.add(self.render_row(row, layout));
        }

        if let Some(marker) = self.render_now(layout) {
            group = group.add(marker);
        }
        group
    }

    fn render_grid(&self, layout: &BoardLayout<'_>) -> Group {
        let mut grid = Group::new().set("class", "grid");
        for i in 0..=layout.range.column_count() {
            let x = i as f64 * layout.col_width;
            grid = grid.add(
                Line::new()
                    .set("x1", x)
                    .set("y1", 0)
                    .set("x2", x)
                    .set("y2", layout.total_height)
                    .set("stroke", self.theme.grid_color.as_str())
                    .set("stroke-width", 1),
            );
        }
        grid
    }

    fn render_row(&self, row: &Row<'_>, layout: &BoardLayout<'_>) -> Group {
        let (fill, class) = match row.kind {
            RowKind::Group { .. } => (self.theme.group_header_bg.as_str(), "row group-row"),
            RowKind::Operation { .. } => (self.theme.operation_bg.as_str(), "row operation-row"),
            RowKind::Task { .. } => ("none", "row task-row"),
        };

        let mut group = Group::new()
            .set("class", class)
            .set("transform", format!("translate(0,{})", row.top))
            .add(
                Rectangle::new()
                    .set("x", 0)
                    .set("y", 0)
                    .set("width", layout.grid_width)
                    .set("height", row.height)
                    .set("fill", fill)
                    .set("fill-opacity", 0.6),
            )
            .add(
                Line::new()
                    .set("x1", 0)
                    .set("y1", row.height)
                    .set("x2", layout.grid_width)
                    .set("y2", row.height)
                    .set("stroke", self.theme.row_line_color.as_str())
                    .set("stroke-width", 1),
            );

        let RowKind::Task {
            group_index, task, ..
        } = row.kind
        else {
            return group;
        };
        group = group.set("data-task", task.id.as_str());

        let span = layout.bar_for(task);
        if !span.is_visible() {
            return group;
        }

        let bar_height = row.height * BAR_FILL;
        let bar_y = (row.height - bar_height) / 2.0;
        let label = bar_label(task, layout.display_offset);
        // ~7px per character at the default font size
        let max_chars = ((span.width - 8.0) / 7.0).max(0.0) as usize;

        group = group.add(
            Rectangle::new()
                .set("class", "bar")
                .set("x", span.left)
                .set("y", bar_y)
                .set("width", span.width)
                .set("height", bar_height)
                .set("rx", 3)
                .set("fill", layout.color_for(group_index)),
        );
        group = group.set("data-label", label.as_str());
        if max_chars >= 4 {
            group = group.add(
                Text::new(truncate(&label, max_chars))
                    .set("x", span.left + 4.0)
                    .set("y", row.height / 2.0 + 4.0)
                    .set("font-family", self.theme.font_family.as_str())
                    .set("font-size", self.theme.font_size.saturating_sub(1))
                    .set("fill", "#ffffff"),
            );
        }
        group
    }

    fn render_now(&self, layout: &BoardLayout<'_>) -> Option<Group> {
        if !self.now_marker.enabled || !layout.range.contains(layout.now) {
            return None;
        }
        let x = layout.metrics.x_of(layout.now, layout.range.start);
        let mut group = Group::new().set("class", "now-line").add(
            Line::new()
                .set("x1", x)
                .set("y1", 0)
                .set("x2", x)
                .set("y2", layout.total_height)
                .set("stroke", self.theme.now_color.as_str())
                .set("stroke-width", 2)
                .set("stroke-dasharray", "4,2"),
        );
        if self.now_marker.show_label {
            group = group.add(
                Text::new(clock_label(layout.now, layout.display_offset))
                    .set("x", x + 3.0)
                    .set("y", 12)
                    .set("font-family", self.theme.font_family.as_str())
                    .set("font-size", self.theme.font_size.saturating_sub(2))
                    .set("fill", self.theme.now_color.as_str()),
            );
        }
        Some(group)
    }
}

impl Renderer for RightPanelRenderer {
    type Output = String;

    fn render(&self, layout: &BoardLayout<'_>) -> Result<String, RenderError> {
        let document = Document::new()
            .set("xmlns", "http://www.w3.org/2000/svg")
            .set("viewBox", (0, 0, layout.grid_width, layout.total_height))
            .set("width", layout.grid_width)
            .set("height", layout.total_height)
            .add(self.group(layout));
        write_document(&document)
    }
}
