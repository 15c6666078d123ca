//! Row label panel
//!
//! Draws the same rows as the bar panel, with text in place of bars.

use svg::node::element::{Group, Line, Rectangle, Text};
use svg::Document;

use opsgantt_core::{BoardLayout, RenderError, Renderer, Row, RowKind};

use crate::{chevron, truncate, write_document, PanelTheme, PLACEHOLDER};

const OPERATION_INDENT: f64 = 16.0;
const TASK_INDENT: f64 = 32.0;

/// SVG renderer for the label panel
#[derive(Clone, Debug)]
pub struct LeftPanelRenderer {
    pub theme: PanelTheme,
    /// Labels longer than this are cut with an ellipsis
    pub max_label_chars: usize,
}

impl Default for LeftPanelRenderer {
    fn default() -> Self {
        Self {
            theme: PanelTheme::default(),
            max_label_chars: 28,
        }
    }
}

impl LeftPanelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn theme(mut self, theme: PanelTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn max_label_chars(mut self, max: usize) -> Self {
        self.max_label_chars = max;
        self
    }

    /// Build the label rows as an SVG group
    pub fn group(&self, layout: &BoardLayout<'_>) -> Group {
        let mut group = Group::new().set("class", "left-panel");
        for row in &layout.rows {
            group = group.add(self.render_row(row, layout.left_width));
        }
        group
    }

    fn render_row(&self, row: &Row<'_>, width: f64) -> Group {
        let (fill, class) = match row.kind {
            RowKind::Group { .. } => (self.theme.group_header_bg.as_str(), "row group-row"),
            RowKind::Operation { .. } => (self.theme.operation_bg.as_str(), "row operation-row"),
            RowKind::Task { .. } => (self.theme.background_color.as_str(), "row task-row"),
        };

        let mut group = Group::new()
            .set("class", class)
            .set("transform", format!("translate(0,{})", row.top));

        group = match row.kind {
            RowKind::Group { group: g, .. } => group.set("data-group", g.id.as_str()),
            RowKind::Operation { operation, .. } => group.set("data-operation", operation.key.as_str()),
            RowKind::Task { task, .. } => group.set("data-task", task.id.as_str()),
        };

        group = group
            .add(
                Rectangle::new()
                    .set("x", 0)
                    .set("y", 0)
                    .set("width", width)
                    .set("height", row.height)
                    .set("fill", fill),
            )
            .add(
                Line::new()
                    .set("x1", 0)
                    .set("y1", row.height)
                    .set("x2", width)
                    .set("y2", row.height)
                    .set("stroke", self.theme.row_line_color.as_str())
                    .set("stroke-width", 1),
            );

        let baseline = row.height / 2.0 + 4.0;
        match row.kind {
            RowKind::Group {
                group: g,
                collapsed,
                ..
            } => {
                let title = format!("{} {}", chevron(collapsed), g.title);
                group
                    .add(self.text(&title, 8.0, baseline, true))
                    .add(self.badge(g.operations.len(), width, row.height))
            }
            RowKind::Operation {
                operation,
                collapsed,
                ..
            } => {
                let planner = operation.planner_name.as_deref().unwrap_or(PLACEHOLDER);
                let label = format!(
                    "{} {} · {}",
                    chevron(collapsed),
                    operation.operation_code,
                    planner
                );
                group
                    .add(self.text(&label, OPERATION_INDENT, baseline, false))
                    .add(self.badge(operation.tasks.len(), width, row.height))
            }
            RowKind::Task { task, .. } => {
                let label = format!(
                    "{} · {}",
                    task.task_code,
                    task.assignee().unwrap_or(PLACEHOLDER)
                );
                group.add(self.text(&label, TASK_INDENT, baseline, false))
            }
        }
    }

    fn text(&self, label: &str, x: f64, y: f64, bold: bool) -> Text {
        let text = Text::new(truncate(label, self.max_label_chars))
            .set("x", x)
            .set("y", y)
            .set("font-family", self.theme.font_family.as_str())
            .set("font-size", self.theme.font_size)
            .set("fill", self.theme.text_color.as_str());
        if bold {
            text.set("font-weight", "bold")
        } else {
            text
        }
    }

    /// Count badge pinned to the right edge
    fn badge(&self, count: usize, width: f64, row_height: f64) -> Group {
        let badge_width = 28.0;
        let badge_height = 16.0;
        let x = width - badge_width - 8.0;
        let y = (row_height - badge_height) / 2.0;
        Group::new()
            .set("class", "badge")
            .add(
                Rectangle::new()
                    .set("x", x)
                    .set("y", y)
                    .set("width", badge_width)
                    .set("height", badge_height)
                    .set("rx", 8)
                    .set("fill", self.theme.badge_bg.as_str()),
            )
            .add(
                Text::new(count.to_string())
                    .set("x", x + badge_width / 2.0)
                    .set("y", y + badge_height - 4.0)
                    .set("font-family", self.theme.font_family.as_str())
                    .set("font-size", self.theme.font_size.saturating_sub(2))
                    .set("fill", self.theme.muted_text_color.as_str())
                    .set("text-anchor", "middle"),
            )
    }
}

impl Renderer for LeftPanelRenderer {
    type Output = String;

    fn render(&self, layout: &BoardLayout<'_>) -> Result<String, RenderError> {
        let document = Document::new()
            .set("xmlns", "http://www.w3.org/2000/svg")
            .set("viewBox", (0, 0, layout.left_width, layout.total_height))
            .set("width", layout.left_width)
            .set("height", layout.total_height)
            .add(self.group(layout));
        write_document(&document)
    }
}
