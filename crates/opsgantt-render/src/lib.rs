//! # opsgantt-render
//!
//! Rendering backends for opsgantt boards.
//!
//! This crate provides:
//! - Time-axis header row (SVG)
//! - Left label panel (SVG)
//! - Right bar panel (SVG)
//! - A standalone HTML board composing the panels with synchronized scrolling
//!
//! Every renderer takes the same `BoardLayout`, so the two panels always draw
//! congruent rows.
//!
//! ## Example
//!
//! ```rust,ignore
//! use opsgantt_core::{BoardVariant, GanttBoard, GanttConfig, Renderer};
//! use opsgantt_render::{HtmlBoardRenderer, LeftPanelRenderer, RightPanelRenderer};
//!
//! let mut board = GanttBoard::new(GanttConfig::default(), BoardVariant::Product)?;
//! board.refresh(&records);
//! let layout = board.layout();
//!
//! let left = LeftPanelRenderer::new().render(&layout)?;
//! let right = RightPanelRenderer::new().render(&layout)?;
//! let page = HtmlBoardRenderer::new().title("Line 3").render(&layout)?;
//! ```

pub mod header;
pub mod html;
pub mod left;
pub mod right;

pub use header::HeaderRenderer;
pub use html::HtmlBoardRenderer;
pub use left::LeftPanelRenderer;
pub use right::RightPanelRenderer;

use chrono::FixedOffset;
use opsgantt_core::{RenderError, Task, Timestamp};
use svg::Document;

/// Shown where an optional field is absent
pub const PLACEHOLDER: &str = "-";

/// Colors and fonts shared by all panels
#[derive(Clone, Debug)]
pub struct PanelTheme {
    pub background_color: String,
    pub group_header_bg: String,
    pub operation_bg: String,
    pub grid_color: String,
    pub row_line_color: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub badge_bg: String,
    pub now_color: String,
    pub font_family: String,
    pub font_size: u32,
}

impl Default for PanelTheme {
    fn default() -> Self {
        Self::light()
    }
}

impl PanelTheme {
    pub fn light() -> Self {
        Self {
            background_color: "#ffffff".into(),
            group_header_bg: "#eef2f7".into(),
            operation_bg: "#f8f9fb".into(),
            grid_color: "#e3e7ed".into(),
            row_line_color: "#edf0f4".into(),
            text_color: "#1f2937".into(),
            muted_text_color: "#6b7280".into(),
            badge_bg: "#dbe4f0".into(),
            now_color: "#e11d48".into(),
            font_family: "system-ui, -apple-system, sans-serif".into(),
            font_size: 12,
        }
    }

    pub fn dark() -> Self {
        Self {
            background_color: "#111827".into(),
            group_header_bg: "#1f2937".into(),
            operation_bg: "#172033".into(),
            grid_color: "#2b3545".into(),
            row_line_color: "#222c3b".into(),
            text_color: "#e5e7eb".into(),
            muted_text_color: "#9ca3af".into(),
            badge_bg: "#374151".into(),
            now_color: "#fb7185".into(),
            font_family: "system-ui, -apple-system, sans-serif".into(),
            font_size: 12,
        }
    }
}

/// "HH:MM" in the display offset
pub fn clock_label(t: Timestamp, offset: FixedOffset) -> String {
    t.with_timezone(&offset).format("%H:%M").to_string()
}

/// "HH:MM~HH:MM" for a task with both ends valid
pub fn window_label(task: &Task, offset: FixedOffset) -> Option<String> {
    let (start, end) = (task.start_at?, task.end_at?);
    Some(format!(
        "{}~{}",
        clock_label(start, offset),
        clock_label(end, offset)
    ))
}

/// Overlay text of a bar: code, assignee and time window
pub fn bar_label(task: &Task, offset: FixedOffset) -> String {
    let mut label = format!(
        "{} {}",
        task.task_code,
        task.assignee().unwrap_or(PLACEHOLDER)
    );
    if let Some(window) = window_label(task, offset) {
        label.push(' ');
        label.push_str(&window);
    }
    label
}

/// Chevron for a collapsible row
pub(crate) fn chevron(collapsed: bool) -> &'static str {
    if collapsed {
        "▶"
    } else {
        "▼"
    }
}

/// Truncate a string with ellipsis
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!(
            "{}…",
            s.chars().take(max.saturating_sub(1)).collect::<String>()
        )
    }
}

/// HTML-escape a string
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub(crate) fn write_document(document: &Document) -> Result<String, RenderError> {
    let mut output = Vec::new();
    svg::write(&mut output, document)
        .map_err(|e| RenderError::Format(format!("Failed to write SVG: {}", e)))?;
    String::from_utf8(output).map_err(|e| RenderError::Format(format!("Invalid UTF-8: {}", e)))
}
