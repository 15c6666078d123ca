//! WebAssembly bindings for the opsgantt board controller
//!
//! The page owns the DOM: it feeds schedule data and scroll events into a
//! `ScheduleBoard` and applies the scroll writes and markup it gets back.

use chrono::{TimeZone, Utc};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use opsgantt_core::{
    normalize_records, Axis, BarSpan, BoardVariant, GanttBoard, GanttConfig, Renderer, RowKind,
    ScrollWrite, Surface,
};
use opsgantt_render::right::NowMarker;
use opsgantt_render::{HeaderRenderer, HtmlBoardRenderer, LeftPanelRenderer, RightPanelRenderer};

/// Initialize panic hook for better error messages in console
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_error)
}

#[derive(Serialize)]
struct RangeInfo {
    start: String,
    end: String,
    step_minutes: u32,
    ticks: Vec<String>,
    grid_width: f64,
}

#[derive(Serialize)]
struct RowInfo {
    kind: &'static str,
    id: String,
    top: f64,
    height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    collapsed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bar: Option<BarSpan>,
}

// ============================================================================
// Board handle
// ============================================================================

/// One schedule board living in the page
#[wasm_bindgen]
pub struct ScheduleBoard {
    board: GanttBoard,
    title: String,
    dark_theme: bool,
    show_now_line: bool,
}

impl ScheduleBoard {
    fn build(variant: &str, config: GanttConfig) -> Result<Self, String> {
        let variant: BoardVariant = variant.parse()?;
        let board = GanttBoard::new(config, variant).map_err(|e| e.to_string())?;
        Ok(Self {
            board,
            title: "Schedule".into(),
            dark_theme: false,
            show_now_line: true,
        })
    }

    fn refresh_json(
        &mut self,
        records_json: &str,
        now: chrono::DateTime<Utc>,
    ) -> Result<Vec<ScrollWrite>, String> {
        let value: serde_json::Value =
            serde_json::from_str(records_json).map_err(|e| format!("Invalid JSON: {}", e))?;
        let records = normalize_records(&value);
        Ok(self.board.refresh_at(&records, now))
    }

    fn theme_renderers(&self) -> (HeaderRenderer, LeftPanelRenderer, RightPanelRenderer) {
        let theme = if self.dark_theme {
            opsgantt_render::PanelTheme::dark()
        } else {
            opsgantt_render::PanelTheme::light()
        };
        let marker = if self.show_now_line {
            NowMarker::default()
        } else {
            NowMarker::disabled()
        };
        (
            HeaderRenderer::new().theme(theme.clone()),
            LeftPanelRenderer::new().theme(theme.clone()),
            RightPanelRenderer::new().theme(theme).with_now_marker(marker),
        )
    }

    fn rows(&self) -> Vec<RowInfo> {
        let layout = self.board.layout();
        layout
            .rows
            .iter()
            .map(|row| match row.kind {
                RowKind::Group {
                    group, collapsed, ..
                } => RowInfo {
                    kind: "group",
                    id: group.id.clone(),
                    top: row.top,
                    height: row.height,
                    collapsed: Some(collapsed),
                    bar: None,
                },
                RowKind::Operation {
                    operation,
                    collapsed,
                    ..
                } => RowInfo {
                    kind: "operation",
                    id: operation.key.clone(),
                    top: row.top,
                    height: row.height,
                    collapsed: Some(collapsed),
                    bar: None,
                },
                RowKind::Task { task, .. } => {
                    let span = layout.bar_for(task);
                    RowInfo {
                        kind: "task",
                        id: task.id.clone(),
                        top: row.top,
                        height: row.height,
                        collapsed: None,
                        bar: span.is_visible().then_some(span),
                    }
                }
            })
            .collect()
    }

    fn range_info(&self) -> RangeInfo {
        let range = self.board.range();
        let offset = self.board.layout().display_offset;
        RangeInfo {
            start: range.start.with_timezone(&offset).to_rfc3339(),
            end: range.end.with_timezone(&offset).to_rfc3339(),
            step_minutes: range.step_minutes,
            ticks: range
                .ticks
                .iter()
                .map(|t| t.with_timezone(&offset).to_rfc3339())
                .collect(),
            grid_width: self.board.grid_width(),
        }
    }
}

fn parse_axis(axis: &str) -> Result<Axis, String> {
    match axis {
        "x" | "X" => Ok(Axis::X),
        "y" | "Y" => Ok(Axis::Y),
        other => Err(format!("unknown axis '{}'", other)),
    }
}

fn parse_surface(surface: &str) -> Result<Surface, String> {
    serde_json::from_value(serde_json::Value::String(surface.to_string()))
        .map_err(|_| format!("unknown surface '{}'", surface))
}

#[wasm_bindgen]
impl ScheduleBoard {
    /// Create a board with the default configuration
    ///
    /// # Arguments
    /// * `variant` - Either "product" or "machine"
    #[wasm_bindgen(constructor)]
    pub fn new(variant: &str) -> Result<ScheduleBoard, JsValue> {
        Self::build(variant, GanttConfig::default()).map_err(js_error)
    }

    /// Create a board from a configuration object
    pub fn with_config(variant: &str, config: JsValue) -> Result<ScheduleBoard, JsValue> {
        let config: GanttConfig = serde_wasm_bindgen::from_value(config)?;
        Self::build(variant, config).map_err(js_error)
    }

    /// Create a board from a JSON configuration string
    pub fn with_config_json(variant: &str, config_json: &str) -> Result<ScheduleBoard, JsValue> {
        let config: GanttConfig = serde_json::from_str(config_json).map_err(js_error)?;
        Self::build(variant, config).map_err(js_error)
    }

    /// Load schedule records (JSON); returns the scroll writes as JSON
    pub fn refresh(&mut self, records_json: &str) -> Result<String, JsValue> {
        let writes = self.refresh_json(records_json, Utc::now()).map_err(js_error)?;
        to_json(&writes)
    }

    /// `refresh` with an explicit clock in epoch milliseconds
    pub fn refresh_at(&mut self, records_json: &str, now_ms: f64) -> Result<String, JsValue> {
        let now = Utc
            .timestamp_millis_opt(now_ms as i64)
            .single()
            .ok_or_else(|| js_error(format!("Invalid instant {}", now_ms)))?;
        let writes = self.refresh_json(records_json, now).map_err(js_error)?;
        to_json(&writes)
    }

    pub fn toggle_group(&mut self, id: &str) -> bool {
        self.board.toggle_group(id)
    }

    pub fn toggle_operation(&mut self, key: &str) -> bool {
        self.board.toggle_operation(key)
    }

    pub fn expand_all(&mut self) {
        self.board.expand_all();
    }

    pub fn collapse_all_groups(&mut self) {
        self.board.collapse_all_groups();
    }

    /// A surface fired a scroll event; returns the writes for the others
    ///
    /// # Arguments
    /// * `axis` - "x" or "y"
    /// * `surface` - "header", "left_panel", "right_panel" or "bottom_scrollbar"
    pub fn scroll(&mut self, axis: &str, surface: &str, offset: f64) -> Result<String, JsValue> {
        let axis = parse_axis(axis).map_err(js_error)?;
        let surface = parse_surface(surface).map_err(js_error)?;
        to_json(&self.board.scroll(axis, surface, offset))
    }

    /// Same as `scroll`, returning the writes as a JS array
    pub fn scroll_writes(
        &mut self,
        axis: &str,
        surface: &str,
        offset: f64,
    ) -> Result<JsValue, JsValue> {
        let axis = parse_axis(axis).map_err(js_error)?;
        let surface = parse_surface(surface).map_err(js_error)?;
        Ok(serde_wasm_bindgen::to_value(&self.board.scroll(axis, surface, offset))?)
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) -> Result<String, JsValue> {
        to_json(&self.board.set_viewport(width, height))
    }

    /// Re-clamp offsets after collapse toggles
    pub fn clamp_scroll(&mut self) -> Result<String, JsValue> {
        to_json(&self.board.clamp_scroll())
    }

    pub fn header_offset(&self) -> f64 {
        self.board.header_offset()
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn set_dark_theme(&mut self, enabled: bool) {
        self.dark_theme = enabled;
    }

    pub fn set_show_now_line(&mut self, enabled: bool) {
        self.show_now_line = enabled;
    }

    pub fn render_header(&self) -> Result<String, JsValue> {
        let (header, _, _) = self.theme_renderers();
        header.render(&self.board.layout()).map_err(js_error)
    }

    pub fn render_left(&self) -> Result<String, JsValue> {
        let (_, left, _) = self.theme_renderers();
        left.render(&self.board.layout()).map_err(js_error)
    }

    pub fn render_right(&self) -> Result<String, JsValue> {
        let (_, _, right) = self.theme_renderers();
        right.render(&self.board.layout()).map_err(js_error)
    }

    /// Render the whole board as a standalone page
    pub fn render_html(&self) -> Result<String, JsValue> {
        let (header, left, right) = self.theme_renderers();
        let mut renderer = HtmlBoardRenderer::new().title(self.title.clone());
        if self.dark_theme {
            renderer = renderer.dark_theme();
        }
        renderer.header = header;
        renderer.left = left;
        renderer.right = right;
        renderer.render(&self.board.layout()).map_err(js_error)
    }

    /// The derived time range as JSON
    pub fn range_json(&self) -> Result<String, JsValue> {
        to_json(&self.range_info())
    }

    /// The visible rows with their geometry as JSON
    pub fn rows_json(&self) -> Result<String, JsValue> {
        to_json(&self.rows())
    }
}
