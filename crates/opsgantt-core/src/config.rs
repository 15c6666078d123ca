//! Board configuration
//!
//! All values are fixed for the lifetime of a board. Deserializes from TOML
//! or JSON; missing keys take the defaults below.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default palette, cycled by group index
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#4e79a7", "#f28e2b", "#59a14f", "#e15759", "#76b7b2", "#edc948", "#b07aa1", "#9c755f",
];

/// How the left label panel follows vertical scrolling
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalSync {
    /// The bar panel is the only user-scrollable surface; the label panel mirrors it
    Follow,
    /// Either panel may scroll; the other mirrors
    Bidirectional,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanttConfig {
    /// Tick granularity in minutes
    pub step_minutes: u32,
    /// Pixel width of one tick column
    pub col_width: f64,
    /// Height of operation and task rows
    pub row_height: f64,
    /// Height of group header rows
    pub group_header_height: f64,
    /// Width of the label panel
    pub left_width: f64,
    /// Height of the time-axis header
    pub header_height: f64,
    /// Window shown when no task has a drawable interval
    pub fallback_hours: u32,
    /// Smallest width a visible bar is drawn with
    pub min_bar_width: f64,
    /// Most tick columns a range may span; later instants are cut off
    pub max_columns: usize,
    /// Offset assumed for timestamps that carry no zone, e.g. "+09:00"
    pub assumed_offset: String,
    /// Group bar colors
    pub palette: Vec<String>,
    /// Overrides the variant's vertical scroll topology
    pub vertical_sync: Option<VerticalSync>,
}

impl Default for GanttConfig {
    fn default() -> Self {
        Self {
            step_minutes: 60,
            col_width: 120.0,
            row_height: 36.0,
            group_header_height: 40.0,
            left_width: 280.0,
            header_height: 40.0,
            fallback_hours: 9,
            min_bar_width: 2.0,
            max_columns: 2880,
            assumed_offset: "+09:00".into(),
            palette: DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect(),
            vertical_sync: None,
        }
    }
}

impl GanttConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step_minutes(mut self, step: u32) -> Self {
        self.step_minutes = step;
        self
    }

    pub fn col_width(mut self, width: f64) -> Self {
        self.col_width = width;
        self
    }

    pub fn fallback_hours(mut self, hours: u32) -> Self {
        self.fallback_hours = hours;
        self
    }

    pub fn assumed_offset(mut self, offset: impl Into<String>) -> Self {
        self.assumed_offset = offset.into();
        self
    }

    pub fn max_columns(mut self, columns: usize) -> Self {
        self.max_columns = columns;
        self
    }

    pub fn vertical_sync(mut self, mode: VerticalSync) -> Self {
        self.vertical_sync = Some(mode);
        self
    }

    /// Check every value; called by the board before use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_minutes == 0 {
            return Err(ConfigError::InvalidStep(self.step_minutes));
        }
        for (field, value) in [
            ("col_width", self.col_width),
            ("row_height", self.row_height),
            ("group_header_height", self.group_header_height),
            ("left_width", self.left_width),
            ("header_height", self.header_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidSize { field, value });
            }
        }
        if !(self.min_bar_width.is_finite() && self.min_bar_width >= 0.0) {
            return Err(ConfigError::InvalidSize {
                field: "min_bar_width",
                value: self.min_bar_width,
            });
        }
        if self.fallback_hours == 0 {
            return Err(ConfigError::InvalidFallback);
        }
        if self.max_columns < 2 {
            return Err(ConfigError::InvalidMaxColumns(self.max_columns));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        self.offset()?;
        Ok(())
    }

    /// The parsed assumed offset
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        parse_offset(&self.assumed_offset)
            .ok_or_else(|| ConfigError::InvalidOffset(self.assumed_offset.clone()))
    }

    /// Fallback window as a duration
    pub fn fallback_window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.fallback_hours))
    }

    /// Palette color for a group index
    pub fn color_for(&self, group_index: usize) -> &str {
        &self.palette[group_index % self.palette.len()]
    }
}

/// Parse "+HH:MM", "-HHMM" or "Z" into a fixed offset
pub fn parse_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) || rest.len() > 5 {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
