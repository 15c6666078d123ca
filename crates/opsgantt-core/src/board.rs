//! Gantt board controller
//!
//! Owns the only mutable state of a board view: group and operation collapse
//! flags and the two scroll axes. Every transition is synchronous. A data
//! refresh replaces the tree and the time range wholesale; collapse flags of
//! ids that survive the refresh are kept.

use chrono::{FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collapse::CollapseState;
use crate::config::{GanttConfig, VerticalSync};
use crate::geometry::BarMetrics;
use crate::hierarchy::{build_hierarchy, sort_all_tasks, ByMachine, ByProduct, GroupingStrategy};
use crate::layout::{layout_rows, BoardLayout, RowSpec};
use crate::scroll::{Axis, ScrollSync, ScrollWrite, Surface, SurfaceRole};
use crate::timegrid::{derive_time_range, TimeRange};
use crate::{ConfigError, Group, TaskRecord, Timestamp};

/// Which board is shown: tasks grouped by product or by machine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardVariant {
    #[default]
    Product,
    Machine,
}

impl BoardVariant {
    pub fn strategy(&self) -> Box<dyn GroupingStrategy> {
        match self {
            BoardVariant::Product => Box::new(ByProduct),
            BoardVariant::Machine => Box::new(ByMachine),
        }
    }

    /// The product board scrolls vertically from the bar panel only
    pub fn default_vertical_sync(&self) -> VerticalSync {
        match self {
            BoardVariant::Product => VerticalSync::Follow,
            BoardVariant::Machine => VerticalSync::Bidirectional,
        }
    }

    /// The machine board adds a fixed bottom scrollbar
    pub fn has_bottom_scrollbar(&self) -> bool {
        matches!(self, BoardVariant::Machine)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoardVariant::Product => "product",
            BoardVariant::Machine => "machine",
        }
    }
}

impl std::str::FromStr for BoardVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "product" => Ok(BoardVariant::Product),
            "machine" => Ok(BoardVariant::Machine),
            other => Err(format!("unknown board variant '{}'", other)),
        }
    }
}

#[derive(Debug)]
pub struct GanttBoard {
    config: GanttConfig,
    offset: FixedOffset,
    variant: BoardVariant,
    strategy: Box<dyn GroupingStrategy>,
    groups: Vec<Group>,
    range: TimeRange,
    refreshed_at: Timestamp,
    group_collapse: CollapseState,
    operation_collapse: CollapseState,
    scroll_x: ScrollSync,
    scroll_y: ScrollSync,
    viewport: Option<(f64, f64)>,
}

impl GanttBoard {
    pub fn new(config: GanttConfig, variant: BoardVariant) -> Result<Self, ConfigError> {
        Self::with_strategy(config, variant, variant.strategy())
    }

    /// Board with a custom grouping strategy; `variant` still picks the
    /// scroll topology
    pub fn with_strategy(
        config: GanttConfig,
        variant: BoardVariant,
        strategy: Box<dyn GroupingStrategy>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let offset = config.offset()?;
        let now = Utc::now();
        let range = derive_time_range(
            &[],
            config.step_minutes,
            config.fallback_window(),
            now,
            config.max_columns,
        );
        let vertical = config
            .vertical_sync
            .unwrap_or_else(|| variant.default_vertical_sync());

        let mut scroll_x = ScrollSync::new(Axis::X)
            .with_surface(Surface::RightPanel, SurfaceRole::Scroll)
            .with_surface(Surface::Header, SurfaceRole::Transform);
        if variant.has_bottom_scrollbar() {
            scroll_x = scroll_x.with_surface(Surface::BottomScrollbar, SurfaceRole::Scroll);
        }
        let left_role = match vertical {
            VerticalSync::Follow => SurfaceRole::Mirror,
            VerticalSync::Bidirectional => SurfaceRole::Scroll,
        };
        let scroll_y = ScrollSync::new(Axis::Y)
            .with_surface(Surface::RightPanel, SurfaceRole::Scroll)
            .with_surface(Surface::LeftPanel, left_role);

        Ok(Self {
            config,
            offset,
            variant,
            strategy,
            groups: Vec::new(),
            range,
            refreshed_at: now,
            group_collapse: CollapseState::new(),
            operation_collapse: CollapseState::new(),
            scroll_x,
            scroll_y,
            viewport: None,
        })
    }

    // ------------------------------------------------------------------------
    // Data refresh
    // ------------------------------------------------------------------------

    /// Replace the board's data with a new set of flat records
    pub fn refresh(&mut self, records: &[TaskRecord]) -> Vec<ScrollWrite> {
        self.refresh_at(records, Utc::now())
    }

    /// `refresh` with an explicit clock, used for the fallback window
    pub fn refresh_at(&mut self, records: &[TaskRecord], now: Timestamp) -> Vec<ScrollWrite> {
        let groups = build_hierarchy(records, self.strategy.as_ref(), self.offset);
        self.apply_groups(groups, now)
    }

    /// Replace the board's data with an already grouped tree
    pub fn set_groups(&mut self, mut groups: Vec<Group>, now: Timestamp) -> Vec<ScrollWrite> {
        sort_all_tasks(&mut groups);
        self.apply_groups(groups, now)
    }

    fn apply_groups(&mut self, groups: Vec<Group>, now: Timestamp) -> Vec<ScrollWrite> {
        let new_groups = self.group_collapse.seed(groups.iter().map(|g| g.id.as_str()));
        let new_operations = self.operation_collapse.seed(
            groups
                .iter()
                .flat_map(|g| g.operations.iter().map(|op| op.key.as_str())),
        );

        self.range = derive_time_range(
            &groups,
            self.config.step_minutes,
            self.config.fallback_window(),
            now,
            self.config.max_columns,
        );
        self.groups = groups;
        self.refreshed_at = now;

        debug!(
            strategy = self.strategy.name(),
            groups = self.groups.len(),
            new_groups,
            new_operations,
            tasks = self.groups.iter().map(Group::task_count).sum::<usize>(),
            range_start = %self.range.start,
            range_end = %self.range.end,
            "board refreshed"
        );

        self.clamp_scroll()
    }

    // ------------------------------------------------------------------------
    // Collapse
    // ------------------------------------------------------------------------

    /// Flip a group; returns the new collapsed flag
    pub fn toggle_group(&mut self, id: &str) -> bool {
        let collapsed = self.group_collapse.toggle(id);
        debug!(group = id, collapsed, "group toggled");
        collapsed
    }

    /// Flip an operation by its scoped key; returns the new collapsed flag
    pub fn toggle_operation(&mut self, key: &str) -> bool {
        let collapsed = self.operation_collapse.toggle(key);
        debug!(operation = key, collapsed, "operation toggled");
        collapsed
    }

    pub fn is_group_collapsed(&self, id: &str) -> bool {
        self.group_collapse.is_collapsed(id)
    }

    pub fn is_operation_collapsed(&self, key: &str) -> bool {
        self.operation_collapse.is_collapsed(key)
    }

    pub fn expand_all(&mut self) {
        self.group_collapse.expand_all();
        self.operation_collapse.expand_all();
    }

    pub fn collapse_all_groups(&mut self) {
        self.group_collapse.collapse_all();
    }

    // ------------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------------

    /// A surface scrolled; returns the writes to mirror it elsewhere
    pub fn scroll(&mut self, axis: Axis, source: Surface, offset: f64) -> Vec<ScrollWrite> {
        match axis {
            Axis::X => self.scroll_x.publish(source, offset),
            Axis::Y => self.scroll_y.publish(source, offset),
        }
    }

    pub fn scroll_x(&mut self, source: Surface, offset: f64) -> Vec<ScrollWrite> {
        self.scroll(Axis::X, source, offset)
    }

    pub fn scroll_y(&mut self, source: Surface, offset: f64) -> Vec<ScrollWrite> {
        self.scroll(Axis::Y, source, offset)
    }

    /// Size of the bar panel's visible area; enables offset clamping
    pub fn set_viewport(&mut self, width: f64, height: f64) -> Vec<ScrollWrite> {
        self.viewport = Some((width.max(0.0), height.max(0.0)));
        self.clamp_scroll()
    }

    /// Re-clamp both axes to the current content size. Collapse toggles
    /// change the content height; call this after them.
    pub fn clamp_scroll(&mut self) -> Vec<ScrollWrite> {
        let Some((width, height)) = self.viewport else {
            return Vec::new();
        };
        let content_width = self.grid_width();
        let content_height = self.layout().total_height;
        let mut writes = self.scroll_x.set_extent(content_width, width);
        writes.extend(self.scroll_y.set_extent(content_height, height));
        writes
    }

    /// Translation applied to the header row
    pub fn header_offset(&self) -> f64 {
        -self.scroll_x.offset()
    }

    pub fn scroll_offset(&self) -> (f64, f64) {
        (self.scroll_x.offset(), self.scroll_y.offset())
    }

    pub fn scroll_sync(&self, axis: Axis) -> &ScrollSync {
        match axis {
            Axis::X => &self.scroll_x,
            Axis::Y => &self.scroll_y,
        }
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &GanttConfig {
        &self.config
    }

    pub fn vertical_sync(&self) -> VerticalSync {
        match self.scroll_y.role_of(Surface::LeftPanel) {
            Some(SurfaceRole::Scroll) => VerticalSync::Bidirectional,
            _ => VerticalSync::Follow,
        }
    }

    pub fn variant(&self) -> BoardVariant {
        self.variant
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn range(&self) -> &TimeRange {
        &self.range
    }

    pub fn grid_width(&self) -> f64 {
        self.range.grid_width(self.config.col_width)
    }

    pub fn metrics(&self) -> BarMetrics {
        BarMetrics {
            step_minutes: self.config.step_minutes,
            px_per_column: self.config.col_width,
            total_width: self.grid_width(),
            min_width: self.config.min_bar_width,
        }
    }

    /// Lay out the visible rows for one render pass
    pub fn layout(&self) -> BoardLayout<'_> {
        let group_collapsed = |id: &str| self.group_collapse.is_collapsed(id);
        let operation_collapsed = |key: &str| self.operation_collapse.is_collapsed(key);
        let rows = layout_rows(
            &self.groups,
            &RowSpec {
                row_height: self.config.row_height,
                group_header_height: self.config.group_header_height,
                group_collapsed: &group_collapsed,
                operation_collapsed: &operation_collapsed,
            },
        );
        let total_height = rows.last().map_or(0.0, |r| r.bottom());

        BoardLayout {
            rows,
            range: &self.range,
            metrics: self.metrics(),
            col_width: self.config.col_width,
            left_width: self.config.left_width,
            header_height: self.config.header_height,
            grid_width: self.grid_width(),
            total_height,
            header_offset: self.header_offset(),
            scroll_x: self.scroll_x.offset(),
            scroll_y: self.scroll_y.offset(),
            bottom_scrollbar: self.scroll_x.role_of(Surface::BottomScrollbar).is_some(),
            vertical_sync: self.vertical_sync(),
            display_offset: self.offset,
            palette: &self.config.palette,
            now: self.refreshed_at,
        }
    }
}
