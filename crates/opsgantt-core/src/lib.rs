//! # opsgantt-core
//!
//! Core model and state for the opsgantt schedule board.
//!
//! This crate provides:
//! - Domain types: `Task`, `Operation`, `Group`, `TaskRecord`
//! - Time grid: instant parsing, step alignment, tick generation, range derivation
//! - Bar geometry: pixel spans for task intervals, clamped to the grid
//! - Hierarchy building with product or machine grouping
//! - The board controller: collapse state, synchronized scroll axes, row layout
//! - Error types and the `Renderer` trait
//!
//! ## Example
//!
//! ```rust
//! use opsgantt_core::{BoardVariant, GanttBoard, GanttConfig, RawInstant, TaskRecord};
//!
//! let mut board = GanttBoard::new(GanttConfig::default(), BoardVariant::Product).unwrap();
//! let record = TaskRecord::new("t1", "op-10", "WO-0001")
//!     .product("p1", "Bracket")
//!     .window(
//!         RawInstant::text("2026-01-28 09:00:00"),
//!         RawInstant::text("2026-01-28 11:30:00"),
//!     );
//! board.refresh(&[record]);
//!
//! let layout = board.layout();
//! assert_eq!(layout.rows.len(), 3); // group, operation, task
//! ```

pub mod adapter;
pub mod board;
pub mod collapse;
pub mod config;
pub mod geometry;
pub mod hierarchy;
pub mod layout;
pub mod scroll;
pub mod timegrid;

pub use adapter::{normalize_record, normalize_records};
pub use board::{BoardVariant, GanttBoard};
pub use collapse::CollapseState;
pub use config::{GanttConfig, VerticalSync};
pub use geometry::{layout_bar, BarMetrics, BarSpan};
pub use hierarchy::{build_hierarchy, ByMachine, ByProduct, GroupingStrategy};
pub use layout::{BoardLayout, Row, RowKind};
pub use scroll::{Axis, ScrollSync, ScrollWrite, Surface, SurfaceRole};
pub use timegrid::{build_ticks, ceil_to_step, derive_time_range, floor_to_step, parse_instant, TimeRange};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// A normalized point in time
pub type Timestamp = DateTime<Utc>;

/// Opaque identifier of a group (product or machine)
pub type GroupId = String;

/// Scoped identifier of an operation (unique across the whole board)
pub type OperationKey = String;

/// Identifier of a task
pub type TaskId = String;

// ============================================================================
// Raw input
// ============================================================================

/// An instant as handed over by the schedule source, before normalization
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RawInstant {
    /// Absent or null
    #[default]
    Missing,
    /// Textual timestamp ("2026-01-28 09:00:00", RFC 3339, ...)
    Text(String),
    /// Milliseconds since the Unix epoch
    EpochMillis(i64),
    /// Already a native instant
    Native(Timestamp),
}

impl RawInstant {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

impl From<Timestamp> for RawInstant {
    fn from(value: Timestamp) -> Self {
        Self::Native(value)
    }
}

impl From<&str> for RawInstant {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One flat schedule entry as produced by the record adapter
///
/// Carries the identity of every level of the hierarchy. The grouping
/// strategy decides which fields form the top-level group.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskRecord {
    pub product_id: Option<String>,
    pub product_title: Option<String>,
    pub operation_id: String,
    pub operation_code: String,
    pub planner_name: Option<String>,
    pub task_id: TaskId,
    pub task_code: String,
    pub worker_name: Option<String>,
    pub machine_id: Option<String>,
    pub start_at: RawInstant,
    pub end_at: RawInstant,
}

impl TaskRecord {
    /// Create a record with task id, operation id and task code.
    /// The operation code defaults to the operation id.
    pub fn new(
        task_id: impl Into<String>,
        operation_id: impl Into<String>,
        task_code: impl Into<String>,
    ) -> Self {
        let operation_id = operation_id.into();
        Self {
            operation_code: operation_id.clone(),
            operation_id,
            task_id: task_id.into(),
            task_code: task_code.into(),
            ..Self::default()
        }
    }

    pub fn product(mut self, id: impl Into<String>, title: impl Into<String>) -> Self {
        self.product_id = Some(id.into());
        self.product_title = Some(title.into());
        self
    }

    pub fn operation_code(mut self, code: impl Into<String>) -> Self {
        self.operation_code = code.into();
        self
    }

    pub fn planner(mut self, name: impl Into<String>) -> Self {
        self.planner_name = Some(name.into());
        self
    }

    pub fn worker(mut self, name: impl Into<String>) -> Self {
        self.worker_name = Some(name.into());
        self
    }

    pub fn machine(mut self, id: impl Into<String>) -> Self {
        self.machine_id = Some(id.into());
        self
    }

    pub fn window(mut self, start: impl Into<RawInstant>, end: impl Into<RawInstant>) -> Self {
        self.start_at = start.into();
        self.end_at = end.into();
        self
    }
}

// ============================================================================
// Hierarchy
// ============================================================================

/// A single scheduled unit of work
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub task_code: String,
    pub worker_name: Option<String>,
    pub machine_id: Option<String>,
    /// Normalized start; `None` when the source value could not be parsed
    pub start_at: Option<Timestamp>,
    /// Normalized end; `None` when the source value could not be parsed
    pub end_at: Option<Timestamp>,
}

impl Task {
    pub fn new(id: impl Into<String>, task_code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            task_code: task_code.into(),
            worker_name: None,
            machine_id: None,
            start_at: None,
            end_at: None,
        }
    }

    pub fn worker(mut self, name: impl Into<String>) -> Self {
        self.worker_name = Some(name.into());
        self
    }

    pub fn machine(mut self, id: impl Into<String>) -> Self {
        self.machine_id = Some(id.into());
        self
    }

    pub fn window(mut self, start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        self.start_at = start;
        self.end_at = end;
        self
    }

    /// The drawable interval: both ends valid and `end > start`
    pub fn interval(&self) -> Option<(Timestamp, Timestamp)> {
        match (self.start_at, self.end_at) {
            (Some(start), Some(end)) if end > start => Some((start, end)),
            _ => None,
        }
    }

    /// Worker name, falling back to the machine id
    pub fn assignee(&self) -> Option<&str> {
        self.worker_name.as_deref().or(self.machine_id.as_deref())
    }
}

/// A named step of work holding an ordered set of tasks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Identifier as given by the source
    pub id: String,
    /// Board-wide key used for collapse state (scoped by group)
    pub key: OperationKey,
    pub operation_code: String,
    pub planner_name: Option<String>,
    pub tasks: Vec<Task>,
}

impl Operation {
    pub fn new(group_id: &str, id: impl Into<String>, operation_code: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            key: hierarchy::operation_key(group_id, &id),
            id,
            operation_code: operation_code.into(),
            planner_name: None,
            tasks: Vec::new(),
        }
    }

    pub fn planner(mut self, name: impl Into<String>) -> Self {
        self.planner_name = Some(name.into());
        self
    }

    pub fn task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }
}

/// Top-level grouping (product or machine)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    pub operations: Vec<Operation>,
}

impl Group {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            operations: Vec::new(),
        }
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn task_count(&self) -> usize {
        self.operations.iter().map(|op| op.tasks.len()).sum()
    }

    /// Iterate over every task of every operation in order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.operations.iter().flat_map(|op| op.tasks.iter())
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output backend for one board layout pass
pub trait Renderer {
    type Output;

    /// Render a laid-out board to the output format
    fn render(&self, layout: &BoardLayout<'_>) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Invalid board configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("step_minutes must be positive, got {0}")]
    InvalidStep(u32),

    #[error("{field} must be a positive pixel size, got {value}")]
    InvalidSize { field: &'static str, value: f64 },

    #[error("Invalid UTC offset: {0}")]
    InvalidOffset(String),

    #[error("fallback_hours must be positive")]
    InvalidFallback,

    #[error("max_columns must be at least 2, got {0}")]
    InvalidMaxColumns(usize),

    #[error("Palette must contain at least one color")]
    EmptyPalette,
}

/// A source record that cannot be normalized
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("Record is not an object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
