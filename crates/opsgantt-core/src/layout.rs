//! Row layout shared by the label panel and the bar panel
//!
//! Both panels are separate scroll containers that stay aligned only because
//! they draw the same rows at the same heights. `BoardLayout` is computed once
//! per render pass, reading each collapse flag exactly once, and both panels
//! render from it.

use chrono::FixedOffset;

use crate::config::VerticalSync;
use crate::geometry::{layout_bar, BarMetrics, BarSpan};
use crate::timegrid::TimeRange;
use crate::{Group, Operation, Task, Timestamp};

#[derive(Clone, Debug, PartialEq)]
pub enum RowKind<'a> {
    Group {
        group_index: usize,
        group: &'a Group,
        collapsed: bool,
    },
    Operation {
        group_index: usize,
        operation: &'a Operation,
        collapsed: bool,
    },
    Task {
        group_index: usize,
        operation: &'a Operation,
        task: &'a Task,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row<'a> {
    /// Distance from the top of the panel content
    pub top: f64,
    pub height: f64,
    pub kind: RowKind<'a>,
}

impl Row<'_> {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn group_index(&self) -> usize {
        match self.kind {
            RowKind::Group { group_index, .. }
            | RowKind::Operation { group_index, .. }
            | RowKind::Task { group_index, .. } => group_index,
        }
    }
}

/// Everything a renderer needs for one pass
#[derive(Clone, Debug)]
pub struct BoardLayout<'a> {
    pub rows: Vec<Row<'a>>,
    pub range: &'a TimeRange,
    pub metrics: BarMetrics,
    pub col_width: f64,
    pub left_width: f64,
    pub header_height: f64,
    pub grid_width: f64,
    pub total_height: f64,
    /// Horizontal shift for the header (negative scroll offset)
    pub header_offset: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    /// Whether a fixed bottom scrollbar takes part in horizontal scrolling
    pub bottom_scrollbar: bool,
    pub vertical_sync: VerticalSync,
    /// Offset used to display times
    pub display_offset: FixedOffset,
    pub palette: &'a [String],
    /// Instant the data was last refreshed
    pub now: Timestamp,
}

impl<'a> BoardLayout<'a> {
    /// Bar span for a task row
    pub fn bar_for(&self, task: &Task) -> BarSpan {
        layout_bar(task, self.range.start, &self.metrics)
    }

    pub fn color_for(&self, group_index: usize) -> &str {
        if self.palette.is_empty() {
            return "#888888";
        }
        &self.palette[group_index % self.palette.len()]
    }

    pub fn task_rows(&self) -> impl Iterator<Item = &Row<'a>> {
        self.rows
            .iter()
            .filter(|r| matches!(r.kind, RowKind::Task { .. }))
    }
}

/// Heights and collapse lookups used to lay out rows
pub(crate) struct RowSpec<'s> {
    pub row_height: f64,
    pub group_header_height: f64,
    pub group_collapsed: &'s dyn Fn(&str) -> bool,
    pub operation_collapsed: &'s dyn Fn(&str) -> bool,
}

/// Flatten the visible hierarchy into positioned rows
pub(crate) fn layout_rows<'a>(groups: &'a [Group], spec: &RowSpec<'_>) -> Vec<Row<'a>> {
    let mut rows: Vec<Row<'a>> = Vec::new();
    let mut top = 0.0;
    let mut push = |height: f64, kind: RowKind<'a>| {
        rows.push(Row { top, height, kind });
        top += height;
    };

    for (group_index, group) in groups.iter().enumerate() {
        let group_collapsed = (spec.group_collapsed)(&group.id);
        push(
            spec.group_header_height,
            RowKind::Group {
                group_index,
                group,
                collapsed: group_collapsed,
            },
        );
        if group_collapsed {
            continue;
        }
        for operation in &group.operations {
            let op_collapsed = (spec.operation_collapsed)(&operation.key);
            push(
                spec.row_height,
                RowKind::Operation {
                    group_index,
                    operation,
                    collapsed: op_collapsed,
                },
            );
            if op_collapsed {
                continue;
            }
            for task in &operation.tasks {
                push(
                    spec.row_height,
                    RowKind::Task {
                        group_index,
                        operation,
                        task,
                    },
                );
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<Group> {
        vec![
            Group::new("p1", "Bracket")
                .operation(
                    Operation::new("p1", "op-10", "CUT")
                        .task(Task::new("t1", "WO-1"))
                        .task(Task::new("t2", "WO-2")),
                )
                .operation(Operation::new("p1", "op-20", "WELD").task(Task::new("t3", "WO-3"))),
            Group::new("p2", "Hinge")
                .operation(Operation::new("p2", "op-10", "CUT").task(Task::new("t4", "WO-4"))),
        ]
    }

    fn spec<'s>(
        group_collapsed: &'s dyn Fn(&str) -> bool,
        operation_collapsed: &'s dyn Fn(&str) -> bool,
    ) -> RowSpec<'s> {
        RowSpec {
            row_height: 30.0,
            group_header_height: 40.0,
            group_collapsed,
            operation_collapsed,
        }
    }

    #[test]
    fn expanded_rows_are_contiguous() {
        let groups = groups();
        let none = |_: &str| false;
        let rows = layout_rows(&groups, &spec(&none, &none));
        assert_eq!(rows.len(), 2 + 3 + 4);
        for pair in rows.windows(2) {
            assert_eq!(pair[0].bottom(), pair[1].top);
        }
        assert_eq!(rows.last().unwrap().bottom(), 2.0 * 40.0 + 7.0 * 30.0);
    }

    #[test]
    fn collapsed_group_hides_operations_regardless_of_their_flags() {
        let groups = groups();
        let group_collapsed = |id: &str| id == "p1";
        let none = |_: &str| false;
        let rows = layout_rows(&groups, &spec(&group_collapsed, &none));
        // p1 header, p2 header, p2 op, p2 task
        assert_eq!(rows.len(), 4);
        assert!(matches!(rows[0].kind, RowKind::Group { collapsed: true, .. }));
        assert_eq!(rows[1].group_index(), 1);
    }

    #[test]
    fn collapsed_operation_hides_only_its_tasks() {
        let groups = groups();
        let none = |_: &str| false;
        let op_collapsed = |key: &str| key == "p1/op-10";
        let rows = layout_rows(&groups, &spec(&none, &op_collapsed));
        let task_codes: Vec<_> = rows
            .iter()
            .filter_map(|r| match r.kind {
                RowKind::Task { task, .. } => Some(task.task_code.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(task_codes, vec!["WO-3", "WO-4"]);
    }
}
