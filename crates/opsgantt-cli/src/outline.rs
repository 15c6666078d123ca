//! Plain outline of a board layout for the `rows` command

use serde::Serialize;

use opsgantt_core::{BarSpan, BoardLayout, RowKind};
use opsgantt_render::{window_label, PLACEHOLDER};

#[derive(Debug, Serialize)]
pub struct OutlineEntry {
    pub kind: &'static str,
    pub id: String,
    pub label: String,
    pub top: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar: Option<BarSpan>,
}

pub fn entries(layout: &BoardLayout<'_>) -> Vec<OutlineEntry> {
    layout
        .rows
        .iter()
        .map(|row| match row.kind {
            RowKind::Group {
                group, collapsed, ..
            } => OutlineEntry {
                kind: "group",
                id: group.id.clone(),
                label: group.title.clone(),
                top: row.top,
                height: row.height,
                collapsed: Some(collapsed),
                bar: None,
            },
            RowKind::Operation {
                operation,
                collapsed,
                ..
            } => OutlineEntry {
                kind: "operation",
                id: operation.key.clone(),
                label: format!(
                    "{} · {}",
                    operation.operation_code,
                    operation.planner_name.as_deref().unwrap_or(PLACEHOLDER)
                ),
                top: row.top,
                height: row.height,
                collapsed: Some(collapsed),
                bar: None,
            },
            RowKind::Task { task, .. } => {
                let span = layout.bar_for(task);
                OutlineEntry {
                    kind: "task",
                    id: task.id.clone(),
                    label: format!(
                        "{} · {}",
                        task.task_code,
                        task.assignee().unwrap_or(PLACEHOLDER)
                    ),
                    top: row.top,
                    height: row.height,
                    collapsed: None,
                    bar: span.is_visible().then_some(span),
                }
            }
        })
        .collect()
}

pub fn text(layout: &BoardLayout<'_>) -> String {
    let mut out = String::new();
    for row in &layout.rows {
        match row.kind {
            RowKind::Group {
                group, collapsed, ..
            } => {
                out.push_str(&format!(
                    "{} {} ({}) [{} ops]\n",
                    marker(collapsed),
                    group.title,
                    group.id,
                    group.operations.len()
                ));
            }
            RowKind::Operation {
                operation,
                collapsed,
                ..
            } => {
                out.push_str(&format!(
                    "  {} {} · {} [{} tasks]\n",
                    marker(collapsed),
                    operation.operation_code,
                    operation.planner_name.as_deref().unwrap_or(PLACEHOLDER),
                    operation.tasks.len()
                ));
            }
            RowKind::Task { task, .. } => {
                let window = window_label(task, layout.display_offset)
                    .unwrap_or_else(|| PLACEHOLDER.to_string());
                out.push_str(&format!(
                    "    {} · {}  {}\n",
                    task.task_code,
                    task.assignee().unwrap_or(PLACEHOLDER),
                    window
                ));
            }
        }
    }
    out
}

fn marker(collapsed: bool) -> char {
    if collapsed {
        '+'
    } else {
        '-'
    }
}
