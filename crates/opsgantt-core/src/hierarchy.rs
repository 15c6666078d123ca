//! Hierarchy building: flat records to `Group -> Operation -> Task`
//!
//! Groups and operations keep the order of their first appearance. Tasks
//! inside an operation are sorted by start (unparseable starts last), then
//! by task code.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Debug;

use chrono::FixedOffset;

use crate::timegrid::parse_instant;
use crate::{Group, Operation, Task, TaskRecord};

/// Group id used for records the strategy cannot place
pub const UNASSIGNED_GROUP_ID: &str = "__unassigned__";
pub const UNASSIGNED_GROUP_TITLE: &str = "Unassigned";

/// Decides which top-level group a record belongs to
pub trait GroupingStrategy: Debug + Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// `(group id, group title)` for a record
    fn group_of(&self, record: &TaskRecord) -> (String, String);
}

/// Group by product
#[derive(Clone, Copy, Debug, Default)]
pub struct ByProduct;

impl GroupingStrategy for ByProduct {
    fn name(&self) -> &'static str {
        "product"
    }

    fn group_of(&self, record: &TaskRecord) -> (String, String) {
        match (&record.product_id, &record.product_title) {
            (Some(id), Some(title)) => (id.clone(), title.clone()),
            (Some(id), None) => (id.clone(), id.clone()),
            (None, Some(title)) => (title.clone(), title.clone()),
            (None, None) => unassigned(),
        }
    }
}

/// Group by assigned machine
#[derive(Clone, Copy, Debug, Default)]
pub struct ByMachine;

impl GroupingStrategy for ByMachine {
    fn name(&self) -> &'static str {
        "machine"
    }

    fn group_of(&self, record: &TaskRecord) -> (String, String) {
        match &record.machine_id {
            Some(id) => (id.clone(), id.clone()),
            None => unassigned(),
        }
    }
}

fn unassigned() -> (String, String) {
    (
        UNASSIGNED_GROUP_ID.to_string(),
        UNASSIGNED_GROUP_TITLE.to_string(),
    )
}

/// Collapse key of an operation within a group.
///
/// `group/operation`, with `\` and `/` inside either id escaped by a
/// backslash so distinct pairs never share a key.
pub fn operation_key(group_id: &str, operation_id: &str) -> String {
    let mut key = String::with_capacity(group_id.len() + operation_id.len() + 1);
    push_escaped(&mut key, group_id);
    key.push('/');
    push_escaped(&mut key, operation_id);
    key
}

fn push_escaped(out: &mut String, id: &str) {
    for c in id.chars() {
        if matches!(c, '\\' | '/') {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Build the ordered tree from flat records
pub fn build_hierarchy(
    records: &[TaskRecord],
    strategy: &dyn GroupingStrategy,
    assumed_offset: FixedOffset,
) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut operation_index: HashMap<(String, String), (usize, usize)> = HashMap::new();

    for record in records {
        let (group_id, title) = strategy.group_of(record);
        let gi = *group_index.entry(group_id.clone()).or_insert_with(|| {
            groups.push(Group::new(group_id.clone(), title));
            groups.len() - 1
        });

        let key = (group_id.clone(), record.operation_id.clone());
        let (gi, oi) = *operation_index.entry(key).or_insert_with(|| {
            let ops = &mut groups[gi].operations;
            ops.push(Operation::new(
                &group_id,
                record.operation_id.clone(),
                record.operation_code.clone(),
            ));
            (gi, ops.len() - 1)
        });

        let operation = &mut groups[gi].operations[oi];
        if operation.planner_name.is_none() {
            operation.planner_name.clone_from(&record.planner_name);
        }
        operation.tasks.push(Task {
            id: record.task_id.clone(),
            task_code: record.task_code.clone(),
            worker_name: record.worker_name.clone(),
            machine_id: record.machine_id.clone(),
            start_at: parse_instant(&record.start_at, assumed_offset),
            end_at: parse_instant(&record.end_at, assumed_offset),
        });
    }

    sort_all_tasks(&mut groups);
    groups
}

/// Sort the tasks of every operation in place
pub fn sort_all_tasks(groups: &mut [Group]) {
    for group in groups {
        for operation in &mut group.operations {
            operation.tasks.sort_by(compare_tasks);
        }
    }
}

/// Task order: valid starts ascending, unparseable starts after, then code
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    let by_start = match (a.start_at, b.start_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_start.then_with(|| a.task_code.cmp(&b.task_code))
}
