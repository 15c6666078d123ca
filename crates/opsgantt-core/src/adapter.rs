//! Record adapter: schedule exports to `TaskRecord`
//!
//! The schedule API spells the same field several ways depending on the
//! endpoint and its version. Each field has one fixed list of accepted keys,
//! looked up in order, first on the record itself and then on the one nested
//! object that owns the field (`task`, `operation`, `product` or `machine`).
//! This runs once per record at the boundary; nothing downstream looks at
//! raw keys.

use serde_json::{Map, Value};
use tracing::warn;

use crate::{RawInstant, RecordError, TaskRecord};

pub const TASK_ID_KEYS: &[&str] = &["taskId", "task_id", "id", "workOrderId", "work_order_id"];
pub const TASK_CODE_KEYS: &[&str] = &[
    "taskCode",
    "task_code",
    "workOrderCode",
    "work_order_code",
    "workOrderNo",
    "code",
];
pub const OPERATION_ID_KEYS: &[&str] = &[
    "operationId",
    "operation_id",
    "opId",
    "op_id",
    "processId",
    "process_id",
];
pub const OPERATION_CODE_KEYS: &[&str] = &[
    "operationCode",
    "operation_code",
    "opCode",
    "op_code",
    "processCode",
    "operationName",
];
pub const PLANNER_KEYS: &[&str] = &["plannerName", "planner_name", "planner", "managerName"];
pub const PRODUCT_ID_KEYS: &[&str] = &["productId", "product_id", "itemId", "item_id", "groupId"];
pub const PRODUCT_TITLE_KEYS: &[&str] = &[
    "productName",
    "product_name",
    "productTitle",
    "itemName",
    "item_name",
    "title",
];
pub const WORKER_KEYS: &[&str] = &["workerName", "worker_name", "worker", "assigneeName", "memberName"];
pub const MACHINE_KEYS: &[&str] = &["machineId", "machine_id", "machineCode", "equipmentId", "machine"];
pub const START_KEYS: &[&str] = &[
    "startAt",
    "start_at",
    "startTime",
    "start_time",
    "plannedStart",
    "start",
];
pub const END_KEYS: &[&str] = &["endAt", "end_at", "endTime", "end_time", "plannedEnd", "end"];

/// Normalize one source record
pub fn normalize_record(value: &Value) -> Result<TaskRecord, RecordError> {
    let obj = value.as_object().ok_or(RecordError::NotAnObject)?;

    let task_id = text_field(obj, TASK_ID_KEYS, "task")
        .or_else(|| text_field(obj, TASK_CODE_KEYS, "task"))
        .ok_or(RecordError::MissingField("task id"))?;
    let task_code = text_field(obj, TASK_CODE_KEYS, "task").unwrap_or_else(|| task_id.clone());

    let operation_code = text_field(obj, OPERATION_CODE_KEYS, "operation");
    let operation_id = text_field(obj, OPERATION_ID_KEYS, "operation")
        .or_else(|| operation_code.clone())
        .ok_or(RecordError::MissingField("operation id"))?;

    Ok(TaskRecord {
        product_id: text_field(obj, PRODUCT_ID_KEYS, "product"),
        product_title: text_field(obj, PRODUCT_TITLE_KEYS, "product"),
        operation_code: operation_code.unwrap_or_else(|| operation_id.clone()),
        operation_id,
        planner_name: text_field(obj, PLANNER_KEYS, "operation"),
        task_id,
        task_code,
        worker_name: text_field(obj, WORKER_KEYS, "task"),
        machine_id: text_field(obj, MACHINE_KEYS, "machine"),
        start_at: instant_field(obj, START_KEYS, "task"),
        end_at: instant_field(obj, END_KEYS, "task"),
    })
}

/// Normalize a list of records, skipping those that cannot be placed.
///
/// Accepts a bare array or an object wrapping one under `data`, `items`,
/// `content` or `tasks`.
pub fn normalize_records(value: &Value) -> Vec<TaskRecord> {
    let items: &[Value] = match value {
        Value::Array(items) => items,
        Value::Object(obj) => ["data", "items", "content", "tasks"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match normalize_record(item) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(index, error = %err, "skipping schedule record");
                None
            }
        })
        .collect()
}

/// Only scalars count as field values; a nested object under a field name
/// (e.g. `"machine": {...}`) is searched as a nested object instead
fn is_scalar(v: &Value) -> bool {
    matches!(v, Value::String(_) | Value::Number(_))
}

/// First scalar under `keys` on the record, then on `obj[owner]`
fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str], owner: &str) -> Option<&'a Value> {
    let scalar_in = |map: &'a Map<String, Value>| {
        keys.iter()
            .find_map(|k| map.get(*k).filter(|v| is_scalar(v)))
    };
    scalar_in(obj).or_else(|| obj.get(owner).and_then(Value::as_object).and_then(scalar_in))
}

fn text_field(obj: &Map<String, Value>, keys: &[&str], owner: &str) -> Option<String> {
    match lookup(obj, keys, owner)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn instant_field(obj: &Map<String, Value>, keys: &[&str], owner: &str) -> RawInstant {
    match lookup(obj, keys, owner) {
        Some(Value::String(s)) => RawInstant::Text(s.clone()),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map_or(RawInstant::Missing, RawInstant::EpochMillis),
        _ => RawInstant::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn camel_case_record() {
        let record = normalize_record(&json!({
            "taskId": 17,
            "taskCode": "WO-0017",
            "operationId": "op-10",
            "operationCode": "CUT",
            "plannerName": "Lee",
            "productId": "p1",
            "productName": "Bracket",
            "workerName": "Kim",
            "machineId": "M-3",
            "startAt": "2026-01-28 09:00:00",
            "endAt": 1769562000000_i64
        }))
        .unwrap();

        assert_eq!(record.task_id, "17");
        assert_eq!(record.task_code, "WO-0017");
        assert_eq!(record.operation_code, "CUT");
        assert_eq!(record.planner_name.as_deref(), Some("Lee"));
        assert_eq!(record.product_title.as_deref(), Some("Bracket"));
        assert_eq!(record.machine_id.as_deref(), Some("M-3"));
        assert_eq!(record.start_at, RawInstant::text("2026-01-28 09:00:00"));
        assert_eq!(record.end_at, RawInstant::EpochMillis(1769562000000));
    }

    #[test]
    fn snake_case_and_nested_fields() {
        let record = normalize_record(&json!({
            "id": "t-1",
            "work_order_code": "WO-1",
            "operation": { "op_id": "op-20", "op_code": "WELD", "planner": "Park" },
            "product": { "item_id": "p9", "item_name": "Hinge" },
            "start_time": "2026-01-28T10:00:00+09:00",
            "end_time": null
        }))
        .unwrap();

        assert_eq!(record.task_id, "t-1");
        assert_eq!(record.operation_id, "op-20");
        assert_eq!(record.operation_code, "WELD");
        assert_eq!(record.planner_name.as_deref(), Some("Park"));
        assert_eq!(record.product_id.as_deref(), Some("p9"));
        assert_eq!(record.end_at, RawInstant::Missing);
    }

    #[test]
    fn operation_code_stands_in_for_missing_id() {
        let record = normalize_record(&json!({
            "taskCode": "WO-1",
            "operationCode": "PAINT"
        }))
        .unwrap();
        assert_eq!(record.task_id, "WO-1");
        assert_eq!(record.operation_id, "PAINT");
    }

    #[test]
    fn missing_identity_is_an_error() {
        assert_eq!(
            normalize_record(&json!({ "operationId": "op" })),
            Err(RecordError::MissingField("task id"))
        );
        assert_eq!(
            normalize_record(&json!({ "taskId": "t" })),
            Err(RecordError::MissingField("operation id"))
        );
        assert_eq!(normalize_record(&json!("x")), Err(RecordError::NotAnObject));
    }

    #[test]
    fn nested_object_under_field_name() {
        let record = normalize_record(&json!({
            "taskId": "t",
            "operationId": "op",
            "machine": { "machineCode": "M-7" }
        }))
        .unwrap();
        assert_eq!(record.machine_id.as_deref(), Some("M-7"));
    }

    #[test]
    fn nested_ids_stay_with_their_owner() {
        assert_eq!(
            normalize_record(&json!({
                "taskCode": "WO-1",
                "operationId": "op-10",
                "operation": { "id": "op-99" }
            }))
            .map(|r| r.task_id),
            Ok("WO-1".to_string())
        );

        let record = normalize_record(&json!({
            "operationId": "op-10",
            "task": { "id": "t-7", "startAt": "2026-01-28 09:00:00" },
            "product": { "title": "Hinge", "startAt": "2030-01-01 00:00:00" }
        }))
        .unwrap();
        assert_eq!(record.task_id, "t-7");
        assert_eq!(record.product_title.as_deref(), Some("Hinge"));
        assert_eq!(record.start_at, RawInstant::text("2026-01-28 09:00:00"));
    }

    #[test]
    fn blank_strings_are_absent() {
        let record = normalize_record(&json!({
            "taskId": "t", "operationId": "op", "workerName": "   "
        }))
        .unwrap();
        assert_eq!(record.worker_name, None);
    }

    #[test]
    fn list_wrappers_and_bad_records() {
        let value = json!({
            "data": [
                { "taskId": "t1", "operationId": "op" },
                { "operationId": "op" },
                { "taskId": "t3", "operationId": "op" }
            ]
        });
        let records = normalize_records(&value);
        let ids: Vec<_> = records.iter().map(|r| r.task_id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t3"]);
        assert!(normalize_records(&json!(42)).is_empty());
    }
}
