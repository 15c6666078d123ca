//! CLI integration tests
//!
//! Run the built binary against schedule exports written to a temp dir.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const SCHEDULE: &str = r#"{
  "data": [
    {
      "taskId": "t1", "taskCode": "WO-0001",
      "operationId": "op-10", "operationCode": "CUT", "plannerName": "Lee",
      "productId": "p1", "productName": "Bracket",
      "workerName": "Kim", "machineId": "M-1",
      "startAt": "2026-01-28 09:00:00", "endAt": "2026-01-28 11:30:00"
    },
    {
      "task_id": "t2", "task_code": "WO-0002",
      "operation": { "op_id": "op-20", "op_code": "WELD" },
      "product": { "item_id": "p2", "item_name": "Hinge" },
      "start_time": "2026-01-28T10:00:00+09:00", "end_time": "2026-01-28T12:00:00+09:00"
    },
    { "operationId": "orphan" }
  ]
}"#;

fn opsgantt() -> Command {
    Command::new(env!("CARGO_BIN_EXE_opsgantt"))
}

fn write_schedule(dir: &Path) -> PathBuf {
    let path = dir.join("schedule.json");
    fs::write(&path, SCHEDULE).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    opsgantt().args(args).output().expect("failed to execute opsgantt")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn range_uses_task_extremes() {
    let dir = TempDir::new().unwrap();
    let file = write_schedule(dir.path());

    let output = run(&["range", file.to_str().unwrap()]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("start: 2026-01-28T09:00:00+09:00"), "{out}");
    assert!(out.contains("end:   2026-01-28T12:00:00+09:00"), "{out}");
    assert!(out.contains("ticks: 4"), "{out}");
    assert!(out.contains("width: 480px"), "{out}");
}

#[test]
fn range_falls_back_when_nothing_is_drawable() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("empty.json");
    fs::write(&file, "[]").unwrap();

    let output = run(&[
        "range",
        file.to_str().unwrap(),
        "--now",
        "2026-01-28T10:20:00+09:00",
    ]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("start: 2026-01-28T10:00:00+09:00"), "{out}");
    assert!(out.contains("end:   2026-01-28T20:00:00+09:00"), "{out}");
}

#[test]
fn rows_outline_skips_bad_records() {
    let dir = TempDir::new().unwrap();
    let file = write_schedule(dir.path());

    let output = run(&["rows", file.to_str().unwrap()]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("- Bracket (p1) [1 ops]"), "{out}");
    assert!(out.contains("  - CUT · Lee [1 tasks]"), "{out}");
    assert!(out.contains("    WO-0001 · Kim  09:00~11:30"), "{out}");
    assert!(out.contains("  - WELD · - [1 tasks]"), "{out}");
    assert!(!out.contains("orphan"), "{out}");
}

#[test]
fn rows_json_respects_collapse() {
    let dir = TempDir::new().unwrap();
    let file = write_schedule(dir.path());

    let output = run(&[
        "rows",
        file.to_str().unwrap(),
        "--format",
        "json",
        "--collapse",
        "p1",
    ]);
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let kinds: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["group", "group", "operation", "task"]);
    assert_eq!(rows[0]["collapsed"], true);
    assert_eq!(rows[3]["bar"]["left"], 120.0);
}

#[test]
fn machine_variant_groups_by_machine() {
    let dir = TempDir::new().unwrap();
    let file = write_schedule(dir.path());

    let output = run(&["rows", file.to_str().unwrap(), "--variant", "machine"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("M-1 (M-1)"), "{out}");
    assert!(out.contains("Unassigned (__unassigned__)"), "{out}");
}

#[test]
fn render_writes_html() {
    let dir = TempDir::new().unwrap();
    let file = write_schedule(dir.path());
    let out_path = dir.path().join("board.html");

    let output = run(&[
        "render",
        file.to_str().unwrap(),
        "-o",
        out_path.to_str().unwrap(),
        "--title",
        "Line 3",
    ]);
    assert!(output.status.success());
    let html = fs::read_to_string(&out_path).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Line 3</title>"));
    assert!(html.contains("id=\"right-panel\""));
}

#[test]
fn render_single_panel_to_stdout() {
    let dir = TempDir::new().unwrap();
    let file = write_schedule(dir.path());

    let output = run(&["render", file.to_str().unwrap(), "--format", "left"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("<svg"));
    assert!(out.contains("Bracket"));
}

#[test]
fn config_file_changes_the_grid() {
    let dir = TempDir::new().unwrap();
    let file = write_schedule(dir.path());
    let config = dir.path().join("board.toml");
    fs::write(&config, "step_minutes = 30\ncol_width = 50.0\n").unwrap();

    let output = run(&[
        "range",
        file.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("step:  30 min"), "{out}");
    assert!(out.contains("ticks: 7"), "{out}");
    assert!(out.contains("width: 350px"), "{out}");
}

#[test]
fn invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_schedule(dir.path());
    let config = dir.path().join("board.toml");
    fs::write(&config, "step_minutes = 0\n").unwrap();

    let output = run(&[
        "range",
        file.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
}

#[test]
fn missing_input_fails() {
    let output = run(&["range", "/nonexistent/schedule.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}
