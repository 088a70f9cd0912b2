use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Helper function to create a temporary project for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Helper function to create a Command rooted in the test project
fn checkcard_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("checkcard").expect("Failed to find checkcard binary");
    cmd.arg("--project-root")
        .arg(temp_dir.path().join("project"))
        .arg("--template-dir")
        .arg(temp_dir.path().join("templates"));
    cmd
}

fn write_json(dir: &Path, name: &str, value: &Value) -> String {
    let path = dir.join(name);
    fs::write(&path, value.to_string()).expect("Failed to write JSON file");
    path.to_str().unwrap().to_string()
}

fn a1_outputs() -> Value {
    json!({
        "user_initial_input": "Add a dark mode",
        "user_approved_stepA2": true,
        "description_of_feature": "Dark mode toggle in settings",
        "user_story": "As a user I want a dark theme"
    })
}

#[test]
fn test_cli_list_steps() {
    let temp_dir = create_cli_test_environment();

    checkcard_cmd(&temp_dir)
        .arg("steps")
        .assert()
        .success()
        .stdout(predicate::str::contains("A1\torchestrator"))
        .stdout(predicate::str::contains("F1\tplanner\tPlanner Tasks Phase"));
}

#[test]
fn test_cli_list_steps_by_actor() {
    let temp_dir = create_cli_test_environment();

    checkcard_cmd(&temp_dir)
        .args(["steps", "--by-actor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("orchestrator: A1, C1, E1"))
        .stdout(predicate::str::contains("planner: B1, D1, F1"));
}

#[test]
fn test_cli_brief_first_step() {
    let temp_dir = create_cli_test_environment();

    checkcard_cmd(&temp_dir)
        .args(["brief", "A1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# A1: User Request + Orchestrator Dialog"))
        .stdout(predicate::str::contains("- user_story (text):"))
        .stdout(predicate::str::contains("## Tool Usage (optional)"));
}

#[test]
fn test_cli_brief_requires_source_checkcard() {
    let temp_dir = create_cli_test_environment();

    checkcard_cmd(&temp_dir)
        .args(["brief", "B1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: Checkcard not found:"));
}

#[test]
fn test_cli_unknown_step_fails() {
    let temp_dir = create_cli_test_environment();

    checkcard_cmd(&temp_dir)
        .args(["brief", "Z9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown step: Z9"));
}

#[test]
fn test_cli_save_then_brief_next_step() {
    let temp_dir = create_cli_test_environment();
    let outputs = write_json(temp_dir.path(), "a1.json", &a1_outputs());

    checkcard_cmd(&temp_dir)
        .args(["save", "A1", &outputs, "--instance", "specs/001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved checkcard A1 to"));

    assert!(temp_dir
        .path()
        .join("project/specs/001/checkcards/A1_checkcard.json")
        .is_file());

    checkcard_cmd(&temp_dir)
        .args(["--json", "brief", "B1", "--instance", "specs/001"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#""user_story": "As a user I want a dark theme""#,
        ));
}

#[test]
fn test_cli_save_reports_every_missing_output() {
    let temp_dir = create_cli_test_environment();
    let outputs = write_json(
        temp_dir.path(),
        "a1.json",
        &json!({"user_initial_input": "Add a dark mode"}),
    );

    checkcard_cmd(&temp_dir)
        .args(["save", "A1", &outputs])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "error: Missing required output field: outputs.user_approved_stepA2",
        ))
        .stderr(predicate::str::contains(
            "error: Missing required output field: outputs.user_story",
        ));
}

#[test]
fn test_cli_save_completed_without_timing_fails() {
    let temp_dir = create_cli_test_environment();
    let outputs = write_json(temp_dir.path(), "a1.json", &a1_outputs());

    checkcard_cmd(&temp_dir)
        .args(["save", "A1", &outputs, "--status", "completed"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Completed checkcard missing 'duration_minutes'",
        ));

    checkcard_cmd(&temp_dir)
        .args([
            "save",
            "A1",
            &outputs,
            "--status",
            "completed",
            "--started-at",
            "2025-01-15T10:30:00Z",
            "--completed-at",
            "2025-01-15T10:45:00Z",
            "--duration-minutes",
            "15",
        ])
        .assert()
        .success();
}

#[test]
fn test_cli_save_from_stdin() {
    let temp_dir = create_cli_test_environment();

    checkcard_cmd(&temp_dir)
        .args(["--json", "save", "A1", "-"])
        .write_stdin(a1_outputs().to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""step_id": "A1""#));
}

#[test]
fn test_cli_validate_stored_checkcard() {
    let temp_dir = create_cli_test_environment();
    let outputs = write_json(temp_dir.path(), "a1.json", &a1_outputs());

    checkcard_cmd(&temp_dir)
        .args(["save", "A1", &outputs])
        .assert()
        .success();

    checkcard_cmd(&temp_dir)
        .args(["validate", "A1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation passed"));
}

#[test]
fn test_cli_validate_candidate_file() {
    let temp_dir = create_cli_test_environment();
    let record = json!({
        "stepA1": {
            "metadata": {
                "step_id": "A1",
                "step_index": 1,
                "step_name": "User Request + Orchestrator Dialog",
                "agent": "planner",
                "description": "dialog"
            },
            "data": {"outputs": a1_outputs()},
            "status": "failed"
        }
    });
    let file = write_json(temp_dir.path(), "candidate.json", &record);

    checkcard_cmd(&temp_dir)
        .args(["validate", "A1", "--file", &file])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Field 'metadata.agent' has invalid value 'planner'. Expected: orchestrator",
        ))
        .stdout(predicate::str::contains(
            "Failed checkcard missing 'error' message",
        ));
}

#[test]
fn test_cli_validate_checks_task_list() {
    let temp_dir = create_cli_test_environment();
    let record = json!({
        "metadata": {
            "step_id": "F1",
            "step_index": 7,
            "step_name": "Planner Tasks Phase",
            "agent": "planner",
            "description": "tasks"
        },
        "data": {
            "inputs": {"plan_file_path": "plan.md"},
            "outputs": {"tasks_json": [], "task_file_path": "tasks.md"}
        }
    });
    let file = write_json(temp_dir.path(), "f1.json", &record);

    checkcard_cmd(&temp_dir)
        .args(["validate", "F1", "--file", &file])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "outputs.tasks_json: Tasks list cannot be empty",
        ));
}

#[test]
fn test_cli_tasks_normalizes_phases() {
    let temp_dir = create_cli_test_environment();
    let tasks = json!([
        {"task_id": "T007", "description": "a", "is_parallel": false, "dependencies": null, "mvp": true},
        {"task_id": "T015", "description": "b", "is_parallel": true, "dependencies": ["T007"], "mvp": false}
    ]);
    let file = write_json(temp_dir.path(), "tasks.json", &tasks);

    let output = checkcard_cmd(&temp_dir)
        .args(["tasks", &file])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let normalized: Value = serde_json::from_slice(&output).expect("Invalid JSON output");
    assert_eq!(normalized[0]["phase"], 1);
    assert_eq!(normalized[1]["phase"], 2);
    assert_eq!(normalized[1]["status"], "pending");
}

#[test]
fn test_cli_tasks_unknown_dependency() {
    let temp_dir = create_cli_test_environment();
    let tasks = json!([
        {"task_id": "T001", "description": "a", "is_parallel": false, "dependencies": ["T999"], "mvp": true}
    ]);
    let file = write_json(temp_dir.path(), "tasks.json", &tasks);

    checkcard_cmd(&temp_dir)
        .args(["tasks", &file])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Dependency 'T999' does not match any task_id in the list",
        ));

    checkcard_cmd(&temp_dir)
        .args(["--allow-unknown-dependencies", "tasks", &file])
        .assert()
        .success();
}

#[test]
fn test_cli_zero_phase_band_fails() {
    let temp_dir = create_cli_test_environment();

    checkcard_cmd(&temp_dir)
        .args(["--phase-band", "0", "steps"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to initialize workflow"));
}

#[test]
fn test_cli_schema() {
    let temp_dir = create_cli_test_environment();

    checkcard_cmd(&temp_dir)
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"metadata\""))
        .stdout(predicate::str::contains("\"duration_minutes\""));
}
