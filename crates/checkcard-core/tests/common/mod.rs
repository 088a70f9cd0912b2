#![allow(dead_code)]

use checkcard_core::{Workflow, WorkflowBuilder};
use serde_json::{json, Map, Value};
use tempfile::TempDir;

/// Helper function to create a test workflow rooted in a temporary project
pub fn create_test_workflow() -> (TempDir, Workflow) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let workflow = WorkflowBuilder::new()
        .with_project_root(Some(temp_dir.path().join("project")))
        .with_template_dir(Some(temp_dir.path().join("templates")))
        .build()
        .expect("Failed to create workflow");
    (temp_dir, workflow)
}

/// Converts a `json!` object literal into a map
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

pub fn user_request_outputs() -> Map<String, Value> {
    object(json!({
        "user_initial_input": "Add a dark mode",
        "user_approved_stepA2": true,
        "description_of_feature": "Dark mode toggle in settings",
        "user_story": "As a user I want a dark theme so that night reading is easier"
    }))
}

pub fn task(task_id: &str, dependencies: Value) -> Value {
    json!({
        "task_id": task_id,
        "description": format!("Implement {task_id}"),
        "is_parallel": false,
        "dependencies": dependencies,
        "mvp": true
    })
}
