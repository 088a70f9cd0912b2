//! Task breakdown validation and normalization.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::{display_value, json_kind};
use crate::{
    error::{CheckcardError, Result},
    models::{TaskRecord, INITIAL_TASK_STATUS},
};

/// Number of consecutive task numbers grouped into one inferred phase.
pub const DEFAULT_PHASE_BAND: u32 = 10;

/// Tunables for task-list validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskListOptions {
    /// Task numbers per inferred phase: with 10, T001-T010 is phase 1,
    /// T011-T020 phase 2 and so on
    pub phase_band: u32,
    /// Every dependency must name a task in the same list
    pub require_known_dependencies: bool,
}

impl Default for TaskListOptions {
    fn default() -> Self {
        Self {
            phase_band: DEFAULT_PHASE_BAND,
            require_known_dependencies: true,
        }
    }
}

/// Validates a task breakdown and produces the normalized list.
///
/// # Examples
///
/// ```rust
/// use checkcard_core::validation::TaskListValidator;
/// use serde_json::json;
///
/// let tasks = TaskListValidator::default()
///     .validate(&json!([{
///         "task_id": "T015",
///         "description": "Wire up the store",
///         "is_parallel": false,
///         "dependencies": null,
///         "mvp": true
///     }]))
///     .unwrap();
/// assert_eq!(tasks[0].phase, 2);
/// assert_eq!(tasks[0].status, "pending");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskListValidator {
    options: TaskListOptions,
}

impl TaskListValidator {
    pub fn new(options: TaskListOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> TaskListOptions {
        self.options
    }

    /// Validates `raw`, which is either the task array itself or a JSON
    /// string holding it.
    ///
    /// # Errors
    ///
    /// Returns `CheckcardError::Parse` when a string does not hold JSON, and
    /// `CheckcardError::Validation` with every per-entry error when any
    /// entry is invalid. No partial list is returned.
    pub fn validate(&self, raw: &Value) -> Result<Vec<TaskRecord>> {
        let parsed;
        let value = match raw {
            Value::String(text) => {
                parsed = serde_json::from_str::<Value>(text).map_err(CheckcardError::parse)?;
                &parsed
            }
            other => other,
        };

        let Value::Array(entries) = value else {
            return Err(CheckcardError::validation(vec![
                "Tasks must be a JSON array (list)".to_string(),
            ]));
        };
        if entries.is_empty() {
            return Err(CheckcardError::validation(vec![
                "Tasks list cannot be empty".to_string(),
            ]));
        }

        let mut errors = Vec::new();
        let mut tasks = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            let Value::Object(task) = entry else {
                errors.push(format!(
                    "Task {idx}: Must be an object/dict, got {}",
                    json_kind(entry)
                ));
                continue;
            };

            let label = task
                .get("task_id")
                .and_then(Value::as_str)
                .unwrap_or("UNKNOWN");
            match self.normalize(task) {
                Ok(record) => tasks.push((idx, record)),
                Err(problems) => errors.extend(
                    problems
                        .into_iter()
                        .map(|problem| format!("Task {idx} ({label}): {problem}")),
                ),
            }
        }

        errors.extend(self.check_references(&tasks));

        if !errors.is_empty() {
            log::debug!("Task list rejected with {} error(s)", errors.len());
            return Err(CheckcardError::validation(errors));
        }

        Ok(tasks.into_iter().map(|(_, record)| record).collect())
    }

    fn normalize(&self, task: &Map<String, Value>) -> std::result::Result<TaskRecord, Vec<String>> {
        let mut problems = Vec::new();

        let task_id = required(task, "task_id", Value::as_str, "string", &mut problems);
        let description = required(task, "description", Value::as_str, "string", &mut problems);
        let is_parallel = required(task, "is_parallel", Value::as_bool, "boolean", &mut problems);
        let mvp = required(task, "mvp", Value::as_bool, "boolean", &mut problems);
        let dependencies = parse_dependencies(task, &mut problems);

        let phase = match task.get("phase") {
            None | Some(Value::Null) => task_id.map(|id| infer_phase(id, self.options.phase_band)),
            Some(value) => {
                let explicit = value
                    .as_u64()
                    .filter(|phase| *phase > 0)
                    .and_then(|phase| u32::try_from(phase).ok());
                if explicit.is_none() {
                    problems.push(format!(
                        "Field 'phase': expected positive integer, got {}",
                        display_value(value)
                    ));
                }
                explicit
            }
        };

        match (task_id, description, is_parallel, mvp, dependencies, phase) {
            (
                Some(task_id),
                Some(description),
                Some(is_parallel),
                Some(mvp),
                Ok(dependencies),
                Some(phase),
            ) if problems.is_empty() => Ok(TaskRecord {
                task_id: task_id.to_string(),
                description: description.to_string(),
                is_parallel,
                dependencies,
                mvp,
                status: INITIAL_TASK_STATUS.to_string(),
                phase,
            }),
            _ => Err(problems),
        }
    }

    /// Uniqueness of ids and, when enabled, that dependencies resolve.
    fn check_references(&self, tasks: &[(usize, TaskRecord)]) -> Vec<String> {
        let mut errors = Vec::new();
        let mut first_seen: HashMap<&str, usize> = HashMap::new();

        for (idx, task) in tasks {
            if let Some(first) = first_seen.get(task.task_id.as_str()) {
                errors.push(format!(
                    "Task {idx} ({}): Duplicate task_id (already used by task {first})",
                    task.task_id
                ));
            } else {
                first_seen.insert(&task.task_id, *idx);
            }
        }

        if self.options.require_known_dependencies {
            for (idx, task) in tasks {
                for dependency in task.dependencies.iter().flatten() {
                    if !first_seen.contains_key(dependency.as_str()) {
                        errors.push(format!(
                            "Task {idx} ({}): Dependency '{dependency}' does not match any task_id in the list",
                            task.task_id
                        ));
                    }
                }
            }
        }

        errors
    }
}

fn required<'a, T>(
    task: &'a Map<String, Value>,
    field: &str,
    extract: impl Fn(&'a Value) -> Option<T>,
    expected: &str,
    problems: &mut Vec<String>,
) -> Option<T> {
    let Some(value) = task.get(field) else {
        problems.push(format!("Missing required field: {field}"));
        return None;
    };
    let extracted = extract(value);
    if extracted.is_none() {
        problems.push(format!(
            "Field '{field}': expected {expected}, got {}",
            json_kind(value)
        ));
    }
    extracted
}

fn parse_dependencies(
    task: &Map<String, Value>,
    problems: &mut Vec<String>,
) -> std::result::Result<Option<Vec<String>>, ()> {
    let items = match task.get("dependencies") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(other) => {
            problems.push(format!(
                "Field 'dependencies': must be null or string array, got {}",
                json_kind(other)
            ));
            return Err(());
        }
    };

    let mut dependencies = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        match item {
            Value::String(dependency) => dependencies.push(dependency.clone()),
            other => {
                problems.push(format!(
                    "Field 'dependencies': item {position} must be a string, got {}",
                    json_kind(other)
                ));
                return Err(());
            }
        }
    }
    Ok(Some(dependencies))
}

/// Phase for a task id such as "T015": the non-numeric prefix is stripped and
/// the number grouped into bands of `band`. Ids without a number, and the
/// number 0, fall back to phase 1.
pub fn infer_phase(task_id: &str, band: u32) -> u32 {
    let band = u64::from(band.max(1));
    let digits = task_id.trim_start_matches(|c: char| !c.is_ascii_digit());
    match digits.parse::<u64>() {
        Ok(number) if number > 0 => u32::try_from((number - 1) / band + 1).unwrap_or(u32::MAX),
        _ => 1,
    }
}
