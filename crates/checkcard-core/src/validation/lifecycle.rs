//! Status-specific rules and timestamp formats.

use serde_json::{Map, Value};

use super::{display_value, timestamp::check_timestamp, ValidationReport};
use crate::{
    models::{CheckcardRecord, LifecycleStatus},
    resolver::lookup,
};

const TIMING_FIELDS: [&str; 3] = ["started_at", "completed_at", "duration_minutes"];

/// Checks that a record's lifecycle fields agree with its status.
#[derive(Debug, Clone)]
pub struct LifecycleValidator {
    event_timestamps: Vec<String>,
}

impl Default for LifecycleValidator {
    fn default() -> Self {
        Self {
            event_timestamps: vec![
                "agent_spawned.spawned_at".to_string(),
                "agent_killed.killed_at".to_string(),
            ],
        }
    }
}

impl LifecycleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dotted path, relative to the outputs, holding a sub-event
    /// timestamp to check when present.
    pub fn with_event_timestamp(mut self, path: impl Into<String>) -> Self {
        self.event_timestamps.push(path.into());
        self
    }

    pub fn validate(&self, record: &CheckcardRecord) -> ValidationReport {
        let mut report = ValidationReport::new();

        for (field, value) in [
            ("started_at", &record.started_at),
            ("completed_at", &record.completed_at),
        ] {
            if let Some(message) = value.as_ref().and_then(|v| check_timestamp(v, field)) {
                report.error(message);
            }
        }

        match record.status.as_ref() {
            None | Some(Value::Null) => {}
            Some(raw) => match raw.as_str().and_then(|s| s.parse::<LifecycleStatus>().ok()) {
                Some(LifecycleStatus::Completed) => Self::check_completed(record, &mut report),
                Some(LifecycleStatus::Failed) => Self::check_failed(record, &mut report),
                Some(LifecycleStatus::Pending | LifecycleStatus::InProgress) => {
                    Self::check_open(record, &mut report)
                }
                None => report.error(format!(
                    "Field 'status' has invalid value '{}'. Expected one of: [{}]",
                    display_value(raw),
                    LifecycleStatus::ALL
                        .iter()
                        .map(LifecycleStatus::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            },
        }

        self.check_event_timestamps(&record.data.outputs, &mut report);
        report
    }

    fn check_completed(record: &CheckcardRecord, report: &mut ValidationReport) {
        for (field, value) in [
            ("started_at", &record.started_at),
            ("completed_at", &record.completed_at),
        ] {
            let missing = match value {
                None | Some(Value::Null) => true,
                Some(Value::String(text)) => text.is_empty(),
                Some(_) => false,
            };
            if missing {
                report.error(format!("Completed checkcard missing '{field}' timestamp"));
            }
        }

        match &record.duration_minutes {
            None | Some(Value::Null) => {
                report.error("Completed checkcard missing 'duration_minutes'");
            }
            Some(Value::Number(minutes)) if minutes.as_f64().is_some_and(|m| m >= 0.0) => {}
            Some(_) => report.error("Field 'duration_minutes' must be a non-negative number"),
        }

        for (key, value) in &record.data.outputs {
            if value.is_null() {
                report.error(format!("Completed checkcard has null output: outputs.{key}"));
            }
        }
    }

    fn check_failed(record: &CheckcardRecord, report: &mut ValidationReport) {
        let described = matches!(&record.error, Some(Value::String(text)) if !text.trim().is_empty());
        if !described {
            report.error("Failed checkcard missing 'error' message");
        }
    }

    fn check_open(record: &CheckcardRecord, report: &mut ValidationReport) {
        let values = [
            &record.started_at,
            &record.completed_at,
            &record.duration_minutes,
        ];
        for (field, value) in TIMING_FIELDS.iter().zip(values) {
            if value.as_ref().is_some_and(|v| !v.is_null()) {
                report.warning(format!(
                    "Pending/in_progress checkcard has non-null '{field}' (expected null until completed)"
                ));
            }
        }
    }

    fn check_event_timestamps(&self, outputs: &Map<String, Value>, report: &mut ValidationReport) {
        let outputs = Value::Object(outputs.clone());
        for path in &self.event_timestamps {
            // Unset events may be recorded as empty strings.
            let Some(value) = lookup(&outputs, path).filter(|v| v.as_str() != Some("")) else {
                continue;
            };
            if let Some(message) = check_timestamp(value, &format!("outputs.{path}")) {
                report.error(message);
            }
        }
    }
}
