//! Checkcard validation.
//!
//! Three validators run over a candidate record and their findings are
//! merged into one [`ValidationReport`]:
//!
//! - [`StructuralValidator`]: required outputs and inputs, required values,
//!   nested structures and declared output types
//! - [`LifecycleValidator`]: status-specific rules and timestamp formats
//! - [`TaskListValidator`]: the task breakdown of task-list steps
//!
//! Errors are accumulated rather than short-circuited so an actor sees every
//! problem at once. Warnings never make a report invalid.

mod lifecycle;
mod structural;
mod tasks;
pub mod timestamp;

use std::fmt;

pub use lifecycle::LifecycleValidator;
use serde::Serialize;
use serde_json::Value;
pub use structural::StructuralValidator;
pub use tasks::{TaskListOptions, TaskListValidator, DEFAULT_PHASE_BAND};

use crate::error::{CheckcardError, Result};

/// Externally supplied validation, typically a JSON schema, applied to the
/// record's JSON form.
pub trait ExternalSchema {
    /// Violation messages; empty when the record conforms.
    fn validate(&self, record: &Value) -> Vec<String>;
}

/// Accumulated findings of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Appends another report's findings after this one's. A message
    /// already present is not repeated.
    pub fn merge(&mut self, other: ValidationReport) {
        for error in other.errors {
            if !self.errors.contains(&error) {
                self.errors.push(error);
            }
        }
        for warning in other.warnings {
            if !self.warnings.contains(&warning) {
                self.warnings.push(warning);
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts into the warnings on success or a
    /// [`CheckcardError::Validation`] carrying every error.
    ///
    /// # Errors
    ///
    /// Returns `CheckcardError::Validation` when any error was recorded.
    pub fn into_result(self) -> Result<Vec<String>> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(CheckcardError::validation(self.errors))
        }
    }
}

/// Name of a JSON value's kind, as used in error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Short rendering of a value inside a message: strings bare, anything else
/// as JSON.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            writeln!(f, "Validation passed")?;
        } else {
            writeln!(f, "Validation failed with {} error(s):", self.errors.len())?;
            for (i, error) in self.errors.iter().enumerate() {
                writeln!(f, "  {}. {error}", i + 1)?;
            }
        }
        for warning in &self.warnings {
            writeln!(f, "  warning: {warning}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_order() {
        let mut first = ValidationReport::new();
        first.error("a");
        first.warning("w1");
        let mut second = ValidationReport::new();
        second.error("b");
        second.warning("w2");

        first.merge(second);
        assert_eq!(first.errors, vec!["a", "b"]);
        assert_eq!(first.warnings, vec!["w1", "w2"]);
    }

    #[test]
    fn test_merge_collapses_identical_findings() {
        let mut first = ValidationReport::new();
        first.error("same");
        let mut second = ValidationReport::new();
        second.error("same");
        second.error("other");

        first.merge(second);
        assert_eq!(first.errors, vec!["same", "other"]);
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let mut report = ValidationReport::new();
        report.warning("careful");
        assert!(report.is_valid());
        assert_eq!(report.into_result().unwrap(), vec!["careful"]);
    }

    #[test]
    fn test_errors_become_validation_error() {
        let mut report = ValidationReport::new();
        report.error("one");
        report.error("two");
        let err = report.into_result().unwrap_err();
        assert_eq!(err.messages(), vec!["one", "two"]);
    }

    #[test]
    fn test_display_numbers_errors() {
        let mut report = ValidationReport::new();
        report.error("first");
        let text = report.to_string();
        assert!(text.contains("1 error(s)"));
        assert!(text.contains("1. first"));
    }
}
