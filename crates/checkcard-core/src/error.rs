//! Error types for the checkcard library.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Comprehensive error type for all checkcard operations.
#[derive(Error, Debug)]
pub enum CheckcardError {
    /// The step id is not registered
    #[error("Unknown step: {step_id} (valid steps: {})", .valid.join(", "))]
    UnknownStep { step_id: String, valid: Vec<String> },
    /// No checkcard exists at the resolved location
    #[error("Checkcard not found: {}", .path.display())]
    NotFound { path: PathBuf },
    /// A required upstream field is absent or empty
    #[error("Input '{key}' from step '{source_step}' is not available or empty (path: {path})")]
    MissingInput {
        key: String,
        path: String,
        source_step: String,
    },
    /// Malformed serialized input
    #[error("JSON Parse Error: {message}")]
    Parse { message: String },
    /// One or more rule violations, always reported together
    #[error("Validation failed with {} error(s): {}", .errors.len(), .errors.join("; "))]
    Validation { errors: Vec<String> },
    /// Step definitions that cannot form a workflow
    #[error("Invalid step definition '{step_id}': {reason}")]
    InvalidDefinition { step_id: String, reason: String },
    /// File system operation errors
    #[error("File system error at path '{}': {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Serialization errors while writing records
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating missing-input errors.
pub struct MissingInputBuilder {
    key: String,
    source_step: String,
}

impl MissingInputBuilder {
    /// Create a new builder for an input key sourced from a step.
    pub fn new(key: impl Into<String>, source_step: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source_step: source_step.into(),
        }
    }

    /// Build the error with the dotted path that failed to resolve.
    pub fn at_path(self, path: impl Into<String>) -> CheckcardError {
        CheckcardError::MissingInput {
            key: self.key,
            path: path.into(),
            source_step: self.source_step,
        }
    }
}

/// Builder for creating definition errors.
pub struct InvalidDefinitionBuilder {
    step_id: String,
}

impl InvalidDefinitionBuilder {
    /// Create a new builder for a step id.
    pub fn new(step_id: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> CheckcardError {
        CheckcardError::InvalidDefinition {
            step_id: self.step_id,
            reason: reason.into(),
        }
    }
}

impl CheckcardError {
    /// Creates a builder for missing-input errors.
    pub fn missing_input(
        key: impl Into<String>,
        source_step: impl Into<String>,
    ) -> MissingInputBuilder {
        MissingInputBuilder::new(key, source_step)
    }

    /// Creates a builder for definition errors.
    pub fn invalid_definition(step_id: impl Into<String>) -> InvalidDefinitionBuilder {
        InvalidDefinitionBuilder::new(step_id)
    }

    /// Creates a parse error from any displayable diagnostic.
    pub fn parse(message: impl std::fmt::Display) -> Self {
        Self::Parse {
            message: message.to_string(),
        }
    }

    /// Creates a validation error. An empty list is a caller bug and is
    /// replaced with a generic message so the failure always carries one.
    pub fn validation(errors: Vec<String>) -> Self {
        if errors.is_empty() {
            return Self::Validation {
                errors: vec!["Validation failed".to_string()],
            };
        }
        Self::Validation { errors }
    }

    /// Error messages suitable for showing to an actor verbatim, one per
    /// violation. Never empty.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation { errors } => errors.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Whether the caller can recover by fixing its input or completing a
    /// prerequisite step.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::MissingInput { .. }
                | Self::Parse { .. }
                | Self::Validation { .. }
        )
    }
}

/// Extension trait attaching a path to io errors.
pub trait FsResultExt<T> {
    /// Map io errors to [`CheckcardError::FileSystem`] at the given path.
    fn fs_context(self, path: &Path) -> Result<T>;
}

impl<T> FsResultExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, path: &Path) -> Result<T> {
        self.map_err(|source| CheckcardError::FileSystem {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Result type alias for checkcard operations
pub type Result<T> = std::result::Result<T, CheckcardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_returned_verbatim() {
        let err = CheckcardError::validation(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.messages(), vec!["a".to_string(), "b".to_string()]);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_empty_validation_still_carries_a_message() {
        let err = CheckcardError::validation(vec![]);
        assert_eq!(err.messages().len(), 1);
    }

    #[test]
    fn test_missing_input_names_key_and_path() {
        let err = CheckcardError::missing_input("user_story", "A1").at_path("outputs.user_story");
        let message = err.to_string();
        assert!(message.contains("user_story"));
        assert!(message.contains("outputs.user_story"));
        assert!(message.contains("A1"));
    }

    #[test]
    fn test_unknown_step_lists_valid_ids() {
        let err = CheckcardError::UnknownStep {
            step_id: "Z9".to_string(),
            valid: vec!["A1".to_string(), "B1".to_string()],
        };
        assert_eq!(err.to_string(), "Unknown step: Z9 (valid steps: A1, B1)");
        assert!(!err.is_recoverable());
    }
}
