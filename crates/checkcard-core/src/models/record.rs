//! Checkcard record definition: the persisted unit, one per step.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::LifecycleStatus;
use crate::error::Result;

/// Script-owned metadata section, copied from the step definition at save
/// time. Actors never supply it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StepMetadata {
    /// Short step identifier (e.g. "B1")
    #[serde(default)]
    pub step_id: String,

    /// Ordinal position of the step in the workflow
    pub step_index: u32,

    /// Human-readable step name
    pub step_name: String,

    /// Role that owns the step
    pub agent: String,

    /// What the step does
    pub description: String,

    /// RFC 3339 timestamp stamped when the record was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Actor-owned data section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DataSection {
    /// Values resolved from the upstream step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Map<String, Value>>,

    /// Values produced by the actor
    #[serde(default)]
    pub outputs: Map<String, Value>,

    /// Tool usage, only recorded for steps that ask for it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Map<String, Value>>,
}

impl DataSection {
    /// Creates a data section holding only outputs.
    pub fn with_outputs(outputs: Map<String, Value>) -> Self {
        Self {
            outputs,
            ..Default::default()
        }
    }
}

/// One persisted checkcard.
///
/// Lifecycle fields are kept as raw JSON values so that malformed content
/// (a misspelled status, a timestamp given as a number) is reported by the
/// validators instead of being rejected while reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CheckcardRecord {
    /// Script-derived metadata
    pub metadata: StepMetadata,

    /// Actor-owned data
    #[serde(default, alias = "agent_data")]
    pub data: DataSection,

    /// Lifecycle status, one of pending / in_progress / completed / failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,

    /// ISO-8601 start time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Value>,

    /// ISO-8601 completion time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Value>,

    /// Elapsed time in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<Value>,

    /// Failure description, required when status is failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl CheckcardRecord {
    /// Creates a record without lifecycle information.
    pub fn new(metadata: StepMetadata, data: DataSection) -> Self {
        Self {
            metadata,
            data,
            status: None,
            started_at: None,
            completed_at: None,
            duration_minutes: None,
            error: None,
        }
    }

    /// Key of the section wrapping a step's record in its file.
    pub fn section_key(step_id: &str) -> String {
        format!("step{step_id}")
    }

    /// Sets the lifecycle status.
    pub fn with_status(mut self, status: LifecycleStatus) -> Self {
        self.status = Some(Value::String(status.as_str().to_string()));
        self
    }

    /// Sets start, completion and duration in one go.
    pub fn with_timing(
        mut self,
        started_at: impl Into<String>,
        completed_at: impl Into<String>,
        duration_minutes: f64,
    ) -> Self {
        self.started_at = Some(Value::String(started_at.into()));
        self.completed_at = Some(Value::String(completed_at.into()));
        self.duration_minutes = serde_json::Number::from_f64(duration_minutes).map(Value::Number);
        self
    }

    /// Sets the failure description.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(Value::String(error.into()));
        self
    }

    /// The declared status when it names a known lifecycle state.
    pub fn lifecycle_status(&self) -> Option<LifecycleStatus> {
        self.status.as_ref()?.as_str()?.parse().ok()
    }

    /// JSON form of the record, used for path-based rule evaluation.
    ///
    /// # Errors
    ///
    /// Returns `CheckcardError::Serialization` if the record cannot be
    /// represented as JSON.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
