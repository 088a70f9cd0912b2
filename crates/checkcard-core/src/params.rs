//! Parameter structures for checkcard operations.
//!
//! These structures are shared by every front end. Interface layers (such as
//! the command line) define their own argument types with framework-specific
//! derives and convert them into these via `From`.

use std::path::{Path, PathBuf};

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::LifecycleStatus;

/// Parameters for loading a step briefing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct LoadStepInput {
    /// Step to load (e.g. "B1")
    pub step_id: String,
    /// Workflow instance directory relative to the project root; the
    /// template area when absent
    #[serde(default)]
    pub instance: Option<PathBuf>,
}

impl LoadStepInput {
    pub fn instance(&self) -> Option<&Path> {
        self.instance.as_deref()
    }
}

/// Parameters for validating and saving a step's output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SaveStepOutput {
    /// Step whose output is saved
    pub step_id: String,
    /// Workflow instance directory relative to the project root
    #[serde(default)]
    pub instance: Option<PathBuf>,
    /// Output values keyed by the step's declared output keys
    pub outputs: Map<String, Value>,
    /// Tool usage, kept only for steps that ask for it
    #[serde(default)]
    pub tools: Option<Map<String, Value>>,
    /// Lifecycle status to record
    #[serde(default)]
    pub status: Option<LifecycleStatus>,
    /// ISO-8601 start time
    #[serde(default)]
    pub started_at: Option<String>,
    /// ISO-8601 completion time
    #[serde(default)]
    pub completed_at: Option<String>,
    /// Elapsed minutes
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    /// Failure description
    #[serde(default)]
    pub error: Option<String>,
}

impl SaveStepOutput {
    /// Output for a step in the template area, without lifecycle fields.
    pub fn new(step_id: impl Into<String>, outputs: Map<String, Value>) -> Self {
        Self {
            step_id: step_id.into(),
            outputs,
            ..Default::default()
        }
    }

    pub fn instance(&self) -> Option<&Path> {
        self.instance.as_deref()
    }
}
