//! Normalized task entries produced by task-list validation.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status assigned to every freshly validated task.
pub const INITIAL_TASK_STATUS: &str = "pending";

/// One entry of a validated task breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct TaskRecord {
    /// Identifier such as "T007"
    pub task_id: String,

    /// What the task does
    pub description: String,

    /// Whether the task can run alongside others
    pub is_parallel: bool,

    /// Task ids this task waits on
    pub dependencies: Option<Vec<String>>,

    /// Whether the task belongs to the minimum viable product
    pub mvp: bool,

    /// Always "pending" after validation
    pub status: String,

    /// Explicit or inferred phase, starting at 1
    pub phase: u32,
}
