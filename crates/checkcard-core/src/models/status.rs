//! Lifecycle status of a checkcard.

use std::{fmt, str::FromStr};

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Type-safe enumeration of checkcard lifecycle statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    /// Step has not started
    Pending,

    /// Step is being worked on
    InProgress,

    /// Step finished and its outputs are final
    Completed,

    /// Step could not be finished
    Failed,
}

impl LifecycleStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [LifecycleStatus; 4] = [
        LifecycleStatus::Pending,
        LifecycleStatus::InProgress,
        LifecycleStatus::Completed,
        LifecycleStatus::Failed,
    ];

    /// Persisted string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Pending => "pending",
            LifecycleStatus::InProgress => "in_progress",
            LifecycleStatus::Completed => "completed",
            LifecycleStatus::Failed => "failed",
        }
    }

    /// Whether timestamps are expected to still be unset.
    pub fn is_open(&self) -> bool {
        matches!(self, LifecycleStatus::Pending | LifecycleStatus::InProgress)
    }
}

impl FromStr for LifecycleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LifecycleStatus::Pending),
            "in_progress" => Ok(LifecycleStatus::InProgress),
            "completed" => Ok(LifecycleStatus::Completed),
            "failed" => Ok(LifecycleStatus::Failed),
            _ => Err(format!("Invalid lifecycle status: {s}")),
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
