//! Actor roles that own workflow steps.

use std::{fmt, str::FromStr};

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The role responsible for completing a step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum Actor {
    User,
    Orchestrator,
    Planner,
    Coder,
    Reviewer,
    DatabaseArchitect,
}

impl Actor {
    /// Persisted string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Actor::User => "user",
            Actor::Orchestrator => "orchestrator",
            Actor::Planner => "planner",
            Actor::Coder => "coder",
            Actor::Reviewer => "reviewer",
            Actor::DatabaseArchitect => "database-architect",
        }
    }
}

impl FromStr for Actor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Actor::User),
            "orchestrator" => Ok(Actor::Orchestrator),
            "planner" => Ok(Actor::Planner),
            "coder" => Ok(Actor::Coder),
            "reviewer" => Ok(Actor::Reviewer),
            "database-architect" | "database_architect" => Ok(Actor::DatabaseArchitect),
            _ => Err(format!("Invalid actor: {s}")),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
