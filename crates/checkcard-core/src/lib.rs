//! Core library for the checkcard workflow engine.
//!
//! A workflow is a sequence of steps, each owned by an actor (orchestrator,
//! planner, ...). Every step produces a *checkcard*: a JSON record of what it
//! consumed, what it produced, and whether it succeeded. Later steps take
//! their inputs from fields of earlier checkcards.
//!
//! The crate provides:
//!
//! - [`registry`]: the step definition graph, checked once when built
//! - [`resolver`]: dotted-path extraction carrying outputs into inputs
//! - [`store`]: one JSON file per step, per workflow instance
//! - [`validation`]: structural, lifecycle and task-list validators
//! - [`workflow`]: the facade front ends talk to
//!
//! Everything is synchronous. Failures are returned as [`CheckcardError`],
//! and validation failures always carry every violation at once.
//!
//! # Quick Start
//!
//! ```rust
//! use checkcard_core::{params::SaveStepOutput, WorkflowBuilder};
//! use serde_json::{json, Map};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let workflow = WorkflowBuilder::new()
//!     .with_project_root(Some(temp.path()))
//!     .with_template_dir(Some(temp.path().join("templates")))
//!     .build()?;
//!
//! let mut outputs = Map::new();
//! outputs.insert("user_initial_input".into(), json!("Add dark mode"));
//! outputs.insert("user_approved_stepA2".into(), json!(true));
//! outputs.insert("description_of_feature".into(), json!("Dark mode toggle"));
//! outputs.insert("user_story".into(), json!("As a user I want a dark theme"));
//! workflow.save_output(&SaveStepOutput::new("A1", outputs))?;
//!
//! let briefing = workflow.briefing("B1", None)?;
//! assert_eq!(briefing.inputs["user_story"], "As a user I want a dark theme");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod error;
pub mod models;
pub mod params;
pub mod registry;
pub mod resolver;
pub mod store;
pub mod validation;
pub mod workflow;

// Re-export commonly used types
pub use error::{CheckcardError, Result};
pub use models::{
    Actor, CheckcardRecord, DataSection, LifecycleStatus, StepMetadata, TaskRecord,
};
pub use params::{LoadStepInput, SaveStepOutput};
pub use registry::{RegistryBuilder, StepBehavior, StepDefinition, StepRegistry};
pub use store::{CheckcardStore, PathResolver, ProjectPathResolver};
pub use validation::{
    ExternalSchema, LifecycleValidator, StructuralValidator, TaskListOptions, TaskListValidator,
    ValidationReport,
};
pub use workflow::{ExpectedOutput, SaveOutcome, StepBriefing, Workflow, WorkflowBuilder};
