//! High-level workflow API.
//!
//! [`Workflow`] ties the registry, store and validators together into the
//! operations a front end needs:
//!
//! - [`Workflow::briefing`]: what a step must do, its resolved inputs and the
//!   outputs it is expected to produce
//! - [`Workflow::save_output`]: validate an actor's output and persist it
//! - [`Workflow::validate_record`] / [`Workflow::validate_stored`]: check a
//!   candidate or stored checkcard
//! - [`Workflow::validate_tasks`]: check a task breakdown on its own
//!
//! # Examples
//!
//! ```rust,no_run
//! use checkcard_core::{params::SaveStepOutput, WorkflowBuilder};
//! use serde_json::{json, Map};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let workflow = WorkflowBuilder::new()
//!     .with_project_root(Some("/home/user/project"))
//!     .build()?;
//!
//! let briefing = workflow.briefing("A1", None)?;
//! println!("{}", briefing.instructions.join("\n"));
//!
//! let mut outputs = Map::new();
//! outputs.insert("user_initial_input".into(), json!("Add dark mode"));
//! outputs.insert("user_approved_stepA2".into(), json!(true));
//! outputs.insert("description_of_feature".into(), json!("Dark mode toggle"));
//! outputs.insert("user_story".into(), json!("As a user I want dark mode"));
//! let outcome = workflow.save_output(&SaveStepOutput::new("A1", outputs))?;
//! println!("Saved to {}", outcome.path.display());
//! # Ok(())
//! # }
//! ```

mod builder;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use builder::WorkflowBuilder;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::{
    error::Result,
    models::{Actor, CheckcardRecord, DataSection, StepMetadata, TaskRecord},
    params::SaveStepOutput,
    registry::{FieldType, OutputField, StepDefinition, StepRegistry},
    resolver::resolve_inputs,
    store::CheckcardStore,
    validation::{
        timestamp::now_rfc3339, ExternalSchema, LifecycleValidator, StructuralValidator,
        TaskListValidator, ValidationReport,
    },
};

/// One output or tool question as shown to an actor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ExpectedOutput {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub required: bool,
    pub description: String,
}

impl ExpectedOutput {
    fn from_field(field: &OutputField, required: bool) -> Self {
        Self {
            key: field.key.clone(),
            kind: field.kind,
            required,
            description: field.prompt.clone(),
        }
    }
}

/// Everything an actor needs to carry out a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StepBriefing {
    pub step_id: String,
    pub step_index: u32,
    pub step_name: String,
    pub actor: Actor,
    pub description: String,
    pub instructions: Vec<String>,
    /// Values resolved from the source step's stored record
    pub inputs: Map<String, Value>,
    pub expected_outputs: Vec<ExpectedOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_questions: Vec<ExpectedOutput>,
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SaveOutcome {
    pub step_id: String,
    pub path: PathBuf,
    pub warnings: Vec<String>,
}

/// The checkcard state-and-validation engine.
pub struct Workflow {
    registry: StepRegistry,
    store: CheckcardStore,
    lifecycle: LifecycleValidator,
    tasks: TaskListValidator,
    external_schema: Option<Box<dyn ExternalSchema + Send + Sync>>,
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("registry", &self.registry)
            .field("store", &self.store)
            .field("tasks", &self.tasks)
            .field("external_schema", &self.external_schema.is_some())
            .finish_non_exhaustive()
    }
}

impl Workflow {
    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn store(&self) -> &CheckcardStore {
        &self.store
    }

    /// Step ids grouped by owning actor.
    pub fn actors(&self) -> BTreeMap<Actor, Vec<String>> {
        self.registry.actors()
    }

    /// Loads the briefing for a step.
    ///
    /// # Errors
    ///
    /// Returns `CheckcardError::UnknownStep` for an unregistered step,
    /// `CheckcardError::NotFound` when the source step has no stored record,
    /// and `CheckcardError::MissingInput` when a mapped source value is
    /// absent or empty.
    pub fn briefing(&self, step_id: &str, instance: Option<&Path>) -> Result<StepBriefing> {
        let definition = self.registry.definition(step_id)?;
        let inputs = self.load_inputs(definition, instance)?;

        log::debug!("Loaded briefing for step {step_id}");
        Ok(StepBriefing {
            step_id: step_id.to_string(),
            step_index: definition.metadata.step_index,
            step_name: definition.metadata.step_name.clone(),
            actor: definition.actor,
            description: definition.metadata.description.clone(),
            instructions: definition.instructions.clone(),
            inputs,
            expected_outputs: definition
                .outputs
                .iter()
                .map(|field| ExpectedOutput::from_field(field, true))
                .collect(),
            tool_questions: definition
                .tools
                .iter()
                .map(|field| ExpectedOutput::from_field(field, false))
                .collect(),
        })
    }

    /// Validates an actor's output and saves it as the step's checkcard.
    ///
    /// Task-list steps have their list replaced by the normalized one. Every
    /// missing output and rule violation is collected before failing.
    /// Inputs are re-resolved from the source step so the record always
    /// reflects what the step consumed.
    ///
    /// # Errors
    ///
    /// Returns `CheckcardError::Validation` listing every missing output or
    /// rule violation, plus the errors of [`Workflow::briefing`] for input
    /// resolution and `CheckcardError::FileSystem` when writing fails.
    pub fn save_output(&self, params: &SaveStepOutput) -> Result<SaveOutcome> {
        let step_id = params.step_id.as_str();
        let definition = self.registry.definition(step_id)?;

        let mut report = ValidationReport::new();
        for key in definition.output_keys() {
            if !params.outputs.contains_key(key) {
                report.error(format!("Missing required output field: outputs.{key}"));
            }
        }

        // An invalid task list is stored raw here and reported by
        // `validate_record` together with every other violation.
        let mut outputs = params.outputs.clone();
        if let Some(field) = definition.behavior.task_list_field() {
            let normalized = outputs
                .get(field)
                .filter(|raw| !raw.is_null())
                .and_then(|raw| self.tasks.validate(raw).ok());
            if let Some(tasks) = normalized {
                log::info!("Validated {} task(s) for step {step_id}", tasks.len());
                outputs.insert(field.to_string(), serde_json::to_value(&tasks)?);
            }
        }

        let inputs = if definition.input.is_some() {
            Some(self.load_inputs(definition, params.instance())?)
        } else {
            None
        };

        let tools = if definition.declares_tools() {
            params.tools.clone()
        } else {
            if params.tools.is_some() {
                log::warn!("Step {step_id} does not record tool usage; discarding tools");
            }
            None
        };

        let metadata = StepMetadata {
            step_id: step_id.to_string(),
            step_index: definition.metadata.step_index,
            step_name: definition.metadata.step_name.clone(),
            agent: definition.actor.as_str().to_string(),
            description: definition.metadata.description.clone(),
            created_at: Some(now_rfc3339()),
        };

        let mut record = CheckcardRecord::new(
            metadata,
            DataSection {
                inputs,
                outputs,
                tools,
            },
        );
        if let Some(status) = params.status {
            record = record.with_status(status);
        }
        record.started_at = params.started_at.clone().map(Value::String);
        record.completed_at = params.completed_at.clone().map(Value::String);
        record.duration_minutes = params
            .duration_minutes
            .and_then(Number::from_f64)
            .map(Value::Number);
        record.error = params.error.clone().map(Value::String);

        report.merge(self.validate_record(step_id, &record)?);
        let warnings = report.into_result()?;
        for warning in &warnings {
            log::warn!("{warning}");
        }

        let path = self.store.save_record(step_id, &record, params.instance())?;
        Ok(SaveOutcome {
            step_id: step_id.to_string(),
            path,
            warnings,
        })
    }

    /// Runs the structural, lifecycle and external checks on a record, plus
    /// the task-list check for task-list steps. Task-list errors are
    /// prefixed with the output they came from, e.g. `outputs.tasks_json: `.
    ///
    /// # Errors
    ///
    /// Returns `CheckcardError::UnknownStep` for an unregistered step and
    /// `CheckcardError::Serialization` if the record cannot be turned into
    /// JSON. Violations are reported in the returned report, not as errors.
    pub fn validate_record(
        &self,
        step_id: &str,
        record: &CheckcardRecord,
    ) -> Result<ValidationReport> {
        let definition = self.registry.definition(step_id)?;

        let mut report = StructuralValidator::new().validate(record, definition);
        report.merge(self.lifecycle.validate(record));
        if let Some(field) = definition.behavior.task_list_field() {
            report.merge(self.check_task_list(record, field));
        }
        if let Some(schema) = &self.external_schema {
            let mut external = ValidationReport::new();
            for error in schema.validate(&record.to_value()?) {
                external.error(error);
            }
            report.merge(external);
        }

        log::debug!(
            "Validated step {step_id}: {} error(s), {} warning(s)",
            report.errors.len(),
            report.warnings.len()
        );
        Ok(report)
    }

    /// Loads and validates a stored checkcard.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`CheckcardStore::load`] and
    /// [`Workflow::validate_record`].
    pub fn validate_stored(&self, step_id: &str, instance: Option<&Path>) -> Result<ValidationReport> {
        self.registry.definition(step_id)?;
        let record = self.store.load(step_id, instance)?;
        self.validate_record(step_id, &record)
    }

    /// Validates a task breakdown with the configured options.
    ///
    /// # Errors
    ///
    /// See [`TaskListValidator::validate`].
    pub fn validate_tasks(&self, raw: &Value) -> Result<Vec<TaskRecord>> {
        self.tasks.validate(raw)
    }

    fn check_task_list(&self, record: &CheckcardRecord, field: &str) -> ValidationReport {
        let mut report = ValidationReport::new();
        let Some(raw) = record.data.outputs.get(field).filter(|raw| !raw.is_null()) else {
            return report;
        };
        if let Err(err) = self.tasks.validate(raw) {
            for message in err.messages() {
                report.error(format!("outputs.{field}: {message}"));
            }
        }
        report
    }

    fn load_inputs(
        &self,
        definition: &StepDefinition,
        instance: Option<&Path>,
    ) -> Result<Map<String, Value>> {
        let Some(spec) = &definition.input else {
            return Ok(Map::new());
        };
        let source = self
            .store
            .load_section(&spec.source_step, &spec.source_section, instance)?;
        resolve_inputs(definition, &source)
    }
}
