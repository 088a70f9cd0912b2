//! Command-line argument wrappers and command handlers.
//!
//! Argument structures carry the clap derives and convert into the core
//! parameter types, so `checkcard-core` stays free of CLI concerns:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Workflow
//! ```
//!
//! Rejections the caller can fix (validation failures, missing upstream
//! checkcards, malformed JSON) are printed one message per line and turn
//! into exit code 1. Anything else propagates as an error.

use std::{
    fmt::{self, Write as _},
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{bail, Context, Result};
use checkcard_core::{
    params::{LoadStepInput, SaveStepOutput},
    CheckcardError, CheckcardRecord, LifecycleStatus, StepBriefing, Workflow,
};
use clap::{Args, ValueEnum};
use serde_json::{json, Map, Value};

/// Path argument meaning "read from standard input".
const STDIN_PATH: &str = "-";

/// List the registered steps
#[derive(Args)]
pub struct StepsArgs {
    /// Group step ids by the actor that owns them
    #[arg(long)]
    pub by_actor: bool,
}

/// Show a step's briefing
///
/// Resolves the step's inputs from the stored checkcard of its source step,
/// so the source step must have been saved first.
#[derive(Args)]
pub struct BriefArgs {
    /// Step id (e.g. B1)
    pub step_id: String,
    /// Workflow instance directory, relative to the project root
    #[arg(long, help = "Workflow instance directory (e.g. specs/001-feature)")]
    pub instance: Option<PathBuf>,
}

impl From<BriefArgs> for LoadStepInput {
    fn from(val: BriefArgs) -> Self {
        LoadStepInput {
            step_id: val.step_id,
            instance: val.instance,
        }
    }
}

/// Save a step's outputs
///
/// The outputs file holds a JSON object keyed by the step's output keys.
/// Pass `-` to read it from standard input.
#[derive(Args)]
pub struct SaveArgs {
    /// Step id (e.g. A1)
    pub step_id: String,
    /// JSON file with the step's outputs, or `-` for standard input
    pub outputs: PathBuf,
    /// Workflow instance directory, relative to the project root
    #[arg(long, help = "Workflow instance directory (e.g. specs/001-feature)")]
    pub instance: Option<PathBuf>,
    /// JSON file describing the tools used during the step
    #[arg(long)]
    pub tools: Option<PathBuf>,
    /// Lifecycle status to record
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,
    /// ISO-8601 start time
    #[arg(long)]
    pub started_at: Option<String>,
    /// ISO-8601 completion time
    #[arg(long)]
    pub completed_at: Option<String>,
    /// Elapsed minutes
    #[arg(long)]
    pub duration_minutes: Option<f64>,
    /// Failure description, required with `--status failed`
    #[arg(long)]
    pub error: Option<String>,
}

impl SaveArgs {
    /// Reads the referenced files and builds the core parameters.
    pub fn into_params(self) -> Result<SaveStepOutput> {
        let outputs = read_object(&self.outputs)?;
        let tools = self.tools.as_deref().map(read_object).transpose()?;

        Ok(SaveStepOutput {
            step_id: self.step_id,
            instance: self.instance,
            outputs,
            tools,
            status: self.status.map(LifecycleStatus::from),
            started_at: self.started_at,
            completed_at: self.completed_at,
            duration_minutes: self.duration_minutes,
            error: self.error,
        })
    }
}

/// Validate a checkcard
///
/// Checks the stored checkcard of the step, or a candidate record from a
/// file. The file may hold the bare record or the `{"step<ID>": ...}`
/// wrapper used on disk.
#[derive(Args)]
pub struct ValidateArgs {
    /// Step id (e.g. C1)
    pub step_id: String,
    /// Workflow instance directory, relative to the project root
    #[arg(long, help = "Workflow instance directory (e.g. specs/001-feature)")]
    pub instance: Option<PathBuf>,
    /// Validate this file instead of the stored checkcard
    #[arg(long, conflicts_with = "instance")]
    pub file: Option<PathBuf>,
}

/// Validate a task breakdown
#[derive(Args)]
pub struct TasksArgs {
    /// JSON file holding the task array, or `-` for standard input
    pub file: PathBuf,
}

/// Command-line representation of lifecycle statuses
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Pending,
    #[value(name = "in_progress")]
    InProgress,
    Completed,
    Failed,
}

impl From<StatusArg> for LifecycleStatus {
    fn from(val: StatusArg) -> Self {
        match val {
            StatusArg::Pending => LifecycleStatus::Pending,
            StatusArg::InProgress => LifecycleStatus::InProgress,
            StatusArg::Completed => LifecycleStatus::Completed,
            StatusArg::Failed => LifecycleStatus::Failed,
        }
    }
}

/// Runs parsed commands against a workflow.
pub struct Cli {
    workflow: Workflow,
    json: bool,
}

impl Cli {
    pub fn new(workflow: Workflow, json: bool) -> Self {
        Self { workflow, json }
    }

    pub fn list_steps(&self, args: &StepsArgs) -> Result<ExitCode> {
        let registry = self.workflow.registry();

        if args.by_actor {
            let actors = self.workflow.actors();
            if self.json {
                print_json(&actors)?;
            } else {
                for (actor, steps) in &actors {
                    println!("{actor}: {}", steps.join(", "));
                }
            }
            return Ok(ExitCode::SUCCESS);
        }

        if self.json {
            let steps: Vec<Value> = registry
                .iter()
                .map(|(step_id, definition)| {
                    json!({
                        "step_id": step_id,
                        "step_index": definition.metadata.step_index,
                        "step_name": definition.metadata.step_name,
                        "actor": definition.actor,
                    })
                })
                .collect();
            print_json(&steps)?;
        } else {
            for (step_id, definition) in registry.iter() {
                println!(
                    "{step_id}\t{}\t{}",
                    definition.actor, definition.metadata.step_name
                );
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    pub fn brief(&self, params: &LoadStepInput) -> Result<ExitCode> {
        let briefing = match self.workflow.briefing(&params.step_id, params.instance()) {
            Ok(briefing) => briefing,
            Err(err) => return self.rejected(err),
        };

        if self.json {
            print_json(&briefing)?;
        } else {
            print!("{}", render_briefing(&briefing)?);
        }
        Ok(ExitCode::SUCCESS)
    }

    pub fn save(&self, params: &SaveStepOutput) -> Result<ExitCode> {
        let outcome = match self.workflow.save_output(params) {
            Ok(outcome) => outcome,
            Err(err) => return self.rejected(err),
        };

        if self.json {
            print_json(&outcome)?;
        } else {
            for warning in &outcome.warnings {
                eprintln!("warning: {warning}");
            }
            println!(
                "Saved checkcard {} to {}",
                outcome.step_id,
                outcome.path.display()
            );
        }
        Ok(ExitCode::SUCCESS)
    }

    pub fn validate(&self, args: &ValidateArgs) -> Result<ExitCode> {
        let result = match &args.file {
            Some(file) => read_record(&args.step_id, file)?
                .and_then(|record| self.workflow.validate_record(&args.step_id, &record)),
            None => self
                .workflow
                .validate_stored(&args.step_id, args.instance.as_deref()),
        };
        let report = match result {
            Ok(report) => report,
            Err(err) => return self.rejected(err),
        };

        if self.json {
            print_json(&report)?;
        } else {
            print!("{report}");
        }

        Ok(if report.is_valid() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    pub fn tasks(&self, args: &TasksArgs) -> Result<ExitCode> {
        let raw = read_json(&args.file)?;
        match self.workflow.validate_tasks(&raw) {
            Ok(tasks) => {
                print_json(&tasks)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => self.rejected(err),
        }
    }

    pub fn schema() -> Result<ExitCode> {
        let schema = schemars::schema_for!(CheckcardRecord);
        print_json(&schema)?;
        Ok(ExitCode::SUCCESS)
    }

    /// Reports a caller-fixable error and maps it to a failing exit code.
    fn rejected(&self, err: CheckcardError) -> Result<ExitCode> {
        if !err.is_recoverable() {
            return Err(err.into());
        }

        let messages = err.messages();
        log::debug!("Command rejected with {} message(s)", messages.len());
        if self.json {
            print_json(&json!({ "errors": messages }))?;
        } else {
            for message in &messages {
                eprintln!("error: {message}");
            }
        }
        Ok(ExitCode::FAILURE)
    }
}

/// Text rendering of a briefing, in the order an actor works through it.
pub fn render_briefing(briefing: &StepBriefing) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "# {}: {} ({})",
        briefing.step_id, briefing.step_name, briefing.actor
    )?;
    if !briefing.description.is_empty() {
        writeln!(out, "\n{}", briefing.description)?;
    }

    writeln!(out, "\n## Instructions\n")?;
    for instruction in &briefing.instructions {
        writeln!(out, "{instruction}")?;
    }

    if !briefing.inputs.is_empty() {
        writeln!(out, "\n## Inputs\n")?;
        for (key, value) in &briefing.inputs {
            writeln!(out, "- {key}: {value}")?;
        }
    }

    writeln!(out, "\n## Expected Outputs\n")?;
    for output in &briefing.expected_outputs {
        writeln!(out, "- {} ({}): {}", output.key, output.kind, output.description)?;
    }

    if !briefing.tool_questions.is_empty() {
        writeln!(out, "\n## Tool Usage (optional)\n")?;
        for question in &briefing.tool_questions {
            writeln!(
                out,
                "- {} ({}): {}",
                question.key, question.kind, question.description
            )?;
        }
    }
    Ok(out)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let content = if path.as_os_str() == STDIN_PATH {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read standard input")?;
        buffer
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn read_object(path: &Path) -> Result<Map<String, Value>> {
    match read_json(path)? {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

/// Reads a candidate record. The inner result carries record-shape errors
/// so they are reported like validation failures.
fn read_record(
    step_id: &str,
    path: &Path,
) -> Result<std::result::Result<CheckcardRecord, CheckcardError>> {
    let section = CheckcardRecord::section_key(step_id);
    let raw = match read_json(path)? {
        Value::Object(mut document) => document
            .remove(&section)
            .unwrap_or(Value::Object(document)),
        other => other,
    };

    Ok(serde_json::from_value::<CheckcardRecord>(raw)
        .map(|mut record| {
            if record.metadata.step_id.is_empty() {
                record.metadata.step_id = step_id.to_string();
            }
            record
        })
        .map_err(CheckcardError::parse))
}
