use std::path::PathBuf;

use checkcard_core::validation::DEFAULT_PHASE_BAND;
use clap::{Parser, Subcommand};

use crate::cli::{BriefArgs, SaveArgs, StepsArgs, TasksArgs, ValidateArgs};

/// Validate and store the checkcards of a multi-actor workflow
///
/// Each workflow step produces a checkcard: a JSON record of what the step
/// consumed and produced. This tool shows a step's briefing, validates and
/// saves its outputs, and checks stored checkcards and task breakdowns.
#[derive(Parser)]
#[command(version, about, name = "checkcard")]
pub struct Args {
    /// Project root that workflow instance directories are relative to.
    /// Defaults to the current directory
    #[arg(long, global = true)]
    pub project_root: Option<PathBuf>,

    /// Directory for template checkcards. Defaults to
    /// $XDG_DATA_HOME/checkcard/templates
    #[arg(long, global = true)]
    pub template_dir: Option<PathBuf>,

    /// Number of task ids grouped into one phase
    #[arg(long, global = true, default_value_t = DEFAULT_PHASE_BAND)]
    pub phase_band: u32,

    /// Accept task dependencies that name no task in the list
    #[arg(long, global = true)]
    pub allow_unknown_dependencies: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the registered steps
    #[command(alias = "ls")]
    Steps(StepsArgs),
    /// Show what a step must do and its resolved inputs
    #[command(alias = "b")]
    Brief(BriefArgs),
    /// Validate a step's outputs and save them as its checkcard
    #[command(alias = "s")]
    Save(SaveArgs),
    /// Validate a stored or candidate checkcard
    #[command(alias = "v")]
    Validate(ValidateArgs),
    /// Validate and normalize a task breakdown
    #[command(alias = "t")]
    Tasks(TasksArgs),
    /// Print the JSON schema of a checkcard record
    Schema,
}
