//! Checkcard CLI Application
//!
//! Command-line front end for the checkcard workflow engine.

mod args;
mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use args::{Args, Commands};
use checkcard_core::{TaskListOptions, WorkflowBuilder};
use clap::Parser;
use cli::Cli;
use log::info;
use Commands::*;

fn main() -> Result<ExitCode> {
    env_logger::init();

    let Args {
        project_root,
        template_dir,
        phase_band,
        allow_unknown_dependencies,
        json,
        command,
    } = Args::parse();

    if let Schema = command {
        return Cli::schema();
    }

    let workflow = WorkflowBuilder::new()
        .with_project_root(project_root)
        .with_template_dir(template_dir)
        .with_task_options(TaskListOptions {
            phase_band,
            require_known_dependencies: !allow_unknown_dependencies,
        })
        .build()
        .context("Failed to initialize workflow")?;

    info!("Checkcard started");

    let cli = Cli::new(workflow, json);
    match command {
        Steps(args) => cli.list_steps(&args),
        Brief(args) => cli.brief(&args.into()),
        Save(args) => {
            let params = args.into_params().context("Failed to read step output")?;
            cli.save(&params)
        }
        Validate(args) => cli.validate(&args),
        Tasks(args) => cli.tasks(&args),
        Schema => Cli::schema(),
    }
}
