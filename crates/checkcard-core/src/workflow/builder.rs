//! Builder for creating and configuring Workflow instances.

use std::path::{Path, PathBuf};

use super::Workflow;
use crate::{
    error::{CheckcardError, FsResultExt, Result},
    registry::StepRegistry,
    store::{default_template_dir, CheckcardStore, PathResolver, ProjectPathResolver},
    validation::{ExternalSchema, LifecycleValidator, TaskListOptions, TaskListValidator},
};

/// Builder for creating and configuring Workflow instances.
#[derive(Default)]
pub struct WorkflowBuilder {
    project_root: Option<PathBuf>,
    template_dir: Option<PathBuf>,
    path_resolver: Option<Box<dyn PathResolver + Send + Sync>>,
    registry: Option<StepRegistry>,
    task_options: TaskListOptions,
    lifecycle: Option<LifecycleValidator>,
    external_schema: Option<Box<dyn ExternalSchema + Send + Sync>>,
}

impl WorkflowBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory workflow instances are resolved against.
    ///
    /// If not specified, the current working directory is used.
    pub fn with_project_root<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.project_root = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Sets the shared template directory used when no instance is given.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/checkcard/templates` or
    /// `~/.local/share/checkcard/templates`
    pub fn with_template_dir<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.template_dir = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Replaces project-root based path resolution entirely. Project root
    /// and template directory are then ignored.
    pub fn with_path_resolver(mut self, resolver: impl PathResolver + Send + Sync + 'static) -> Self {
        self.path_resolver = Some(Box::new(resolver));
        self
    }

    /// Uses a custom step registry instead of the standard workflow.
    pub fn with_registry(mut self, registry: StepRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_task_options(mut self, options: TaskListOptions) -> Self {
        self.task_options = options;
        self
    }

    /// Uses a lifecycle validator with additional sub-event timestamps.
    pub fn with_lifecycle_validator(mut self, validator: LifecycleValidator) -> Self {
        self.lifecycle = Some(validator);
        self
    }

    /// Appends an external schema check to every record validation.
    pub fn with_external_schema(mut self, schema: impl ExternalSchema + Send + Sync + 'static) -> Self {
        self.external_schema = Some(Box::new(schema));
        self
    }

    /// Builds the configured workflow.
    ///
    /// # Errors
    ///
    /// Returns `CheckcardError::Configuration` if the phase band is zero,
    /// `CheckcardError::FileSystem` if the current directory cannot be
    /// determined, and `CheckcardError::XdgDirectory` if the default template
    /// directory cannot be created.
    pub fn build(self) -> Result<Workflow> {
        if self.task_options.phase_band == 0 {
            return Err(CheckcardError::Configuration {
                message: "Phase band must be at least 1".to_string(),
            });
        }

        let store = match self.path_resolver {
            Some(resolver) => CheckcardStore::new(resolver),
            None => {
                let project_root = match self.project_root {
                    Some(root) => root,
                    None => std::env::current_dir().fs_context(Path::new("."))?,
                };
                let template_dir = match self.template_dir {
                    Some(dir) => dir,
                    None => default_template_dir()?,
                };
                log::debug!(
                    "Resolving instances under {} with templates in {}",
                    project_root.display(),
                    template_dir.display()
                );
                CheckcardStore::new(ProjectPathResolver::new(project_root, template_dir))
            }
        };

        Ok(Workflow {
            registry: self.registry.unwrap_or_default(),
            store,
            lifecycle: self.lifecycle.unwrap_or_default(),
            tasks: TaskListValidator::new(self.task_options),
            external_schema: self.external_schema,
        })
    }
}
