//! Where checkcard files live.

use std::path::{Path, PathBuf};

use crate::error::{CheckcardError, Result};

/// Maps an optional workflow instance to the directory holding its
/// checkcards.
pub trait PathResolver {
    /// Directory for the instance, or the shared template area for `None`.
    fn checkcard_dir(&self, instance: Option<&Path>) -> PathBuf;
}

impl<T: PathResolver + ?Sized> PathResolver for Box<T> {
    fn checkcard_dir(&self, instance: Option<&Path>) -> PathBuf {
        (**self).checkcard_dir(instance)
    }
}

/// Resolves instances relative to a project root.
///
/// An instance `specs/001-feature` maps to
/// `<project_root>/specs/001-feature/checkcards`; no instance maps to the
/// template directory. The two areas never mix.
#[derive(Debug, Clone)]
pub struct ProjectPathResolver {
    project_root: PathBuf,
    template_dir: PathBuf,
}

impl ProjectPathResolver {
    pub fn new(project_root: impl Into<PathBuf>, template_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            template_dir: template_dir.into(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }
}

impl PathResolver for ProjectPathResolver {
    fn checkcard_dir(&self, instance: Option<&Path>) -> PathBuf {
        match instance {
            Some(instance) => self.project_root.join(instance).join("checkcards"),
            None => self.template_dir.clone(),
        }
    }
}

/// File name of a step's checkcard.
pub fn checkcard_file_name(step_id: &str) -> String {
    format!("{step_id}_checkcard.json")
}

/// Returns the default template directory following the XDG Base Directory
/// specification: `$XDG_DATA_HOME/checkcard/templates` or
/// `~/.local/share/checkcard/templates`.
pub fn default_template_dir() -> Result<PathBuf> {
    xdg::BaseDirectories::with_prefix("checkcard")
        .create_data_directory("templates")
        .map_err(|e| CheckcardError::XdgDirectory(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_and_template_areas_are_separate() {
        let resolver = ProjectPathResolver::new("/project", "/templates");

        assert_eq!(
            resolver.checkcard_dir(Some(Path::new("specs/001-feature"))),
            PathBuf::from("/project/specs/001-feature/checkcards")
        );
        assert_eq!(resolver.checkcard_dir(None), PathBuf::from("/templates"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(checkcard_file_name("C1"), "C1_checkcard.json");
    }
}
