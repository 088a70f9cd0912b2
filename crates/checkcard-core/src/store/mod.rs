//! Flat-file persistence of checkcards.
//!
//! Each step has one file, `<dir>/<STEP>_checkcard.json`, whose single
//! top-level key `step<STEP>` wraps the record:
//!
//! ```json
//! {
//!   "stepB1": {
//!     "metadata": { "step_id": "B1", "step_index": 3, "...": "..." },
//!     "data": { "inputs": {}, "outputs": {} },
//!     "status": "completed"
//!   }
//! }
//! ```
//!
//! Saving always overwrites, creates missing directories and is not atomic.
//! Concurrent writers to one step and instance are not protected against.

mod location;

use std::{
    fs,
    path::{Path, PathBuf},
};

pub use location::{checkcard_file_name, default_template_dir, PathResolver, ProjectPathResolver};
use serde_json::{Map, Value};

use crate::{
    error::{CheckcardError, FsResultExt, Result},
    models::{CheckcardRecord, DataSection, StepMetadata},
};

/// Keyed read/write of one record per step id.
pub struct CheckcardStore {
    resolver: Box<dyn PathResolver + Send + Sync>,
}

impl std::fmt::Debug for CheckcardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckcardStore").finish_non_exhaustive()
    }
}

impl CheckcardStore {
    /// Creates a store using the given path collaborator.
    pub fn new(resolver: impl PathResolver + Send + Sync + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
        }
    }

    /// Path of the step's file, whether or not it exists.
    pub fn location(&self, step_id: &str, instance: Option<&Path>) -> PathBuf {
        self.resolver
            .checkcard_dir(instance)
            .join(checkcard_file_name(step_id))
    }

    /// Whether a file exists for the step.
    pub fn exists(&self, step_id: &str, instance: Option<&Path>) -> bool {
        self.location(step_id, instance).is_file()
    }

    /// Loads the step's record.
    ///
    /// # Errors
    ///
    /// Returns `CheckcardError::NotFound` when the file or its `step<ID>`
    /// section does not exist, `CheckcardError::Parse` when the content is
    /// not a valid record, and `CheckcardError::FileSystem` when the file
    /// cannot be read.
    pub fn load(&self, step_id: &str, instance: Option<&Path>) -> Result<CheckcardRecord> {
        self.load_section(step_id, &CheckcardRecord::section_key(step_id), instance)
    }

    /// Loads the record stored under `section` in the step's file.
    ///
    /// # Errors
    ///
    /// See [`CheckcardStore::load`].
    pub fn load_section(
        &self,
        step_id: &str,
        section: &str,
        instance: Option<&Path>,
    ) -> Result<CheckcardRecord> {
        let path = self.location(step_id, instance);
        if !path.is_file() {
            return Err(CheckcardError::NotFound { path });
        }

        let content = fs::read_to_string(&path).fs_context(&path)?;
        let mut document: Value = serde_json::from_str(&content).map_err(CheckcardError::parse)?;

        let raw = document
            .as_object_mut()
            .and_then(|sections| sections.remove(section))
            .ok_or_else(|| CheckcardError::NotFound { path: path.clone() })?;

        let mut record: CheckcardRecord =
            serde_json::from_value(raw).map_err(CheckcardError::parse)?;
        if record.metadata.step_id.is_empty() {
            record.metadata.step_id = step_id.to_string();
        }

        log::debug!("Loaded checkcard {step_id} from {}", path.display());
        Ok(record)
    }

    /// Saves a record built from `data` and `metadata` without lifecycle
    /// fields.
    ///
    /// # Errors
    ///
    /// See [`CheckcardStore::save_record`].
    pub fn save(
        &self,
        step_id: &str,
        data: DataSection,
        metadata: StepMetadata,
        instance: Option<&Path>,
    ) -> Result<PathBuf> {
        self.save_record(step_id, &CheckcardRecord::new(metadata, data), instance)
    }

    /// Writes the record, replacing any previous file for the step.
    ///
    /// # Errors
    ///
    /// Returns `CheckcardError::FileSystem` if the directory cannot be
    /// created or the file cannot be written.
    pub fn save_record(
        &self,
        step_id: &str,
        record: &CheckcardRecord,
        instance: Option<&Path>,
    ) -> Result<PathBuf> {
        let dir = self.resolver.checkcard_dir(instance);
        fs::create_dir_all(&dir).fs_context(&dir)?;

        let mut document = Map::new();
        document.insert(
            CheckcardRecord::section_key(step_id),
            serde_json::to_value(record)?,
        );
        let content = serde_json::to_string_pretty(&Value::Object(document))?;

        let path = dir.join(checkcard_file_name(step_id));
        fs::write(&path, content).fs_context(&path)?;

        log::info!("Saved checkcard {step_id} to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn create_test_store() -> (CheckcardStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let resolver =
            ProjectPathResolver::new(temp_dir.path().join("project"), temp_dir.path().join("tpl"));
        (CheckcardStore::new(resolver), temp_dir)
    }

    fn metadata() -> StepMetadata {
        StepMetadata {
            step_id: "B1".to_string(),
            step_index: 3,
            step_name: "Planner Specify Phase".to_string(),
            agent: "planner".to_string(),
            description: "spec".to_string(),
            created_at: Some("2025-01-15T10:30:00Z".to_string()),
        }
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let (store, _temp) = create_test_store();
        let err = store.load("B1", None).unwrap_err();
        assert!(matches!(err, CheckcardError::NotFound { .. }));
    }

    #[test]
    fn test_save_writes_wrapped_section() {
        let (store, _temp) = create_test_store();
        let mut outputs = Map::new();
        outputs.insert("spec_file_path".to_string(), json!("spec.md"));

        let path = store
            .save("B1", DataSection::with_outputs(outputs), metadata(), None)
            .unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(
            written["stepB1"]["data"]["outputs"]["spec_file_path"],
            "spec.md"
        );
        assert_eq!(written["stepB1"]["metadata"]["step_index"], 3);
    }

    #[test]
    fn test_instance_and_template_do_not_mix() {
        let (store, _temp) = create_test_store();
        let instance = Path::new("specs/001");

        store
            .save("B1", DataSection::default(), metadata(), Some(instance))
            .unwrap();

        assert!(store.exists("B1", Some(instance)));
        assert!(!store.exists("B1", None));
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let (store, _temp) = create_test_store();
        let path = store.location("B1", None);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let err = store.load("B1", None).unwrap_err();
        assert!(err.to_string().starts_with("JSON Parse Error:"));
    }

    #[test]
    fn test_load_missing_section_is_not_found() {
        let (store, _temp) = create_test_store();
        let path = store.location("B1", None);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"stepA1": {}}"#).unwrap();

        let err = store.load("B1", None).unwrap_err();
        assert!(matches!(err, CheckcardError::NotFound { .. }));
    }

    #[test]
    fn test_load_accepts_legacy_layout() {
        let (store, _temp) = create_test_store();
        let path = store.location("B1", None);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let legacy = json!({
            "stepB1": {
                "metadata": {
                    "step_index": 3,
                    "step_name": "Planner Specify Phase",
                    "agent": "planner",
                    "description": "spec"
                },
                "agent_data": {"outputs": {"spec_file_path": "spec.md"}}
            }
        });
        fs::write(&path, legacy.to_string()).unwrap();

        let record = store.load("B1", None).unwrap();
        assert_eq!(record.metadata.step_id, "B1");
        assert_eq!(record.data.outputs["spec_file_path"], "spec.md");
    }
}
