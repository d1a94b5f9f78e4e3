//! Project persistence.
//!
//! A project is always read and written as one record keyed by its id.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::project::{Project, ProjectError};

/// A key/value record store for whole projects.
pub trait ProjectStore: Send + Sync {
    /// Fetch a project by id. `Ok(None)` when no record exists.
    fn load(&self, id: &str) -> Result<Option<Project>, ProjectError>;

    /// Insert or replace the record for `project.id`.
    fn save(&self, project: &Project) -> Result<(), ProjectError>;

    /// Ids of all stored projects.
    fn list(&self) -> Result<Vec<String>, ProjectError>;

    /// Like [`ProjectStore::load`], turning a missing record into an error.
    fn require(&self, id: &str) -> Result<Project, ProjectError> {
        self.load(id)?.ok_or_else(|| ProjectError::NotFound { id: id.to_string() })
    }
}

/// Stores each project as `<root>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileProjectStore {
    root: PathBuf,
}

impl FileProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &str) -> Result<PathBuf, ProjectError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ProjectError::ValidationError {
                message: format!("invalid project id: {id:?}"),
            });
        }
        Ok(self.root.join(format!("{id}.json")))
    }
}

impl ProjectStore for FileProjectStore {
    fn load(&self, id: &str) -> Result<Option<Project>, ProjectError> {
        let path = self.record_path(id)?;
        if !path.exists() {
            return Ok(None);
        }

        let json = std::fs::read_to_string(&path).map_err(|e| ProjectError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let project: Project =
            serde_json::from_str(&json).map_err(|e| ProjectError::ParseError {
                path: path.clone(),
                source: e,
            })?;
        project.validate()?;
        Ok(Some(project))
    }

    fn save(&self, project: &Project) -> Result<(), ProjectError> {
        project.validate()?;
        let path = self.record_path(&project.id)?;
        std::fs::create_dir_all(&self.root).map_err(|e| ProjectError::IoError {
            path: self.root.clone(),
            source: e,
        })?;

        let json =
            serde_json::to_string_pretty(project).map_err(|e| ProjectError::ParseError {
                path: path.clone(),
                source: e,
            })?;

        // write-then-rename so a crash never leaves a truncated record
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| ProjectError::IoError {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| ProjectError::IoError { path, source: e })?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, ProjectError> {
        if !self.root.exists() {
            return Ok(vec![]);
        }
        let entries = std::fs::read_dir(&self.root).map_err(|e| ProjectError::IoError {
            path: self.root.clone(),
            source: e,
        })?;

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// In-memory store, for tests and hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryProjectStore {
    records: Mutex<HashMap<String, Project>>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Project>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProjectStore for MemoryProjectStore {
    fn load(&self, id: &str) -> Result<Option<Project>, ProjectError> {
        Ok(self.lock().get(id).cloned())
    }

    fn save(&self, project: &Project) -> Result<(), ProjectError> {
        project.validate()?;
        self.lock().insert(project.id.clone(), project.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, ProjectError> {
        let mut ids: Vec<String> = self.lock().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::OutputSize;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join("slidekit_test_file_store");
        let _ = std::fs::remove_dir_all(&dir);
        let store = FileProjectStore::new(&dir);

        let mut project = Project::new("Stored", OutputSize::Story);
        project.frames[0].text = "Hello\nWorld".into();
        store.save(&project).unwrap();

        let loaded = store.load(&project.id).unwrap().unwrap();
        assert_eq!(loaded, project);
        assert_eq!(store.list().unwrap(), vec![project.id.clone()]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_store_missing_record() {
        let dir = std::env::temp_dir().join("slidekit_test_missing_record");
        let store = FileProjectStore::new(&dir);
        assert!(store.load("does-not-exist").unwrap().is_none());
        assert!(matches!(
            store.require("does-not-exist"),
            Err(ProjectError::NotFound { .. })
        ));
    }

    #[test]
    fn test_file_store_rejects_path_like_ids() {
        let store = FileProjectStore::new(std::env::temp_dir());
        assert!(matches!(
            store.load("../etc/passwd"),
            Err(ProjectError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_file_store_rejects_corrupt_record() {
        let dir = std::env::temp_dir().join("slidekit_test_corrupt_record");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("broken.json"), "{ not json").unwrap();

        let store = FileProjectStore::new(&dir);
        assert!(matches!(
            store.load("broken"),
            Err(ProjectError::ParseError { .. })
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_memory_store_refuses_empty_project() {
        let store = MemoryProjectStore::new();
        let mut project = Project::new("Empty", OutputSize::Square);
        project.frames.clear();
        assert!(store.save(&project).is_err());
        assert!(store.list().unwrap().is_empty());
    }
}
