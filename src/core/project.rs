//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{RecordId, RecordKind};

/// Represents an Aegis project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .aegis/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            let aegis_dir = current.join(".aegis");
            if aegis_dir.is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        let aegis_dir = root.join(".aegis");
        if aegis_dir.exists() {
            return Err(ProjectError::AlreadyExists(root.clone()));
        }

        Self::write_skeleton(&root)?;
        Ok(Self { root })
    }

    /// Force initialization even if .aegis/ exists
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        Self::write_skeleton(&root)?;
        Ok(Self { root })
    }

    fn write_skeleton(root: &Path) -> Result<(), ProjectError> {
        let aegis_dir = root.join(".aegis");
        std::fs::create_dir_all(&aegis_dir)
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let config_path = aegis_dir.join("config.yaml");
        std::fs::write(&config_path, Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        for kind in RecordKind::all() {
            std::fs::create_dir_all(root.join(kind.dir_name()))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(())
    }

    fn default_config() -> &'static str {
        r#"# Aegis Project Configuration

# Default author for new records (can be overridden by global config)
# author: ""

# Editor to use for `aegis <register> new --edit` (default: $EDITOR)
# editor: ""

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .aegis configuration directory
    pub fn aegis_dir(&self) -> PathBuf {
        self.root.join(".aegis")
    }

    /// Get the directory holding a register's records
    pub fn register_dir(&self, kind: RecordKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Get the path for a new record file
    pub fn record_path(&self, id: &RecordId) -> PathBuf {
        self.register_dir(id.kind()).join(format!("{}.yaml", id))
    }

    /// Iterate all record files of a register, recursing into subdirectories
    /// so teams can group records however they like
    pub fn iter_record_files(&self, kind: RecordKind) -> impl Iterator<Item = PathBuf> {
        let dir = self.register_dir(kind);
        walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "yaml"))
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not an Aegis project (searched from {searched_from:?}). Run 'aegis init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("Aegis project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.aegis_dir().exists());
        assert!(project.aegis_dir().join("config.yaml").exists());
        for kind in RecordKind::all() {
            assert!(project.register_dir(*kind).is_dir());
        }
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_discover_finds_aegis_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_aegis_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_record_path_lands_in_register_dir() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let id = RecordId::new(RecordKind::Inc);
        let path = project.record_path(&id);
        assert!(path.starts_with(project.register_dir(RecordKind::Inc)));
        assert!(path.to_string_lossy().ends_with(".yaml"));
    }
}
