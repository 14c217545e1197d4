//! Register loading utilities
//!
//! Loads typed register entries from their YAML files and hands back the
//! in-memory sequences the query core operates on. Loading happens wholesale
//! per invocation; there is no cache between runs. `aegis validate` walks
//! the files itself so it can report every parse failure, not just the first.

use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::project::Project;
use crate::core::record::{Record, RegisterEntry};

/// Load all entries of a register from the project.
///
/// Files that fail to parse are skipped; `aegis validate` reports them.
pub fn load_register<T: RegisterEntry>(project: &Project) -> Vec<T> {
    let mut entries = Vec::new();

    for path in project.iter_record_files(T::KIND) {
        if let Ok(content) = fs::read_to_string(&path) {
            if let Ok(entry) = serde_yml::from_str::<T>(&content) {
                entries.push(entry);
            }
        }
    }

    entries
}

/// Convert a register's entries into generic records for the query core
pub fn to_records<T: RegisterEntry>(entries: &[T]) -> Vec<Record> {
    entries.iter().map(|e| e.to_record()).collect()
}

/// Find a record file by ID (supports prefix matching)
///
/// Searches for a file whose stem starts with or contains the given ID.
/// Returns the first match found.
pub fn find_record_file(dir: &Path, id: &str) -> Option<PathBuf> {
    if !dir.exists() {
        return None;
    }

    for entry in fs::read_dir(dir).ok()? {
        let entry = entry.ok()?;
        let path = entry.path();

        if path.extension().map_or(false, |e| e == "yaml") {
            let filename = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            if filename.starts_with(id) || filename.contains(id) {
                return Some(path);
            }
        }
    }

    None
}

/// Load a single entry by ID
///
/// Searches the register directory for a file matching the ID and
/// deserializes it. Returns the path and entry if found.
pub fn load_entry<T: RegisterEntry>(
    project: &Project,
    id: &str,
) -> Result<Option<(PathBuf, T)>> {
    let dir = project.register_dir(T::KIND);
    if let Some(path) = find_record_file(&dir, id) {
        let content = fs::read_to_string(&path).into_diagnostic()?;
        let entry: T = serde_yml::from_str(&content)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
        return Ok(Some((path, entry)));
    }
    Ok(None)
}
