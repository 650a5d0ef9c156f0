//! Named plan snapshots under `<data>/profiles/<name>.json`.
//!
//! Saving overwrites an existing profile in place. Unlike the config
//! writers in [`crate::gateway`] no backup copy is kept.

use crate::error::{PickerError, Result};
use crate::plan::PlanSnapshot;
use crate::utils::persist::write_json_atomic;
use crate::utils::sanitize::validate_profile_name;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_profile_name(name)?;
        Ok(self.dir.join(format!("{}.json", name)))
    }

    pub fn save(&self, name: &str, snapshot: &PlanSnapshot) -> Result<PathBuf> {
        let path = self.path_for(name)?;
        write_json_atomic(&path, snapshot)?;
        tracing::info!(profile = name, path = %path.display(), "profile saved");
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<PlanSnapshot> {
        let path = self.path_for(name)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PickerError::ProfileNotFound(name.to_string()));
            }
            Err(e) => return Err(PickerError::IoError { path, source: e }),
        };
        let snapshot: PlanSnapshot = serde_json::from_str(&content).map_err(|e| {
            PickerError::ConfigError(format!("Profile '{}' is not valid: {}", name, e))
        })?;
        if let Some(reason) = snapshot.inconsistency() {
            return Err(PickerError::ConfigError(format!(
                "Profile '{}' is not valid: {}",
                name, reason
            )));
        }
        Ok(snapshot)
    }

    /// Stored profile names, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PickerError::IoError {
                    path: self.dir.clone(),
                    source: e,
                });
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .filter(|name| validate_profile_name(name).is_ok())
            .collect();
        names.sort();
        Ok(names)
    }
}
