use super::types::Catalog;
use crate::error::{PickerError, Result};
use std::fs;
use std::path::Path;

/// Load `packages.json`. A missing file is an empty catalog.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no catalog, using an empty one");
            return Ok(Catalog::default());
        }
        Err(e) => {
            return Err(PickerError::IoError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    if content.trim().is_empty() {
        return Ok(Catalog::default());
    }

    serde_json::from_str(&content).map_err(|e| {
        PickerError::ConfigError(format!("Invalid catalog {}: {}", path.display(), e))
    })
}
