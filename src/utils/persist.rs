use crate::error::{PickerError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Read a JSON document, treating missing, empty or malformed files as
/// the default value. Corruption is logged, never returned.
pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(e) => {
            let err = PickerError::CacheCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            };
            tracing::warn!("{}", err);
            return T::default();
        }
    };

    if content.trim().is_empty() {
        return T::default();
    }

    serde_json::from_str(&content).unwrap_or_else(|e| {
        let err = PickerError::CacheCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        tracing::warn!("{}", err);
        T::default()
    })
}

/// Write pretty JSON through a temp file and rename.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        PickerError::PathError(format!("No parent directory: {}", path.display()))
    })?;
    fs::create_dir_all(dir).map_err(|e| PickerError::IoError {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let content = serde_json::to_string_pretty(value)?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    let mut tmp_file = fs::File::create(&tmp_path).map_err(|e| PickerError::IoError {
        path: tmp_path.clone(),
        source: e,
    })?;
    tmp_file.write_all(content.as_bytes())?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(&tmp_path, path).map_err(|e| PickerError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn missing_and_garbage_files_read_as_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let v: BTreeMap<String, u32> = load_json_or_default(&path);
        assert!(v.is_empty());

        fs::write(&path, "{not json").unwrap();
        let v: BTreeMap<String, u32> = load_json_or_default(&path);
        assert!(v.is_empty());
    }

    #[test]
    fn atomic_write_creates_parents_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b.json");
        let mut doc = BTreeMap::new();
        doc.insert("k".to_string(), 7u32);

        write_json_atomic(&path, &doc).unwrap();
        let back: BTreeMap<String, u32> = load_json_or_default(&path);
        assert_eq!(back, doc);
        assert!(!dir.path().join("a").join("b.json.tmp").exists());
    }
}
