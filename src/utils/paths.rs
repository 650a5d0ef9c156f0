use crate::error::{PickerError, Result};
use crate::project_identity;
use directories::{ProjectDirs, UserDirs};
use std::path::{Path, PathBuf};

pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();

    if !path_str.starts_with('~') {
        return Ok(path.to_path_buf());
    }

    let user_dirs = UserDirs::new()
        .ok_or_else(|| PickerError::PathError("Could not determine user home directory".into()))?;

    let home = user_dirs.home_dir();

    if path_str == "~" {
        return Ok(home.to_path_buf());
    }

    let stripped = path_str
        .strip_prefix("~/")
        .ok_or_else(|| PickerError::PathError(format!("Invalid path format: {}", path_str)))?;

    Ok(home.join(stripped))
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", project_identity::STABLE_PROJECT_ID)
        .ok_or_else(|| PickerError::PathError("Could not determine project directories".into()))
}

/// Root for history, caches and profiles. `PKGPICKER_HOME` overrides it.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(project_identity::env_key("HOME"))
        && !dir.trim().is_empty()
    {
        return expand_home(Path::new(dir.trim()));
    }
    Ok(project_dirs()?.cache_dir().to_path_buf())
}

/// Holds `settings.kdl` and `packages.json`. `PKGPICKER_CONFIG` overrides it.
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(project_identity::env_key("CONFIG"))
        && !dir.trim().is_empty()
    {
        return expand_home(Path::new(dir.trim()));
    }
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn settings_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(project_identity::SETTINGS_FILE_BASENAME))
}

pub fn catalog_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(project_identity::CATALOG_FILE_BASENAME))
}

/// Fixed file layout below the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn discover() -> Result<Self> {
        Ok(Self::new(data_dir()?))
    }

    pub fn history_log(&self) -> PathBuf {
        self.root.join("history.log")
    }

    pub fn search_cache(&self) -> PathBuf {
        self.root.join("search_cache.json")
    }

    pub fn pkginfo_cache(&self) -> PathBuf {
        self.root.join("pkginfo_cache.json")
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.root.join("profiles")
    }
}
