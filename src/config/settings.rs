//! Settings Module
//!
//! Operator settings in `settings.kdl`:
//!
//! ```kdl
//! settings {
//!     search-ttl 1800
//!     aur-helper "yay"
//!     after-apply "clear"
//!     elevation "sudo"
//! }
//! ```
//!
//! Missing keys fall back to their defaults.

use crate::apply::AfterApply;
use crate::cache::{CacheOptions, DEFAULT_AUR_HELPER, DEFAULT_TTL_SECS};
use crate::error::{PickerError, Result};
use crate::project_identity;
use crate::utils::paths;
use crate::utils::platform::Elevation;
use kdl::{KdlDocument, KdlNode};
use std::fs;
use std::path::{Path, PathBuf};

pub const KEYS: [&str; 4] = ["search-ttl", "aur-helper", "after-apply", "elevation"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub search_ttl: u64,
    pub aur_helper: String,
    pub after_apply: AfterApply,
    pub elevation: Elevation,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_ttl: DEFAULT_TTL_SECS,
            aur_helper: DEFAULT_AUR_HELPER.to_string(),
            after_apply: AfterApply::default(),
            elevation: Elevation::default(),
        }
    }
}

impl Settings {
    /// Load from the default location, or defaults if there is no file.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::settings_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| PickerError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let doc: KdlDocument = content.parse().map_err(|e: kdl::KdlError| {
            PickerError::ConfigError(format!("Invalid settings.kdl: {}", e))
        })?;

        let mut settings = Self::default();
        for node in doc.nodes() {
            if node.name().value() == "settings" {
                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        settings.apply_node(child)?;
                    }
                }
            } else {
                settings.apply_node(node)?;
            }
        }
        Ok(settings)
    }

    fn apply_node(&mut self, node: &KdlNode) -> Result<()> {
        let key = node.name().value();
        let Some(value) = node.entries().first().and_then(|entry| {
            let value = entry.value();
            value
                .as_string()
                .map(str::to_string)
                .or_else(|| value.as_integer().map(|n| n.to_string()))
        }) else {
            tracing::warn!(key, "setting has no value, ignoring");
            return Ok(());
        };

        if !KEYS.contains(&key) {
            tracing::warn!(key, "unknown setting, ignoring");
            return Ok(());
        }
        self.set_value(key, &value)
    }

    /// Validate and assign one key.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "search-ttl" => {
                // stored as u64, compared against i64 timestamps
                self.search_ttl = value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|ttl| i64::try_from(*ttl).is_ok())
                    .ok_or_else(|| {
                        PickerError::ConfigError(format!(
                            "Invalid value for 'search-ttl': '{}'. Expected seconds",
                            value
                        ))
                    })?;
            }
            "aur-helper" => {
                let helper = value.trim();
                if helper.is_empty() || !helper.chars().all(is_helper_char) {
                    return Err(PickerError::ConfigError(format!(
                        "Invalid value for 'aur-helper': '{}'",
                        value
                    )));
                }
                self.aur_helper = helper.to_string();
            }
            "after-apply" => self.after_apply = value.parse()?,
            "elevation" => self.elevation = value.parse()?,
            _ => {
                return Err(PickerError::ConfigError(format!(
                    "Unknown setting: '{}'. Valid settings: {}",
                    key,
                    KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "search-ttl" => Some(self.search_ttl.to_string()),
            "aur-helper" => Some(self.aur_helper.clone()),
            "after-apply" => Some(self.after_apply.to_string()),
            "elevation" => Some(self.elevation.to_string()),
            _ => None,
        }
    }

    pub fn all(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            ttl_secs: self.search_ttl,
            aur_helper: self.aur_helper.clone(),
        }
    }

    pub fn render(&self) -> String {
        let mut content = format!("// {} settings\n\nsettings {{\n", project_identity::DISPLAY_NAME);
        for (key, value) in self.all() {
            if key == "search-ttl" {
                content.push_str(&format!("    {} {}\n", key, value));
            } else {
                content.push_str(&format!("    {} \"{}\"\n", key, value));
            }
        }
        content.push_str("}\n");
        content
    }

    pub fn save_to(&self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PickerError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(path, self.render()).map_err(|e| PickerError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(path.to_path_buf())
    }
}

/// A program name or path; rendered inside a quoted KDL string.
fn is_helper_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-' | '/')
}
