//! Settings command
//!
//! Reads and writes `settings.kdl`.

use crate::config::Settings;
use crate::config::settings::KEYS;
use crate::error::{PickerError, Result};
use crate::ui as output;
use crate::utils::paths;

pub fn show() -> Result<()> {
    let path = paths::settings_file()?;
    let settings = Settings::load_from(&path)?;

    output::header("Settings");
    for (key, value) in settings.all() {
        output::keyval(key, &value);
    }
    if !path.exists() {
        output::info(&format!("{} not found; showing defaults", path.display()));
    }
    Ok(())
}

pub fn get(key: &str) -> Result<()> {
    let settings = Settings::load()?;
    match settings.get(key) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => Err(PickerError::ConfigError(format!(
            "Unknown setting: '{}'. Valid settings: {}",
            key,
            KEYS.join(", ")
        ))),
    }
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let path = paths::settings_file()?;
    let mut settings = Settings::load_from(&path)?;
    settings.set_value(key, value)?;
    settings.save_to(&path)?;
    output::success(&format!("{} = {}", key, value.trim()));
    Ok(())
}
