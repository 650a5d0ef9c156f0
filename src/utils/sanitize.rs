//! Input sanitization utilities for security
//!
//! Validation for names that end up in argv or file names, and quoting for
//! values interpolated into shell scripts.

use crate::error::{PickerError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Allows: alphanumeric, dash, underscore, dot, plus, at sign
static SAFE_PACKAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9@._+-]+$").expect("Invalid regex pattern"));

/// systemd unit names may also carry `@` instances and `:`/`\` escapes.
static SAFE_UNIT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9@._:\\-]+$").expect("Invalid regex pattern"));

static SAFE_PROFILE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("Invalid regex pattern"));

/// Validate a package name is safe to pass to pacman or an AUR helper.
///
/// Names starting with `-` are rejected so they cannot be read as options.
pub fn validate_package_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PickerError::ConfigError(
            "Package name cannot be empty".to_string(),
        ));
    }

    if name.len() > 256 {
        let prefix: String = name.chars().take(50).collect();
        return Err(PickerError::ConfigError(format!(
            "Package name too long (max 256 chars): {}",
            prefix
        )));
    }

    if name.starts_with('-') || !SAFE_PACKAGE_NAME.is_match(name) {
        return Err(PickerError::ConfigError(format!(
            "Package name contains invalid characters: {}",
            name
        )));
    }

    Ok(())
}

/// Validate a list of package names
pub fn validate_package_names<'a>(names: impl IntoIterator<Item = &'a String>) -> Result<()> {
    for name in names {
        validate_package_name(name)?;
    }
    Ok(())
}

pub fn validate_unit_name(unit: &str) -> Result<()> {
    if unit.is_empty() || unit.starts_with('-') || !SAFE_UNIT_NAME.is_match(unit) {
        return Err(PickerError::ConfigError(format!(
            "Invalid unit name: {:?}",
            unit
        )));
    }
    Ok(())
}

/// Profile names become file names; no separators or traversal.
pub fn validate_profile_name(name: &str) -> Result<()> {
    if name.is_empty() || name.starts_with('.') || !SAFE_PROFILE_NAME.is_match(name) {
        return Err(PickerError::PathError(format!(
            "Invalid profile name: {:?}",
            name
        )));
    }
    Ok(())
}

/// Wrap `value` in single quotes for POSIX `sh`.
///
/// An embedded `'` closes the quote, emits a double-quoted `'`, and reopens:
/// `it's` becomes `'it'"'"'s'`.
pub fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\"'\"'"))
}

/// Render an argv as one shell-style line for logs and history.
pub fn render_argv(argv: &[String]) -> String {
    shlex::try_join(argv.iter().map(String::as_str)).unwrap_or_else(|_| argv.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_package_names() {
        assert!(validate_package_name("hyprland").is_ok());
        assert!(validate_package_name("hyprland-git").is_ok());
        assert!(validate_package_name("python3.12").is_ok());
        assert!(validate_package_name("gcc++").is_ok());
        assert!(validate_package_name("lib32-vulkan-radeon").is_ok());
    }

    #[test]
    fn test_shell_injection_blocked() {
        assert!(validate_package_name("foo; rm -rf /").is_err());
        assert!(validate_package_name("foo | cat").is_err());
        assert!(validate_package_name("foo$(cat)").is_err());
        assert!(validate_package_name("--overwrite=*").is_err());
    }

    #[test]
    fn test_unit_names() {
        assert!(validate_unit_name("sshd.service").is_ok());
        assert!(validate_unit_name("getty@tty1.service").is_ok());
        assert!(validate_unit_name("a b.service").is_err());
        assert!(validate_unit_name("").is_err());
    }

    #[test]
    fn test_profile_names() {
        assert!(validate_profile_name("laptop-2024").is_ok());
        assert!(validate_profile_name("../etc/passwd").is_err());
        assert!(validate_profile_name(".hidden").is_err());
    }

    #[test]
    fn test_sh_quote() {
        assert_eq!(sh_quote("plain"), "'plain'");
        assert_eq!(sh_quote("it's"), "'it'\"'\"'s'");
        assert_eq!(sh_quote("$(reboot)"), "'$(reboot)'");
    }

    #[test]
    fn test_render_argv_quotes_spaces() {
        let argv = vec!["echo".to_string(), "two words".to_string()];
        let line = render_argv(&argv);
        assert!(line.starts_with("echo "));
        assert_ne!(line, "echo two words");
        assert_eq!(shlex::split(&line), Some(argv));
    }
}
