//! Central project identity contract.
//!
//! Single source of truth for names used in paths, env vars and output.

pub const DISPLAY_NAME: &str = "PkgPicker";
pub const BINARY_NAME: &str = "pkgpicker";
pub const STABLE_PROJECT_ID: &str = "pkgpicker";
pub const ENV_PREFIX: &str = "PKGPICKER";
pub const SETTINGS_FILE_BASENAME: &str = "settings.kdl";
pub const CATALOG_FILE_BASENAME: &str = "packages.json";

pub fn env_key(suffix: &str) -> String {
    format!("{}_{}", ENV_PREFIX, suffix)
}

pub fn cli_with(args: &str) -> String {
    format!("{} {}", BINARY_NAME, args)
}
