//! Selfcheck command
//!
//! Reports optional tools and the paths in use.

use super::Context;
use crate::error::Result;
use crate::ui as output;
use crate::utils::paths;

fn hint(tool: &str, aur_helper: &str) -> &'static str {
    match tool {
        "expac" => "package info falls back to pacman -Qi",
        "paccache" => "install pacman-contrib for cache cleanup",
        "lspci" => "install pciutils for driver suggestions",
        _ if tool == aur_helper => "AUR search and installs are skipped",
        _ => "",
    }
}

pub fn run(ctx: &Context) -> Result<()> {
    output::header("Tools");
    let helper = ctx.settings.aur_helper.as_str();
    for tool in ctx.host().self_check(helper) {
        if tool.present {
            output::success(&tool.name);
        } else {
            output::warning(&format!("{} missing: {}", tool.name, hint(&tool.name, helper)));
        }
    }

    output::header("Paths");
    output::keyval("Data", &ctx.layout.root.display().to_string());
    output::keyval("Settings", &paths::settings_file()?.display().to_string());
    output::keyval("Catalog", &paths::catalog_file()?.display().to_string());
    output::keyval("Elevation", &ctx.settings.elevation.to_string());
    Ok(())
}
