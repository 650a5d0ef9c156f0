//! Profile and preset listing.

use super::Context;
use super::apply::print_plan;
use crate::error::Result;
use crate::plan::{PlanSnapshot, Preset};
use crate::ui as output;
use colored::Colorize;

pub fn list(ctx: &Context) -> Result<()> {
    let names = ctx.profiles().list()?;
    if names.is_empty() {
        output::info("No saved profiles");
        return Ok(());
    }
    output::header("Profiles");
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

pub fn show(ctx: &Context, name: &str) -> Result<()> {
    let snapshot = ctx.profiles().load(name)?;
    output::header(&format!("Profile '{}'", name));
    if snapshot == PlanSnapshot::default() {
        output::info("Empty plan");
    } else {
        print_plan(&snapshot);
    }
    Ok(())
}

pub fn presets() {
    output::header("Presets");
    for preset in Preset::ALL {
        println!("{}  {}", preset.id().bold(), preset.description());
        output::indent(&preset.packages().join(" "), 2);
        for file in preset.config_files() {
            output::indent(&format!("writes {}", file.path.display()), 2);
        }
    }
}
