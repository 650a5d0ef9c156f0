//! Drivers command
//!
//! GPU driver suggestions; `--install` plans the missing ones as repo installs.

use super::Context;
use super::apply::{self, ApplyCommandOptions};
use crate::error::Result;
use crate::ui as output;
use colored::Colorize;

pub struct DriverOptions {
    pub install: bool,
    pub dry_run: bool,
    pub yes: bool,
}

pub fn run(ctx: &Context, options: DriverOptions) -> Result<()> {
    let installed = ctx.host().installed_names();
    let Some(suggestion) = ctx.host().driver_suggestions(&installed) else {
        output::warning("lspci is unavailable; cannot detect the GPU");
        return Ok(());
    };

    output::header(&format!("GPU: {}", suggestion.vendor));
    for pkg in &suggestion.packages {
        if installed.contains(pkg) {
            println!("{} {}", pkg, "[installed]".green());
        } else {
            println!("{}", pkg.bold());
        }
    }

    if suggestion.missing.is_empty() {
        output::success("All suggested packages are installed");
        return Ok(());
    }
    if !options.install {
        output::info(&format!(
            "{} package(s) missing; rerun with --install to plan them",
            suggestion.missing.len()
        ));
        return Ok(());
    }

    apply::run(
        ctx,
        ApplyCommandOptions {
            repo: suggestion.missing,
            dry_run: options.dry_run,
            yes: options.yes,
            ..ApplyCommandOptions::default()
        },
    )
}
