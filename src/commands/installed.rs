//! Installed command
//!
//! Explicitly installed packages with their source. `--remove` plans
//! removals, limited to explicit packages.

use super::Context;
use super::apply::{self, ApplyCommandOptions};
use crate::config::Source;
use crate::error::{PickerError, Result};
use crate::host::HostSnapshot;
use crate::ui as output;
use colored::Colorize;

#[derive(Debug, Clone, Default)]
pub struct InstalledOptions {
    pub source: Option<Source>,
    pub info: bool,
    pub remove: Vec<String>,
    pub dry_run: bool,
    pub yes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledRow {
    pub name: String,
    pub source: Source,
}

/// Explicit packages, sorted, optionally narrowed to one source.
pub fn installed_rows(snapshot: &HostSnapshot, source: Option<Source>) -> Vec<InstalledRow> {
    snapshot
        .explicit
        .iter()
        .filter_map(|name| {
            snapshot.source_of(name).map(|source| InstalledRow {
                name: name.clone(),
                source,
            })
        })
        .filter(|row| source.is_none_or(|wanted| row.source == wanted))
        .collect()
}

/// Every requested name must be explicitly installed.
pub fn removable(snapshot: &HostSnapshot, names: &[String]) -> Result<Vec<String>> {
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(|name| {
            if snapshot.explicit.iter().any(|e| e == name) {
                Ok(name.to_string())
            } else {
                Err(PickerError::ConfigError(format!(
                    "'{}' is not an explicitly installed package",
                    name
                )))
            }
        })
        .collect()
}

pub fn run(ctx: &Context, options: InstalledOptions) -> Result<()> {
    let snapshot = ctx.host().installed_snapshot();

    if !options.remove.is_empty() {
        let remove = removable(&snapshot, &options.remove)?;
        return apply::run(
            ctx,
            ApplyCommandOptions {
                remove,
                dry_run: options.dry_run,
                yes: options.yes,
                ..ApplyCommandOptions::default()
            },
        );
    }

    let rows = installed_rows(&snapshot, options.source);
    if rows.is_empty() {
        output::info("No explicitly installed packages found");
        return Ok(());
    }

    output::header(&format!("{} explicitly installed package(s)", rows.len()));
    let cache = options.info.then(|| ctx.cache());
    for row in &rows {
        let source = match row.source {
            Source::Aur => row.source.to_string().yellow(),
            Source::Repo => row.source.to_string().normal(),
        };
        let Some(cache) = &cache else {
            println!("{} {}", format!("{:<32}", row.name).bold(), source);
            continue;
        };
        let info = cache.installed_info(&row.name);
        println!(
            "{} {} {}",
            format!("{:<32}", row.name).bold(),
            source,
            info.version
        );
        if !info.description.is_empty() {
            output::indent(&info.description, 2);
        }
    }
    Ok(())
}
