//! Services command
//!
//! Enabled/active state of the units the catalog offers.

use super::Context;
use crate::error::{PickerError, Result};
use crate::host::ServiceStatus;
use crate::ui as output;
use colored::Colorize;
use rayon::prelude::*;

pub fn run(ctx: &Context, target: Option<&str>) -> Result<()> {
    let catalog = ctx.catalog()?;
    let target = match target {
        Some(id) => Some(
            catalog
                .target(id)
                .ok_or_else(|| PickerError::ConfigError(format!("Unknown target '{}'", id)))?,
        ),
        None => None,
    };

    let entries = catalog.service_entries(target);
    let host = ctx.host();
    let statuses: Vec<ServiceStatus> = entries
        .par_iter()
        .map(|entry| host.service_status(&entry.unit))
        .collect();

    output::header("Services");
    for (entry, status) in entries.iter().zip(&statuses) {
        let active = if status.active == "active" {
            status.active.green()
        } else {
            status.active.normal()
        };
        println!(
            "{} {:<10} {}",
            format!("{:<28}", entry.unit).bold(),
            status.enabled,
            active
        );
        if !entry.desc.is_empty() {
            output::indent(&entry.desc, 2);
        }
    }
    Ok(())
}
