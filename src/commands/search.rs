//! Search command
//!
//! Cached `pacman -Ss` / AUR helper search with installed markers.

use super::Context;
use crate::cache::Namespace;
use crate::error::Result;
use crate::ui as output;
use colored::Colorize;

pub struct SearchOptions {
    pub namespace: Namespace,
    pub query: String,
}

pub fn run(ctx: &Context, options: SearchOptions) -> Result<()> {
    let query = options.query.trim();
    if query.is_empty() {
        output::warning("Empty search query");
        return Ok(());
    }

    if options.namespace == Namespace::Aur && !ctx.gateway.probe(&ctx.settings.aur_helper) {
        output::warning(&format!(
            "AUR helper '{}' not found; AUR search is unavailable",
            ctx.settings.aur_helper
        ));
        return Ok(());
    }

    let hits = ctx.cache().search(options.namespace, query);
    if hits.is_empty() {
        output::info(&format!("No {} results for '{}'", options.namespace, query));
        return Ok(());
    }

    let installed = ctx.host().installed_names();
    output::header(&format!(
        "{} {} result(s) for '{}'",
        hits.len(),
        options.namespace,
        query
    ));
    for hit in &hits {
        if installed.contains(&hit.name) {
            println!("{} {}", hit.name.bold(), "[installed]".green());
        } else {
            println!("{}", hit.name.bold());
        }
        if !hit.desc.is_empty() {
            output::indent(&hit.desc, 2);
        }
    }
    Ok(())
}
