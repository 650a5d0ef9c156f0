//! History command
//!
//! Prints `history.log` newest first.

use super::Context;
use crate::error::Result;
use crate::history::HistoryEntry;
use crate::ui as output;
use colored::Colorize;

pub fn run(ctx: &Context, limit: usize) -> Result<()> {
    let log = ctx.history();
    let entries = log.parse(limit)?;

    if entries.is_empty() {
        output::info("No history recorded yet");
        return Ok(());
    }

    output::header(&format!("History ({})", log.path().display()));
    for entry in &entries {
        print_entry(entry);
    }
    Ok(())
}

fn print_entry(entry: &HistoryEntry) {
    let rc = format!("rc={}", entry.rc);
    let rc = if entry.rc == 0 { rc.green() } else { rc.red() };
    println!(
        "{} {} {}",
        format!("[{}]", entry.timestamp).dimmed(),
        entry.action.bold(),
        rc
    );
    for command in &entry.commands {
        output::indent(command, 1);
    }
}
