pub mod apply;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conflicts;
pub mod error;
pub mod gateway;
pub mod history;
pub mod host;
pub mod plan;
pub mod profiles;
pub mod project_identity;
pub mod session;
pub mod ui;
pub mod utils;

use clap::Parser;
use std::process::exit;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Run the pkgpicker CLI entrypoint.
pub fn run_cli() {
    let args = cli::args::Cli::parse();
    ui::logging::init(args.global.verbose);
    ui::set_quiet(args.global.quiet);

    // Ctrl-C stops an apply before its next batch; a second one exits.
    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = interrupt.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            exit(130);
        }
        eprintln!();
        ui::warning("Interrupt received; stopping after the current step.");
    }) {
        tracing::warn!("Could not install Ctrl-C handler: {}", e);
    }

    if let Err(e) = cli::dispatcher::dispatch(&args, interrupt) {
        ui::error(&format!("{}", e));
        exit(1);
    }
}
