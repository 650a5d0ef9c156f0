//! Diagnostic logging setup.
//!
//! User-facing messages go through the `ui` helpers; everything else is a
//! `tracing` event written to stderr and filtered by `PKGPICKER_LOG`
//! (falling back to `RUST_LOG`, then `warn`).

use crate::project_identity;
use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = std::env::var(project_identity::env_key("LOG"))
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
