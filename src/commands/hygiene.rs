//! Hygiene commands
//!
//! Orphan listing and removal, `paccache -r`, cache reset.

use super::Context;
use super::apply::{self, ApplyCommandOptions};
use crate::error::{PickerError, Result};
use crate::gateway::RC_NOT_FOUND;
use crate::ui::{self as output, MAX_OUTPUT_CHARS, truncate_tail};

pub fn orphans(ctx: &Context, remove: bool, dry_run: bool, yes: bool) -> Result<()> {
    let orphans = ctx.host().orphans();
    if orphans.is_empty() {
        output::success("No orphaned packages");
        return Ok(());
    }

    output::header(&format!("{} orphaned package(s)", orphans.len()));
    for name in &orphans {
        println!("{}", name);
    }
    if !remove {
        return Ok(());
    }

    apply::run(
        ctx,
        ApplyCommandOptions {
            remove: orphans,
            dry_run,
            yes,
            ..ApplyCommandOptions::default()
        },
    )
}

pub fn paccache(ctx: &Context, yes: bool) -> Result<()> {
    if !yes && !output::prompt_yes_no("Remove old package versions from the pacman cache?") {
        output::info("Cancelled");
        return Ok(());
    }

    let out = ctx.host().paccache_clean(&ctx.history())?;
    if out.code == RC_NOT_FOUND {
        return Err(PickerError::ToolMissing(
            "paccache (install pacman-contrib)".to_string(),
        ));
    }
    let text = truncate_tail(out.output.trim_end(), MAX_OUTPUT_CHARS);
    if out.success() {
        if !text.is_empty() {
            println!("{}", text);
        }
        output::success("Package cache cleaned");
        Ok(())
    } else {
        if !text.is_empty() {
            eprintln!("{}", text);
        }
        Err(PickerError::CommandFailed {
            command: "paccache -r".to_string(),
            rc: out.code,
        })
    }
}

pub fn clear_cache(ctx: &Context) -> Result<()> {
    ctx.cache().clear()?;
    output::success("Search and package info caches cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::gateway::{CommandOutput, RecordingGateway};
    use crate::utils::paths::DataLayout;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use tempfile::tempdir;

    fn context(gw: RecordingGateway, root: &std::path::Path) -> Context {
        Context::new(
            Settings::default(),
            DataLayout::new(root),
            Arc::new(gw),
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[test]
    fn missing_paccache_is_a_missing_tool() {
        let dir = tempdir().unwrap();
        let ctx = context(RecordingGateway::new().without_tool("paccache"), dir.path());

        let err = paccache(&ctx, true).unwrap_err();
        assert!(matches!(err, PickerError::ToolMissing(ref tool) if tool.contains("pacman-contrib")));
        assert_eq!(ctx.history().parse(10).unwrap()[0].rc, 127);
    }

    #[test]
    fn failed_paccache_keeps_its_rc() {
        let dir = tempdir().unwrap();
        let gw = RecordingGateway::new().respond_to("paccache", CommandOutput::new(1, "denied"));
        let ctx = context(gw, dir.path());

        assert!(matches!(
            paccache(&ctx, true),
            Err(PickerError::CommandFailed { rc: 1, .. })
        ));
    }
}
