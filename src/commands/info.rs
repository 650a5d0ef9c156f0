//! Info command
//!
//! Version, repository and description of one installed package.

use super::Context;
use crate::error::Result;
use crate::ui as output;
use crate::utils::sanitize::validate_package_name;

pub fn run(ctx: &Context, package: &str) -> Result<()> {
    validate_package_name(package)?;
    let info = ctx.cache().installed_info(package);

    if info.version.is_empty() {
        output::info(&format!("'{}' is not installed", package));
        return Ok(());
    }

    output::header(&info.name);
    output::keyval("Version", &info.version);
    if !info.repo.is_empty() {
        output::keyval("Repository", &info.repo);
    }
    if !info.description.is_empty() {
        output::keyval("Description", &info.description);
    }
    Ok(())
}
