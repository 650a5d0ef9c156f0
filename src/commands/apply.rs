//! Apply command
//!
//! Builds a plan from a saved profile and/or flags, previews the batches,
//! asks for confirmation and runs it through the apply engine.

use super::Context;
use crate::apply::{
    ApplyEngine, ApplyOptions, ApplyReport, BatchPlan, BatchStep, Confirmation, build_batches,
};
use crate::config::{Catalog, ServiceSpec};
use crate::error::{PickerError, Result};
use crate::plan::{PlanSnapshot, PlanStore, Preset};
use crate::profiles::ProfileStore;
use crate::ui::{self as output, MAX_OUTPUT_CHARS, truncate_tail};
use crate::utils::sanitize::render_argv;
use colored::Colorize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct ApplyCommandOptions {
    pub profile: Option<String>,
    pub repo: Vec<String>,
    pub aur: Vec<String>,
    pub remove: Vec<String>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub preset: Option<Preset>,
    pub targets: Vec<String>,
    pub generate_configs: bool,
    pub dry_run: bool,
    pub save: Option<String>,
    pub yes: bool,
}

/// Profile first, then preset, targets and explicit flags on top.
pub fn build_plan(
    options: &ApplyCommandOptions,
    catalog: &Catalog,
    profiles: &ProfileStore,
) -> Result<PlanStore> {
    let mut plan = PlanStore::new();

    if let Some(name) = &options.profile {
        plan.restore(profiles.load(name)?)?;
    }
    if let Some(preset) = options.preset {
        plan.apply_builtin_preset(preset);
    }
    for id in &options.targets {
        let target = catalog
            .target(id)
            .ok_or_else(|| PickerError::ConfigError(format!("Unknown target '{}'", id)))?;
        plan.add_target(target);
    }

    plan.plan_repo_packages(options.repo.iter().map(|p| p.trim()).filter(|p| !p.is_empty()));
    plan.plan_aur_packages(options.aur.iter().map(|p| p.trim()).filter(|p| !p.is_empty()));
    plan.plan_removals(options.remove.iter().map(|p| p.trim()).filter(|p| !p.is_empty()));

    for unit in unit_names(&options.enable) {
        plan.plan_enable(&unit);
    }
    for unit in unit_names(&options.disable) {
        plan.plan_disable(&unit);
    }
    if options.generate_configs {
        plan.set_generate_configs(true);
    }
    Ok(plan)
}

fn unit_names(raw: &[String]) -> Vec<String> {
    raw.iter()
        .filter_map(|name| ServiceSpec::Name(name.clone()).normalize())
        .map(|entry| entry.unit)
        .collect()
}

pub fn run(ctx: &Context, options: ApplyCommandOptions) -> Result<()> {
    let catalog = ctx.catalog()?;
    let profiles = ctx.profiles();
    let mut plan = build_plan(&options, &catalog, &profiles)?;

    if let Some(name) = &options.save {
        let path = profiles.save(name, &plan.snapshot())?;
        output::success(&format!("Saved profile '{}' to {}", name, path.display()));
    }

    if plan.is_empty() {
        output::info("Nothing to apply");
        return Ok(());
    }

    let installed = ctx.host().installed_names();
    ApplyEngine::validate(&plan, &installed, &catalog.conflicts)?;

    output::header("Plan");
    print_plan(plan.state());

    let preview = build_batches(plan.state(), ctx.gateway.as_ref(), &ctx.settings.aur_helper);
    print_batches(&preview);

    if options.dry_run {
        output::info("Dry run: nothing was executed");
        return Ok(());
    }
    if preview.batches.is_empty() {
        output::info("No batch can run");
        return Ok(());
    }

    let question = format!("Run {} batch(es)?", preview.batches.len());
    if !options.yes && !output::prompt_yes_no(&question) {
        output::info("Cancelled");
        return Ok(());
    }

    let mut engine = ApplyEngine::new(
        ctx.gateway.clone(),
        ctx.history(),
        ApplyOptions {
            aur_helper: ctx.settings.aur_helper.clone(),
            after_apply: ctx.settings.after_apply,
        },
    )
    .with_interrupt(ctx.interrupt.clone());

    let report = engine.apply(
        &mut plan,
        &installed,
        &catalog.conflicts,
        Confirmation::confirmed_by_operator(),
    )?;
    print_report(&report);

    if report.interrupted {
        return Err(PickerError::Interrupted);
    }
    let failed = report.failures().count();
    if failed > 0 {
        return Err(PickerError::Other(format!("{} batch(es) failed", failed)));
    }
    Ok(())
}

fn print_set(label: &str, set: &BTreeSet<String>) {
    if !set.is_empty() {
        output::keyval(label, &set.iter().cloned().collect::<Vec<_>>().join(" "));
    }
}

pub fn print_plan(state: &PlanSnapshot) {
    print_set("Selected (repo)", &state.selected_repo);
    print_set("Selected (aur)", &state.selected_aur);
    print_set("Install (repo)", &state.add_repo);
    print_set("Install (aur)", &state.add_aur);
    print_set("Remove", &state.remove);
    print_set("Enable", &state.enable);
    print_set("Disable", &state.disable);
    if let Some(preset) = &state.preset {
        output::keyval("Preset", preset);
    }
    if state.generate_configs {
        output::keyval("Generate configs", "yes");
    }
}

fn print_batches(preview: &BatchPlan) {
    output::header("Batches");
    for (idx, batch) in preview.batches.iter().enumerate() {
        println!("{}. {}", idx + 1, batch.kind.to_string().bold());
        match &batch.step {
            BatchStep::Command(argv) => output::indent(&render_argv(argv), 2),
            BatchStep::Writes(files) => {
                for file in files {
                    output::indent(&format!("write {}", file.path.display()), 2);
                }
            }
        }
    }
    for notice in &preview.notices {
        output::warning(notice);
    }
}

fn print_report(report: &ApplyReport) {
    output::header("Result");
    for outcome in &report.outcomes {
        if outcome.succeeded() {
            output::success(&format!("{} rc=0", outcome.kind));
        } else {
            output::error(&format!("{} rc={}", outcome.kind, outcome.rc));
            let tail = truncate_tail(outcome.output.trim_end(), MAX_OUTPUT_CHARS);
            if !tail.is_empty() {
                eprintln!("{}", tail);
            }
        }
    }
    for notice in &report.notices {
        output::warning(notice);
    }
    if report.plan_cleared {
        output::info("Plan entries of the executed batches were cleared");
    }
}
