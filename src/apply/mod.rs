//! # Apply engine
//!
//! Validates the plan, turns it into ordered batches, runs them through the
//! gateway and records one history entry per executed batch.
//!
//! Stages run `Idle -> Validating -> Executing -> Completed -> Idle`. A run
//! only starts from a [`Confirmation`]. Validation failures return to `Idle`
//! before any command is issued. Batches continue on error and nothing is
//! rolled back.

mod batches;
mod report;

pub use batches::{Batch, BatchKind, BatchPlan, BatchStep, build_batches};
pub use report::{ApplyReport, BatchOutcome};

use crate::cache::DEFAULT_AUR_HELPER;
use crate::conflicts::{self, ConflictRule};
use crate::error::{PickerError, Result};
use crate::gateway::CommandGateway;
use crate::history::HistoryLog;
use crate::plan::{ConfigFile, PlanStore, WriteScope};
use crate::utils::sanitize::{render_argv, validate_package_names, validate_unit_name};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// What happens to the plan after a run in which every batch returned 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AfterApply {
    /// Clear the plan sets whose batches ran.
    #[default]
    ClearSatisfied,
    /// Leave the plan untouched.
    Keep,
}

impl fmt::Display for AfterApply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClearSatisfied => write!(f, "clear"),
            Self::Keep => write!(f, "keep"),
        }
    }
}

impl FromStr for AfterApply {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "clear" | "clear-satisfied" => Ok(Self::ClearSatisfied),
            "keep" => Ok(Self::Keep),
            other => Err(PickerError::ConfigError(format!(
                "Invalid value for 'after-apply': '{}'. Valid: clear, keep",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStage {
    Idle,
    Validating,
    Executing,
    Completed,
}

impl fmt::Display for ApplyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Executing => "executing",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Proof that the operator confirmed this run.
#[derive(Debug)]
pub struct Confirmation {
    _private: (),
}

impl Confirmation {
    /// Call only after the operator has agreed to the plan.
    pub fn confirmed_by_operator() -> Self {
        Self { _private: () }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    pub aur_helper: String,
    pub after_apply: AfterApply,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            aur_helper: DEFAULT_AUR_HELPER.to_string(),
            after_apply: AfterApply::default(),
        }
    }
}

pub struct ApplyEngine {
    gateway: Arc<dyn CommandGateway>,
    history: HistoryLog,
    options: ApplyOptions,
    stage: ApplyStage,
    trace: Vec<ApplyStage>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl ApplyEngine {
    pub fn new(gateway: Arc<dyn CommandGateway>, history: HistoryLog, options: ApplyOptions) -> Self {
        Self {
            gateway,
            history,
            options,
            stage: ApplyStage::Idle,
            trace: Vec::new(),
            interrupt: None,
        }
    }

    /// Stop before the next batch once `flag` is set.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub fn stage(&self) -> ApplyStage {
        self.stage
    }

    /// Stages entered by the most recent run, in order.
    pub fn last_trace(&self) -> &[ApplyStage] {
        &self.trace
    }

    pub fn options(&self) -> &ApplyOptions {
        &self.options
    }

    fn enter(&mut self, next: ApplyStage) -> Result<()> {
        let allowed = matches!(
            (self.stage, next),
            (ApplyStage::Idle, ApplyStage::Validating)
                | (ApplyStage::Validating, ApplyStage::Executing)
                | (ApplyStage::Validating, ApplyStage::Idle)
                | (ApplyStage::Executing, ApplyStage::Completed)
                | (ApplyStage::Completed, ApplyStage::Idle)
        );
        if !allowed {
            return Err(PickerError::ApplyBusy(self.stage.to_string()));
        }
        tracing::debug!(from = %self.stage, to = %next, "apply stage");
        self.stage = next;
        self.trace.push(next);
        Ok(())
    }

    /// Conflict rules and argument hygiene. Pure: issues no commands.
    pub fn validate(
        plan: &PlanStore,
        installed: &BTreeSet<String>,
        rules: &[ConflictRule],
    ) -> Result<()> {
        let violations = conflicts::evaluate(&plan.validation_set(installed), rules);
        if !violations.is_empty() {
            return Err(PickerError::ConflictViolation(
                violations.iter().map(ToString::to_string).collect(),
            ));
        }

        let s = plan.state();
        validate_package_names(s.add_repo.iter().chain(&s.add_aur).chain(&s.remove))?;
        for unit in s.enable.iter().chain(&s.disable) {
            validate_unit_name(unit)?;
        }
        Ok(())
    }

    /// Run a confirmed plan.
    ///
    /// Returns `Err` only when the run never started (validation, or the
    /// engine was not idle). Batch failures are reported in the
    /// [`ApplyReport`].
    pub fn apply(
        &mut self,
        plan: &mut PlanStore,
        installed: &BTreeSet<String>,
        rules: &[ConflictRule],
        _confirmation: Confirmation,
    ) -> Result<ApplyReport> {
        if self.stage != ApplyStage::Idle {
            return Err(PickerError::ApplyBusy(self.stage.to_string()));
        }
        self.trace.clear();
        self.enter(ApplyStage::Validating)?;

        if let Err(e) = Self::validate(plan, installed, rules) {
            tracing::warn!("apply rejected: {}", e);
            self.enter(ApplyStage::Idle)?;
            return Err(e);
        }

        let built = build_batches(plan.state(), self.gateway.as_ref(), &self.options.aur_helper);
        self.enter(ApplyStage::Executing)?;

        let mut report = ApplyReport {
            notices: built.notices,
            ..ApplyReport::default()
        };

        let total = built.batches.len();
        for (idx, batch) in built.batches.into_iter().enumerate() {
            if self.interrupted() {
                report.interrupted = true;
                report.notices.push(format!(
                    "Interrupted; {} batch(es) not run",
                    total - idx
                ));
                break;
            }

            tracing::info!(batch = %batch.kind, "executing batch {}/{}", idx + 1, total);
            let outcome = self.execute(&batch);

            if let Err(e) = self
                .history
                .append(batch.kind.action(), &outcome.commands, outcome.rc)
            {
                tracing::error!("Failed to record {} in history: {}", batch.kind, e);
                report
                    .notices
                    .push(format!("History entry for {} was not written: {}", batch.kind, e));
            }

            if !outcome.succeeded() {
                tracing::warn!(batch = %batch.kind, rc = outcome.rc, "batch failed, continuing");
            }
            report.outcomes.push(outcome);
        }

        self.enter(ApplyStage::Completed)?;

        if report.all_succeeded() && self.options.after_apply == AfterApply::ClearSatisfied {
            clear_satisfied(plan, &report);
            report.plan_cleared = !report.outcomes.is_empty();
        }

        self.enter(ApplyStage::Idle)?;
        Ok(report)
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn execute(&self, batch: &Batch) -> BatchOutcome {
        match &batch.step {
            BatchStep::Command(argv) => {
                let out = self.gateway.run(argv);
                BatchOutcome {
                    kind: batch.kind,
                    rc: out.code,
                    output: out.output,
                    commands: vec![render_argv(argv)],
                }
            }
            BatchStep::Writes(files) => self.execute_writes(batch.kind, files),
        }
    }

    /// Every file is attempted; rc is the first non-zero result.
    fn execute_writes(&self, kind: BatchKind, files: &[ConfigFile]) -> BatchOutcome {
        let mut rc = 0;
        let mut output = String::new();
        let mut commands = Vec::with_capacity(files.len());

        for file in files {
            let shown = file.path.display().to_string();
            let file_rc = match file.scope() {
                WriteScope::Privileged => {
                    commands.push(format!("privileged-write {}", shown));
                    let out = self.gateway.privileged_write(&file.path, &file.content);
                    if out.success() {
                        output.push_str(&format!("wrote {}\n", shown));
                    } else {
                        output.push_str(&out.output);
                    }
                    out.code
                }
                WriteScope::User => {
                    commands.push(format!("user-write {}", shown));
                    match self.gateway.user_write(&file.path, &file.content) {
                        Ok(path) => {
                            output.push_str(&format!("wrote {}\n", path.display()));
                            0
                        }
                        Err(e) => {
                            output.push_str(&format!("{}\n", e));
                            1
                        }
                    }
                }
            };
            if rc == 0 && file_rc != 0 {
                rc = file_rc;
            }
        }

        BatchOutcome {
            kind,
            rc,
            output,
            commands,
        }
    }
}

fn clear_satisfied(plan: &mut PlanStore, report: &ApplyReport) {
    for outcome in &report.outcomes {
        if let Some(source) = batches::source_of(outcome.kind) {
            plan.clear_installs(source);
            continue;
        }
        match outcome.kind {
            BatchKind::Remove => plan.clear_removals(),
            BatchKind::ServiceEnable => plan.clear_enable(),
            BatchKind::ServiceDisable => plan.clear_disable(),
            BatchKind::ConfigWrite => plan.clear_config_generation(),
            BatchKind::InstallRepo | BatchKind::InstallAur => {}
        }
    }
}
