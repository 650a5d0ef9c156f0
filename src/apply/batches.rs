//! Turning a plan into ordered batches.

use crate::config::Source;
use crate::gateway::CommandGateway;
use crate::plan::{ConfigFile, PlanSnapshot, Preset};
use crate::utils::platform::Elevation;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    InstallRepo,
    InstallAur,
    Remove,
    ServiceEnable,
    ServiceDisable,
    ConfigWrite,
}

impl BatchKind {
    /// Action name written to history.
    pub fn action(self) -> &'static str {
        match self {
            Self::InstallRepo => "install_repo",
            Self::InstallAur => "install_aur",
            Self::Remove => "remove",
            Self::ServiceEnable => "service_enable",
            Self::ServiceDisable => "service_disable",
            Self::ConfigWrite => "config_write",
        }
    }
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStep {
    Command(Vec<String>),
    Writes(Vec<ConfigFile>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub kind: BatchKind,
    pub step: BatchStep,
}

/// Batches in execution order plus notices about skipped work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    pub batches: Vec<Batch>,
    pub notices: Vec<String>,
}

fn argv_with<'a>(head: &[&str], names: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    head.iter()
        .map(|s| s.to_string())
        .chain(names.into_iter().cloned())
        .collect()
}

/// Build the ordered batches for `plan`. Empty sets produce no batch.
pub fn build_batches(
    plan: &PlanSnapshot,
    gateway: &dyn CommandGateway,
    aur_helper: &str,
) -> BatchPlan {
    let elevation: Elevation = gateway.elevation();
    let mut out = BatchPlan::default();

    if !plan.add_repo.is_empty() {
        out.batches.push(Batch {
            kind: BatchKind::InstallRepo,
            step: BatchStep::Command(elevation.wrap(argv_with(
                &["pacman", "-S", "--needed", "--noconfirm"],
                &plan.add_repo,
            ))),
        });
    }

    if !plan.add_aur.is_empty() {
        if gateway.probe(aur_helper) {
            // AUR helpers refuse to run as root; they elevate themselves.
            out.batches.push(Batch {
                kind: BatchKind::InstallAur,
                step: BatchStep::Command(argv_with(
                    &[aur_helper, "-S", "--needed", "--noconfirm"],
                    &plan.add_aur,
                )),
            });
        } else {
            out.notices.push(format!(
                "AUR helper '{}' not found; skipped {} AUR package(s): {}",
                aur_helper,
                plan.add_aur.len(),
                plan.add_aur.iter().cloned().collect::<Vec<_>>().join(" ")
            ));
        }
    }

    if !plan.remove.is_empty() {
        out.batches.push(Batch {
            kind: BatchKind::Remove,
            step: BatchStep::Command(elevation.wrap(argv_with(
                &["pacman", "-Rns", "--noconfirm"],
                &plan.remove,
            ))),
        });
    }

    if !plan.enable.is_empty() {
        out.batches.push(Batch {
            kind: BatchKind::ServiceEnable,
            step: BatchStep::Command(
                elevation.wrap(argv_with(&["systemctl", "enable"], &plan.enable)),
            ),
        });
    }

    if !plan.disable.is_empty() {
        out.batches.push(Batch {
            kind: BatchKind::ServiceDisable,
            step: BatchStep::Command(
                elevation.wrap(argv_with(&["systemctl", "disable"], &plan.disable)),
            ),
        });
    }

    if plan.generate_configs {
        match plan.preset.as_deref().map(str::parse::<Preset>) {
            Some(Ok(preset)) => out.batches.push(Batch {
                kind: BatchKind::ConfigWrite,
                step: BatchStep::Writes(preset.config_files()),
            }),
            Some(Err(_)) => out.notices.push(format!(
                "No config templates for preset '{}'; config generation skipped",
                plan.preset.as_deref().unwrap_or_default()
            )),
            None => out
                .notices
                .push("Config generation is on but no preset is planned; skipped".to_string()),
        }
    }

    out
}

/// Which plan set a batch drains once it succeeded.
pub(super) fn source_of(kind: BatchKind) -> Option<Source> {
    match kind {
        BatchKind::InstallRepo => Some(Source::Repo),
        BatchKind::InstallAur => Some(Source::Aur),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RecordingGateway;
    use crate::plan::PlanStore;

    fn kinds(plan: &BatchPlan) -> Vec<BatchKind> {
        plan.batches.iter().map(|b| b.kind).collect()
    }

    #[test]
    fn batches_follow_fixed_order() {
        let mut plan = PlanStore::new();
        plan.plan_disable("cups.service");
        plan.plan_enable("sshd.service");
        plan.plan_removals(["nano"]);
        plan.toggle_selection("yay-bin", Source::Aur);
        plan.commit_selection_to_plan();
        plan.plan_repo_packages(["git"]);

        let gw = RecordingGateway::new();
        let built = build_batches(plan.state(), &gw, "yay");
        assert_eq!(
            kinds(&built),
            vec![
                BatchKind::InstallRepo,
                BatchKind::InstallAur,
                BatchKind::Remove,
                BatchKind::ServiceEnable,
                BatchKind::ServiceDisable,
            ]
        );
        assert_eq!(
            built.batches[0].step,
            BatchStep::Command(
                ["sudo", "pacman", "-S", "--needed", "--noconfirm", "git"]
                    .map(String::from)
                    .to_vec()
            )
        );
        assert_eq!(
            built.batches[1].step,
            BatchStep::Command(
                ["yay", "-S", "--needed", "--noconfirm", "yay-bin"]
                    .map(String::from)
                    .to_vec()
            )
        );
        assert!(built.notices.is_empty());
    }

    #[test]
    fn missing_helper_skips_aur_with_notice() {
        let mut plan = PlanStore::new();
        plan.toggle_selection("yay-bin", Source::Aur);
        plan.commit_selection_to_plan();

        let gw = RecordingGateway::new().without_tool("yay");
        let built = build_batches(plan.state(), &gw, "yay");
        assert!(built.batches.is_empty());
        assert_eq!(built.notices.len(), 1);
        assert!(built.notices[0].contains("yay-bin"));
    }

    #[test]
    fn elevation_none_runs_plain() {
        let mut plan = PlanStore::new();
        plan.plan_removals(["nano"]);
        let gw = RecordingGateway::new().with_elevation(Elevation::None);
        let built = build_batches(plan.state(), &gw, "yay");
        assert_eq!(
            built.batches[0].step,
            BatchStep::Command(["pacman", "-Rns", "--noconfirm", "nano"].map(String::from).to_vec())
        );
    }

    #[test]
    fn config_generation_needs_a_known_preset() {
        let mut plan = PlanStore::new();
        plan.set_generate_configs(true);
        let gw = RecordingGateway::new();
        let built = build_batches(plan.state(), &gw, "yay");
        assert!(built.batches.is_empty());
        assert_eq!(built.notices.len(), 1);

        plan.apply_builtin_preset(Preset::HyprlandTuigreet);
        let built = build_batches(plan.state(), &gw, "yay");
        assert_eq!(built.batches.last().unwrap().kind, BatchKind::ConfigWrite);
    }
}
