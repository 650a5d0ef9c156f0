//! # Plan
//!
//! In-memory selection and plan state. Nothing here touches the host; the
//! apply engine reads the plan and clears it after a clean run.

pub mod presets;

use crate::config::{Source, Target};
use crate::error::{PickerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use presets::{BASE_SERVICE_UNIT, ConfigFile, Preset, WriteScope};

/// Serializable copy of every plan field. Missing fields load as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanSnapshot {
    pub selected_repo: BTreeSet<String>,
    pub selected_aur: BTreeSet<String>,
    #[serde(rename = "plan_repo")]
    pub add_repo: BTreeSet<String>,
    #[serde(rename = "plan_aur")]
    pub add_aur: BTreeSet<String>,
    #[serde(rename = "remove_explicit")]
    pub remove: BTreeSet<String>,
    #[serde(rename = "plan_services_enable")]
    pub enable: BTreeSet<String>,
    #[serde(rename = "plan_services_disable")]
    pub disable: BTreeSet<String>,
    #[serde(rename = "plan_preset")]
    pub preset: Option<String>,
    #[serde(rename = "plan_generate_configs")]
    pub generate_configs: bool,
}

impl PlanSnapshot {
    /// Names selected under both sources, then units planned for both
    /// enable and disable. `None` when the snapshot is consistent.
    pub fn inconsistency(&self) -> Option<String> {
        let both_sources: Vec<&str> = self
            .selected_repo
            .intersection(&self.selected_aur)
            .map(String::as_str)
            .collect();
        if !both_sources.is_empty() {
            return Some(format!(
                "selected under both repo and aur: {}",
                both_sources.join(", ")
            ));
        }

        let both_states: Vec<&str> = self
            .enable
            .intersection(&self.disable)
            .map(String::as_str)
            .collect();
        if !both_states.is_empty() {
            return Some(format!(
                "planned for both enable and disable: {}",
                both_states.join(", ")
            ));
        }
        None
    }

    pub fn check_consistency(&self) -> Result<()> {
        match self.inconsistency() {
            Some(reason) => Err(PickerError::ConfigError(format!("Inconsistent plan: {}", reason))),
            None => Ok(()),
        }
    }
}

/// Planned state of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServicePlan {
    None,
    Enable,
    Disable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanStore {
    state: PlanSnapshot,
}

impl PlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PlanSnapshot {
        &self.state
    }

    /// Select `name` under `source`, or deselect it if it already is.
    /// A name is never selected under both sources.
    pub fn toggle_selection(&mut self, name: &str, source: Source) {
        let (chosen, other) = match source {
            Source::Repo => (&mut self.state.selected_repo, &mut self.state.selected_aur),
            Source::Aur => (&mut self.state.selected_aur, &mut self.state.selected_repo),
        };
        if !chosen.remove(name) {
            chosen.insert(name.to_string());
            other.remove(name);
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.state.selected_repo.contains(name) || self.state.selected_aur.contains(name)
    }

    pub fn clear_selection(&mut self) {
        self.state.selected_repo.clear();
        self.state.selected_aur.clear();
    }

    /// Union the selection into the install plan.
    pub fn commit_selection_to_plan(&mut self) {
        let repo = self.state.selected_repo.clone();
        let aur = self.state.selected_aur.clone();
        self.state.add_repo.extend(repo);
        self.state.add_aur.extend(aur);
    }

    pub fn plan_repo_packages<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.add_repo.extend(names.into_iter().map(Into::into));
    }

    pub fn plan_aur_packages<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.add_aur.extend(names.into_iter().map(Into::into));
    }

    pub fn toggle_removal(&mut self, name: &str) {
        if !self.state.remove.remove(name) {
            self.state.remove.insert(name.to_string());
        }
    }

    pub fn plan_removals<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.remove.extend(names.into_iter().map(Into::into));
    }

    pub fn service_plan(&self, unit: &str) -> ServicePlan {
        if self.state.enable.contains(unit) {
            ServicePlan::Enable
        } else if self.state.disable.contains(unit) {
            ServicePlan::Disable
        } else {
            ServicePlan::None
        }
    }

    /// Cycle none -> enable -> disable -> none. Returns the new state.
    pub fn toggle_service_plan(&mut self, unit: &str) -> ServicePlan {
        match self.service_plan(unit) {
            ServicePlan::None => self.plan_enable(unit),
            ServicePlan::Enable => self.plan_disable(unit),
            ServicePlan::Disable => {
                self.state.disable.remove(unit);
            }
        }
        self.service_plan(unit)
    }

    pub fn plan_enable(&mut self, unit: &str) {
        self.state.disable.remove(unit);
        self.state.enable.insert(unit.to_string());
    }

    pub fn plan_disable(&mut self, unit: &str) {
        self.state.enable.remove(unit);
        self.state.disable.insert(unit.to_string());
    }

    pub fn clear_service_plan(&mut self) {
        self.state.enable.clear();
        self.state.disable.clear();
    }

    /// Add the preset's packages, enable its base unit and remember it.
    pub fn apply_preset(&mut self, id: &str, packages: &[String], base_unit: &str) {
        self.state.add_repo.extend(packages.iter().cloned());
        self.plan_enable(base_unit);
        self.state.preset = Some(id.to_string());
    }

    /// Built-in preset, with config generation switched on.
    pub fn apply_builtin_preset(&mut self, preset: Preset) {
        self.apply_preset(preset.id(), &preset.packages(), BASE_SERVICE_UNIT);
        self.state.generate_configs = true;
    }

    /// Required and recommended packages of a target into the repo plan.
    pub fn add_target(&mut self, target: &Target) {
        self.plan_repo_packages(
            target
                .required_packages
                .iter()
                .chain(target.recommended_packages.iter())
                .map(|p| p.trim())
                .filter(|p| !p.is_empty()),
        );
    }

    pub fn set_generate_configs(&mut self, on: bool) {
        self.state.generate_configs = on;
    }

    pub fn toggle_generate_configs(&mut self) -> bool {
        self.state.generate_configs = !self.state.generate_configs;
        self.state.generate_configs
    }

    /// Drop the install plan for one source.
    pub(crate) fn clear_installs(&mut self, source: Source) {
        match source {
            Source::Repo => self.state.add_repo.clear(),
            Source::Aur => self.state.add_aur.clear(),
        }
    }

    pub(crate) fn clear_removals(&mut self) {
        self.state.remove.clear();
    }

    pub(crate) fn clear_enable(&mut self) {
        self.state.enable.clear();
    }

    pub(crate) fn clear_disable(&mut self) {
        self.state.disable.clear();
    }

    /// Generated configs are done; forget the request.
    pub(crate) fn clear_config_generation(&mut self) {
        self.state.generate_configs = false;
    }

    pub fn reset(&mut self) {
        self.state = PlanSnapshot::default();
    }

    /// True when nothing would be executed.
    pub fn is_empty(&self) -> bool {
        let s = &self.state;
        s.add_repo.is_empty()
            && s.add_aur.is_empty()
            && s.remove.is_empty()
            && s.enable.is_empty()
            && s.disable.is_empty()
            && !s.generate_configs
    }

    pub fn snapshot(&self) -> PlanSnapshot {
        self.state.clone()
    }

    /// Replace the whole state. An inconsistent snapshot leaves the plan untouched.
    pub fn restore(&mut self, snapshot: PlanSnapshot) -> Result<()> {
        snapshot.check_consistency()?;
        self.state = snapshot;
        Ok(())
    }

    /// installed ∪ planned installs ∪ selection, the set conflict rules see.
    pub fn validation_set(&self, installed: &BTreeSet<String>) -> BTreeSet<String> {
        let s = &self.state;
        installed
            .iter()
            .chain(&s.add_repo)
            .chain(&s.add_aur)
            .chain(&s.selected_repo)
            .chain(&s.selected_aur)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceSpec;

    #[test]
    fn toggle_selection_moves_between_sources() {
        let mut plan = PlanStore::new();
        plan.toggle_selection("paru", Source::Repo);
        plan.toggle_selection("paru", Source::Aur);
        assert!(plan.state().selected_repo.is_empty());
        assert!(plan.state().selected_aur.contains("paru"));

        plan.toggle_selection("paru", Source::Aur);
        assert!(!plan.is_selected("paru"));
    }

    #[test]
    fn service_toggle_cycles() {
        let mut plan = PlanStore::new();
        assert_eq!(plan.toggle_service_plan("sshd.service"), ServicePlan::Enable);
        assert_eq!(plan.toggle_service_plan("sshd.service"), ServicePlan::Disable);
        assert!(!plan.state().enable.contains("sshd.service"));
        assert_eq!(plan.toggle_service_plan("sshd.service"), ServicePlan::None);
        assert!(plan.is_empty());
    }

    #[test]
    fn commit_is_idempotent() {
        let mut plan = PlanStore::new();
        plan.toggle_selection("git", Source::Repo);
        plan.toggle_selection("yay-bin", Source::Aur);
        plan.commit_selection_to_plan();
        let once = plan.snapshot();
        plan.commit_selection_to_plan();
        assert_eq!(plan.snapshot(), once);
        assert!(once.add_repo.contains("git"));
        assert!(once.add_aur.contains("yay-bin"));
    }

    #[test]
    fn preset_enables_base_unit() {
        let mut plan = PlanStore::new();
        plan.plan_disable(BASE_SERVICE_UNIT);
        plan.apply_builtin_preset(Preset::PlasmaTuigreet);

        let s = plan.state();
        assert!(s.enable.contains(BASE_SERVICE_UNIT));
        assert!(!s.disable.contains(BASE_SERVICE_UNIT));
        assert!(s.add_repo.contains("plasma-meta"));
        assert_eq!(s.preset.as_deref(), Some("plasma-tuigreet"));
        assert!(s.generate_configs);
    }

    #[test]
    fn target_adds_required_and_recommended() {
        let target = Target {
            id: "desk".into(),
            name: "Desktop".into(),
            required_packages: vec!["kitty".into()],
            recommended_packages: vec!["btop".into(), " ".into()],
            services: vec![ServiceSpec::Name("sshd".into())],
            preset: "hyprland".into(),
        };
        let mut plan = PlanStore::new();
        plan.add_target(&target);
        let names: Vec<&String> = plan.state().add_repo.iter().collect();
        assert_eq!(names, vec!["btop", "kitty"]);
    }

    #[test]
    fn validation_set_unions_everything() {
        let mut plan = PlanStore::new();
        plan.toggle_selection("a", Source::Repo);
        plan.plan_repo_packages(["b"]);
        let installed: BTreeSet<String> = ["c".to_string()].into();
        let set = plan.validation_set(&installed);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn restore_rejects_overlapping_sets() {
        let mut plan = PlanStore::new();
        plan.plan_repo_packages(["vim"]);

        let mut snapshot = PlanSnapshot::default();
        snapshot.enable.insert("sshd.service".to_string());
        snapshot.disable.insert("sshd.service".to_string());
        assert!(plan.restore(snapshot).is_err());

        let mut snapshot = PlanSnapshot::default();
        snapshot.selected_repo.insert("git".to_string());
        snapshot.selected_aur.insert("git".to_string());
        assert!(plan.restore(snapshot).is_err());

        assert!(plan.state().add_repo.contains("vim"));
        assert!(plan.restore(PlanSnapshot::default()).is_ok());
        assert!(plan.is_empty());
    }

    #[test]
    fn snapshot_uses_stable_field_names() {
        let mut plan = PlanStore::new();
        plan.plan_removals(["nano"]);
        let json = serde_json::to_string(&plan.snapshot()).unwrap();
        assert!(json.contains("\"remove_explicit\":[\"nano\"]"));
        assert!(json.contains("\"plan_preset\":null"));

        let partial: PlanSnapshot = serde_json::from_str(r#"{"plan_repo":["git"]}"#).unwrap();
        assert!(partial.add_repo.contains("git"));
        assert!(partial.enable.is_empty());
    }
}
