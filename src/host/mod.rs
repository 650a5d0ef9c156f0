//! Read-only host queries and the cache hygiene action.

pub mod hardware;

pub use hardware::{DriverSuggestion, GpuVendor};

use crate::config::Source;
use crate::error::Result;
use crate::gateway::{CommandGateway, CommandOutput, RC_NOT_FOUND};
use crate::history::HistoryLog;
use crate::utils::sanitize::render_argv;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Installed package sets. A failed query leaves its set empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSnapshot {
    pub all: BTreeSet<String>,
    /// Explicitly installed, sorted.
    pub explicit: Vec<String>,
    /// Not found in any sync database.
    pub foreign: BTreeSet<String>,
}

impl HostSnapshot {
    /// `None` when not installed; foreign packages count as AUR.
    pub fn source_of(&self, name: &str) -> Option<Source> {
        if !self.all.contains(name) {
            None
        } else if self.foreign.contains(name) {
            Some(Source::Aur)
        } else {
            Some(Source::Repo)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub unit: String,
    pub enabled: String,
    pub active: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub name: String,
    pub present: bool,
}

pub struct HostQueries {
    gateway: Arc<dyn CommandGateway>,
}

const INSTALLED_QUERIES: [&str; 3] = ["-Qq", "-Qqe", "-Qmq"];

impl HostQueries {
    pub fn new(gateway: Arc<dyn CommandGateway>) -> Self {
        Self { gateway }
    }

    fn pacman_names(&self, flag: &str) -> Vec<String> {
        let out = self
            .gateway
            .run(&["pacman".to_string(), flag.to_string()]);
        if !out.success() {
            tracing::debug!(flag, rc = out.code, "pacman query failed");
            return Vec::new();
        }
        out.output.split_whitespace().map(String::from).collect()
    }

    /// Every installed package name (`pacman -Qq`).
    pub fn installed_names(&self) -> BTreeSet<String> {
        self.pacman_names("-Qq").into_iter().collect()
    }

    /// All, explicit and foreign sets, queried in parallel.
    pub fn installed_snapshot(&self) -> HostSnapshot {
        let mut results: Vec<Vec<String>> = INSTALLED_QUERIES[..]
            .par_iter()
            .map(|flag| self.pacman_names(flag))
            .collect();

        let foreign = results.pop().unwrap_or_default();
        let mut explicit = results.pop().unwrap_or_default();
        let all = results.pop().unwrap_or_default();
        explicit.sort();

        HostSnapshot {
            all: all.into_iter().collect(),
            explicit,
            foreign: foreign.into_iter().collect(),
        }
    }

    /// Unneeded dependencies. pacman exits non-zero when there are none.
    pub fn orphans(&self) -> Vec<String> {
        self.pacman_names("-Qtdq")
    }

    fn systemctl_query(&self, verb: &str, unit: &str) -> String {
        let out = self.gateway.run(&[
            "systemctl".to_string(),
            verb.to_string(),
            unit.to_string(),
        ]);
        let text = out.output.trim();
        if !text.is_empty() {
            // only the first line carries the state
            text.lines().next().unwrap_or(text).trim().to_string()
        } else if out.success() {
            String::new()
        } else {
            "not-found".to_string()
        }
    }

    pub fn service_status(&self, unit: &str) -> ServiceStatus {
        ServiceStatus {
            unit: unit.to_string(),
            enabled: self.systemctl_query("is-enabled", unit),
            active: self.systemctl_query("is-active", unit),
        }
    }

    /// Optional tools the workflows rely on.
    pub fn self_check(&self, aur_helper: &str) -> Vec<ToolStatus> {
        [aur_helper, "expac", "paccache", "lspci"]
            .iter()
            .map(|name| ToolStatus {
                name: name.to_string(),
                present: self.gateway.probe(name),
            })
            .collect()
    }

    /// `paccache -r`, recorded in history whatever the outcome.
    pub fn paccache_clean(&self, history: &HistoryLog) -> Result<CommandOutput> {
        let argv = self
            .gateway
            .elevation()
            .wrap(vec!["paccache".to_string(), "-r".to_string()]);

        let out = if self.gateway.probe("paccache") {
            self.gateway.run(&argv)
        } else {
            CommandOutput::new(RC_NOT_FOUND, "paccache not found (install pacman-contrib).")
        };

        history.append("paccache", &[render_argv(&argv)], out.code)?;
        Ok(out)
    }

    /// `lspci -nnk`, or empty when lspci is unavailable or fails.
    pub fn lspci(&self) -> String {
        if !self.gateway.probe("lspci") {
            return String::new();
        }
        let out = self.gateway.run(&["lspci".to_string(), "-nnk".to_string()]);
        if out.success() { out.output } else { String::new() }
    }

    pub fn driver_suggestions(&self, installed: &BTreeSet<String>) -> Option<DriverSuggestion> {
        let lspci = self.lspci();
        if lspci.trim().is_empty() {
            return None;
        }
        Some(DriverSuggestion::from_lspci(&lspci, installed))
    }
}
