//! # Query cache
//!
//! Search results live in one document with a single timestamp. Once that
//! timestamp is older than the TTL the whole document is dropped, both
//! namespaces together, before the request is served.
//!
//! Installed-package metadata is cached separately and never expires.

mod parse;

use crate::error::{PickerError, Result};
use crate::gateway::CommandGateway;
use crate::utils::paths::DataLayout;
use crate::utils::persist::{load_json_or_default, write_json_atomic};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Upper bound on stored results per query.
pub const MAX_RESULTS: usize = 500;
pub const DEFAULT_TTL_SECS: u64 = 1800;
pub const DEFAULT_AUR_HELPER: &str = "yay";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Repo,
    Aur,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repo => write!(f, "repo"),
            Self::Aur => write!(f, "aur"),
        }
    }
}

impl FromStr for Namespace {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "repo" => Ok(Self::Repo),
            "aur" => Ok(Self::Aur),
            other => Err(PickerError::ConfigError(format!(
                "Unknown package source '{}'. Valid: repo, aur",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub name: String,
    pub desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheDocument {
    pub ts: i64,
    pub repo: BTreeMap<String, Vec<SearchHit>>,
    pub aur: BTreeMap<String, Vec<SearchHit>>,
}

impl CacheDocument {
    fn fresh(now: i64) -> Self {
        Self {
            ts: now,
            ..Self::default()
        }
    }

    pub fn is_stale(&self, now: i64, ttl_secs: u64) -> bool {
        now.saturating_sub(self.ts) > i64::try_from(ttl_secs).unwrap_or(i64::MAX)
    }

    pub fn namespace(&self, ns: Namespace) -> &BTreeMap<String, Vec<SearchHit>> {
        match ns {
            Namespace::Repo => &self.repo,
            Namespace::Aur => &self.aur,
        }
    }

    fn namespace_mut(&mut self, ns: Namespace) -> &mut BTreeMap<String, Vec<SearchHit>> {
        match ns {
            Namespace::Repo => &mut self.repo,
            Namespace::Aur => &mut self.aur,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledInfo {
    pub name: String,
    #[serde(rename = "ver", default)]
    pub version: String,
    #[serde(default)]
    pub repo: String,
    #[serde(rename = "desc", default)]
    pub description: String,
}

impl InstalledInfo {
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: String::new(),
            repo: String::new(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    pub ttl_secs: u64,
    pub aur_helper: String,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            aur_helper: DEFAULT_AUR_HELPER.to_string(),
        }
    }
}

pub struct QueryCache {
    search_path: PathBuf,
    info_path: PathBuf,
    gateway: Arc<dyn CommandGateway>,
    options: CacheOptions,
}

impl QueryCache {
    pub fn new(layout: &DataLayout, gateway: Arc<dyn CommandGateway>, options: CacheOptions) -> Self {
        Self {
            search_path: layout.search_cache(),
            info_path: layout.pkginfo_cache(),
            gateway,
            options,
        }
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    pub fn document(&self) -> CacheDocument {
        load_json_or_default(&self.search_path)
    }

    pub fn search(&self, ns: Namespace, query: &str) -> Vec<SearchHit> {
        self.search_at(ns, query, chrono::Utc::now().timestamp())
    }

    /// [`search`](Self::search) against an explicit clock (unix seconds).
    pub fn search_at(&self, ns: Namespace, query: &str, now: i64) -> Vec<SearchHit> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let mut doc = self.document();
        if doc.is_stale(now, self.options.ttl_secs) {
            tracing::debug!(age = now - doc.ts, "search cache expired, dropping both namespaces");
            doc = CacheDocument::fresh(now);
        }

        if let Some(hits) = doc.namespace(ns).get(query) {
            tracing::debug!(%ns, query, "search cache hit");
            return hits.clone();
        }

        let mut hits = self.run_search(ns, query);
        hits.truncate(MAX_RESULTS);

        doc.namespace_mut(ns).insert(query.to_string(), hits.clone());
        doc.ts = now;
        if let Err(e) = write_json_atomic(&self.search_path, &doc) {
            tracing::warn!("Failed to persist search cache: {}", e);
        }

        hits
    }

    fn run_search(&self, ns: Namespace, query: &str) -> Vec<SearchHit> {
        let program = match ns {
            Namespace::Repo => "pacman",
            Namespace::Aur => {
                if !self.gateway.probe(&self.options.aur_helper) {
                    tracing::info!(helper = %self.options.aur_helper, "AUR helper missing, AUR search disabled");
                    return Vec::new();
                }
                self.options.aur_helper.as_str()
            }
        };

        let argv = vec![program.to_string(), "-Ss".to_string(), query.to_string()];
        let out = self.gateway.run(&argv);
        if !out.success() {
            // pacman exits 1 when nothing matches
            tracing::debug!(%ns, rc = out.code, "search returned no results");
            return Vec::new();
        }
        parse::parse_search_output(ns, &out.output)
    }

    /// Metadata of an installed package. Written once on miss, never expires.
    pub fn installed_info(&self, pkg: &str) -> InstalledInfo {
        let mut cache: BTreeMap<String, InstalledInfo> = load_json_or_default(&self.info_path);
        if let Some(info) = cache.get(pkg) {
            return info.clone();
        }

        let mut info = InstalledInfo::empty(pkg);

        if self.gateway.probe("expac") {
            let argv = ["expac", "-Q", "%n\t%v\t%r\t%d", pkg].map(String::from);
            let out = self.gateway.run(&argv);
            if out.success() {
                parse::apply_expac_line(&mut info, &out.output);
            }
        }

        if info.version.is_empty() || info.description.is_empty() {
            let argv = ["pacman", "-Qi", pkg].map(String::from);
            let out = self.gateway.run(&argv);
            if out.success() {
                parse::apply_pacman_qi(&mut info, &out.output);
            }
        }

        cache.insert(pkg.to_string(), info.clone());
        if let Err(e) = write_json_atomic(&self.info_path, &cache) {
            tracing::warn!("Failed to persist package info cache: {}", e);
        }

        info
    }

    /// Remove both cache files.
    pub fn clear(&self) -> Result<()> {
        for path in [&self.search_path, &self.info_path] {
            match fs::remove_file(path) {
                Ok(()) => tracing::info!(path = %path.display(), "cache removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(PickerError::IoError {
                        path: path.clone(),
                        source: e,
                    });
                }
            }
        }
        Ok(())
    }
}
