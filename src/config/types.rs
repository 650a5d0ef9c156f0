//! Typed catalog model (`packages.json`).

use crate::cache::Namespace;
use crate::conflicts::ConflictRule;
use serde::{Deserialize, Serialize};

/// Package source. Shares its wire names with the search namespaces.
pub type Source = Namespace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageItem {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_source")]
    pub source: Source,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

fn default_source() -> Source {
    Source::Repo
}

impl PackageItem {
    pub fn repo(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: Source::Repo,
            desc: String::new(),
            featured: false,
            reason: String::new(),
        }
    }
}

/// Catalog entries may be a bare name (a repo package) or a full record.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawItem {
    Name(String),
    Item(PackageItem),
}

fn deserialize_items<'de, D>(deserializer: D) -> std::result::Result<Vec<PackageItem>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Vec<RawItem> = Vec::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|item| match item {
            RawItem::Name(name) => {
                let name = name.trim();
                (!name.is_empty()).then(|| PackageItem::repo(name))
            }
            RawItem::Item(mut item) => {
                item.name = item.name.trim().to_string();
                (!item.name.is_empty()).then_some(item)
            }
        })
        .collect())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_items")]
    pub items: Vec<PackageItem>,
}

/// A service either named bare or described by a record whose unit and
/// description keys vary between catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceSpec {
    Name(String),
    Detailed {
        #[serde(default, alias = "name", alias = "service")]
        unit: Option<String>,
        #[serde(default, alias = "why", alias = "reason")]
        desc: Option<String>,
    },
}

/// Canonical unit plus its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    pub unit: String,
    pub desc: String,
}

impl ServiceSpec {
    pub fn named(unit: &str, desc: &str) -> Self {
        Self::Detailed {
            unit: Some(unit.to_string()),
            desc: Some(desc.to_string()),
        }
    }

    /// `None` when no unit name is present.
    pub fn normalize(&self) -> Option<ServiceEntry> {
        let (unit, desc) = match self {
            Self::Name(name) => (name.trim(), ""),
            Self::Detailed { unit, desc } => (
                unit.as_deref().unwrap_or("").trim(),
                desc.as_deref().unwrap_or("").trim(),
            ),
        };
        if unit.is_empty() {
            return None;
        }
        let unit = if unit.contains('.') {
            unit.to_string()
        } else {
            format!("{}.service", unit)
        };
        Some(ServiceEntry {
            unit,
            desc: desc.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub required_packages: Vec<String>,
    #[serde(default)]
    pub recommended_packages: Vec<String>,
    #[serde(default)]
    pub services: Vec<ServiceSpec>,
    #[serde(default = "default_target_preset")]
    pub preset: String,
}

fn default_target_preset() -> String {
    "hyprland".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub targets: Vec<Target>,
    pub conflicts: Vec<ConflictRule>,
    pub services: Vec<ServiceSpec>,
}

/// Units every catalog offers, ahead of its own.
pub fn essential_services() -> Vec<ServiceSpec> {
    vec![
        ServiceSpec::named("greetd", "Greeter daemon (tuigreet)"),
        ServiceSpec::named("NetworkManager", "Network"),
        ServiceSpec::named("bluetooth", "Bluetooth (bluez)"),
        ServiceSpec::named("cups", "Printing"),
        ServiceSpec::named("avahi-daemon", "mDNS/Bonjour"),
    ]
}

impl Catalog {
    pub fn target(&self, id: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Essentials, catalog services and the given target's services,
    /// normalized and de-duplicated in first-seen order.
    pub fn service_entries(&self, target: Option<&Target>) -> Vec<ServiceEntry> {
        let mut seen = std::collections::HashSet::new();
        essential_services()
            .iter()
            .chain(self.services.iter())
            .chain(target.into_iter().flat_map(|t| t.services.iter()))
            .filter_map(ServiceSpec::normalize)
            .filter(|entry| seen.insert(entry.unit.clone()))
            .collect()
    }
}
