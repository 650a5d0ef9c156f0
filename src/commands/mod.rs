//! Command handlers behind the `pkgpicker` binary.

pub mod apply;
pub mod drivers;
pub mod history;
pub mod hygiene;
pub mod info;
pub mod installed;
pub mod packages;
pub mod profile;
pub mod search;
pub mod selfcheck;
pub mod services;
pub mod settings;

use crate::cache::QueryCache;
use crate::config::{Catalog, Settings, load_catalog};
use crate::error::Result;
use crate::gateway::{CommandGateway, SystemGateway};
use crate::history::HistoryLog;
use crate::host::HostQueries;
use crate::profiles::ProfileStore;
use crate::utils::paths::{self, DataLayout};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Settings, file layout and gateway shared by every handler.
pub struct Context {
    pub settings: Settings,
    pub layout: DataLayout,
    pub gateway: Arc<dyn CommandGateway>,
    pub interrupt: Arc<AtomicBool>,
}

impl Context {
    pub fn load(interrupt: Arc<AtomicBool>) -> Result<Self> {
        let settings = Settings::load()?;
        let layout = DataLayout::discover()?;
        let gateway: Arc<dyn CommandGateway> = Arc::new(SystemGateway::new(settings.elevation));
        tracing::debug!(
            data = %layout.root.display(),
            elevation = %settings.elevation,
            "context loaded"
        );
        Ok(Self::new(settings, layout, gateway, interrupt))
    }

    pub fn new(
        settings: Settings,
        layout: DataLayout,
        gateway: Arc<dyn CommandGateway>,
        interrupt: Arc<AtomicBool>,
    ) -> Self {
        Self {
            settings,
            layout,
            gateway,
            interrupt,
        }
    }

    pub fn history(&self) -> HistoryLog {
        HistoryLog::new(self.layout.history_log())
    }

    pub fn cache(&self) -> QueryCache {
        QueryCache::new(&self.layout, self.gateway.clone(), self.settings.cache_options())
    }

    pub fn host(&self) -> HostQueries {
        HostQueries::new(self.gateway.clone())
    }

    pub fn profiles(&self) -> ProfileStore {
        ProfileStore::new(self.layout.profiles_dir())
    }

    pub fn catalog(&self) -> Result<Catalog> {
        load_catalog(&paths::catalog_file()?)
    }
}
