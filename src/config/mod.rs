mod loader;
pub mod settings;
pub mod types;

pub use loader::load_catalog;
pub use settings::Settings;
pub use types::{Catalog, Category, PackageItem, ServiceEntry, ServiceSpec, Source, Target};
