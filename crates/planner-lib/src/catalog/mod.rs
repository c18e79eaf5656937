//! Machine-class catalog
//!
//! The planner only ever sees the catalog through the read-only [`Catalog`]
//! query trait, against a single snapshot obtained from a [`CatalogSource`].

mod snapshot;
mod store;

pub use snapshot::{
    CatalogInfo, CatalogMetadata, CatalogSnapshot, MachineClasses, OsImage, OsImages,
    PlatformLimits, DEFAULT_MAX_AGE_DAYS,
};
pub use store::{CatalogOrigin, CatalogStore};

use crate::models::{MachineCategory, MachineClass, OsFamily};
use std::sync::Arc;

/// Pure read queries over catalog data
pub trait Catalog {
    /// Machine classes in catalog order
    fn list_machine_classes(&self, category: MachineCategory) -> &[MachineClass];

    /// Supported kubernetes versions, newest first
    fn list_platform_versions(&self) -> &[String];

    fn list_os_images(&self, os: OsFamily) -> &[OsImage];

    fn limits(&self) -> &PlatformLimits;
}

/// Hands out immutable catalog snapshots
pub trait CatalogSource: Send + Sync {
    fn snapshot(&self) -> Arc<CatalogSnapshot>;
}

impl CatalogSource for Arc<CatalogSnapshot> {
    fn snapshot(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(self)
    }
}
