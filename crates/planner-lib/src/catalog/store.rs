//! Refreshable catalog holder
//!
//! Readers get an `Arc` to the current snapshot; a refresh builds a whole
//! new snapshot and swaps the pointer, so a planning call that already
//! holds a snapshot keeps a consistent view.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use super::{CatalogSnapshot, CatalogSource};
use crate::error::CatalogError;

/// Where snapshots come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOrigin {
    Builtin,
    File(PathBuf),
}

#[derive(Debug)]
pub struct CatalogStore {
    origin: CatalogOrigin,
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogStore {
    /// Store backed by the built-in catalog
    pub fn builtin() -> Self {
        Self::from_snapshot(CatalogSnapshot::builtin())
    }

    /// Store wrapping a fixed snapshot
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            origin: CatalogOrigin::Builtin,
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Open a catalog file; a missing file falls back to the built-in catalog
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let snapshot = if path.exists() {
            let snapshot = CatalogSnapshot::load(path)?;
            info!(
                path = %path.display(),
                version = %snapshot.metadata.version,
                target = %snapshot.metadata.target,
                "Loaded catalog"
            );
            snapshot
        } else {
            warn!(path = %path.display(), "Catalog file not found, using built-in catalog");
            CatalogSnapshot::builtin()
        };

        Ok(Self {
            origin: CatalogOrigin::File(path.to_path_buf()),
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Open a catalog file if a path is given, otherwise use the built-in catalog
    pub fn open_or_builtin(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::open(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn origin(&self) -> &CatalogOrigin {
        &self.origin
    }

    /// Rebuild the snapshot from its origin, stamp it and swap it in
    ///
    /// File-backed stores re-read the file (or take the current data if the
    /// file has gone away) and write the stamped snapshot back. Built-in
    /// stores only restamp the current data.
    pub fn refresh(&self) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        let now = Utc::now();
        let next = match &self.origin {
            CatalogOrigin::File(path) => {
                let next = if path.exists() {
                    CatalogSnapshot::load(path)?.restamped(now)
                } else {
                    self.snapshot().restamped(now)
                };
                next.save(path)?;
                next
            }
            CatalogOrigin::Builtin => self.snapshot().restamped(now),
        };
        let next = Arc::new(next);

        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = Arc::clone(&next);
        drop(current);

        info!(
            version = %next.metadata.version,
            last_updated = ?next.metadata.last_updated,
            "Catalog refreshed"
        );
        Ok(next)
    }
}

impl CatalogSource for CatalogStore {
    fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, DEFAULT_MAX_AGE_DAYS};
    use crate::models::MachineCategory;
    use std::io::Write;

    #[test]
    fn test_missing_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::open(&dir.path().join("skus.json")).unwrap();
        assert_eq!(store.snapshot().metadata.target, "Azure Local 2511");
    }

    #[test]
    fn test_refresh_swaps_snapshot_without_touching_readers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut catalog = CatalogSnapshot::builtin();
        catalog.kubernetes_versions = vec!["1.29.2".to_string()];
        file.write_all(serde_json::to_string(&catalog).unwrap().as_bytes())
            .unwrap();

        let store = CatalogStore::open(file.path()).unwrap();
        let held = store.snapshot();

        catalog.kubernetes_versions = vec!["1.30.0".to_string(), "1.29.2".to_string()];
        catalog.machine_classes.gpu.clear();
        std::fs::write(file.path(), serde_json::to_string(&catalog).unwrap()).unwrap();

        let refreshed = store.refresh().unwrap();
        assert_eq!(refreshed.list_platform_versions()[0], "1.30.0");
        assert!(store.snapshot().list_machine_classes(MachineCategory::Gpu).is_empty());

        // The snapshot obtained before the refresh is unchanged
        assert_eq!(held.list_platform_versions(), ["1.29.2".to_string()]);
        assert_eq!(held.list_machine_classes(MachineCategory::Gpu).len(), 2);
    }

    #[test]
    fn test_refresh_restamps_and_persists_stale_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skus.json");
        let stale = CatalogSnapshot::builtin().restamped(Utc::now() - chrono::Duration::days(90));
        stale.save(&path).unwrap();

        let store = CatalogStore::open(&path).unwrap();
        assert!(store.snapshot().is_outdated(Utc::now(), DEFAULT_MAX_AGE_DAYS));

        let refreshed = store.refresh().unwrap();
        assert!(!refreshed.is_outdated(Utc::now(), DEFAULT_MAX_AGE_DAYS));
        assert_eq!(refreshed.machine_classes, stale.machine_classes);

        let reloaded = CatalogSnapshot::load(&path).unwrap();
        assert_eq!(reloaded.metadata.last_updated, refreshed.metadata.last_updated);
    }

    #[test]
    fn test_builtin_refresh_restamps() {
        let store = CatalogStore::builtin();
        let before = store.snapshot();
        let after = store.refresh().unwrap();
        assert!(after.metadata.last_updated >= before.metadata.last_updated);
        assert_eq!(after.machine_classes, before.machine_classes);
    }

    #[test]
    fn test_refresh_surfaces_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&CatalogSnapshot::builtin()).unwrap().as_bytes())
            .unwrap();
        let store = CatalogStore::open(file.path()).unwrap();

        std::fs::write(file.path(), "garbage").unwrap();
        assert!(matches!(store.refresh(), Err(CatalogError::Parse { .. })));
        // Failed refresh keeps the previous snapshot
        assert_eq!(store.snapshot().machine_classes.gpu.len(), 2);
    }
}
