//! Immutable catalog snapshot
//!
//! A snapshot is the unit a planning call reads from. It is never mutated
//! after construction; refreshing the catalog produces a new snapshot.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::Catalog;
use crate::error::CatalogError;
use crate::models::{MachineCategory, MachineClass, OsFamily};

/// Default staleness window for catalog data (30 days)
pub const DEFAULT_MAX_AGE_DAYS: i64 = 30;

/// Catalog provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMetadata {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    pub target: String,
}

/// OS image offered for a node family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsImage {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsImages {
    #[serde(default)]
    pub linux: Vec<OsImage>,
    #[serde(default)]
    pub windows: Vec<OsImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineClasses {
    #[serde(default)]
    pub general_purpose: Vec<MachineClass>,
    #[serde(default)]
    pub gpu: Vec<MachineClass>,
}

/// Numeric platform limits checked by the validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformLimits {
    pub control_plane_options: Vec<u32>,
    pub max_nodes_per_pool: u32,
    pub max_pools_per_cluster: u32,
    pub max_nodes_per_cluster: u32,
    pub max_racks: u32,
    pub min_nodes_per_rack: u32,
}

impl Default for PlatformLimits {
    fn default() -> Self {
        Self {
            control_plane_options: vec![1, 3, 5],
            max_nodes_per_pool: 100,
            max_pools_per_cluster: 10,
            max_nodes_per_cluster: 1000,
            max_racks: 16,
            min_nodes_per_rack: 1,
        }
    }
}

/// Full catalog contents at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub metadata: CatalogMetadata,
    /// Newest first
    #[serde(default)]
    pub kubernetes_versions: Vec<String>,
    #[serde(default)]
    pub os_images: OsImages,
    #[serde(default, rename = "vm_skus")]
    pub machine_classes: MachineClasses,
    #[serde(default)]
    pub limits: PlatformLimits,
}

/// Catalog status summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogInfo {
    pub version: String,
    pub target: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub is_outdated: bool,
    pub general_purpose_classes: usize,
    pub gpu_classes: usize,
    pub kubernetes_versions: usize,
}

impl CatalogSnapshot {
    /// Built-in Azure Local 2511 catalog
    pub fn builtin() -> Self {
        Self {
            metadata: CatalogMetadata {
                version: "1.0".to_string(),
                last_updated: Some(Utc::now()),
                target: "Azure Local 2511".to_string(),
            },
            kubernetes_versions: vec![
                "1.29.2".to_string(),
                "1.28.5".to_string(),
                "1.27.9".to_string(),
            ],
            os_images: OsImages {
                linux: vec![
                    OsImage {
                        name: "Azure Linux 2.0".to_string(),
                        version: "2.0.20240101".to_string(),
                    },
                    OsImage {
                        name: "Ubuntu 22.04".to_string(),
                        version: "22.04.202401".to_string(),
                    },
                ],
                windows: vec![
                    OsImage {
                        name: "Windows Server 2022".to_string(),
                        version: "20348.2227".to_string(),
                    },
                    OsImage {
                        name: "Windows Server 2019".to_string(),
                        version: "17763.5329".to_string(),
                    },
                ],
            },
            machine_classes: MachineClasses {
                general_purpose: vec![
                    MachineClass::new("Standard_D4s_v5", 4, 16),
                    MachineClass::new("Standard_D8s_v5", 8, 32),
                    MachineClass::new("Standard_D16s_v5", 16, 64),
                ],
                gpu: vec![
                    MachineClass::new("Standard_NC4as_T4_v3", 4, 28).with_gpu("T4"),
                    MachineClass::new("Standard_NC8as_T4_v3", 8, 56).with_gpu("T4"),
                ],
            },
            limits: PlatformLimits::default(),
        }
    }

    /// Parse a snapshot from its JSON representation
    pub fn from_json(raw: &str, path: &Path) -> Result<Self, CatalogError> {
        serde_json::from_str(raw).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a snapshot from a JSON catalog file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw, path)
    }

    /// Write the snapshot back as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let write_error = |source: std::io::Error| CatalogError::Write {
            path: path.to_path_buf(),
            source,
        };
        let raw = serde_json::to_string_pretty(self).map_err(|e| write_error(e.into()))?;
        std::fs::write(path, raw).map_err(write_error)
    }

    /// Same contents, stamped with a new refresh time
    pub fn restamped(&self, at: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.metadata.last_updated = Some(at);
        next
    }

    /// Whether the data is older than `max_age_days` (undated data is outdated)
    pub fn is_outdated(&self, now: DateTime<Utc>, max_age_days: i64) -> bool {
        match self.metadata.last_updated {
            Some(updated) => now - updated > Duration::days(max_age_days),
            None => true,
        }
    }

    /// Age in seconds, if the snapshot is dated
    pub fn age_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.metadata
            .last_updated
            .map(|updated| (now - updated).num_seconds().max(0))
    }

    pub fn info(&self, now: DateTime<Utc>, max_age_days: i64) -> CatalogInfo {
        CatalogInfo {
            version: self.metadata.version.clone(),
            target: self.metadata.target.clone(),
            last_updated: self.metadata.last_updated,
            is_outdated: self.is_outdated(now, max_age_days),
            general_purpose_classes: self.machine_classes.general_purpose.len(),
            gpu_classes: self.machine_classes.gpu.len(),
            kubernetes_versions: self.kubernetes_versions.len(),
        }
    }
}

impl Catalog for CatalogSnapshot {
    fn list_machine_classes(&self, category: MachineCategory) -> &[MachineClass] {
        match category {
            MachineCategory::GeneralPurpose => &self.machine_classes.general_purpose,
            MachineCategory::Gpu => &self.machine_classes.gpu,
        }
    }

    fn list_platform_versions(&self) -> &[String] {
        &self.kubernetes_versions
    }

    fn list_os_images(&self, os: OsFamily) -> &[OsImage] {
        match os {
            OsFamily::Linux => &self.os_images.linux,
            OsFamily::Windows => &self.os_images.windows,
        }
    }

    fn limits(&self) -> &PlatformLimits {
        &self.limits
    }
}
