//! Error types for planning, catalog loading and template generation
//!
//! Only structural failures live here. Platform-limit violations are not
//! errors: they are reported inside the plan's `ValidationResult`.

use std::path::PathBuf;

use crate::models::MachineCategory;

/// Errors that fail a planning call outright
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The catalog offers no machine classes for the requested category.
    #[error("catalog has no machine classes in category '{category}'")]
    CatalogEmpty { category: MachineCategory },

    /// The workload requirement cannot be planned.
    #[error("invalid workload requirement: {field} {reason}")]
    InvalidRequirement { field: &'static str, reason: String },

    /// The catalog lists no platform versions and no fallback is configured.
    #[error("catalog lists no kubernetes versions and no fallback version is configured")]
    NoPlatformVersions,
}

/// Errors raised while loading a catalog snapshot
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write catalog file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while rendering a template
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("failed to serialize {format} template: {source}")]
    Serialize {
        format: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {format} template: {source}")]
    Write {
        format: &'static str,
        #[source]
        source: std::fmt::Error,
    },
}
