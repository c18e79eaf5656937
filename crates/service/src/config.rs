//! Service configuration

use anyhow::{Context, Result};
use planner_lib::catalog::DEFAULT_MAX_AGE_DAYS;
use planner_lib::PlannerConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable naming an optional configuration file
pub const CONFIG_FILE_ENV: &str = "PLANNER_CONFIG_FILE";

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Instance name used in structured logs
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// JSON catalog file; the built-in catalog is used when unset
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Days after which the catalog is reported as outdated
    #[serde(default = "default_catalog_max_age_days")]
    pub catalog_max_age_days: i64,

    #[serde(default)]
    pub planner: PlannerConfig,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "plan-service".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_catalog_max_age_days() -> i64 {
    DEFAULT_MAX_AGE_DAYS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            api_port: default_api_port(),
            catalog_path: None,
            catalog_max_age_days: default_catalog_max_age_days(),
            planner: PlannerConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from an optional file and `PLANNER_` environment variables
    ///
    /// Nested planner settings use a double underscore, e.g.
    /// `PLANNER_PLANNER__MIN_WORKER_NODES=5`.
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);
        Self::load_from(file.as_deref())
    }

    pub fn load_from(file: Option<&std::path::Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config = builder
            .add_source(
                config::Environment::with_prefix("PLANNER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to load service configuration")?;

        config
            .try_deserialize()
            .context("invalid service configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.catalog_max_age_days, 30);
        assert!(config.catalog_path.is_none());
        assert_eq!(config.planner.min_worker_nodes, 3);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "api_port": 9191, "catalog_path": "/etc/planner/catalog.json",
                 "planner": {{ "min_worker_nodes": 4, "gpu_pool_policy": "first-listed" }} }}"#
        )
        .unwrap();

        let config = ServiceConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.api_port, 9191);
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/etc/planner/catalog.json"))
        );
        assert_eq!(config.planner.min_worker_nodes, 4);
        assert_eq!(config.planner.ha_control_plane_cpu_threshold, 16);
    }
}
