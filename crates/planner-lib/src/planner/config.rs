//! Planner settings
//!
//! Every sizing constant the planner uses lives here. The struct is built
//! once (defaults, or deserialized by the service's config layer) and
//! injected into the [`crate::Planner`]; nothing is read from globals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Taint, TaintEffect, DEFAULT_MAX_PODS};

/// Default zone label used for rack spread constraints
pub const ZONE_TOPOLOGY_KEY: &str = "topology.kubernetes.io/zone";

/// Worker node-count threshold bands (upper bounds inclusive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeCountBands {
    pub small_cpu_max: u32,
    pub small_nodes: u32,
    pub medium_cpu_max: u32,
    pub medium_nodes: u32,
    pub large_nodes: u32,
}

impl Default for NodeCountBands {
    fn default() -> Self {
        Self {
            small_cpu_max: 8,
            small_nodes: 3,
            medium_cpu_max: 32,
            medium_nodes: 5,
            large_nodes: 10,
        }
    }
}

/// How the dedicated GPU pool picks its machine class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GpuPoolPolicy {
    /// Smallest GPU class covering the workload's CPU and memory
    #[default]
    RequirementMatched,
    /// First GPU class in catalog order
    FirstListed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub node_bands: NodeCountBands,
    /// Floor applied after banding
    pub min_worker_nodes: u32,
    /// Workloads at or above this many cores get an HA control plane
    pub ha_control_plane_cpu_threshold: u32,
    pub ha_control_plane_count: u32,
    pub dev_control_plane_count: u32,
    pub default_max_pods: u32,
    /// Autoscaling max = node count x multiplier
    pub autoscale_max_multiplier: u32,
    pub autoscale_min_count: u32,
    pub gpu_taint: Taint,
    pub gpu_pool_policy: GpuPoolPolicy,
    pub zone_topology_key: String,
    /// Used only when the catalog lists no kubernetes versions
    pub fallback_kubernetes_version: Option<String>,
    pub network_plugin: String,
    pub load_balancer_sku: String,
    pub tags: BTreeMap<String, String>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            node_bands: NodeCountBands::default(),
            min_worker_nodes: 3,
            ha_control_plane_cpu_threshold: 16,
            ha_control_plane_count: 3,
            dev_control_plane_count: 1,
            default_max_pods: DEFAULT_MAX_PODS,
            autoscale_max_multiplier: 2,
            autoscale_min_count: 1,
            gpu_taint: Taint::new("nvidia.com/gpu", "present", TaintEffect::NoSchedule),
            gpu_pool_policy: GpuPoolPolicy::default(),
            zone_topology_key: ZONE_TOPOLOGY_KEY.to_string(),
            fallback_kubernetes_version: None,
            network_plugin: "azure".to_string(),
            load_balancer_sku: "Standard".to_string(),
            tags: BTreeMap::new(),
        }
    }
}
