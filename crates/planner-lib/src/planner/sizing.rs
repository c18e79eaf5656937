//! Node-count and control-plane sizing heuristics

use super::config::{NodeCountBands, PlannerConfig};

/// Worker node count for a workload's CPU requirement
///
/// Banded: `cpu <= small_cpu_max` → small, `cpu <= medium_cpu_max` →
/// medium, otherwise large; the result is floored at `min_nodes`.
/// The chosen machine class does not influence the count.
pub fn estimate_node_count(cpu_cores: u32, bands: &NodeCountBands, min_nodes: u32) -> u32 {
    let banded = if cpu_cores <= bands.small_cpu_max {
        bands.small_nodes
    } else if cpu_cores <= bands.medium_cpu_max {
        bands.medium_nodes
    } else {
        bands.large_nodes
    };
    banded.max(min_nodes)
}

/// Control-plane replica count: HA at or above the CPU threshold
pub fn control_plane_count(cpu_cores: u32, config: &PlannerConfig) -> u32 {
    if cpu_cores >= config.ha_control_plane_cpu_threshold {
        config.ha_control_plane_count
    } else {
        config.dev_control_plane_count
    }
}
