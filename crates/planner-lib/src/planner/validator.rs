//! Rule-based plan validation
//!
//! Each rule is evaluated independently against the limits, in a fixed
//! order, so identical inputs always yield identical diagnostics. Limit
//! violations are collected as errors; they never abort planning.

use crate::catalog::PlatformLimits;
use crate::models::{ClusterTopology, ValidationResult, WorkloadRequirement};

#[derive(Default)]
struct Diagnostics {
    errors: Vec<String>,
    warnings: Vec<String>,
    recommendations: Vec<String>,
}

/// Validate a candidate topology against platform limits
pub fn validate_plan(
    topology: &ClusterTopology,
    workload: &WorkloadRequirement,
    limits: &PlatformLimits,
) -> ValidationResult {
    let mut d = Diagnostics::default();

    check_control_plane(topology, limits, &mut d);
    check_total_nodes(topology, limits, &mut d);
    check_pool_count(topology, limits, &mut d);
    check_rack_awareness(topology, &mut d);
    check_single_control_plane(topology, &mut d);
    check_pool_sizes(topology, limits, &mut d);
    check_rack_limit(topology, limits, &mut d);
    check_rack_density(topology, limits, &mut d);
    check_gpu_count(workload, &mut d);

    ValidationResult::from_parts(d.errors, d.warnings, d.recommendations)
}

fn check_control_plane(topology: &ClusterTopology, limits: &PlatformLimits, d: &mut Diagnostics) {
    if !limits
        .control_plane_options
        .contains(&topology.control_plane_count)
    {
        d.errors.push(format!(
            "Control plane count must be one of {:?}",
            limits.control_plane_options
        ));
    }
}

fn check_total_nodes(topology: &ClusterTopology, limits: &PlatformLimits, d: &mut Diagnostics) {
    let total = topology.total_nodes();
    if total > u64::from(limits.max_nodes_per_cluster) {
        d.errors.push(format!(
            "Total nodes ({}) exceeds maximum ({})",
            total, limits.max_nodes_per_cluster
        ));
    }
}

fn check_pool_count(topology: &ClusterTopology, limits: &PlatformLimits, d: &mut Diagnostics) {
    let pools = topology.node_pools.len();
    if pools > limits.max_pools_per_cluster as usize {
        d.errors.push(format!(
            "Number of pools ({}) exceeds maximum ({})",
            pools, limits.max_pools_per_cluster
        ));
    }
}

fn check_rack_awareness(topology: &ClusterTopology, d: &mut Diagnostics) {
    if !topology.rack_awareness {
        d.recommendations
            .push("Consider enabling rack awareness for better fault tolerance".to_string());
    }
}

fn check_single_control_plane(topology: &ClusterTopology, d: &mut Diagnostics) {
    if topology.control_plane_count == 1 {
        d.warnings
            .push("Single control plane node is not recommended for production".to_string());
    }
}

fn check_pool_sizes(topology: &ClusterTopology, limits: &PlatformLimits, d: &mut Diagnostics) {
    for pool in &topology.node_pools {
        if pool.node_count > limits.max_nodes_per_pool {
            d.errors.push(format!(
                "Node pool '{}' has {} nodes, exceeding the per-pool maximum ({})",
                pool.name, pool.node_count, limits.max_nodes_per_pool
            ));
        }
    }
}

fn check_rack_limit(topology: &ClusterTopology, limits: &PlatformLimits, d: &mut Diagnostics) {
    if let (true, Some(racks)) = (topology.rack_awareness, topology.rack_count) {
        if racks > limits.max_racks {
            d.errors.push(format!(
                "Rack count ({}) exceeds maximum ({})",
                racks, limits.max_racks
            ));
        }
    }
}

fn check_rack_density(topology: &ClusterTopology, limits: &PlatformLimits, d: &mut Diagnostics) {
    if let (true, Some(racks)) = (topology.rack_awareness, topology.rack_count) {
        let needed = u64::from(racks) * u64::from(limits.min_nodes_per_rack);
        let total = topology.total_nodes();
        if racks > 0 && total < needed {
            d.warnings.push(format!(
                "Spreading across {} racks needs at least {} nodes ({} per rack), plan has {}",
                racks, needed, limits.min_nodes_per_rack, total
            ));
        }
    }
}

fn check_gpu_count(workload: &WorkloadRequirement, d: &mut Diagnostics) {
    if workload.gpu_required && workload.gpu_count == 0 {
        d.warnings.push(
            "GPU required but no GPU count given, provisioning a single GPU node".to_string(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClusterIdentity, NodePool, WorkloadKind};
    use std::collections::BTreeMap;

    fn topology(control_plane_count: u32, pools: Vec<NodePool>) -> ClusterTopology {
        ClusterTopology {
            identity: ClusterIdentity::new("c", "rg", "eastus", "cl"),
            kubernetes_version: "1.29.2".to_string(),
            control_plane_count,
            node_pools: pools,
            rack_awareness: true,
            rack_count: None,
            tags: BTreeMap::new(),
            network_plugin: "azure".to_string(),
            load_balancer_sku: "Standard".to_string(),
        }
    }

    fn workload() -> WorkloadRequirement {
        WorkloadRequirement::new(WorkloadKind::GeneralPurpose, 16, 64)
    }

    #[test]
    fn test_clean_plan_has_no_diagnostics() {
        let t = topology(3, vec![NodePool::new("p", "m", 5)]);
        let result = validate_plan(&t, &workload(), &PlatformLimits::default());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_invalid_control_plane_count() {
        let t = topology(2, vec![NodePool::new("p", "m", 5)]);
        let result = validate_plan(&t, &workload(), &PlatformLimits::default());
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("[1, 3, 5]"));
    }

    #[test]
    fn test_total_node_limit() {
        let limits = PlatformLimits {
            max_nodes_per_cluster: 6,
            ..PlatformLimits::default()
        };
        let t = topology(3, vec![NodePool::new("a", "m", 5), NodePool::new("b", "m", 2)]);
        let result = validate_plan(&t, &workload(), &limits);
        assert_eq!(result.errors, vec!["Total nodes (7) exceeds maximum (6)".to_string()]);
    }

    #[test]
    fn test_total_node_limit_does_not_wrap() {
        let t = topology(
            3,
            vec![NodePool::new("a", "m", u32::MAX), NodePool::new("b", "m", 2)],
        );
        let result = validate_plan(&t, &workload(), &PlatformLimits::default());
        assert!(result
            .errors
            .contains(&"Total nodes (4294967297) exceeds maximum (1000)".to_string()));
    }

    #[test]
    fn test_pool_count_limit() {
        let limits = PlatformLimits {
            max_pools_per_cluster: 1,
            ..PlatformLimits::default()
        };
        let t = topology(3, vec![NodePool::new("a", "m", 3), NodePool::new("b", "m", 1)]);
        let result = validate_plan(&t, &workload(), &limits);
        assert_eq!(result.errors, vec!["Number of pools (2) exceeds maximum (1)".to_string()]);
    }

    #[test]
    fn test_rack_awareness_disabled_recommendation() {
        let mut t = topology(3, vec![NodePool::new("p", "m", 3)]);
        t.rack_awareness = false;
        let result = validate_plan(&t, &workload(), &PlatformLimits::default());
        assert!(result.is_valid);
        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn test_single_control_plane_warning() {
        let t = topology(1, vec![NodePool::new("p", "m", 3)]);
        let result = validate_plan(&t, &workload(), &PlatformLimits::default());
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("production"));
    }

    #[test]
    fn test_errors_follow_rule_order() {
        let limits = PlatformLimits {
            max_nodes_per_cluster: 1,
            max_pools_per_cluster: 1,
            max_nodes_per_pool: 2,
            ..PlatformLimits::default()
        };
        let t = topology(4, vec![NodePool::new("a", "m", 3), NodePool::new("b", "m", 1)]);
        let result = validate_plan(&t, &workload(), &limits);
        assert_eq!(result.errors.len(), 4);
        assert!(result.errors[0].starts_with("Control plane count"));
        assert!(result.errors[1].starts_with("Total nodes"));
        assert!(result.errors[2].starts_with("Number of pools"));
        assert!(result.errors[3].starts_with("Node pool 'a'"));

        // Same input, same output
        assert_eq!(result, validate_plan(&t, &workload(), &limits));
    }

    #[test]
    fn test_rack_limits() {
        let mut t = topology(3, vec![NodePool::new("p", "m", 3)]);
        t.rack_count = Some(20);
        let result = validate_plan(&t, &workload(), &PlatformLimits::default());
        assert_eq!(result.errors, vec!["Rack count (20) exceeds maximum (16)".to_string()]);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("20 racks"));
    }

    #[test]
    fn test_rack_checks_skipped_without_awareness() {
        let mut t = topology(3, vec![NodePool::new("p", "m", 3)]);
        t.rack_awareness = false;
        t.rack_count = Some(20);
        let result = validate_plan(&t, &workload(), &PlatformLimits::default());
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_gpu_without_count_warns() {
        let t = topology(3, vec![NodePool::new("p", "m", 3)]);
        let gpu = workload().with_gpus(0);
        let result = validate_plan(&t, &gpu, &PlatformLimits::default());
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }
}
