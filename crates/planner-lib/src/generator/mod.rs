//! Infrastructure-as-code template generators
//!
//! Generators are pure serializers over a finished [`DeploymentPlan`]; they
//! never make sizing decisions. Resource bodies are built once as JSON
//! values and rendered into each target syntax.

mod arm;
mod bicep;
mod terraform;

pub use arm::ArmGenerator;
pub use bicep::BicepGenerator;
pub use terraform::TerraformGenerator;

use serde_json::{json, Map, Value};

use crate::error::GeneratorError;
use crate::models::{ClusterTopology, DeploymentPlan, ExportFormat, NodePool};

/// Resource API version used for every emitted resource
pub const API_VERSION: &str = "2024-01-01";
pub const CONNECTED_CLUSTER_TYPE: &str = "Microsoft.Kubernetes/connectedClusters";
pub const AGENT_POOL_TYPE: &str = "Microsoft.ContainerService/managedClusters/agentPools";

const GENERATOR_NAME: &str = "AKS Arc Deployment Planner";

/// Renders a deployment plan into one template syntax
pub trait TemplateGenerator: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn render(&self, plan: &DeploymentPlan) -> Result<String, GeneratorError>;
}

/// Generator for an export format
pub fn generator_for(format: ExportFormat) -> Box<dyn TemplateGenerator> {
    match format {
        ExportFormat::Arm => Box::new(ArmGenerator),
        ExportFormat::Bicep => Box::new(BicepGenerator),
        ExportFormat::Terraform => Box::new(TerraformGenerator),
    }
}

/// Render a plan in the given format
pub fn render(plan: &DeploymentPlan, format: ExportFormat) -> Result<String, GeneratorError> {
    generator_for(format).render(plan)
}

/// Agent pool properties shared by all formats; the first pool is the system pool
pub(crate) fn agent_pool_properties(pool: &NodePool, index: usize) -> Value {
    let mut props = json!({
        "count": pool.node_count,
        "vmSize": pool.machine_class,
        "osType": pool.os.display_name(),
        "mode": if index == 0 { "System" } else { "User" },
        "enableAutoScaling": pool.autoscaling_enabled(),
        "minCount": pool.effective_min(),
        "maxCount": pool.effective_max(),
        "maxPods": pool.max_pods,
        "nodeLabels": pool.labels,
    });
    if !pool.taints.is_empty() {
        let taints: Vec<String> = pool.taints.iter().map(ToString::to_string).collect();
        props["nodeTaints"] = json!(taints);
    }
    props
}

/// Connected-cluster properties shared by all formats
pub(crate) fn cluster_properties(topology: &ClusterTopology) -> Value {
    json!({
        "agentPublicKeyCertificate": "",
        "kubernetesVersion": topology.kubernetes_version,
        "controlPlane": { "count": topology.control_plane_count },
        "networkProfile": {
            "networkPlugin": topology.network_plugin,
            "loadBalancerSku": topology.load_balancer_sku,
        },
    })
}

pub(crate) fn tags(topology: &ClusterTopology) -> Value {
    Value::Object(
        topology
            .tags
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<Map<String, Value>>(),
    )
}

/// Identifier-safe form of a pool name
pub(crate) fn identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_for_each_format() {
        for format in ExportFormat::ALL {
            assert_eq!(generator_for(format).format(), format);
        }
    }

    #[test]
    fn test_pool_properties_for_fixed_pool() {
        let plan = fixtures::gpu_plan();
        let gpu = &plan.topology.node_pools[1];
        let props = agent_pool_properties(gpu, 1);
        assert_eq!(props["mode"], "User");
        assert_eq!(props["enableAutoScaling"], false);
        assert_eq!(props["minCount"], 2);
        assert_eq!(props["maxCount"], 2);
        assert_eq!(props["nodeTaints"][0], "nvidia.com/gpu=present:NoSchedule");
    }

    #[test]
    fn test_pool_properties_omit_empty_taints() {
        let plan = fixtures::general_plan();
        let props = agent_pool_properties(&plan.topology.node_pools[0], 0);
        assert_eq!(props["mode"], "System");
        assert!(props.get("nodeTaints").is_none());
        assert_eq!(props["maxCount"], 6);
    }

    #[test]
    fn test_identifier_sanitizes() {
        assert_eq!(identifier("gpu-pool.1"), "gpu_pool_1");
    }
}
