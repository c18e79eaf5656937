//! Node-pool partitioning
//!
//! Always emits the primary pool; GPU workloads additionally get a
//! dedicated, tainted `gpupool`. Pool order is fixed: primary first.

use crate::catalog::Catalog;
use crate::error::PlanError;
use crate::models::{MachineCategory, NodePool, WorkloadRequirement};

use super::config::{GpuPoolPolicy, PlannerConfig};
use super::selector::{first_listed, select_machine_class};
use super::sizing::estimate_node_count;

pub const PRIMARY_POOL: &str = "nodepool1";
pub const GPU_POOL: &str = "gpupool";

/// Build the ordered pool list, appending sizing decisions to `rationale`
pub fn partition_pools(
    workload: &WorkloadRequirement,
    catalog: &dyn Catalog,
    config: &PlannerConfig,
    rationale: &mut Vec<String>,
) -> Result<Vec<NodePool>, PlanError> {
    let mut pools = Vec::with_capacity(2);

    let category = if workload.gpu_required {
        MachineCategory::Gpu
    } else {
        MachineCategory::GeneralPurpose
    };
    let selection = select_machine_class(
        catalog.list_machine_classes(category),
        category,
        workload.cpu_cores,
        workload.memory_gb,
    )?;
    if selection.fits {
        rationale.push(format!(
            "{}: {} ({} vCPU, {} GB) is the smallest {} class covering {} vCPU / {} GB",
            PRIMARY_POOL,
            selection.class.name,
            selection.class.vcpus,
            selection.class.memory_gb,
            category,
            workload.cpu_cores,
            workload.memory_gb,
        ));
    } else {
        rationale.push(format!(
            "{}: no {} class covers {} vCPU / {} GB, using the largest available ({})",
            PRIMARY_POOL, category, workload.cpu_cores, workload.memory_gb, selection.class.name,
        ));
    }

    let node_count = estimate_node_count(
        workload.cpu_cores,
        &config.node_bands,
        config.min_worker_nodes,
    );
    rationale.push(format!(
        "{}: {} nodes for {} vCPU (bands <= {} / <= {} / above, minimum {})",
        PRIMARY_POOL,
        node_count,
        workload.cpu_cores,
        config.node_bands.small_cpu_max,
        config.node_bands.medium_cpu_max,
        config.min_worker_nodes,
    ));

    let primary = NodePool::new(PRIMARY_POOL, selection.class.name.clone(), node_count)
        .with_label("workload", workload.kind.as_str())
        .with_max_pods(config.default_max_pods)
        .with_autoscaling(
            config.autoscale_min_count,
            node_count.saturating_mul(config.autoscale_max_multiplier),
        );
    pools.push(primary);

    if workload.gpu_required {
        let candidates = catalog.list_machine_classes(MachineCategory::Gpu);
        let class = match config.gpu_pool_policy {
            GpuPoolPolicy::FirstListed => first_listed(candidates, MachineCategory::Gpu)?,
            GpuPoolPolicy::RequirementMatched => {
                select_machine_class(
                    candidates,
                    MachineCategory::Gpu,
                    workload.cpu_cores,
                    workload.memory_gb,
                )?
                .class
            }
        };
        let gpu_nodes = workload.gpu_count.max(1);
        rationale.push(format!(
            "{}: {} x {} ({} policy, {} GPU(s) requested)",
            GPU_POOL,
            gpu_nodes,
            class.name,
            match config.gpu_pool_policy {
                GpuPoolPolicy::FirstListed => "first-listed",
                GpuPoolPolicy::RequirementMatched => "requirement-matched",
            },
            workload.gpu_count,
        ));

        let gpu_pool = NodePool::new(GPU_POOL, class.name.clone(), gpu_nodes)
            .with_label("workload", "gpu")
            .with_label("gpu", "true")
            .with_taint(config.gpu_taint.clone())
            .with_max_pods(config.default_max_pods);
        pools.push(gpu_pool);
    }

    Ok(pools)
}
