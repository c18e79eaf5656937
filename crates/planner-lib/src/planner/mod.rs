//! Deployment planner
//!
//! Turns a [`WorkloadRequirement`] into a [`DeploymentPlan`]:
//! machine-class selection, node sizing, pool partitioning, optional rack
//! topology, then validation against the catalog's platform limits.
//!
//! Structural problems (empty catalog category, malformed requirement)
//! fail the call. Limit violations do not: the plan is always returned
//! with its diagnostics so callers can see what was attempted.

mod config;
mod pools;
mod racks;
mod selector;
mod sizing;
mod validator;

pub use config::{GpuPoolPolicy, NodeCountBands, PlannerConfig, ZONE_TOPOLOGY_KEY};
pub use pools::{partition_pools, GPU_POOL, PRIMARY_POOL};
pub use racks::generate_rack_topology;
pub use selector::{first_listed, select_machine_class, Selection};
pub use sizing::{control_plane_count, estimate_node_count};
pub use validator::validate_plan;

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogSnapshot, CatalogSource};
use crate::error::PlanError;
use crate::models::{
    ClusterIdentity, ClusterTopology, DeploymentPlan, PlacementOptions, WorkloadRequirement,
};
use crate::observability::PlannerMetrics;

pub struct Planner {
    source: Arc<dyn CatalogSource>,
    config: PlannerConfig,
    metrics: Option<PlannerMetrics>,
}

impl Planner {
    pub fn new(source: Arc<dyn CatalogSource>, config: PlannerConfig) -> Self {
        Self {
            source,
            config,
            metrics: None,
        }
    }

    /// Record planning outcomes in the global Prometheus registry
    pub fn with_metrics(mut self, metrics: PlannerMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan against the catalog snapshot current at call time
    pub fn plan(
        &self,
        workload: &WorkloadRequirement,
        identity: &ClusterIdentity,
        placement: PlacementOptions,
    ) -> Result<DeploymentPlan, PlanError> {
        let snapshot = self.source.snapshot();
        self.plan_with_snapshot(&snapshot, workload, identity, placement)
    }

    /// Plan against an explicit snapshot
    pub fn plan_with_snapshot(
        &self,
        catalog: &CatalogSnapshot,
        workload: &WorkloadRequirement,
        identity: &ClusterIdentity,
        placement: PlacementOptions,
    ) -> Result<DeploymentPlan, PlanError> {
        let started = Instant::now();
        let result = build_plan(&self.config, catalog, workload, identity, placement);

        if let Some(metrics) = &self.metrics {
            metrics.observe_planning_latency(started.elapsed().as_secs_f64());
            match &result {
                Ok(plan) => metrics.record_plan(&plan.validation),
                Err(_) => metrics.inc_plan_failures(),
            }
        }
        result
    }
}

fn build_plan(
    config: &PlannerConfig,
    catalog: &CatalogSnapshot,
    workload: &WorkloadRequirement,
    identity: &ClusterIdentity,
    placement: PlacementOptions,
) -> Result<DeploymentPlan, PlanError> {
    workload.validate()?;
    let mut rationale = Vec::new();

    let kubernetes_version = match catalog.list_platform_versions().first() {
        Some(version) => version.clone(),
        None => {
            let fallback = config
                .fallback_kubernetes_version
                .clone()
                .ok_or(PlanError::NoPlatformVersions)?;
            rationale.push(format!(
                "kubernetes {}: catalog lists no versions, using configured fallback",
                fallback
            ));
            fallback
        }
    };

    let control_plane = control_plane_count(workload.cpu_cores, config);
    rationale.push(format!(
        "control plane: {} replica(s) ({} vCPU is {} the HA threshold of {})",
        control_plane,
        workload.cpu_cores,
        if workload.cpu_cores >= config.ha_control_plane_cpu_threshold {
            "at or above"
        } else {
            "below"
        },
        config.ha_control_plane_cpu_threshold,
    ));

    let node_pools = partition_pools(workload, catalog, config, &mut rationale)?;

    let topology = ClusterTopology {
        identity: identity.clone(),
        kubernetes_version,
        control_plane_count: control_plane,
        node_pools,
        rack_awareness: placement.rack_awareness,
        rack_count: placement.rack_count,
        tags: config.tags.clone(),
        network_plugin: config.network_plugin.clone(),
        load_balancer_sku: config.load_balancer_sku.clone(),
    };

    let rack_topology = placement.requested_racks().map(|racks| {
        debug!(racks, "Generating rack topology");
        generate_rack_topology(racks, &config.zone_topology_key)
    });

    let validation = validate_plan(&topology, workload, catalog.limits());

    info!(
        cluster = %topology.identity.name,
        workload = %workload.kind,
        pools = topology.node_pools.len(),
        total_nodes = topology.total_nodes(),
        control_plane = topology.control_plane_count,
        valid = validation.is_valid,
        "Created deployment plan"
    );

    Ok(DeploymentPlan {
        topology,
        workload: workload.clone(),
        rack_topology,
        validation,
        rationale,
    })
}
