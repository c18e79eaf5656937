//! Planning commands

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use planner_lib::{
    ClusterIdentity, DeploymentPlan, DomainHints, PlacementOptions, Planner, WorkloadKind,
    WorkloadRequirement,
};
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

use crate::output::{
    format_flag, format_labels, print_diagnostics, print_heading, print_info, print_json,
    print_success, print_warning, OutputFormat,
};

/// Workload, cluster identity and placement flags shared by `plan` and `export`
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Workload type (general-purpose, ai-inference, video-analytics, custom)
    #[arg(long, default_value = "general-purpose")]
    pub workload: WorkloadKind,

    /// CPU cores required
    #[arg(long, default_value_t = 8)]
    pub cpu: u32,

    /// Memory in GB
    #[arg(long, default_value_t = 32)]
    pub memory: u32,

    /// Require GPU nodes
    #[arg(long)]
    pub gpu: bool,

    /// Number of GPU nodes (implies --gpu)
    #[arg(long)]
    pub gpu_count: Option<u32>,

    /// Camera count (video analytics hint)
    #[arg(long)]
    pub cameras: Option<u32>,

    /// Frames per second (video analytics hint)
    #[arg(long)]
    pub fps: Option<u32>,

    /// Retention in days (video analytics hint)
    #[arg(long)]
    pub retention_days: Option<u32>,

    /// Storage in GB
    #[arg(long)]
    pub storage_gb: Option<u32>,

    /// Free-text workload description
    #[arg(long)]
    pub description: Option<String>,

    /// Name of the cluster
    #[arg(long)]
    pub cluster_name: String,

    /// Azure resource group
    #[arg(long)]
    pub resource_group: String,

    /// Azure region
    #[arg(long, default_value = "eastus")]
    pub location: String,

    /// Azure Arc custom location
    #[arg(long)]
    pub custom_location: String,

    /// Spread nodes across racks
    #[arg(long)]
    pub rack_awareness: bool,

    /// Number of racks (used with --rack-awareness)
    #[arg(long)]
    pub racks: Option<u32>,
}

impl PlanArgs {
    pub fn requirement(&self) -> WorkloadRequirement {
        let mut requirement = WorkloadRequirement::new(self.workload, self.cpu, self.memory)
            .with_hints(DomainHints {
                cameras: self.cameras,
                fps: self.fps,
                retention_days: self.retention_days,
                storage_gb: self.storage_gb,
                description: self.description.clone(),
            });
        if self.gpu || self.gpu_count.is_some() {
            requirement = requirement.with_gpus(self.gpu_count.unwrap_or(0));
        }
        requirement
    }

    pub fn identity(&self) -> ClusterIdentity {
        ClusterIdentity::new(
            &self.cluster_name,
            &self.resource_group,
            &self.location,
            &self.custom_location,
        )
    }

    pub fn placement(&self) -> PlacementOptions {
        PlacementOptions {
            rack_awareness: self.rack_awareness,
            rack_count: self.racks,
        }
    }

    /// Run the planner for these flags
    pub fn build_plan(&self, planner: &Planner) -> Result<DeploymentPlan> {
        let plan = planner
            .plan(&self.requirement(), &self.identity(), self.placement())
            .context("Planning failed")?;
        tracing::debug!(
            cluster = %plan.topology.identity.name,
            pools = plan.topology.node_pools.len(),
            valid = plan.validation.is_valid,
            "Plan built"
        );
        Ok(plan)
    }
}

/// Row for the node pool table
#[derive(Tabled)]
struct PoolRow {
    #[tabled(rename = "Pool")]
    name: String,
    #[tabled(rename = "Machine Class")]
    machine_class: String,
    #[tabled(rename = "Nodes")]
    nodes: u32,
    #[tabled(rename = "Autoscale")]
    autoscale: String,
    #[tabled(rename = "OS")]
    os: String,
    #[tabled(rename = "Labels")]
    labels: String,
    #[tabled(rename = "Taints")]
    taints: String,
}

/// Row for the rack table
#[derive(Tabled)]
struct RackRow {
    #[tabled(rename = "Rack")]
    rack: String,
    #[tabled(rename = "Fault Domain")]
    fault_domain: String,
    #[tabled(rename = "Zone Label")]
    zone: String,
    #[tabled(rename = "Max Skew")]
    max_skew: String,
}

/// Create a deployment plan; returns whether it passed validation
pub fn create_plan(
    planner: &Planner,
    args: &PlanArgs,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<bool> {
    let plan = args.build_plan(planner)?;

    match format {
        OutputFormat::Json => print_json(&plan),
        OutputFormat::Table => print_plan(&plan),
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&plan)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write plan to {}", path.display()))?;
        if format == OutputFormat::Table {
            print_info(&format!("Plan saved to {}", path.display()));
        }
    }

    if format == OutputFormat::Table {
        if plan.validation.is_valid {
            print_success("Plan created successfully!");
        } else {
            print_warning("Plan failed validation");
        }
    }

    Ok(plan.validation.is_valid)
}

fn print_plan(plan: &DeploymentPlan) {
    let topology = &plan.topology;

    print_heading(&format!("Deployment Plan: {}", topology.identity.name));
    println!("Workload:               {}", plan.workload.kind.to_string().cyan());
    println!("Kubernetes version:     {}", topology.kubernetes_version);
    println!("Control plane nodes:    {}", topology.control_plane_count);
    println!("Worker nodes:           {}", topology.total_nodes());
    println!("Rack awareness:         {}", format_flag(topology.rack_awareness));
    println!();

    let rows: Vec<PoolRow> = topology
        .node_pools
        .iter()
        .map(|pool| PoolRow {
            name: pool.name.clone(),
            machine_class: pool.machine_class.clone(),
            nodes: pool.node_count,
            autoscale: match pool.autoscaling {
                Some(bounds) => format!("{}-{}", bounds.min_count, bounds.max_count),
                None => "off".to_string(),
            },
            os: pool.os.display_name().to_string(),
            labels: format_labels(&pool.labels),
            taints: if pool.taints.is_empty() {
                "-".to_string()
            } else {
                pool.taints
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            },
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));

    if let Some(racks) = &plan.rack_topology {
        println!();
        println!("{}", "Rack Topology".bold());
        let rows: Vec<RackRow> = racks
            .iter()
            .map(|rack| {
                let constraint = rack.spread_constraints.first();
                RackRow {
                    rack: rack.rack_id.clone(),
                    fault_domain: rack.fault_domain.clone(),
                    zone: constraint
                        .and_then(|c| rack.node_labels.get(&c.topology_key))
                        .cloned()
                        .unwrap_or_else(|| "-".to_string()),
                    max_skew: constraint
                        .map(|c| c.max_skew.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                }
            })
            .collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    if !plan.rationale.is_empty() {
        println!();
        println!("{}", "Rationale".bold());
        for line in &plan.rationale {
            println!("  {}", line.dimmed());
        }
    }

    println!();
    print_diagnostics(&plan.validation);
}
