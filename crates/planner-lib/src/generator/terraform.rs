//! Terraform configurations using the `azapi` provider

use serde_json::{json, Value};
use std::fmt::Write;

use super::{
    agent_pool_properties, cluster_properties, identifier, tags, TemplateGenerator,
    AGENT_POOL_TYPE, API_VERSION, CONNECTED_CLUSTER_TYPE, GENERATOR_NAME,
};
use crate::error::GeneratorError;
use crate::models::{DeploymentPlan, ExportFormat};

const AZAPI_VERSION: &str = "~> 1.12";

pub struct TerraformGenerator;

impl TemplateGenerator for TerraformGenerator {
    fn format(&self) -> ExportFormat {
        ExportFormat::Terraform
    }

    fn render(&self, plan: &DeploymentPlan) -> Result<String, GeneratorError> {
        let topology = &plan.topology;
        let cluster_body = json_body(&json!({
            "kind": "ProvisionedCluster",
            "extendedLocation": {
                "type": "CustomLocation",
                "name": topology.identity.custom_location,
            },
            "properties": cluster_properties(topology),
        }))?;
        let cluster_tags = json_body(&tags(topology))?;
        let pool_bodies = topology
            .node_pools
            .iter()
            .enumerate()
            .map(|(index, pool)| {
                json_body(&json!({ "properties": agent_pool_properties(pool, index) }))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = String::new();
        write_configuration(&mut out, plan, &cluster_tags, &cluster_body, &pool_bodies)
            .map_err(|source| GeneratorError::Write {
                format: "terraform",
                source,
            })?;
        Ok(out)
    }
}

fn write_configuration(
    out: &mut String,
    plan: &DeploymentPlan,
    cluster_tags: &str,
    cluster_body: &str,
    pool_bodies: &[String],
) -> std::fmt::Result {
    let topology = &plan.topology;
    let identity = &topology.identity;

    writeln!(out, "# Generated by {}", GENERATOR_NAME)?;
    writeln!(out, "# Workload: {}", plan.workload.kind)?;
    writeln!(out)?;
    writeln!(out, "terraform {{")?;
    writeln!(out, "  required_providers {{")?;
    writeln!(out, "    azapi = {{")?;
    writeln!(out, "      source  = \"Azure/azapi\"")?;
    writeln!(out, "      version = {}", hcl_string(AZAPI_VERSION))?;
    writeln!(out, "    }}")?;
    writeln!(out, "  }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "provider \"azapi\" {{}}")?;
    writeln!(out)?;
    writeln!(out, "variable \"subscription_id\" {{")?;
    writeln!(out, "  type        = string")?;
    writeln!(out, "  description = \"Subscription that owns the resource group\"")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "locals {{")?;
    writeln!(out, "  cluster_name   = {}", hcl_string(&identity.name))?;
    writeln!(out, "  resource_group = {}", hcl_string(&identity.resource_group))?;
    writeln!(out, "  location       = {}", hcl_string(&identity.region))?;
    writeln!(out, "}}")?;

    writeln!(out)?;
    writeln!(out, "resource \"azapi_resource\" \"cluster\" {{")?;
    writeln!(
        out,
        "  type      = \"{}@{}\"",
        CONNECTED_CLUSTER_TYPE, API_VERSION
    )?;
    writeln!(out, "  name      = local.cluster_name")?;
    writeln!(out, "  location  = local.location")?;
    writeln!(
        out,
        "  parent_id = \"/subscriptions/${{var.subscription_id}}/resourceGroups/${{local.resource_group}}\""
    )?;
    writeln!(out, "  tags      = {}", cluster_tags)?;
    writeln!(out, "  body      = jsonencode({})", cluster_body)?;
    writeln!(out, "}}")?;

    for (pool, body) in topology.node_pools.iter().zip(pool_bodies) {
        writeln!(out)?;
        writeln!(
            out,
            "resource \"azapi_resource\" \"node_pool_{}\" {{",
            identifier(&pool.name)
        )?;
        writeln!(out, "  type      = \"{}@{}\"", AGENT_POOL_TYPE, API_VERSION)?;
        writeln!(out, "  name      = {}", hcl_string(&pool.name))?;
        writeln!(out, "  parent_id = azapi_resource.cluster.id")?;
        writeln!(out, "  body      = jsonencode({})", body)?;
        writeln!(out, "}}")?;
    }

    writeln!(out)?;
    writeln!(out, "output \"cluster_id\" {{")?;
    writeln!(out, "  value = azapi_resource.cluster.id")?;
    writeln!(out, "}}")
}

/// Pretty JSON is valid HCL object syntax once template sequences are escaped
fn json_body(value: &Value) -> Result<String, GeneratorError> {
    let raw = serde_json::to_string_pretty(value).map_err(|source| GeneratorError::Serialize {
        format: "terraform",
        source,
    })?;
    Ok(escape_templates(&raw).replace('\n', "\n  "))
}

fn hcl_string(raw: &str) -> String {
    // serde_json string escaping is a subset of HCL's
    let quoted = Value::String(raw.to_string()).to_string();
    escape_templates(&quoted)
}

fn escape_templates(raw: &str) -> String {
    raw.replace("${", "$${").replace("%{", "%%{")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::fixtures;

    #[test]
    fn test_terraform_uses_azapi_resources() {
        let rendered = TerraformGenerator.render(&fixtures::gpu_plan()).unwrap();
        assert!(rendered.contains("terraform {"));
        assert!(rendered.contains("source  = \"Azure/azapi\""));
        assert!(rendered.contains("resource \"azapi_resource\" \"cluster\""));
        assert!(rendered.contains("resource \"azapi_resource\" \"node_pool_nodepool1\""));
        assert!(rendered.contains("resource \"azapi_resource\" \"node_pool_gpupool\""));
        assert!(rendered.contains("cluster_name   = \"test-cluster\""));
        assert!(rendered.contains("\"vmSize\": \"Standard_NC8as_T4_v3\""));
    }

    #[test]
    fn test_template_sequences_are_escaped() {
        assert_eq!(hcl_string("a${b}"), "\"a$${b}\"");
        assert_eq!(escape_templates("%{ if }"), "%%{ if }");
    }
}
