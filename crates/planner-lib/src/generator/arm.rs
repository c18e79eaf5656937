//! ARM (Azure Resource Manager) JSON templates

use serde_json::json;

use super::{
    agent_pool_properties, cluster_properties, tags, TemplateGenerator, AGENT_POOL_TYPE,
    API_VERSION, CONNECTED_CLUSTER_TYPE, GENERATOR_NAME,
};
use crate::error::GeneratorError;
use crate::models::{DeploymentPlan, ExportFormat};

const SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#";

pub struct ArmGenerator;

impl TemplateGenerator for ArmGenerator {
    fn format(&self) -> ExportFormat {
        ExportFormat::Arm
    }

    fn render(&self, plan: &DeploymentPlan) -> Result<String, GeneratorError> {
        let topology = &plan.topology;
        let cluster_id = format!(
            "[resourceId('{}', parameters('clusterName'))]",
            CONNECTED_CLUSTER_TYPE
        );

        let mut resources = vec![json!({
            "type": CONNECTED_CLUSTER_TYPE,
            "apiVersion": API_VERSION,
            "name": "[parameters('clusterName')]",
            "location": "[parameters('location')]",
            "extendedLocation": {
                "type": "CustomLocation",
                "name": "[parameters('customLocation')]",
            },
            "tags": tags(topology),
            "properties": cluster_properties(topology),
        })];

        for (index, pool) in topology.node_pools.iter().enumerate() {
            resources.push(json!({
                "type": AGENT_POOL_TYPE,
                "apiVersion": API_VERSION,
                "name": format!("[concat(parameters('clusterName'), '/{}')]", pool.name),
                "properties": agent_pool_properties(pool, index),
                "dependsOn": [cluster_id],
            }));
        }

        let template = json!({
            "$schema": SCHEMA,
            "contentVersion": "1.0.0.0",
            "metadata": {
                "_generator": {
                    "name": GENERATOR_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                }
            },
            "parameters": {
                "clusterName": {
                    "type": "string",
                    "defaultValue": topology.identity.name,
                    "metadata": { "description": "Name of the AKS Arc cluster" }
                },
                "location": {
                    "type": "string",
                    "defaultValue": topology.identity.region,
                    "metadata": { "description": "Azure region" }
                },
                "customLocation": {
                    "type": "string",
                    "defaultValue": topology.identity.custom_location,
                    "metadata": { "description": "Azure Arc custom location" }
                },
                "kubernetesVersion": {
                    "type": "string",
                    "defaultValue": topology.kubernetes_version,
                    "metadata": { "description": "Kubernetes version" }
                }
            },
            "variables": {},
            "resources": resources,
            "outputs": {
                "clusterName": {
                    "type": "string",
                    "value": "[parameters('clusterName')]"
                },
                "clusterId": {
                    "type": "string",
                    "value": cluster_id,
                }
            }
        });

        serde_json::to_string_pretty(&template).map_err(|source| GeneratorError::Serialize {
            format: "arm",
            source,
        })
    }
}
