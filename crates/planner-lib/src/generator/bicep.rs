//! Bicep templates

use serde_json::{Map, Value};
use std::fmt::Write;

use super::{
    agent_pool_properties, cluster_properties, identifier, tags, TemplateGenerator,
    AGENT_POOL_TYPE, API_VERSION, CONNECTED_CLUSTER_TYPE, GENERATOR_NAME,
};
use crate::error::GeneratorError;
use crate::models::{DeploymentPlan, ExportFormat};

const INDENT: &str = "  ";

pub struct BicepGenerator;

impl TemplateGenerator for BicepGenerator {
    fn format(&self) -> ExportFormat {
        ExportFormat::Bicep
    }

    fn render(&self, plan: &DeploymentPlan) -> Result<String, GeneratorError> {
        write_template(plan).map_err(|source| GeneratorError::Write {
            format: "bicep",
            source,
        })
    }
}

fn write_template(plan: &DeploymentPlan) -> Result<String, std::fmt::Error> {
    let topology = &plan.topology;
    let identity = &topology.identity;
    let mut out = String::new();

    writeln!(out, "// Generated by {}", GENERATOR_NAME)?;
    writeln!(out, "// Workload: {}", plan.workload.kind)?;
    writeln!(out)?;
    writeln!(out, "@description('Name of the AKS Arc cluster')")?;
    writeln!(out, "param clusterName string = {}", quote(&identity.name))?;
    writeln!(out)?;
    writeln!(out, "@description('Azure region')")?;
    writeln!(out, "param location string = {}", quote(&identity.region))?;
    writeln!(out)?;
    writeln!(out, "@description('Azure Arc custom location')")?;
    writeln!(
        out,
        "param customLocation string = {}",
        quote(&identity.custom_location)
    )?;
    writeln!(out)?;
    writeln!(out, "@description('Kubernetes version')")?;
    writeln!(
        out,
        "param kubernetesVersion string = {}",
        quote(&topology.kubernetes_version)
    )?;
    writeln!(out)?;

    // The version is bound to its parameter, not written as a literal
    let mut properties = cluster_properties(topology);
    if let Value::Object(map) = &mut properties {
        map.remove("kubernetesVersion");
    }

    writeln!(
        out,
        "resource cluster '{}@{}' = {{",
        CONNECTED_CLUSTER_TYPE, API_VERSION
    )?;
    writeln!(out, "{}name: clusterName", INDENT)?;
    writeln!(out, "{}location: location", INDENT)?;
    writeln!(out, "{}extendedLocation: {{", INDENT)?;
    writeln!(out, "{}{}type: 'CustomLocation'", INDENT, INDENT)?;
    writeln!(out, "{}{}name: customLocation", INDENT, INDENT)?;
    writeln!(out, "{}}}", INDENT)?;
    write!(out, "{}tags: ", INDENT)?;
    write_value(&mut out, &tags(topology), 1)?;
    writeln!(out)?;
    writeln!(out, "{}properties: {{", INDENT)?;
    writeln!(out, "{}kubernetesVersion: kubernetesVersion", INDENT.repeat(2))?;
    if let Value::Object(map) = &properties {
        write_entries(&mut out, map, 1)?;
    }
    writeln!(out, "{}}}", INDENT)?;
    writeln!(out, "}}")?;

    for (index, pool) in topology.node_pools.iter().enumerate() {
        writeln!(out)?;
        writeln!(
            out,
            "resource nodePool_{} '{}@{}' = {{",
            identifier(&pool.name),
            AGENT_POOL_TYPE,
            API_VERSION
        )?;
        writeln!(out, "{}parent: cluster", INDENT)?;
        writeln!(out, "{}name: {}", INDENT, quote(&pool.name))?;
        write!(out, "{}properties: ", INDENT)?;
        write_value(&mut out, &agent_pool_properties(pool, index), 1)?;
        writeln!(out)?;
        writeln!(out, "}}")?;
    }

    writeln!(out)?;
    writeln!(out, "output clusterName string = cluster.name")?;
    writeln!(out, "output clusterId string = cluster.id")?;
    Ok(out)
}

/// Single-quoted Bicep string literal; `$` is escaped so nothing interpolates
fn quote(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() + 2);
    escaped.push('\'');
    for c in raw.chars() {
        match c {
            '\'' => escaped.push_str("\\'"),
            '\\' => escaped.push_str("\\\\"),
            '$' => escaped.push_str("\\$"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped.push('\'');
    escaped
}

fn object_key(key: &str) -> String {
    let plain = key
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_alphabetic() || c == '_' || (i > 0 && c.is_ascii_digit()));
    if plain && !key.is_empty() {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Bicep literal for a JSON value; multi-line objects and arrays, no commas
fn write_value(out: &mut String, value: &Value, depth: usize) -> std::fmt::Result {
    match value {
        Value::Null => write!(out, "null"),
        Value::Bool(b) => write!(out, "{}", b),
        Value::Number(n) => write!(out, "{}", n),
        Value::String(s) => write!(out, "{}", quote(s)),
        Value::Array(items) if items.is_empty() => write!(out, "[]"),
        Value::Object(map) if map.is_empty() => write!(out, "{{}}"),
        Value::Array(items) => {
            writeln!(out, "[")?;
            for item in items {
                write!(out, "{}", INDENT.repeat(depth + 1))?;
                write_value(out, item, depth + 1)?;
                writeln!(out)?;
            }
            write!(out, "{}]", INDENT.repeat(depth))
        }
        Value::Object(map) => {
            writeln!(out, "{{")?;
            write_entries(out, map, depth)?;
            write!(out, "{}}}", INDENT.repeat(depth))
        }
    }
}

/// Object entries, one per line, one level deeper than `depth`
fn write_entries(out: &mut String, map: &Map<String, Value>, depth: usize) -> std::fmt::Result {
    for (key, item) in map {
        write!(out, "{}{}: ", INDENT.repeat(depth + 1), object_key(key))?;
        write_value(out, item, depth + 1)?;
        writeln!(out)?;
    }
    Ok(())
}
