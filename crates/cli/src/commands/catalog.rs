//! Catalog inspection commands

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use planner_lib::catalog::{
    Catalog, CatalogOrigin, CatalogSnapshot, CatalogStore, DEFAULT_MAX_AGE_DAYS,
};
use planner_lib::{MachineCategory, MachineClass, OsFamily};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{
    print_heading, print_info, print_json, print_success, print_table, print_warning,
    OutputFormat,
};

/// Row for the machine class table
#[derive(Tabled)]
struct ClassRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "vCPU")]
    vcpus: u32,
    #[tabled(rename = "Memory (GB)")]
    memory_gb: u32,
    #[tabled(rename = "GPU")]
    gpu: String,
}

#[derive(Serialize)]
struct ClassEntry<'a> {
    category: MachineCategory,
    #[serde(flatten)]
    class: &'a MachineClass,
}

/// Row for the version table
#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Default")]
    default: String,
}

/// Show catalog metadata and freshness
pub fn show_info(catalog: &CatalogSnapshot, format: OutputFormat) -> Result<()> {
    let info = catalog.info(Utc::now(), DEFAULT_MAX_AGE_DAYS);

    match format {
        OutputFormat::Json => print_json(&info),
        OutputFormat::Table => {
            print_heading("Catalog Information");
            println!("Target:                 {}", info.target.cyan());
            println!("Version:                {}", info.version);
            println!(
                "Last updated:           {}",
                info.last_updated
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            );
            println!("Kubernetes versions:    {}", info.kubernetes_versions);
            println!("General-purpose classes: {}", info.general_purpose_classes);
            println!("GPU classes:            {}", info.gpu_classes);
            println!();

            let limits = catalog.limits();
            println!("{}", "Platform Limits".bold());
            println!("{}", "-".repeat(50));
            println!(
                "Control plane options:  {:?}",
                limits.control_plane_options
            );
            println!("Max nodes per cluster:  {}", limits.max_nodes_per_cluster);
            println!("Max nodes per pool:     {}", limits.max_nodes_per_pool);
            println!("Max pools per cluster:  {}", limits.max_pools_per_cluster);
            println!("Max racks:              {}", limits.max_racks);
            println!();

            println!("{}", "OS Images".bold());
            println!("{}", "-".repeat(50));
            for os in [OsFamily::Linux, OsFamily::Windows] {
                let images: Vec<String> = catalog
                    .list_os_images(os)
                    .iter()
                    .map(|image| format!("{} ({})", image.name, image.version))
                    .collect();
                let images = if images.is_empty() {
                    "-".to_string()
                } else {
                    images.join(", ")
                };
                println!("{:<24}{}", format!("{}:", os), images);
            }
            println!();

            if info.is_outdated {
                print_warning(&format!(
                    "Catalog is more than {} days old. Consider refreshing.",
                    DEFAULT_MAX_AGE_DAYS
                ));
            }
        }
    }

    Ok(())
}

/// Refresh the catalog from its origin and report the new metadata
pub fn refresh(store: &CatalogStore, format: OutputFormat) -> Result<()> {
    let snapshot = store.refresh().context("Failed to refresh catalog")?;
    let info = snapshot.info(Utc::now(), DEFAULT_MAX_AGE_DAYS);

    match format {
        OutputFormat::Json => print_json(&info),
        OutputFormat::Table => {
            match store.origin() {
                CatalogOrigin::File(path) => print_success(&format!(
                    "Catalog refreshed and saved to {}",
                    path.display()
                )),
                CatalogOrigin::Builtin => {
                    print_success("Catalog refreshed");
                    print_info("Using the built-in catalog, nothing was saved");
                }
            }
            println!(
                "Last updated: {}",
                info.last_updated
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            );
        }
    }

    Ok(())
}

/// List machine classes, optionally for a single category
pub fn list_classes(
    catalog: &CatalogSnapshot,
    category: Option<MachineCategory>,
    format: OutputFormat,
) -> Result<()> {
    let categories = match category {
        Some(category) => vec![category],
        None => vec![MachineCategory::GeneralPurpose, MachineCategory::Gpu],
    };

    let entries: Vec<ClassEntry> = categories
        .into_iter()
        .flat_map(|category| {
            catalog
                .list_machine_classes(category)
                .iter()
                .map(move |class| ClassEntry { category, class })
        })
        .collect();

    let rows: Vec<ClassRow> = entries
        .iter()
        .map(|entry| ClassRow {
            name: entry.class.name.clone(),
            category: entry.category.to_string(),
            vcpus: entry.class.vcpus,
            memory_gb: entry.class.memory_gb,
            gpu: match (&entry.class.gpu_model, entry.class.gpu) {
                (Some(model), true) => model.clone(),
                (None, true) => "yes".to_string(),
                (_, false) => "-".to_string(),
            },
        })
        .collect();

    print_table(&rows, &entries, format);
    Ok(())
}

/// List supported kubernetes versions, newest first
pub fn list_versions(catalog: &CatalogSnapshot, format: OutputFormat) -> Result<()> {
    let versions = catalog.list_platform_versions();
    let rows: Vec<VersionRow> = versions
        .iter()
        .enumerate()
        .map(|(i, version)| VersionRow {
            version: version.clone(),
            default: if i == 0 {
                "✓".green().to_string()
            } else {
                String::new()
            },
        })
        .collect();

    print_table(&rows, &versions, format);
    Ok(())
}
