//! Arc Deployment Planner CLI
//!
//! A command-line tool for planning Arc-enabled Kubernetes clusters,
//! exporting infrastructure templates and inspecting the machine catalog.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{catalog, export, plan};
use planner_lib::{CatalogSource, CatalogStore, ExportFormat, MachineCategory, Planner};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Arc Deployment Planner CLI
#[derive(Parser)]
#[command(name = "arcplan")]
#[command(author, version, about = "CLI for the Arc Deployment Planner", long_about = None)]
pub struct Cli {
    /// Catalog JSON file (can also be set via ARCPLAN_CATALOG env var)
    #[arg(long, env = "ARCPLAN_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a deployment plan
    Plan {
        #[command(flatten)]
        args: plan::PlanArgs,

        /// Write the plan as JSON to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Export a deployment plan as an infrastructure template
    Export {
        #[command(flatten)]
        args: plan::PlanArgs,

        /// Template format (bicep, arm, terraform)
        #[arg(long, short)]
        template: ExportFormat,

        /// Write the template to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Inspect the machine catalog
    #[command(subcommand)]
    Catalog(CatalogCommands),
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Show catalog metadata and platform limits
    Info,

    /// List machine classes
    Classes {
        /// Filter by category (general_purpose, gpu)
        #[arg(long, short)]
        category: Option<MachineCategory>,
    },

    /// List supported kubernetes versions
    Versions,

    /// Reload the catalog and stamp it as current
    Refresh,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Execute the command; `Ok(false)` means the plan failed validation
fn run(cli: Cli) -> Result<bool> {
    let settings = config::Config::load()?;

    let format = cli
        .format
        .or_else(|| {
            settings
                .default_format
                .as_deref()
                .and_then(output::OutputFormat::from_name)
        })
        .unwrap_or_default();

    let catalog_path = cli.catalog.or(settings.catalog_path);
    let store = CatalogStore::open_or_builtin(catalog_path.as_deref())
        .context("Failed to load catalog")?;

    match cli.command {
        Commands::Plan { args, output } => {
            let planner = Planner::new(Arc::new(store), settings.planner);
            plan::create_plan(&planner, &args, output.as_deref(), format)
        }
        Commands::Export {
            args,
            template,
            output,
        } => {
            let planner = Planner::new(Arc::new(store), settings.planner);
            export::export_template(&planner, &args, template, output.as_deref())
        }
        Commands::Catalog(catalog_cmd) => {
            let snapshot = store.snapshot();
            match catalog_cmd {
                CatalogCommands::Info => catalog::show_info(&snapshot, format)?,
                CatalogCommands::Classes { category } => {
                    catalog::list_classes(&snapshot, category, format)?
                }
                CatalogCommands::Versions => catalog::list_versions(&snapshot, format)?,
                CatalogCommands::Refresh => catalog::refresh(&store, format)?,
            }
            Ok(true)
        }
    }
}
