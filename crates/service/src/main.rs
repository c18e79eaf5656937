//! Plan service - deployment planning API for Arc-enabled Kubernetes
//!
//! Serves plans, template exports and catalog data over HTTP, alongside
//! health, readiness and Prometheus metrics endpoints.

use anyhow::{Context, Result};
use plan_service::{api, config::ServiceConfig};
use planner_lib::{
    catalog::{CatalogSource, CatalogStore},
    health::{components, HealthRegistry},
    observability::{PlannerMetrics, StructuredLogger},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting plan-service");

    let config = ServiceConfig::load()?;
    info!(
        instance = %config.instance_name,
        port = config.api_port,
        catalog = ?config.catalog_path,
        "Service configured"
    );

    let store = CatalogStore::open_or_builtin(config.catalog_path.as_deref())
        .context("failed to load catalog")?;
    let store = Arc::new(store);

    let health_registry = HealthRegistry::new();
    health_registry.register(components::PLANNER).await;

    let metrics = PlannerMetrics::new();

    let logger = StructuredLogger::new(&config.instance_name);
    logger.log_startup(SERVICE_VERSION, &store.snapshot().metadata.target);

    let app_state = Arc::new(api::AppState::new(
        store,
        config.planner.clone(),
        health_registry.clone(),
        metrics,
        logger.clone(),
        config.catalog_max_age_days,
    ));
    app_state.update_catalog_health().await;

    // Mark service as ready after initialization
    health_registry.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        result = api_handle => {
            result.context("API server task panicked")??;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
