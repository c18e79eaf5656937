//! Deployment planning library for Arc-enabled Kubernetes clusters
//!
//! This crate provides the core functionality for:
//! - Turning workload requirements into a validated cluster topology
//! - Versioned machine-class / platform catalogs with atomic refresh
//! - Rack-aware placement metadata
//! - ARM, Bicep and Terraform template generation
//! - Health checks and observability

pub mod catalog;
pub mod error;
pub mod generator;
pub mod health;
pub mod models;
pub mod observability;
pub mod planner;

pub use catalog::{
    Catalog, CatalogInfo, CatalogOrigin, CatalogSnapshot, CatalogSource, CatalogStore,
    PlatformLimits,
};
pub use error::{CatalogError, GeneratorError, PlanError};
pub use generator::{generator_for, TemplateGenerator};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{PlannerMetrics, StructuredLogger};
pub use planner::{GpuPoolPolicy, Planner, PlannerConfig};
