//! Plan service - HTTP API over the deployment planner
//!
//! Exposes planning, template export and catalog management next to the
//! usual health, readiness and Prometheus endpoints.

pub mod api;
pub mod config;
