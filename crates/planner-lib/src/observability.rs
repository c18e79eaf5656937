//! Observability infrastructure for the planner
//!
//! Provides:
//! - Prometheus metrics (planning latency, plan outcomes, diagnostics, catalog age)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::models::{DeploymentPlan, Severity, ValidationResult};

/// Histogram buckets for planning latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PlannerMetricsInner> = OnceLock::new();

struct PlannerMetricsInner {
    planning_latency_seconds: Histogram,
    plans_created: IntCounter,
    plans_invalid: IntCounter,
    plan_failures: IntCounter,
    diagnostics: IntCounterVec,
    catalog_age_seconds: IntGauge,
    catalog_refreshes: IntCounter,
}

impl PlannerMetricsInner {
    fn new() -> Self {
        Self {
            planning_latency_seconds: register_histogram!(
                "planner_planning_latency_seconds",
                "Time spent producing a deployment plan",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register planning_latency_seconds"),

            plans_created: register_int_counter!(
                "planner_plans_created_total",
                "Deployment plans produced"
            )
            .expect("Failed to register plans_created"),

            plans_invalid: register_int_counter!(
                "planner_plans_invalid_total",
                "Deployment plans produced with at least one validation error"
            )
            .expect("Failed to register plans_invalid"),

            plan_failures: register_int_counter!(
                "planner_plan_failures_total",
                "Planning calls rejected before a plan could be built"
            )
            .expect("Failed to register plan_failures"),

            diagnostics: register_int_counter_vec!(
                "planner_validation_diagnostics_total",
                "Validation diagnostics emitted, by severity",
                &["severity"]
            )
            .expect("Failed to register validation_diagnostics"),

            catalog_age_seconds: register_int_gauge!(
                "planner_catalog_age_seconds",
                "Age of the current catalog snapshot"
            )
            .expect("Failed to register catalog_age_seconds"),

            catalog_refreshes: register_int_counter!(
                "planner_catalog_refreshes_total",
                "Successful catalog refreshes"
            )
            .expect("Failed to register catalog_refreshes"),
        }
    }
}

/// Planner metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct PlannerMetrics {
    _private: (),
}

impl Default for PlannerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PlannerMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PlannerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PlannerMetricsInner {
        GLOBAL_METRICS.get_or_init(PlannerMetricsInner::new)
    }

    pub fn observe_planning_latency(&self, duration_secs: f64) {
        self.inner().planning_latency_seconds.observe(duration_secs);
    }

    /// Count a produced plan and its diagnostics
    pub fn record_plan(&self, validation: &ValidationResult) {
        let inner = self.inner();
        inner.plans_created.inc();
        if !validation.is_valid {
            inner.plans_invalid.inc();
        }
        for (severity, _) in validation.diagnostics() {
            inner
                .diagnostics
                .with_label_values(&[severity.as_str()])
                .inc();
        }
    }

    pub fn inc_plan_failures(&self) {
        self.inner().plan_failures.inc();
    }

    pub fn set_catalog_age(&self, seconds: i64) {
        self.inner().catalog_age_seconds.set(seconds);
    }

    pub fn inc_catalog_refreshes(&self) {
        self.inner().catalog_refreshes.inc();
    }

    pub fn plans_created(&self) -> u64 {
        self.inner().plans_created.get()
    }

    pub fn diagnostics_count(&self, severity: Severity) -> u64 {
        self.inner()
            .diagnostics
            .with_label_values(&[severity.as_str()])
            .get()
    }
}

/// Structured logger for planner events
///
/// Consistent JSON-formatted records for plans, catalog changes and
/// service lifecycle.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    /// Log a produced plan, at warn level when it failed validation
    pub fn log_plan(&self, plan: &DeploymentPlan) {
        let topology = &plan.topology;
        if plan.validation.is_valid {
            info!(
                event = "plan_created",
                instance = %self.instance,
                cluster = %topology.identity.name,
                workload = %plan.workload.kind,
                pools = topology.node_pools.len(),
                total_nodes = topology.total_nodes(),
                control_plane = topology.control_plane_count,
                warnings = plan.validation.warnings.len(),
                "Deployment plan created"
            );
        } else {
            warn!(
                event = "plan_invalid",
                instance = %self.instance,
                cluster = %topology.identity.name,
                workload = %plan.workload.kind,
                errors = ?plan.validation.errors,
                "Deployment plan failed validation"
            );
        }
    }

    pub fn log_plan_rejected(&self, cluster: &str, reason: &str) {
        warn!(
            event = "plan_rejected",
            instance = %self.instance,
            cluster = %cluster,
            reason = %reason,
            "Planning request rejected"
        );
    }

    pub fn log_export(&self, cluster: &str, format: &str, bytes: usize) {
        info!(
            event = "template_exported",
            instance = %self.instance,
            cluster = %cluster,
            format = %format,
            bytes = bytes,
            "Template rendered"
        );
    }

    pub fn log_catalog_refresh(&self, version: &str, success: bool) {
        if success {
            info!(
                event = "catalog_refreshed",
                instance = %self.instance,
                version = %version,
                "Catalog refreshed"
            );
        } else {
            warn!(
                event = "catalog_refresh_failed",
                instance = %self.instance,
                version = %version,
                "Catalog refresh failed, keeping previous snapshot"
            );
        }
    }

    pub fn log_startup(&self, version: &str, catalog_target: &str) {
        info!(
            event = "service_started",
            instance = %self.instance,
            service_version = %version,
            catalog_target = %catalog_target,
            "Plan service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Plan service shutting down"
        );
    }
}
