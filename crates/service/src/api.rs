//! HTTP API for planning, template export, catalog management, health checks
//! and Prometheus metrics

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use planner_lib::{
    catalog::{CatalogInfo, CatalogSource, CatalogStore, MachineClasses, OsImages, PlatformLimits},
    generator::generator_for,
    health::{components, ComponentHealth, ComponentStatus, HealthRegistry},
    observability::{PlannerMetrics, StructuredLogger},
    ClusterIdentity, DeploymentPlan, ExportFormat, PlacementOptions, PlanError, Planner,
    PlannerConfig, WorkloadRequirement,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
pub struct AppState {
    pub planner: Planner,
    pub store: Arc<CatalogStore>,
    pub health_registry: HealthRegistry,
    pub metrics: PlannerMetrics,
    pub logger: StructuredLogger,
    pub catalog_max_age_days: i64,
}

impl AppState {
    pub fn new(
        store: Arc<CatalogStore>,
        config: PlannerConfig,
        health_registry: HealthRegistry,
        metrics: PlannerMetrics,
        logger: StructuredLogger,
        catalog_max_age_days: i64,
    ) -> Self {
        let source: Arc<dyn CatalogSource> = store.clone();
        let planner = Planner::new(source, config).with_metrics(metrics.clone());
        Self {
            planner,
            store,
            health_registry,
            metrics,
            logger,
            catalog_max_age_days,
        }
    }

    /// Re-assess catalog health and age from the current snapshot
    ///
    /// Called before health and metrics responses so a catalog that ages
    /// past the staleness window while the service runs is reported.
    pub async fn update_catalog_health(&self) {
        let snapshot = self.store.snapshot();
        let now = Utc::now();
        if let Some(age) = snapshot.age_seconds(now) {
            self.metrics.set_catalog_age(age);
        }
        self.health_registry
            .update(
                components::CATALOG,
                ComponentHealth::for_catalog(&snapshot, now, self.catalog_max_age_days),
            )
            .await;
    }
}

/// Planning request body, shared by `/api/plan` and `/api/export/:format`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub workload: WorkloadRequirement,
    pub cluster: ClusterIdentity,
    #[serde(default)]
    pub placement: PlacementOptions,
}

#[derive(Serialize)]
struct CatalogResponse<'a> {
    metadata: CatalogInfo,
    kubernetes_versions: &'a [String],
    os_images: &'a OsImages,
    vm_skus: &'a MachineClasses,
    limits: &'a PlatformLimits,
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (status, Json(json!({ "error": msg }))).into_response()
}

fn plan_error_response(err: &PlanError) -> Response {
    error_response(&err.to_string(), StatusCode::UNPROCESSABLE_ENTITY)
}

fn run_plan(state: &AppState, request: &PlanRequest) -> Result<DeploymentPlan, Response> {
    state
        .planner
        .plan(&request.workload, &request.cluster, request.placement)
        .map_err(|e| {
            state
                .logger
                .log_plan_rejected(&request.cluster.name, &e.to_string());
            plan_error_response(&e)
        })
}

/// Service index
async fn index() -> impl IntoResponse {
    Json(json!({
        "name": "Arc Deployment Planner API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "catalog": "/api/catalog",
            "catalog_refresh": "/api/catalog/refresh",
            "plan": "/api/plan",
            "export_bicep": "/api/export/bicep",
            "export_arm": "/api/export/arm",
            "export_terraform": "/api/export/terraform",
            "health": "/healthz",
            "ready": "/readyz",
            "metrics": "/metrics"
        }
    }))
}

/// Health check response - returns 200 if healthy, 503 if degraded/unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.update_catalog_health().await;
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    state.update_catalog_health().await;

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// GET /api/catalog
async fn get_catalog(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.store.snapshot();
    let body = CatalogResponse {
        metadata: snapshot.info(Utc::now(), state.catalog_max_age_days),
        kubernetes_versions: &snapshot.kubernetes_versions,
        os_images: &snapshot.os_images,
        vm_skus: &snapshot.machine_classes,
        limits: &snapshot.limits,
    };
    Json(body).into_response()
}

/// POST /api/catalog/refresh
async fn refresh_catalog(State(state): State<Arc<AppState>>) -> Response {
    let store = Arc::clone(&state.store);
    let refreshed = match tokio::task::spawn_blocking(move || store.refresh()).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Catalog refresh task failed");
            return error_response(
                &format!("catalog refresh task failed: {}", e),
                StatusCode::INTERNAL_SERVER_ERROR,
            );
        }
    };

    match refreshed {
        Ok(snapshot) => {
            state.metrics.inc_catalog_refreshes();
            state
                .logger
                .log_catalog_refresh(&snapshot.metadata.version, true);
            state.update_catalog_health().await;
            Json(json!({
                "success": true,
                "message": "Catalog refreshed successfully",
                "metadata": snapshot.info(Utc::now(), state.catalog_max_age_days),
            }))
            .into_response()
        }
        Err(e) => {
            let current = state.store.snapshot();
            state
                .logger
                .log_catalog_refresh(&current.metadata.version, false);
            error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/plan
async fn create_plan(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlanRequest>,
) -> Response {
    match run_plan(&state, &request) {
        Ok(plan) => {
            state.logger.log_plan(&plan);
            Json(plan).into_response()
        }
        Err(response) => response,
    }
}

/// POST /api/export/:format
///
/// Plans the request and returns the rendered template as text. Plans that
/// fail validation are not exported.
async fn export_template(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
    Json(request): Json<PlanRequest>,
) -> Response {
    let format: ExportFormat = match format.parse() {
        Ok(format) => format,
        Err(e) => return error_response(&e, StatusCode::BAD_REQUEST),
    };

    let plan = match run_plan(&state, &request) {
        Ok(plan) => plan,
        Err(response) => return response,
    };
    state.logger.log_plan(&plan);

    if !plan.validation.is_valid {
        return error_response(
            &format!(
                "plan failed validation: {}",
                plan.validation.errors.join("; ")
            ),
            StatusCode::UNPROCESSABLE_ENTITY,
        );
    }

    match generator_for(format).render(&plan) {
        Ok(rendered) => {
            state
                .logger
                .log_export(&request.cluster.name, format.as_str(), rendered.len());
            let content_type = match format {
                ExportFormat::Arm => "application/json",
                ExportFormat::Bicep | ExportFormat::Terraform => "text/plain; charset=utf-8",
            };
            (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], rendered).into_response()
        }
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/catalog", get(get_catalog))
        .route("/api/catalog/refresh", post(refresh_catalog))
        .route("/api/plan", post(create_plan))
        .route("/api/export/:format", post(export_template))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
