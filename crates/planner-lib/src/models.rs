//! Core data models for deployment planning
//!
//! Inputs (`WorkloadRequirement`, `ClusterIdentity`, `PlacementOptions`)
//! and outputs (`ClusterTopology`, `RackTopology`, `ValidationResult`,
//! `DeploymentPlan`). Every value here is created fresh per planning call
//! and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::PlanError;

/// Workload archetype presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadKind {
    GeneralPurpose,
    AiInference,
    VideoAnalytics,
    Custom,
}

impl WorkloadKind {
    pub const ALL: [WorkloadKind; 4] = [
        WorkloadKind::GeneralPurpose,
        WorkloadKind::AiInference,
        WorkloadKind::VideoAnalytics,
        WorkloadKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::GeneralPurpose => "general-purpose",
            WorkloadKind::AiInference => "ai-inference",
            WorkloadKind::VideoAnalytics => "video-analytics",
            WorkloadKind::Custom => "custom",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkloadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkloadKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown workload kind '{}'", s))
    }
}

/// Archetype-specific hints carried through to the plan untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cameras: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_gb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Declarative workload resource requirements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadRequirement {
    pub kind: WorkloadKind,
    pub cpu_cores: u32,
    pub memory_gb: u32,
    #[serde(default)]
    pub gpu_required: bool,
    /// Only meaningful when `gpu_required` is set
    #[serde(default)]
    pub gpu_count: u32,
    #[serde(flatten)]
    pub hints: DomainHints,
}

impl WorkloadRequirement {
    pub fn new(kind: WorkloadKind, cpu_cores: u32, memory_gb: u32) -> Self {
        Self {
            kind,
            cpu_cores,
            memory_gb,
            gpu_required: false,
            gpu_count: 0,
            hints: DomainHints::default(),
        }
    }

    pub fn with_gpus(mut self, gpu_count: u32) -> Self {
        self.gpu_required = true;
        self.gpu_count = gpu_count;
        self
    }

    pub fn with_hints(mut self, hints: DomainHints) -> Self {
        self.hints = hints;
        self
    }

    /// Reject requirements that cannot be planned at all
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.cpu_cores == 0 {
            return Err(PlanError::InvalidRequirement {
                field: "cpu_cores",
                reason: "must be a positive integer".to_string(),
            });
        }
        if self.memory_gb == 0 {
            return Err(PlanError::InvalidRequirement {
                field: "memory_gb",
                reason: "must be a positive integer".to_string(),
            });
        }
        Ok(())
    }
}

/// Machine class category as exposed by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineCategory {
    GeneralPurpose,
    Gpu,
}

impl MachineCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineCategory::GeneralPurpose => "general_purpose",
            MachineCategory::Gpu => "gpu",
        }
    }
}

impl fmt::Display for MachineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MachineCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "general_purpose" | "general" => Ok(MachineCategory::GeneralPurpose),
            "gpu" => Ok(MachineCategory::Gpu),
            other => Err(format!("unknown machine category '{}'", other)),
        }
    }
}

/// A named hardware profile offered by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineClass {
    pub name: String,
    pub vcpus: u32,
    pub memory_gb: u32,
    #[serde(default)]
    pub gpu: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_model: Option<String>,
}

impl MachineClass {
    pub fn new(name: impl Into<String>, vcpus: u32, memory_gb: u32) -> Self {
        Self {
            name: name.into(),
            vcpus,
            memory_gb,
            gpu: false,
            gpu_model: None,
        }
    }

    pub fn with_gpu(mut self, model: impl Into<String>) -> Self {
        self.gpu = true;
        self.gpu_model = Some(model.into());
        self
    }

    /// Whether this class covers both resource minimums
    pub fn satisfies(&self, min_cpu: u32, min_memory_gb: u32) -> bool {
        self.vcpus >= min_cpu && self.memory_gb >= min_memory_gb
    }
}

/// Node operating system family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    #[default]
    Linux,
    Windows,
}

impl OsFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Linux => "linux",
            OsFamily::Windows => "windows",
        }
    }

    /// Capitalized form used by Azure resource schemas
    pub fn display_name(&self) -> &'static str {
        match self {
            OsFamily::Linux => "Linux",
            OsFamily::Windows => "Windows",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduling effect of a node taint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaintEffect {
    NoSchedule,
    PreferNoSchedule,
    NoExecute,
}

impl TaintEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaintEffect::NoSchedule => "NoSchedule",
            TaintEffect::PreferNoSchedule => "PreferNoSchedule",
            TaintEffect::NoExecute => "NoExecute",
        }
    }
}

/// Node taint in `key=value:Effect` form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Taint {
    pub key: String,
    pub value: String,
    pub effect: TaintEffect,
}

impl Taint {
    pub fn new(key: impl Into<String>, value: impl Into<String>, effect: TaintEffect) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            effect,
        }
    }
}

impl fmt::Display for Taint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}:{}", self.key, self.value, self.effect.as_str())
    }
}

impl FromStr for Taint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kv, effect) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("taint '{}' is missing an effect", s))?;
        let effect = match effect {
            "NoSchedule" => TaintEffect::NoSchedule,
            "PreferNoSchedule" => TaintEffect::PreferNoSchedule,
            "NoExecute" => TaintEffect::NoExecute,
            other => return Err(format!("unknown taint effect '{}'", other)),
        };
        let (key, value) = kv.split_once('=').unwrap_or((kv, ""));
        if key.is_empty() {
            return Err(format!("taint '{}' has an empty key", s));
        }
        Ok(Taint::new(key, value, effect))
    }
}

impl From<Taint> for String {
    fn from(taint: Taint) -> Self {
        taint.to_string()
    }
}

impl TryFrom<String> for Taint {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Autoscaling bounds; only present on pools that autoscale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autoscaling {
    pub min_count: u32,
    pub max_count: u32,
}

impl Autoscaling {
    pub fn contains(&self, count: u32) -> bool {
        self.min_count <= count && count <= self.max_count
    }
}

/// Default pod density per node
pub const DEFAULT_MAX_PODS: u32 = 110;

/// A homogeneous group of worker nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePool {
    pub name: String,
    pub machine_class: String,
    pub node_count: u32,
    pub os: OsFamily,
    pub labels: BTreeMap<String, String>,
    pub taints: Vec<Taint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscaling: Option<Autoscaling>,
    pub max_pods: u32,
}

impl NodePool {
    /// Fixed-size Linux pool with default pod density
    pub fn new(name: impl Into<String>, machine_class: impl Into<String>, node_count: u32) -> Self {
        Self {
            name: name.into(),
            machine_class: machine_class.into(),
            node_count: node_count.max(1),
            os: OsFamily::Linux,
            labels: BTreeMap::new(),
            taints: Vec::new(),
            autoscaling: None,
            max_pods: DEFAULT_MAX_PODS,
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_taint(mut self, taint: Taint) -> Self {
        self.taints.push(taint);
        self
    }

    pub fn with_max_pods(mut self, max_pods: u32) -> Self {
        self.max_pods = max_pods.max(1);
        self
    }

    /// Enable autoscaling; bounds are widened so they always contain the node count
    pub fn with_autoscaling(mut self, min_count: u32, max_count: u32) -> Self {
        let min_count = min_count.max(1).min(self.node_count);
        let max_count = max_count.max(self.node_count);
        self.autoscaling = Some(Autoscaling {
            min_count,
            max_count,
        });
        self
    }

    pub fn autoscaling_enabled(&self) -> bool {
        self.autoscaling.is_some()
    }

    /// Min count as rendered by generators (node count when fixed-size)
    pub fn effective_min(&self) -> u32 {
        self.autoscaling.map_or(self.node_count, |a| a.min_count)
    }

    /// Max count as rendered by generators (node count when fixed-size)
    pub fn effective_max(&self) -> u32 {
        self.autoscaling.map_or(self.node_count, |a| a.max_count)
    }
}

/// Opaque cluster identity, passed through to generators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterIdentity {
    pub name: String,
    pub resource_group: String,
    pub region: String,
    pub custom_location: String,
}

impl ClusterIdentity {
    pub fn new(
        name: impl Into<String>,
        resource_group: impl Into<String>,
        region: impl Into<String>,
        custom_location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            resource_group: resource_group.into(),
            region: region.into(),
            custom_location: custom_location.into(),
        }
    }
}

/// Rack placement request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementOptions {
    #[serde(default)]
    pub rack_awareness: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rack_count: Option<u32>,
}

impl PlacementOptions {
    pub fn rack_aware(rack_count: u32) -> Self {
        Self {
            rack_awareness: true,
            rack_count: Some(rack_count),
        }
    }

    /// Rack count to generate topology for, if any
    pub fn requested_racks(&self) -> Option<u32> {
        match (self.rack_awareness, self.rack_count) {
            (true, Some(n)) if n > 0 => Some(n),
            _ => None,
        }
    }
}

/// Derived cluster shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterTopology {
    pub identity: ClusterIdentity,
    pub kubernetes_version: String,
    pub control_plane_count: u32,
    pub node_pools: Vec<NodePool>,
    pub rack_awareness: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rack_count: Option<u32>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub network_plugin: String,
    pub load_balancer_sku: String,
}

impl ClusterTopology {
    /// Worker nodes across all pools, widened so large pools cannot overflow
    pub fn total_nodes(&self) -> u64 {
        self.node_pools.iter().map(|p| u64::from(p.node_count)).sum()
    }

    pub fn pool(&self, name: &str) -> Option<&NodePool> {
        self.node_pools.iter().find(|p| p.name == name)
    }
}

/// Behavior when a spread constraint cannot be met
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnsatisfiablePolicy {
    DoNotSchedule,
    ScheduleAnyway,
}

/// Pod topology spread constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadConstraint {
    pub max_skew: u32,
    pub topology_key: String,
    pub when_unsatisfiable: UnsatisfiablePolicy,
}

/// Placement metadata for one physical rack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackTopology {
    pub rack_id: String,
    pub fault_domain: String,
    pub node_labels: BTreeMap<String, String>,
    pub spread_constraints: Vec<SpreadConstraint>,
}

/// Severity of a validation diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Recommendation,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Recommendation => "recommendation",
        }
    }
}

/// Categorized validation diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl ValidationResult {
    pub fn from_parts(
        errors: Vec<String>,
        warnings: Vec<String>,
        recommendations: Vec<String>,
    ) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            recommendations,
        }
    }

    /// All diagnostics in severity order
    pub fn diagnostics(&self) -> impl Iterator<Item = (Severity, &str)> {
        self.errors
            .iter()
            .map(|m| (Severity::Error, m.as_str()))
            .chain(self.warnings.iter().map(|m| (Severity::Warning, m.as_str())))
            .chain(
                self.recommendations
                    .iter()
                    .map(|m| (Severity::Recommendation, m.as_str())),
            )
    }
}

/// Complete planning output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    pub topology: ClusterTopology,
    pub workload: WorkloadRequirement,
    /// `None` means rack topology was not requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rack_topology: Option<Vec<RackTopology>>,
    pub validation: ValidationResult,
    #[serde(default)]
    pub rationale: Vec<String>,
}

/// Infrastructure-as-code target syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Bicep,
    Arm,
    Terraform,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Bicep, ExportFormat::Arm, ExportFormat::Terraform];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Bicep => "bicep",
            ExportFormat::Arm => "arm",
            ExportFormat::Terraform => "terraform",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Bicep => "bicep",
            ExportFormat::Arm => "json",
            ExportFormat::Terraform => "tf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown export format '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_kind_round_trips_through_str() {
        for kind in WorkloadKind::ALL {
            assert_eq!(kind.as_str().parse::<WorkloadKind>().unwrap(), kind);
        }
        assert!("batch".parse::<WorkloadKind>().is_err());
    }

    #[test]
    fn test_workload_kind_wire_format() {
        let json = serde_json::to_string(&WorkloadKind::AiInference).unwrap();
        assert_eq!(json, "\"ai-inference\"");
    }

    #[test]
    fn test_requirement_rejects_zero_cpu() {
        let req = WorkloadRequirement::new(WorkloadKind::Custom, 0, 16);
        assert!(matches!(
            req.validate(),
            Err(PlanError::InvalidRequirement { field: "cpu_cores", .. })
        ));
    }

    #[test]
    fn test_requirement_rejects_zero_memory() {
        let req = WorkloadRequirement::new(WorkloadKind::Custom, 4, 0);
        assert!(matches!(
            req.validate(),
            Err(PlanError::InvalidRequirement { field: "memory_gb", .. })
        ));
    }

    #[test]
    fn test_negative_cpu_rejected_on_deserialize() {
        let raw = r#"{"kind":"custom","cpu_cores":-4,"memory_gb":16}"#;
        assert!(serde_json::from_str::<WorkloadRequirement>(raw).is_err());
    }

    #[test]
    fn test_requirement_hints_flattened() {
        let raw = r#"{"kind":"video-analytics","cpu_cores":8,"memory_gb":32,"cameras":12,"fps":30}"#;
        let req: WorkloadRequirement = serde_json::from_str(raw).unwrap();
        assert_eq!(req.hints.cameras, Some(12));
        assert_eq!(req.hints.fps, Some(30));
        assert!(!req.gpu_required);
    }

    #[test]
    fn test_taint_parse_and_display() {
        let taint: Taint = "nvidia.com/gpu=present:NoSchedule".parse().unwrap();
        assert_eq!(taint.key, "nvidia.com/gpu");
        assert_eq!(taint.value, "present");
        assert_eq!(taint.effect, TaintEffect::NoSchedule);
        assert_eq!(taint.to_string(), "nvidia.com/gpu=present:NoSchedule");

        let json = serde_json::to_string(&taint).unwrap();
        assert_eq!(json, "\"nvidia.com/gpu=present:NoSchedule\"");
    }

    #[test]
    fn test_taint_rejects_bad_effect() {
        assert!("dedicated=infra:Sometimes".parse::<Taint>().is_err());
        assert!("no-effect".parse::<Taint>().is_err());
    }

    #[test]
    fn test_autoscaling_bounds_contain_node_count() {
        let pool = NodePool::new("p", "Standard_D4s_v5", 5).with_autoscaling(1, 3);
        let bounds = pool.autoscaling.unwrap();
        assert!(bounds.contains(pool.node_count));
        assert_eq!(bounds.max_count, 5);
    }

    #[test]
    fn test_fixed_pool_effective_bounds() {
        let pool = NodePool::new("gpupool", "Standard_NC4as_T4_v3", 2);
        assert!(!pool.autoscaling_enabled());
        assert_eq!(pool.effective_min(), 2);
        assert_eq!(pool.effective_max(), 2);
        assert_eq!(pool.max_pods, DEFAULT_MAX_PODS);
    }

    #[test]
    fn test_requested_racks() {
        assert_eq!(PlacementOptions::rack_aware(3).requested_racks(), Some(3));
        assert_eq!(PlacementOptions::rack_aware(0).requested_racks(), None);
        let disabled = PlacementOptions {
            rack_awareness: false,
            rack_count: Some(4),
        };
        assert_eq!(disabled.requested_racks(), None);
    }

    #[test]
    fn test_validation_result_validity_tracks_errors() {
        let ok = ValidationResult::from_parts(vec![], vec!["w".into()], vec!["r".into()]);
        assert!(ok.is_valid);
        let bad = ValidationResult::from_parts(vec!["e".into()], vec![], vec![]);
        assert!(!bad.is_valid);
        assert_eq!(bad.diagnostics().next(), Some((Severity::Error, "e")));
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("ARM".parse::<ExportFormat>().unwrap(), ExportFormat::Arm);
        assert_eq!(ExportFormat::Terraform.file_extension(), "tf");
        assert!("pulumi".parse::<ExportFormat>().is_err());
    }
}
