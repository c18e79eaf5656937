//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};

const CLUSTER_ARGS: [&str; 6] = [
    "--cluster-name",
    "test-cluster",
    "--resource-group",
    "test-rg",
    "--custom-location",
    "test-custom-location",
];

/// Run the binary isolated from the user's settings file and environment
fn arcplan(args: &[&str], config_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_arcplan"))
        .args(args)
        .env("ARCPLAN_CONFIG", config_dir.join("config.json"))
        .env_remove("ARCPLAN_CATALOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command")
}

fn plan_args<'a>(extra: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec!["plan"];
    args.extend_from_slice(&CLUSTER_ARGS);
    args.extend_from_slice(extra);
    args
}

fn write_catalog(dir: &Path, limits: serde_json::Value) -> std::path::PathBuf {
    let path = dir.join("catalog.json");
    let catalog = serde_json::json!({
        "metadata": { "version": "2.0", "target": "Lab rack", "last_updated": "2020-01-01T00:00:00Z" },
        "kubernetes_versions": ["1.30.1"],
        "vm_skus": {
            "general_purpose": [ { "name": "Lab_8x32", "vcpus": 8, "memory_gb": 32 } ],
            "gpu": []
        },
        "limits": limits
    });
    std::fs::write(&path, catalog.to_string()).unwrap();
    path
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = arcplan(&["--help"], dir.path());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Arc Deployment Planner"), "Should show app name");
    assert!(stdout.contains("plan"), "Should show plan command");
    assert!(stdout.contains("export"), "Should show export command");
    assert!(stdout.contains("catalog"), "Should show catalog command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let dir = tempfile::tempdir().unwrap();
    let output = arcplan(&["--version"], dir.path());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("arcplan"), "Should show binary name");
}

#[test]
fn test_plan_help_lists_workload_flags() {
    let dir = tempfile::tempdir().unwrap();
    let output = arcplan(&["plan", "--help"], dir.path());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--workload"));
    assert!(stdout.contains("--gpu-count"));
    assert!(stdout.contains("--rack-awareness"));
    assert!(stdout.contains("--cluster-name"));
}

#[test]
fn test_plan_requires_cluster_identity() {
    let dir = tempfile::tempdir().unwrap();
    let output = arcplan(&["plan", "--cpu", "8"], dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--cluster-name"));
}

#[test]
fn test_plan_table_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = arcplan(&plan_args(&[]), dir.path());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stdout: {}", stdout);
    assert!(stdout.contains("Deployment Plan: test-cluster"));
    assert!(stdout.contains("nodepool1"));
    assert!(stdout.contains("Standard_D8s_v5"));
    assert!(stdout.contains("Single control plane node is not recommended for production"));
    assert!(stdout.contains("Consider enabling rack awareness for better fault tolerance"));
    assert!(stdout.contains("Plan created successfully!"));
}

#[test]
fn test_plan_gpu_workload_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = arcplan(
        &plan_args(&[
            "--workload",
            "ai-inference",
            "--cpu",
            "16",
            "--memory",
            "64",
            "--gpu-count",
            "2",
            "--rack-awareness",
            "--racks",
            "3",
            "--format",
            "json",
        ]),
        dir.path(),
    );
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let topology = &plan["topology"];
    assert_eq!(topology["control_plane_count"], 3);
    assert_eq!(topology["node_pools"][0]["node_count"], 5);
    assert_eq!(topology["node_pools"][1]["name"], "gpupool");
    assert_eq!(topology["node_pools"][1]["node_count"], 2);
    assert_eq!(plan["rack_topology"].as_array().unwrap().len(), 3);
    assert!(plan["validation"]["recommendations"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[test]
fn test_plan_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let plan_path = dir.path().join("plan.json");
    let output = arcplan(
        &plan_args(&["--output", plan_path.to_str().unwrap()]),
        dir.path(),
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Plan saved to"));

    let plan: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&plan_path).unwrap()).unwrap();
    assert_eq!(plan["topology"]["identity"]["name"], "test-cluster");
    assert_eq!(plan["topology"]["kubernetes_version"], "1.29.2");
}

#[test]
fn test_plan_validation_error_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path(), serde_json::json!({ "max_nodes_per_cluster": 2 }));
    let output = arcplan(
        &plan_args(&["--catalog", catalog.to_str().unwrap()]),
        dir.path(),
    );

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total nodes (3) exceeds maximum (2)"));
    assert!(stdout.contains("Plan failed validation"));
}

#[test]
fn test_plan_gpu_without_gpu_classes_fails() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path(), serde_json::json!({}));
    let output = arcplan(
        &plan_args(&["--catalog", catalog.to_str().unwrap(), "--gpu"]),
        dir.path(),
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("catalog has no machine classes in category 'gpu'"));
}

#[test]
fn test_export_terraform_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = vec!["export", "--template", "terraform"];
    args.extend_from_slice(&CLUSTER_ARGS);
    let output = arcplan(&args, dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("terraform"));
    assert!(stdout.contains("azapi_resource"));
}

#[test]
fn test_export_bicep_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("main.bicep");
    let mut args = vec![
        "export",
        "--template",
        "bicep",
        "--output",
        template_path.to_str().unwrap(),
    ];
    args.extend_from_slice(&CLUSTER_ARGS);
    let output = arcplan(&args, dir.path());

    assert!(output.status.success());
    let bicep = std::fs::read_to_string(&template_path).unwrap();
    assert!(bicep.contains("test-cluster"));
    assert!(bicep.contains("resource"));
    assert!(bicep.contains("nodePool"));
}

#[test]
fn test_export_rejects_unknown_template() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = vec!["export", "--template", "pulumi"];
    args.extend_from_slice(&CLUSTER_ARGS);
    let output = arcplan(&args, dir.path());

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("pulumi"));
}

#[test]
fn test_catalog_classes_by_category() {
    let dir = tempfile::tempdir().unwrap();
    let output = arcplan(
        &["catalog", "classes", "--category", "gpu", "--format", "json"],
        dir.path(),
    );
    assert!(output.status.success());

    let classes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let classes = classes.as_array().unwrap();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0]["name"], "Standard_NC4as_T4_v3");
    assert_eq!(classes[0]["category"], "gpu");
}

#[test]
fn test_catalog_versions_table() {
    let dir = tempfile::tempdir().unwrap();
    let output = arcplan(&["catalog", "versions"], dir.path());
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1.29.2"));
    assert!(stdout.contains("1.27.9"));
}

#[test]
fn test_catalog_info_from_env_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path(), serde_json::json!({}));
    let output = Command::new(env!("CARGO_BIN_EXE_arcplan"))
        .args(["catalog", "info", "--format", "json"])
        .env("ARCPLAN_CONFIG", dir.path().join("config.json"))
        .env("ARCPLAN_CATALOG", &catalog)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["target"], "Lab rack");
    assert_eq!(info["is_outdated"], true);
    assert_eq!(info["general_purpose_classes"], 1);
}

#[test]
fn test_catalog_refresh_renews_stale_file() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path(), serde_json::json!({}));
    let output = arcplan(
        &["catalog", "refresh", "--catalog", catalog.to_str().unwrap()],
        dir.path(),
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Catalog refreshed and saved to"));

    let output = arcplan(
        &[
            "catalog",
            "info",
            "--catalog",
            catalog.to_str().unwrap(),
            "--format",
            "json",
        ],
        dir.path(),
    );
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["target"], "Lab rack");
    assert_eq!(info["is_outdated"], false);
}

#[test]
fn test_catalog_refresh_builtin_is_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let output = arcplan(&["catalog", "refresh"], dir.path());
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Catalog refreshed"));
    assert!(stdout.contains("nothing was saved"));
}

#[test]
fn test_catalog_info_lists_os_images() {
    let dir = tempfile::tempdir().unwrap();
    let output = arcplan(&["catalog", "info"], dir.path());
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Azure Linux 2.0"));
    assert!(stdout.contains("Windows Server 2022"));
}

#[test]
fn test_settings_file_default_format() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{ "default_format": "json" }"#,
    )
    .unwrap();

    let output = arcplan(&["catalog", "versions"], dir.path());
    assert!(output.status.success());
    let versions: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(versions, vec!["1.29.2", "1.28.5", "1.27.9"]);
}
