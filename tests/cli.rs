//! Binary-level checks: JSON envelope shape and exit codes.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const REGISTRY_REL: &str = "apis/org/project_planton/shared/cloudresourcekind/cloud_resource_kind.proto";

fn kindctl(repo: &Path, args: &[&str]) -> (Value, i32) {
    let output: Output = Command::new(env!("CARGO_BIN_EXE_kindctl"))
        .arg("--repo-root")
        .arg(repo)
        .args(args)
        .env_remove("REPO_ROOT")
        .output()
        .unwrap();

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    (json, output.status.code().unwrap())
}

fn repo_with_registry() -> TempDir {
    let dir = TempDir::new().unwrap();
    let registry = dir.path().join(REGISTRY_REL);
    fs::create_dir_all(registry.parent().unwrap()).unwrap();
    fs::write(
        &registry,
        "enum CloudResourceKind {\n  AwsS3Bucket = 7 [(kind_meta) = {provider: aws, id_prefix: \"s3b\"}];\n}\n",
    )
    .unwrap();
    fs::create_dir_all(
        dir.path()
            .join("apis/org/project_planton/provider/aws/awss3bucket"),
    )
    .unwrap();
    dir
}

#[test]
fn variants_prints_ordered_pairs() {
    let dir = TempDir::new().unwrap();
    let (json, code) = kindctl(
        dir.path(),
        &["variants", "--old-name", "FooBar", "--new-name", "BazQux"],
    );

    assert_eq!(code, 0);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["variants"][0]["from"], "FooBar");
    assert_eq!(json["data"]["variants"][6]["to"], "bazqux");
}

#[test]
fn invalid_identifier_exits_with_validation_code() {
    let dir = TempDir::new().unwrap();
    let (json, code) = kindctl(
        dir.path(),
        &["variants", "--old-name", "foo-bar", "--new-name", "BazQux"],
    );

    assert_eq!(code, 2);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "validation.invalid_argument");
}

#[test]
fn registry_show_resolves_component_dir() {
    let dir = repo_with_registry();
    let (json, code) = kindctl(dir.path(), &["registry", "show", "AwsS3Bucket"]);

    assert_eq!(code, 0);
    assert_eq!(json["data"]["command"], "registry.show");
    assert_eq!(json["data"]["enum_value"], "7");
    assert_eq!(json["data"]["id_prefix"], "s3b");
    assert_eq!(
        json["data"]["component_dir"],
        "apis/org/project_planton/provider/aws/awss3bucket"
    );
}

#[test]
fn registry_show_missing_entry_exits_not_found() {
    let dir = repo_with_registry();
    let (json, code) = kindctl(dir.path(), &["registry", "show", "GcpBucket"]);

    assert_eq!(code, 4);
    assert_eq!(json["error"]["code"], "registry.entry_not_found");
}

#[test]
fn rename_unknown_component_exits_not_found() {
    let dir = repo_with_registry();
    let (json, code) = kindctl(
        dir.path(),
        &["rename", "--old-name", "GcpBucket", "--new-name", "GcpStorage", "--skip-build"],
    );

    assert_eq!(code, 4);
    assert_eq!(json["error"]["code"], "registry.entry_not_found");
}

#[test]
fn rename_with_skip_build_succeeds() {
    let dir = repo_with_registry();
    let (json, code) = kindctl(
        dir.path(),
        &["rename", "--old-name", "AwsS3Bucket", "--new-name", "AwsS3Storage", "--skip-build"],
    );

    assert_eq!(code, 0, "{}", json);
    assert_eq!(json["data"]["command"], "rename");
    assert_eq!(json["data"]["new_folder"], "awss3storage");
    assert_eq!(json["data"]["build"]["skipped"], true);
    assert!(dir
        .path()
        .join("apis/org/project_planton/provider/aws/awss3storage")
        .is_dir());
}

#[test]
fn write_docs_reports_files() {
    let dir = TempDir::new().unwrap();
    let readme = dir.path().join("readme.tmp");
    let examples = dir.path().join("examples.tmp");
    fs::write(&readme, "# Readme\n").unwrap();
    fs::write(&examples, "examples\n").unwrap();

    let (json, code) = kindctl(
        dir.path(),
        &[
            "write",
            "docs",
            "--provider",
            "gcp",
            "--kind-folder",
            "gke_cluster",
            "--readme-file",
            readme.to_str().unwrap(),
            "--examples-file",
            examples.to_str().unwrap(),
        ],
    );

    assert_eq!(code, 0);
    assert_eq!(json["data"]["kind"], "docs");
    assert_eq!(json["data"]["kind_folder"], "gkecluster");
    assert_eq!(json["data"]["files"][1]["bytes_written"], 9);
    assert!(dir
        .path()
        .join("apis/org/project_planton/provider/gcp/gkecluster/v1/examples.md")
        .is_file());
}

#[test]
fn write_without_content_source_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (json, code) = kindctl(
        dir.path(),
        &["write", "spec-proto", "--provider", "aws", "--kind-folder", "awss3bucket"],
    );

    assert_eq!(code, 2);
    assert_eq!(json["error"]["code"], "validation.missing_argument");
}

#[test]
fn write_module_places_manifest_files() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("manifest.json");
    fs::write(
        &manifest,
        r#"{"files": [{"name": "main.tf", "content": "terraform {}\n"},
                      {"name": "modules/vpc/vpc.tf", "content": ""}]}"#,
    )
    .unwrap();

    let (json, code) = kindctl(
        dir.path(),
        &[
            "write",
            "module",
            "--provider",
            "aws",
            "--kind-folder",
            "awsvpc",
            "--target",
            "tf",
            "--manifest-file",
            manifest.to_str().unwrap(),
        ],
    );

    assert_eq!(code, 0, "{}", json);
    assert_eq!(json["data"]["command"], "write.module");
    assert_eq!(json["data"]["target"], "tf");
    assert_eq!(json["data"]["files"][0]["bytes_written"], 13);
    assert!(dir
        .path()
        .join("apis/org/project_planton/provider/aws/awsvpc/v1/iac/tf/modules/vpc/vpc.tf")
        .is_file());
}

#[test]
fn write_module_rejects_escaping_file_names() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("manifest.json");
    fs::write(&manifest, r#"{"files": [{"name": "../../x.go", "content": ""}]}"#).unwrap();

    let (json, code) = kindctl(
        dir.path(),
        &[
            "write",
            "module",
            "--provider",
            "aws",
            "--kind-folder",
            "awsvpc",
            "--target",
            "pulumi-module",
            "--manifest-file",
            manifest.to_str().unwrap(),
        ],
    );

    assert_eq!(code, 2);
    assert_eq!(json["error"]["details"]["field"], "files[0].name");
    assert!(!dir.path().join("apis").exists());
}
