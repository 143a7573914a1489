//! CLI integration tests for freshen.
//!
//! These tests run the binary against throwaway repositories: configuration
//! discovery, migration output, `--write`/`--check`, and release lookups
//! through the git datasources.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use git2::{Repository, Signature};
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Get the freshen binary command, isolated from the user's global config.
fn freshen(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("freshen").unwrap();
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

const LEGACY_CONFIG: &str = r#"{
  "baseBranch": "next",
  "automerge": "minor",
  "extends": ":js-app",
  "schedule": "on the last day of the month"
}"#;

const CURRENT_CONFIG: &str = r#"{
  "extends": ["config:js-app"],
  "baseBranches": ["next"]
}
"#;

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Repository with tags `v1.0.0` and `v2.0.0`.
fn tagged_repo(dir: &Path) {
    let repo = Repository::init(dir).unwrap();
    let sig = Signature::now("Test", "test@example.com").unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let first = repo
        .commit(Some("HEAD"), &sig, &sig, "first", &tree, &[])
        .unwrap();
    let first = repo.find_commit(first).unwrap();
    repo.tag_lightweight("v1.0.0", first.as_object(), false).unwrap();

    let second = repo
        .commit(Some("HEAD"), &sig, &sig, "second", &tree, &[&first])
        .unwrap();
    let second = repo.find_commit(second).unwrap();
    repo.tag_lightweight("v2.0.0", second.as_object(), false).unwrap();
}

// ============================================================================
// freshen migrate
// ============================================================================

#[test]
fn test_migrate_prints_migrated_config() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("freshen.json"), LEGACY_CONFIG).unwrap();

    let output = freshen(tmp.path())
        .arg("migrate")
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed["baseBranches"], json!(["next"]));
    assert_eq!(printed["extends"], json!(["config:js-app"]));
    assert_eq!(printed["schedule"], json!("on the first day of the month"));
    assert_eq!(printed["minor"], json!({"automerge": true}));

    // file untouched without --write
    assert_eq!(
        fs::read_to_string(tmp.path().join("freshen.json")).unwrap(),
        LEGACY_CONFIG
    );
}

#[test]
fn test_migrate_write_rewrites_file() {
    let tmp = temp_dir();
    let path = tmp.path().join("freshen.json");
    fs::write(&path, LEGACY_CONFIG).unwrap();

    freshen(tmp.path())
        .args(["migrate", "--write"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Migrated"));

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.ends_with("}\n"));
    assert!(written.contains("\n  \"baseBranches\""));
    assert!(!written.contains("baseBranch\":"));

    // a second run has nothing left to do
    freshen(tmp.path())
        .args(["migrate", "--write"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn test_migrate_check_fails_for_legacy_config() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("freshen.json"), LEGACY_CONFIG).unwrap();

    freshen(tmp.path())
        .args(["migrate", "--check", "--no-color"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration needs migration"))
        .stderr(predicate::str::contains("`baseBranch` changes"))
        .stderr(predicate::str::contains("freshen migrate --write"));
}

#[test]
fn test_migrate_check_passes_for_current_config() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("freshen.json"), CURRENT_CONFIG).unwrap();

    freshen(tmp.path())
        .args(["migrate", "--check"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn test_migrate_check_conflicts_with_write() {
    let tmp = temp_dir();
    freshen(tmp.path())
        .args(["migrate", "--check", "--write"])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

#[test]
fn test_migrate_discovers_github_config() {
    let tmp = temp_dir();
    fs::create_dir(tmp.path().join(".github")).unwrap();
    let path = tmp.path().join(".github/freshen.json");
    fs::write(&path, r#"{"masterIssue": true}"#).unwrap();

    freshen(tmp.path())
        .args(["migrate", "--write"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert_eq!(read_json(&path), json!({"dependencyDashboard": true}));
}

#[test]
fn test_migrate_package_json() {
    let tmp = temp_dir();
    let path = tmp.path().join("package.json");
    fs::write(
        &path,
        r#"{"name": "app", "freshen": {"rebaseStalePrs": true}}"#,
    )
    .unwrap();

    freshen(tmp.path())
        .args(["migrate", "--write"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert_eq!(
        read_json(&path),
        json!({"name": "app", "freshen": {"rebaseWhen": "behind-base-branch"}})
    );
}

#[test]
fn test_migrate_yaml_stays_yaml() {
    let tmp = temp_dir();
    let path = tmp.path().join("freshen.yaml");
    fs::write(&path, "baseBranch: main\nseparateMajorReleases: true\n").unwrap();

    freshen(tmp.path())
        .args(["migrate", "--write"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let written = fs::read_to_string(&path).unwrap();
    let value: Value = serde_yaml::from_str(&written).unwrap();
    assert_eq!(value["baseBranches"], json!(["main"]));
    assert_eq!(value["separateMajorMinor"], json!(true));
    assert!(!written.trim_start().starts_with('{'));
}

#[test]
fn test_migrate_explicit_path_and_parent() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("child.json"), r#"{"rebaseStalePrs": null}"#).unwrap();
    fs::write(tmp.path().join("parent.json"), r#"{"rebaseWhen": "conflicted"}"#).unwrap();

    let output = freshen(tmp.path())
        .args(["migrate", "child.json", "--parent", "parent.json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed, json!({"rebaseWhen": "conflicted"}));
}

#[test]
fn test_migrate_preset_rename_flag() {
    let tmp = temp_dir();
    fs::write(
        tmp.path().join("freshen.json"),
        r#"{"extends": ["@acme/old", "@acme/gone", "config:base"]}"#,
    )
    .unwrap();

    let output = freshen(tmp.path())
        .args([
            "migrate",
            "--preset-rename",
            "@acme/old=@acme/new",
            "--preset-rename",
            "@acme/gone=",
        ])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed["extends"], json!(["@acme/new", "config:base"]));
}

#[test]
fn test_migrate_preset_renames_from_project_config() {
    let tmp = temp_dir();
    fs::create_dir(tmp.path().join(".freshen")).unwrap();
    fs::write(
        tmp.path().join(".freshen/config.toml"),
        "[migration.preset-renames]\n\"@acme/old\" = \"@acme/new\"\n",
    )
    .unwrap();
    fs::write(tmp.path().join("freshen.json"), r#"{"extends": ["@acme/old"]}"#).unwrap();

    freshen(tmp.path())
        .arg("migrate")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("@acme/new"));
}

#[test]
fn test_migrate_invalid_preset_rename_flag() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("freshen.json"), "{}").unwrap();

    freshen(tmp.path())
        .args(["migrate", "--preset-rename", "no-equals-sign"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected FROM=TO"));
}

#[test]
fn test_migrate_without_config_fails() {
    let tmp = temp_dir();

    freshen(tmp.path())
        .arg("migrate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no configuration file found"))
        .stderr(predicate::str::contains("help:"));
}

#[test]
fn test_migrate_reports_parse_errors() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("freshen.json"), "{\n  \"automerge\": ,\n}\n").unwrap();

    freshen(tmp.path())
        .args(["migrate", "--no-color"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("freshen.json"))
        .stderr(predicate::str::contains("freshen::config::parse"));
}

// ============================================================================
// freshen releases
// ============================================================================

#[test]
fn test_releases_lists_git_tags() {
    let tmp = temp_dir();
    let repo_dir = tmp.path().join("repo");
    tagged_repo(&repo_dir);

    freshen(tmp.path())
        .args(["releases", "git-tags", repo_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("v1.0.0"))
        .stdout(predicate::str::contains("v2.0.0"));
}

#[test]
fn test_releases_json_output() {
    let tmp = temp_dir();
    let repo_dir = tmp.path().join("repo");
    tagged_repo(&repo_dir);

    let output = freshen(tmp.path())
        .args([
            "releases",
            "git-tags",
            repo_dir.to_str().unwrap(),
            "--json",
            "--versioning",
            "semver",
            "--extract-version",
            r"^v(?<version>.+)$",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
    let versions: Vec<&str> = printed["releases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["version"].as_str().unwrap())
        .collect();
    assert_eq!(versions, vec!["1.0.0", "2.0.0"]);

    let output = freshen(tmp.path())
        .args(["releases", "git-tags", repo_dir.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed["releases"].as_array().unwrap().len(), 2);
    assert!(printed["releases"][0]["newDigest"].is_string());
}

#[test]
fn test_releases_offline_finds_nothing() {
    let tmp = temp_dir();
    let repo_dir = tmp.path().join("repo");
    tagged_repo(&repo_dir);

    freshen(tmp.path())
        .args(["releases", "git-tags", repo_dir.to_str().unwrap(), "--offline"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no releases found"));
}

#[test]
fn test_releases_missing_repository_finds_nothing() {
    let tmp = temp_dir();
    let missing = tmp.path().join("nope");

    freshen(tmp.path())
        .args(["releases", "git-tags", missing.to_str().unwrap(), "--no-color"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("note: no releases found"));
}

#[test]
fn test_releases_unreachable_host_reports_diagnostic() {
    let tmp = temp_dir();

    freshen(tmp.path())
        .args([
            "--no-color",
            "releases",
            "git-tags",
            "http://127.0.0.1:1/repo.git",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "error: external host `http://127.0.0.1:1/repo.git` failed",
        ));
}

#[test]
fn test_releases_unknown_datasource() {
    let tmp = temp_dir();

    freshen(tmp.path())
        .args(["releases", "gitbucket", "some/dep"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown datasource `gitbucket`"));
}

#[test]
fn test_releases_invalid_strategy() {
    let tmp = temp_dir();

    freshen(tmp.path())
        .args(["releases", "git-tags", "some/dep", "--strategy", "fastest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown registry strategy"));
}

// ============================================================================
// freshen completions / help
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    freshen(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("freshen"));
}

#[test]
fn test_help_lists_commands() {
    let tmp = temp_dir();

    freshen(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("releases"));
}
