use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tether() -> Command {
    Command::cargo_bin("tether").expect("tether binary")
}

#[test]
fn init_scaffolds_a_config_file() {
    let workspace = TempDir::new().expect("workspace");

    tether()
        .arg("init")
        .arg(workspace.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let config = workspace.path().join(".tether").join("sync-config.json");
    assert!(config.exists(), "config file should exist after init");
}

#[test]
fn second_init_does_not_overwrite() {
    let workspace = TempDir::new().expect("workspace");

    tether().arg("init").arg(workspace.path()).assert().success();
    tether()
        .arg("init")
        .arg(workspace.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn sync_without_config_points_at_init() {
    let workspace = TempDir::new().expect("workspace");

    tether()
        .arg("sync")
        .arg("--root")
        .arg(workspace.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("tether init"));
}
