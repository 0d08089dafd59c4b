use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn policy_sync(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("policy-sync").unwrap();
    cmd.env("POLICY_SYNC_CONFIG_DIR", config_dir.path())
        .env_remove("POLICY_SYNC_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let config_dir = TempDir::new().unwrap();
    policy_sync(&config_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("backup"))
        .stdout(predicate::str::contains("restore-all"))
        .stdout(predicate::str::contains("--fail-fast"));
}

#[test]
fn init_then_config() {
    let config_dir = TempDir::new().unwrap();
    policy_sync(&config_dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));
    assert!(config_dir.path().join("config.json").exists());

    policy_sync(&config_dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("policy-sync Configuration"))
        .stdout(predicate::str::contains("(not set, will prompt)"));
}

#[test]
fn restore_requires_a_source() {
    let config_dir = TempDir::new().unwrap();
    policy_sync(&config_dir).arg("restore").assert().failure();
}

#[test]
fn restore_without_host_is_a_configuration_error() {
    let config_dir = TempDir::new().unwrap();
    policy_sync(&config_dir)
        .args(["restore", "namingPolicies/docker_port.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("connection.host is not set"));
}

#[test]
fn restore_all_without_backup_tree_fails() {
    let config_dir = TempDir::new().unwrap();
    policy_sync(&config_dir)
        .arg("restore-all")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn backup_without_host_is_a_configuration_error() {
    let config_dir = TempDir::new().unwrap();
    policy_sync(&config_dir)
        .arg("backup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
