use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const MODE_ENV: &str = "AUTOLOADER_MANAGER_MODE";

fn project() -> TempDir {
    let root = tempfile::tempdir().unwrap();
    let site = root.path().join("crates/subapps/site");
    fs::create_dir_all(&site).unwrap();
    fs::write(site.join("config.toml"), "project_name = \"starter\"\ninstalled_subapps = [\"billing\"]\n")
        .unwrap();
    root
}

fn manager(root: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("manager").unwrap();
    cmd.current_dir(root.path()).env_remove(MODE_ENV).env_remove("RUST_LOG");
    cmd
}

#[test]
fn no_arguments_prints_help() {
    let root = project();
    manager(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("subapp").and(predicate::str::contains("rm-cache")));
}

#[test]
fn subapp_command_scaffolds_into_the_working_directory() {
    let root = project();
    manager(&root).args(["subapp", "blog", "--route", "blog"]).assert().success();

    assert!(root.path().join("crates/subapps/blog/Cargo.toml").is_file());
    assert!(root.path().join("crates/subapps/blog/src/lib.rs").is_file());
    let config = fs::read_to_string(root.path().join("crates/subapps/site/config.toml")).unwrap();
    assert!(config.contains("\"blog\""));
}

#[test]
fn failing_command_exits_with_one() {
    let root = project();
    manager(&root)
        .args(["subapp", "Not/Valid"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a valid subapp name"));
}

#[test]
fn unknown_command_is_a_usage_error() {
    let root = project();
    manager(&root).arg("migrate").assert().code(2);
}

#[test]
fn disabled_manager_mode_exposes_no_commands() {
    let root = project();
    manager(&root)
        .env(MODE_ENV, "0")
        .assert()
        .success()
        .stdout(predicate::str::contains("rm-cache").not());
}

#[test]
fn disabled_manager_mode_rejects_site_commands() {
    let root = project();
    manager(&root).env(MODE_ENV, "0").args(["subapp", "blog"]).assert().code(2);
    assert!(!root.path().join("crates/subapps/blog").exists());
}
