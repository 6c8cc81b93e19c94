use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn clonectl_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clonectl"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("CLONECTL_CONFIG")
        .env_remove("CLONECTL_GIT")
        .env_remove("RUST_LOG");
    cmd
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn add(home: &TempDir, name: &str, repository: &str, target: &Path) {
    clonectl_cmd(home.path())
        .args(["add", name, repository])
        .arg(target)
        .assert()
        .success()
        .stdout(contains(format!("Added '{name}'")));
}

#[test]
fn add_creates_default_config_under_home() {
    let home = TempDir::new().expect("home");
    let target = home.path().join("work").join("api");
    add(&home, "api", "https://example.com/api.git", &target);

    let config = home.path().join(".clonectl").join("controls.json");
    let body = fs::read_to_string(&config).expect("config written");
    let parsed: serde_json::Value = serde_json::from_str(&body).expect("valid json");
    assert_eq!(parsed["controls"][0]["name"], "api");
    assert_eq!(parsed["controls"][0]["repository_path"], "https://example.com/api.git");
}

#[test]
fn add_duplicate_name_fails() {
    let home = TempDir::new().expect("home");
    add(&home, "api", "https://example.com/api.git", &home.path().join("a"));

    clonectl_cmd(home.path())
        .args(["add", "api", "https://example.com/other.git"])
        .arg(home.path().join("b"))
        .assert()
        .failure()
        .stderr(contains("already registered"));
}

#[test]
fn list_json_reports_state() {
    let home = TempDir::new().expect("home");
    add(&home, "first", "https://example.com/1.git", &home.path().join("one"));
    add(&home, "second", "/srv/git/2.git", &home.path().join("two"));

    let assert = clonectl_cmd(home.path())
        .args(["list", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let rows: serde_json::Value = serde_json::from_str(&stdout).expect("json");
    let rows = rows.as_array().expect("array");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "first");
    assert_eq!(rows[0]["local"], false);
    assert_eq!(rows[1]["name"], "second");
    assert_eq!(rows[1]["local"], true);
    assert_eq!(rows[1]["cloned"], false);
}

#[test]
fn remove_unknown_name_fails_and_known_name_succeeds() {
    let home = TempDir::new().expect("home");
    add(&home, "api", "https://example.com/api.git", &home.path().join("a"));

    clonectl_cmd(home.path())
        .args(["remove", "ghost"])
        .assert()
        .failure()
        .stderr(contains("ghost"));

    clonectl_cmd(home.path())
        .args(["remove", "api"])
        .assert()
        .success();

    clonectl_cmd(home.path())
        .args(["list"])
        .assert()
        .success()
        .stdout(contains("No controls registered."));
}

#[test]
fn update_unknown_name_fails() {
    let home = TempDir::new().expect("home");
    add(&home, "api", "https://example.com/api.git", &home.path().join("a"));

    clonectl_cmd(home.path())
        .args(["update", "ghost"])
        .assert()
        .failure()
        .stderr(contains("no control named 'ghost'"));
}

#[test]
fn missing_config_is_reported() {
    let home = TempDir::new().expect("home");
    clonectl_cmd(home.path())
        .args(["list"])
        .assert()
        .failure()
        .stderr(contains("config file not found"));
}

#[test]
fn validate_flags_shared_target() {
    let home = TempDir::new().expect("home");
    let shared = home.path().join("shared");
    add(&home, "a", "https://example.com/a.git", &shared);
    add(&home, "b", "https://example.com/b.git", &shared);

    clonectl_cmd(home.path())
        .args(["validate"])
        .assert()
        .failure()
        .stdout(contains("more than one control"));
}

#[test]
fn explicit_yaml_config_is_read() {
    let home = TempDir::new().expect("home");
    let config = home.path().join("controls.yaml");
    fs::write(
        &config,
        "controls:\n  - name: docs\n    repository_path: https://example.com/docs.git\n    target_path: /work/docs\n",
    )
    .unwrap();

    clonectl_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .args(["list"])
        .assert()
        .success()
        .stdout(contains("docs").and(contains("1 controls")));
}

#[test]
fn update_twice_clones_then_skips() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let home = TempDir::new().expect("home");
    let origin = home.path().join("origin.git");
    let target = home.path().join("checkout");
    add(&home, "docs", &origin.to_string_lossy(), &target);

    clonectl_cmd(home.path())
        .args(["update"])
        .assert()
        .success()
        .stdout(contains("docs: cloned").and(contains("bare repository created")));
    assert!(target.join(".git").exists());

    clonectl_cmd(home.path())
        .args(["update"])
        .assert()
        .success()
        .stdout(contains("docs: skipped"));

    clonectl_cmd(home.path())
        .args(["update", "docs", "--force"])
        .assert()
        .success()
        .stdout(contains("docs: recloned"));
}

#[test]
fn keep_going_reports_failures_and_exits_nonzero() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let home = TempDir::new().expect("home");
    let occupied = home.path().join("occupied");
    fs::create_dir_all(&occupied).unwrap();
    fs::write(occupied.join("notes.txt"), "mine").unwrap();

    add(&home, "blocked", &home.path().join("a.git").to_string_lossy(), &occupied);
    add(
        &home,
        "fine",
        &home.path().join("b.git").to_string_lossy(),
        &home.path().join("fine"),
    );

    clonectl_cmd(home.path())
        .args(["update", "--keep-going"])
        .assert()
        .failure()
        .stdout(contains("fine: cloned").and(contains("1 succeeded, 1 failed")))
        .stderr(contains("1 of 2 controls failed"));
    assert!(occupied.join("notes.txt").exists());
}

#[test]
fn abort_still_prints_earlier_successes() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let home = TempDir::new().expect("home");
    let occupied = home.path().join("occupied");
    fs::create_dir_all(&occupied).unwrap();
    fs::write(occupied.join("notes.txt"), "mine").unwrap();

    add(
        &home,
        "fine",
        &home.path().join("b.git").to_string_lossy(),
        &home.path().join("fine"),
    );
    add(&home, "blocked", &home.path().join("a.git").to_string_lossy(), &occupied);

    clonectl_cmd(home.path())
        .args(["update"])
        .assert()
        .failure()
        .stdout(contains("fine: cloned").and(contains("succeeded").not()))
        .stderr(contains("update aborted").and(contains("occupied")));
}
