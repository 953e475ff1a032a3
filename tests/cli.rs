use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn init_creates_database() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("confgen")
        .unwrap()
        .args(["init", "--data-dir"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized confgen database"));

    assert!(temp.path().join("confgen.db").exists());
}

#[test]
fn init_twice_fails() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("confgen")
        .unwrap()
        .args(["init", "--data-dir"])
        .arg(temp.path())
        .assert()
        .success();

    Command::cargo_bin("confgen")
        .unwrap()
        .args(["init", "--data-dir"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn serve_requires_init() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("confgen")
        .unwrap()
        .args(["serve", "--data-dir"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}
