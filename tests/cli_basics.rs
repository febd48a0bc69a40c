use assert_cmd::cargo; // handy crate for testing CLIs
use predicates::prelude::*;

#[test]
fn prints_help() {
    let mut cmd = cargo::cargo_bin_cmd!("gsg");

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("Usage"))
        .stdout(predicates::str::contains("commit").and(predicates::str::contains("review")));
}

#[test]
fn prints_version() {
    let mut cmd = cargo::cargo_bin_cmd!("gsg");

    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn commit_outside_a_repository_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cargo::cargo_bin_cmd!("gsg");

    cmd.current_dir(dir.path())
        .arg("commit")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Not a git repository"));
}
