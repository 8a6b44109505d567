use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fixsrc");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_exits_successfully() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--actions"));
}

#[test]
fn test_no_actions_is_an_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.cpp");
    fs::write(&file, "x").unwrap();

    cmd()
        .arg(&file)
        .assert()
        .failure()
        .stderr(contains("no actions defined"));
    assert_eq!(fs::read_to_string(&file).unwrap(), "x");
}

#[test]
fn test_unknown_action_is_an_error() {
    cmd()
        .args(["--actions", "frobnicate", "."])
        .assert()
        .failure();
}

#[test]
fn test_legacy_action_names_are_accepted() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.cpp");
    fs::write(&file, "SLOT(f( int ))").unwrap();

    cmd()
        .args(["-a", "endswitheol,normalize"])
        .arg(&file)
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&file).unwrap(), "SLOT(f(int))\n");
}

#[test]
fn test_missing_path_is_reported_but_run_succeeds() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.cpp");
    fs::write(&file, "x").unwrap();

    cmd()
        .args(["--actions", "all"])
        .arg(&file)
        .arg(dir.path().join("missing.cpp"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(contains("missing.cpp: unknown file or directory"));
    assert_eq!(fs::read_to_string(&file).unwrap(), "x\n");
}

#[test]
fn test_dry_run_verbose_reports_without_writing() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.h"), "#include <x.h>\n#include \"x.h\"\n").unwrap();

    cmd()
        .args(["-rdv", "-a", "all"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(contains("Removing duplicate include \"x.h\" on line 2"));
    assert_eq!(
        fs::read_to_string(dir.path().join("a.h")).unwrap(),
        "#include <x.h>\n#include \"x.h\"\n"
    );
}

#[test]
fn test_json_report_goes_to_stdout() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.cpp"), "x").unwrap();
    fs::write(dir.path().join("b.txt"), "x").unwrap();

    let out = cmd()
        .args(["-r", "-a", "all", "-p", "*.cpp", "--report", "json"])
        .arg(dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["files_visited"], 1);
    assert_eq!(json["files_written"], 1);
}
