//! Integration tests for the bundlewire CLI
//!
//! These tests run the actual binary against program models in temp dirs.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn bundlewire_cmd() -> Command {
    Command::cargo_bin("bundlewire").unwrap()
}

const PROGRAM: &str = r#"
types:
  - name: com.example.BaseActivity
    fields:
      - name: theme
        type: java.lang.String
        annotations: [{ name: StringValue, value: theme }]
  - name: com.example.LoginActivity
    superclass: com.example.BaseActivity
    fields:
      - name: userId
        type: int
        annotations: [{ name: IntValue, value: user_id }, { name: Required }]
  - name: com.example.Bundles
    kind: interface
    methods:
      - name: login
        returns: android.os.Bundle
        parameters:
          - { name: id, type: int, annotations: [{ name: IntValue, value: a }, { name: Required }] }
          - { name: name, type: java.lang.String, annotations: [{ name: StringValue, value: b }] }
"#;

fn write_program(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("program.yaml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_help_flag() {
    bundlewire_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("annotation-driven bundle bindings"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_check_valid_program() {
    let dir = TempDir::new().unwrap();
    let program = write_program(&dir, PROGRAM);

    bundlewire_cmd()
        .current_dir(dir.path())
        .arg("check")
        .arg(&program)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 binding spec(s) resolved"))
        .stdout(predicate::str::contains("extends com.example.BaseActivity"));
}

#[test]
fn test_check_reports_diagnostics() {
    let dir = TempDir::new().unwrap();
    let program = write_program(
        &dir,
        r#"
types:
  - name: com.example.Host
    fields:
      - { name: a, type: int, annotations: [{ name: IntValue, value: k }] }
      - { name: b, type: int, annotations: [{ name: IntValue, value: k }] }
"#,
    );

    bundlewire_cmd()
        .current_dir(dir.path())
        .arg("check")
        .arg(&program)
        .assert()
        .failure()
        .stderr(predicate::str::contains("BW-110"))
        .stderr(predicate::str::contains("com.example.Host.b"))
        .stderr(predicate::str::contains("BW-033"));
}

#[test]
fn test_check_malformed_yaml() {
    let dir = TempDir::new().unwrap();
    let program = write_program(&dir, "types:\n  - name: [unclosed\n");

    bundlewire_cmd()
        .current_dir(dir.path())
        .arg("check")
        .arg(&program)
        .assert()
        .failure()
        .stderr(predicate::str::contains("BW-001"))
        .stderr(predicate::str::contains("Fix:"));
}

#[test]
fn test_generate_writes_binders() {
    let dir = TempDir::new().unwrap();
    let program = write_program(&dir, PROGRAM);
    let out = dir.path().join("gen");

    bundlewire_cmd()
        .current_dir(dir.path())
        .arg("generate")
        .arg(&program)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 binder(s) generated"));

    let source =
        fs::read_to_string(out.join("com/example/LoginActivity_BundleBinder.java")).unwrap();
    assert!(source.contains("com.example.BaseActivity_BundleBinder.bind(target, bundle);"));
    assert!(out.join("com/example/BaseActivity_BundleBinder.java").exists());
}

#[test]
fn test_generate_uses_config_suffix() {
    let dir = TempDir::new().unwrap();
    let program = write_program(&dir, PROGRAM);
    fs::write(
        dir.path().join("bundlewire.toml"),
        "[emitter]\nbinder_suffix = \"Binder\"\n",
    )
    .unwrap();

    bundlewire_cmd()
        .current_dir(dir.path())
        .args(["generate", "program.yaml", "--out", "gen"])
        .assert()
        .success();

    assert!(dir.path().join("gen/com/example/LoginActivityBinder.java").exists());
}

#[test]
fn test_invoke_prints_bundle() {
    let dir = TempDir::new().unwrap();
    let program = write_program(&dir, PROGRAM);

    bundlewire_cmd()
        .current_dir(dir.path())
        .arg("invoke")
        .arg(&program)
        .args(["com.example.Bundles", "login", "5", "\"x\""])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"a\": 5"))
        .stdout(predicate::str::contains("\"b\": \"x\""));
}

#[test]
fn test_invoke_missing_required() {
    let dir = TempDir::new().unwrap();
    let program = write_program(&dir, PROGRAM);

    bundlewire_cmd()
        .current_dir(dir.path())
        .arg("invoke")
        .arg(&program)
        .args(["com.example.Bundles", "login", "null", "\"x\""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("BW-021"))
        .stderr(predicate::str::contains("'a'"));
}

#[test]
fn test_invoke_argument_count() {
    let dir = TempDir::new().unwrap();
    let program = write_program(&dir, PROGRAM);

    bundlewire_cmd()
        .current_dir(dir.path())
        .arg("invoke")
        .arg(&program)
        .args(["com.example.Bundles", "login", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("BW-020"));
}

#[test]
fn test_invoke_rejects_classes() {
    let dir = TempDir::new().unwrap();
    let program = write_program(&dir, PROGRAM);

    bundlewire_cmd()
        .current_dir(dir.path())
        .arg("invoke")
        .arg(&program)
        .args(["com.example.LoginActivity", "login"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("BW-030"));
}
