//! Integration tests for `ivo slice` CLI behavior.

use std::fs;
use std::process::Command;

fn ivo_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ivo"))
}

// ── Helper: build a small fixture repo ──────────────────────

fn fixture_repo() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("create temp repo");
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("src/auth.rs"),
        "pub fn login(user: &str) -> bool {\n    // auth token check\n    true\n}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("Cargo.toml"),
        "[package]\nname = \"fixture\"\nversion = \"0.1.0\"\n",
    )
    .unwrap();
    dir
}

// ── XML output ──────────────────────────────────────────────

#[test]
fn slice_emits_xml_bundle() {
    let repo = fixture_repo();
    let out = ivo_bin()
        .args([
            "slice",
            "--task",
            "auth login",
            "--root",
            repo.path().to_str().unwrap(),
            "--budget",
            "4000",
            "--strategies",
            "keyword,config",
        ])
        .output()
        .expect("run ivo slice");

    assert!(out.status.success(), "exit 0: {:?}", out);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(stdout.contains("<ivo_context version=\"1.0\""));
    assert!(stdout.contains("src/auth.rs"));
}

#[test]
fn slice_emits_json_on_request() {
    let repo = fixture_repo();
    let out = ivo_bin()
        .args([
            "slice",
            "--task",
            "auth",
            "--root",
            repo.path().to_str().unwrap(),
            "--budget",
            "4000",
            "--format",
            "json",
        ])
        .output()
        .expect("run ivo slice");

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(parsed["version"], "1.0");
}

// ── Error mapping ───────────────────────────────────────────

#[test]
fn invalid_budget_maps_to_exit_2() {
    let repo = fixture_repo();
    let out = ivo_bin()
        .args([
            "slice",
            "--task",
            "auth",
            "--root",
            repo.path().to_str().unwrap(),
            "--budget",
            "10",
        ])
        .output()
        .expect("run ivo slice");

    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty(), "nothing on stdout for errors");
}

#[test]
fn missing_root_maps_to_exit_3() {
    let out = ivo_bin()
        .args([
            "slice",
            "--task",
            "auth",
            "--root",
            "/definitely/not/a/repo",
            "--budget",
            "4000",
        ])
        .output()
        .expect("run ivo slice");

    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn unknown_strategy_maps_to_exit_2() {
    let repo = fixture_repo();
    let out = ivo_bin()
        .args([
            "slice",
            "--task",
            "auth",
            "--root",
            repo.path().to_str().unwrap(),
            "--budget",
            "4000",
            "--strategies",
            "telepathy",
        ])
        .output()
        .expect("run ivo slice");

    assert_eq!(out.status.code(), Some(2));
}
