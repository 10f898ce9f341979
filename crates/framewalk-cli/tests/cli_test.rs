use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join("snapshots").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn run_json(args: &[&str]) -> Value {
    let exe = assert_cmd::cargo_bin!("framewalk-cli");
    let out = Command::new(exe)
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&out).expect("stdout is JSON")
}

#[test]
fn cli_resolves_rotated_parent() {
    let path = fixture("rotated_parent.json");
    let json = run_json(&["resolve", "--target", "target", path.to_string_lossy().as_ref()]);

    assert_eq!(json["width"], 100.0);
    assert_eq!(json["direction"], 1);
    let rotation = json["rotation"].as_f64().unwrap();
    assert!((rotation - 30f64.to_radians()).abs() < 1e-4, "{rotation}");
    assert_eq!(json["all_matrix"].as_array().unwrap().len(), 9);
}

#[test]
fn cli_target_info_includes_client_rects() {
    let path = fixture("rotated_parent.json");
    let json = run_json(&[
        "--target",
        "target",
        "--target-info",
        "--pretty",
        path.to_string_lossy().as_ref(),
    ]);

    assert_eq!(json["container_client_rect"]["width"], 800.0);
    assert_eq!(json["target_client_rect"]["height"], 93.3);
    assert!(json.get("before_origin").is_some());
}

#[test]
fn cli_walk_prints_resolved_entries_with_ids() {
    let path = fixture("svg_canvas.json");
    let json = run_json(&["walk", "--target", "shape", path.to_string_lossy().as_ref()]);

    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[0]["node"], "canvas");
    assert_eq!(entries[0]["type"], "offset");
    assert_eq!(entries[5]["node"], "shape");
    assert!(entries.iter().all(|e| e["type"] != "svg_pending_offset"));
}

#[test]
fn cli_reads_config_and_stdin() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("options.json");
    fs::write(&config, r#"{ "force_3d": true }"#).expect("write config");
    let snapshot = fs::read(fixture("rotated_parent.json")).expect("read fixture");

    let exe = assert_cmd::cargo_bin!("framewalk-cli");
    let out = assert_cmd::Command::new(exe)
        .args([
            "--target",
            "target",
            "--config",
            config.to_string_lossy().as_ref(),
            "-",
        ])
        .write_stdin(snapshot)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&out).expect("stdout is JSON");

    assert_eq!(json["is_3d"], true);
    assert_eq!(json["all_matrix"].as_array().unwrap().len(), 16);
}

#[test]
fn cli_unknown_target_fails() {
    let path = fixture("rotated_parent.json");
    let exe = assert_cmd::cargo_bin!("framewalk-cli");
    Command::new(exe)
        .args(["--target", "nope", path.to_string_lossy().as_ref()])
        .assert()
        .code(1);
}

#[test]
fn cli_walk_without_target_is_a_usage_error() {
    let path = fixture("rotated_parent.json");
    let exe = assert_cmd::cargo_bin!("framewalk-cli");
    Command::new(exe)
        .args(["walk", path.to_string_lossy().as_ref()])
        .assert()
        .code(2);
}
