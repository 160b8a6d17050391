use assert_cmd::prelude::*;
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
    let path = repo_root().join("fixtures").join("history").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

#[test]
fn cli_layout_prints_json() {
    let output = Command::cargo_bin("lanegraph-cli")
        .expect("binary")
        .args(["layout", fixture("merged_feature.json").to_string_lossy().as_ref()])
        .output()
        .expect("run");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["commits"], 6);
    assert_eq!(value["layout"]["width"], 48.0);
    assert_eq!(value["layout"]["points"].as_array().unwrap().len(), 6);
}

#[test]
fn cli_render_writes_svg_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("graph.svg");

    Command::cargo_bin("lanegraph-cli")
        .expect("binary")
        .args([
            "render",
            "--id",
            "history",
            "--out",
            out.to_string_lossy().as_ref(),
            fixture("truncated_window.json").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let svg = fs::read_to_string(&out).expect("read svg");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"id="history""#));
    assert!(svg.contains(r#"id="future_x1""#));
    assert!(svg.ends_with("</svg>"));
}

#[test]
fn cli_applies_config_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let cfg = tmp.path().join("config.json");
    fs::write(&cfg, r#"{ "graph": { "circleRadius": 3, "columnWidth": 20, "rowHeight": 10 } }"#).expect("write");

    let output = Command::cargo_bin("lanegraph-cli")
        .expect("binary")
        .args([
            "layout",
            "--config",
            cfg.to_string_lossy().as_ref(),
            fixture("merged_feature.json").to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["layout"]["width"], 60.0);
    assert_eq!(value["layout"]["height"], 60.0);
}

#[test]
fn cli_rejects_config_missing_required_sizes() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let cfg = tmp.path().join("config.json");
    fs::write(&cfg, r#"{ "graph": { "columnWidth": "wide" } }"#).expect("write");

    let output = Command::cargo_bin("lanegraph-cli")
        .expect("binary")
        .args([
            "layout",
            "--config",
            cfg.to_string_lossy().as_ref(),
            fixture("merged_feature.json").to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid render config"));
}

#[test]
fn cli_reports_dangling_children() {
    let path = fixture("dangling_child.json");

    let output = Command::cargo_bin("lanegraph-cli")
        .expect("binary")
        .arg(&path)
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not-loaded"));

    Command::cargo_bin("lanegraph-cli")
        .expect("binary")
        .args(["--lenient", path.to_string_lossy().as_ref()])
        .assert()
        .success();
}

#[test]
fn cli_usage_exits_with_code_2() {
    let output = Command::cargo_bin("lanegraph-cli")
        .expect("binary")
        .arg("--help")
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(2));
}
