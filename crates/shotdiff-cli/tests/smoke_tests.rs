//! Smoke tests for the shotdiff CLI
//!
//! Exit codes: 0 identical, 1 different, 2 error.

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command for the shotdiff binary
fn shotdiff() -> Command {
    Command::cargo_bin("shotdiff").expect("shotdiff binary should exist")
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba(color))
        .save(&path)
        .expect("write png");
    path
}

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    shotdiff()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    shotdiff()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compare"))
        .stdout(predicate::str::contains("compare-dir"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_fails() {
    shotdiff().assert().failure();
}

#[test]
fn test_compare_help_lists_options() {
    shotdiff()
        .args(["compare", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--threshold"))
        .stdout(predicate::str::contains("--header-height"))
        .stdout(predicate::str::contains("--include-aa"));
}

// ============================================================================
// compare
// ============================================================================

#[test]
fn test_compare_identical_exits_zero() {
    let dir = TempDir::new().unwrap();
    let a = write_png(dir.path(), "a.png", 16, 16, WHITE);
    let b = write_png(dir.path(), "b.png", 16, 16, WHITE);

    shotdiff()
        .args(["--color", "never", "compare"])
        .arg(&a)
        .arg(&b)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("identical"));
}

#[test]
fn test_compare_different_exits_one_and_writes_diff() {
    let dir = TempDir::new().unwrap();
    let a = write_png(dir.path(), "a.png", 16, 16, WHITE);
    let b = write_png(dir.path(), "b.png", 16, 16, BLACK);
    let diff = dir.path().join("out").join("diff.png");

    shotdiff()
        .args(["--color", "never", "compare"])
        .arg(&a)
        .arg(&b)
        .arg("--diff-out")
        .arg(&diff)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("256 pixels differ"));

    let written = image::open(&diff).expect("diff image").to_rgba8();
    assert_eq!(written.dimensions(), (16, 16));
}

#[test]
fn test_compare_dimension_mismatch_exits_two() {
    let dir = TempDir::new().unwrap();
    let a = write_png(dir.path(), "a.png", 100, 100, WHITE);
    let b = write_png(dir.path(), "b.png", 100, 200, WHITE);

    shotdiff()
        .arg("compare")
        .arg(&a)
        .arg(&b)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("100x100"))
        .stderr(predicate::str::contains("100x200"));
}

#[test]
fn test_compare_missing_file_exits_two() {
    let dir = TempDir::new().unwrap();
    let a = write_png(dir.path(), "a.png", 4, 4, WHITE);

    shotdiff()
        .arg("compare")
        .arg(&a)
        .arg(dir.path().join("missing.png"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing.png"));
}

#[test]
fn test_compare_header_crop_hides_status_bar() {
    let dir = TempDir::new().unwrap();
    let mut first = RgbaImage::from_pixel(10, 10, Rgba(WHITE));
    let second = first.clone();
    for x in 0..10 {
        first.put_pixel(x, 0, Rgba(BLACK));
        first.put_pixel(x, 1, Rgba(BLACK));
    }
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    first.save(&a).unwrap();
    second.save(&b).unwrap();

    shotdiff().arg("compare").arg(&a).arg(&b).assert().code(1);
    shotdiff()
        .arg("compare")
        .arg(&a)
        .arg(&b)
        .args(["--header-height", "2"])
        .assert()
        .code(0);
}

#[test]
fn test_compare_crop_taller_than_image_exits_two() {
    let dir = TempDir::new().unwrap();
    let a = write_png(dir.path(), "a.png", 4, 4, WHITE);
    let b = write_png(dir.path(), "b.png", 4, 4, WHITE);

    shotdiff()
        .arg("compare")
        .arg(&a)
        .arg(&b)
        .args(["--header-height", "4"])
        .assert()
        .code(2);
}

#[test]
fn test_compare_invalid_threshold_exits_two() {
    let dir = TempDir::new().unwrap();
    let a = write_png(dir.path(), "a.png", 4, 4, WHITE);

    shotdiff()
        .arg("compare")
        .arg(&a)
        .arg(&a)
        .args(["--threshold", "1.5"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("threshold"));
}

#[test]
fn test_compare_json_output() {
    let dir = TempDir::new().unwrap();
    let a = write_png(dir.path(), "a.png", 8, 8, WHITE);
    let b = write_png(dir.path(), "b.png", 8, 8, BLACK);

    let output = shotdiff()
        .arg("compare")
        .arg(&a)
        .arg(&b)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["are_different"], true);
    assert_eq!(json["diff_pixel_count"], 64);
}

// ============================================================================
// compare-dir
// ============================================================================

#[test]
fn test_compare_dir_reports_each_file() {
    let base = TempDir::new().unwrap();
    let new = TempDir::new().unwrap();
    let diffs = base.path().join("diffs");

    write_png(base.path(), "home.png", 8, 8, WHITE);
    write_png(new.path(), "home.png", 8, 8, WHITE);
    write_png(base.path(), "login.png", 8, 8, WHITE);
    write_png(new.path(), "login.png", 8, 8, BLACK);

    shotdiff()
        .args(["--color", "never", "compare-dir"])
        .arg(base.path())
        .arg(new.path())
        .arg("--diff-dir")
        .arg(&diffs)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("home.png: identical"))
        .stdout(predicate::str::contains("login.png"))
        .stdout(predicate::str::contains("1 identical, 1 different, 0 errors"));

    assert!(fs::metadata(diffs.join("login.png")).is_ok());
    assert!(fs::metadata(diffs.join("home.png")).is_err());
}

#[test]
fn test_compare_dir_all_identical_exits_zero() {
    let base = TempDir::new().unwrap();
    let new = TempDir::new().unwrap();
    write_png(base.path(), "a.png", 4, 4, BLACK);
    write_png(new.path(), "a.png", 4, 4, BLACK);

    shotdiff()
        .arg("compare-dir")
        .arg(base.path())
        .arg(new.path())
        .assert()
        .code(0);
}

#[test]
fn test_compare_dir_missing_directory_exits_two() {
    let base = TempDir::new().unwrap();
    write_png(base.path(), "a.png", 4, 4, WHITE);
    write_png(base.path(), "b.png", 4, 4, WHITE);

    shotdiff()
        .args(["-q", "compare-dir"])
        .arg(base.path())
        .arg(base.path().join("does-not-exist"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a directory"));

    shotdiff()
        .arg("compare-dir")
        .arg(base.path().join("nope"))
        .arg(base.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn test_compare_dir_missing_counterpart_exits_one() {
    let base = TempDir::new().unwrap();
    let new = TempDir::new().unwrap();
    write_png(base.path(), "a.png", 4, 4, WHITE);
    write_png(new.path(), "a.png", 4, 4, WHITE);
    write_png(base.path(), "gone.png", 4, 4, WHITE);

    shotdiff()
        .args(["--color", "never", "-q", "compare-dir"])
        .arg(base.path())
        .arg(new.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("gone.png: no candidate"))
        .stdout(predicate::str::contains("1 identical, 0 different, 1 errors"));
}

// ============================================================================
// config
// ============================================================================

#[test]
fn test_config_prints_defaults() {
    let dir = TempDir::new().unwrap();
    shotdiff()
        .current_dir(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("threshold: 0.1"))
        .stdout(predicate::str::contains("__baselines__"));
}

#[test]
fn test_config_file_platform_is_used() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("shotdiff.yaml");
    fs::write(&config, "threshold: 0.2\nplatforms:\n  ios:\n    header_height: 2\n").unwrap();

    shotdiff()
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("threshold: 0.2"))
        .stdout(predicate::str::contains("ios"));

    let mut first = RgbaImage::from_pixel(6, 6, Rgba(WHITE));
    let second = first.clone();
    for x in 0..6 {
        first.put_pixel(x, 0, Rgba(BLACK));
    }
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    first.save(&a).unwrap();
    second.save(&b).unwrap();

    shotdiff()
        .arg("--config")
        .arg(&config)
        .arg("compare")
        .arg(&a)
        .arg(&b)
        .args(["--platform", "ios"])
        .assert()
        .code(0);

    shotdiff()
        .arg("--config")
        .arg(&config)
        .arg("compare")
        .arg(&a)
        .arg(&b)
        .args(["--platform", "android"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown platform"));
}
