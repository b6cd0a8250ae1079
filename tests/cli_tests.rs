//! CLI integration tests
//!
//! These tests verify the CLI commands work correctly by running the binary.

#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::Command;

fn ogc_schema_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ogc-schema"))
}

fn fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path.to_string_lossy().into_owned()
}

// ============================================================================
// Inspect Command Tests
// ============================================================================

#[test]
fn test_cli_inspect_collection() {
    let output = Command::new(ogc_schema_bin())
        .args(["inspect", &fixture("parcels.gml")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "inspect should succeed");
    assert!(stdout.contains("ogc-schema"), "should show version");
    assert!(stdout.contains("Members: 2"), "should count members");
    assert!(stdout.contains("parcel.2"), "should list member ids");
}

#[test]
fn test_cli_inspect_json_output() {
    let output = Command::new(ogc_schema_bin())
        .args(["inspect", "--json", &fixture("large_parcels.filter.xml")])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "inspect --json should succeed");
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("output should be valid JSON");
    assert_eq!(json["kind"], "Filter");
    assert!(json["value"]["comparison"].is_object());
}

#[test]
fn test_cli_inspect_missing_file() {
    let output = Command::new(ogc_schema_bin())
        .args(["inspect", "no/such/file.gml"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "missing file should fail");
}

// ============================================================================
// Bounds, Roundtrip and Filter Command Tests
// ============================================================================

#[test]
fn test_cli_bounds() {
    let output = Command::new(ogc_schema_bin())
        .args(["bounds", &fixture("parcels.gml")])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "bounds should succeed");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "0 0 20 20");
}

#[test]
fn test_cli_roundtrip_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.gml");

    let output = Command::new(ogc_schema_bin())
        .args(["roundtrip", &fixture("parcels.gml"), "-o", out.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "roundtrip should succeed");
    let written = std::fs::read_to_string(&out).unwrap();
    let doc = roxmltree::Document::parse(&written).expect("output should be well formed");
    assert_eq!(doc.root_element().tag_name().name(), "FeatureCollection");
    assert!(written.contains("parcel.1"));
}

#[test]
fn test_cli_filter() {
    let output = Command::new(ogc_schema_bin())
        .args([
            "filter",
            &fixture("large_parcels.filter.xml"),
            &fixture("parcels.gml"),
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "filter should succeed");
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["parcel.1"]);
}
