//! Integration tests for the covgrid binary
//!
//! Every command runs offline: catalog data comes from `--items` files.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn covgrid(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_covgrid"))
        .args(args)
        .current_dir(dir)
        .env_remove("PL_API_KEY")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute covgrid")
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({}): {}", e, stdout))
}

fn write_json(dir: &Path, name: &str, value: Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, value.to_string()).unwrap();
    path
}

fn square(x0: f64, y0: f64, side: f64) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[x0, y0], [x0 + side, y0], [x0 + side, y0 + side], [x0, y0 + side], [x0, y0]]]
    })
}

fn fixture() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let aoi = write_json(dir.path(), "aoi.geojson", json!({"type": "Feature", "properties": {}, "geometry": square(15.0, 0.001, 0.01)}));
    let items = write_json(
        dir.path(),
        "items.geojson",
        json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": "a", "geometry": square(14.9, -0.1, 0.3), "properties": {"cloud_cover": 0.0}},
                {"type": "Feature", "id": "b", "geometry": square(14.9, -0.1, 0.3), "properties": {"cloud_cover": 0.5}},
                {"type": "Feature", "id": "c", "geometry": square(30.0, 10.0, 0.3), "properties": {"cloud_cover": 0.0}}
            ]
        }),
    );
    (dir, aoi, items)
}

#[test]
fn test_zone_json() {
    let (dir, aoi, _) = fixture();
    let output = covgrid(dir.path(), &["zone", aoi.to_str().unwrap(), "--json"]);
    assert!(output.status.success());

    let parsed = stdout_json(&output);
    assert_eq!(parsed["status"], "success");
    assert_eq!(parsed["data"]["zone"]["zone"], 33);
    assert_eq!(parsed["data"]["zone"]["hemisphere"], "north");
    assert_eq!(parsed["data"]["epsg"], 32633);
}

#[test]
fn test_grid_rejects_tiny_aoi() {
    let dir = TempDir::new().unwrap();
    let aoi = write_json(dir.path(), "tiny.geojson", square(15.0, 0.0, 0.0001));

    let output = covgrid(dir.path(), &["grid", aoi.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("AOI too small"), "{}", stderr);
}

#[test]
fn test_coverage_offline() {
    let (dir, aoi, items) = fixture();
    let output = covgrid(
        dir.path(),
        &["coverage", aoi.to_str().unwrap(), "--items", items.to_str().unwrap(), "--json"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let parsed = stdout_json(&output);
    let data = &parsed["data"];
    assert_eq!(data["item_ids"], json!(["a", "b"]));
    assert_eq!(data["summary"]["min"], 2);
    assert_eq!(data["summary"]["max"], 2);
    assert_eq!(data["non_empty_overlaps"], 2);
}

#[test]
fn test_coverage_writes_report() {
    let (dir, aoi, items) = fixture();
    let report = dir.path().join("report.json");
    let output = covgrid(
        dir.path(),
        &[
            "coverage",
            aoi.to_str().unwrap(),
            "--items",
            items.to_str().unwrap(),
            "--max-cloud",
            "0.1",
            "--max-cells",
            "20",
            "--output",
            report.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Histogram"));

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(saved["item_ids"], json!(["a"]));
    assert_eq!(saved["dimensions"], json!({"rows": 20, "cols": 20}));
    assert_eq!(saved["grid"]["rows"], 20);
}

#[test]
fn test_search_save_round_trip() {
    let (dir, aoi, items) = fixture();
    let saved = dir.path().join("saved.geojson");
    let output = covgrid(
        dir.path(),
        &[
            "search",
            aoi.to_str().unwrap(),
            "--items",
            items.to_str().unwrap(),
            "--save",
            saved.to_str().unwrap(),
            "--json",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_json(&output)["data"]["count"], 2);

    let again = covgrid(
        dir.path(),
        &["search", aoi.to_str().unwrap(), "--items", saved.to_str().unwrap(), "--json"],
    );
    let parsed = stdout_json(&again);
    let ids: Vec<&str> = parsed["data"]["items"].as_array().unwrap().iter().map(|i| i["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn test_config_redacts_key() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("covgrid.toml"), "[grid]\nmax_cells = 100\n").unwrap();

    let output = covgrid(dir.path(), &["config", "--api-key", "secret", "--json"]);
    assert!(output.status.success());

    let parsed = stdout_json(&output);
    let rows = parsed["data"].as_array().unwrap();
    let row = |key: &str| rows.iter().find(|r| r["key"] == key).unwrap().clone();

    assert_eq!(row("api_key")["value"], "********");
    assert_eq!(row("api_key")["source"], "Cli");
    assert_eq!(row("max_cells")["value"], "100");
    assert_eq!(row("max_cells")["source"], "File");
    assert_eq!(row("min_cells")["source"], "Default");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("secret"));
}

#[test]
fn test_search_without_key_fails() {
    let (dir, aoi, _) = fixture();
    let output = covgrid(dir.path(), &["search", aoi.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("api_key"), "{}", stderr);
}
