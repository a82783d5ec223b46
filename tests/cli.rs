use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const FIGURE: &str = r##"{
  "width": 4.0,
  "height": 3.0,
  "dpi": 100,
  "axes": [{
    "primitives": [
      {"kind": "line", "data": [[13.4, 52.5], [2.35, 48.86]], "color": "#ff0000"},
      {"kind": "text", "position": [13.4, 52.5], "text": "Berlin"}
    ]
  }]
}"##;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("spatplot").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("spatplot"))
        .stdout(predicate::str::contains("render"));
}

#[test]
fn cli_lists_tile_providers() {
    let mut cmd = Command::cargo_bin("spatplot").unwrap();
    cmd.arg("tiles");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("osm"))
        .stdout(predicate::str::contains("esri_natgeo"));
}

#[test]
fn cli_renders_html_page() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("fig.json");
    let out = dir.path().join("map.html");
    fs::write(&input, FIGURE).unwrap();

    let mut cmd = Command::cargo_bin("spatplot").unwrap();
    cmd.arg("render")
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .args(["--tiles", "cartodb_positron", "--template", "notebook"]);
    cmd.assert().success();

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("basemaps.cartocdn.com/light_all"));
    assert!(html.contains("height:300px;"));
    assert!(html.contains(r##""color":"#FF0000""##));
}

#[test]
fn cli_prints_geojson_with_precision() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("fig.json");
    fs::write(&input, FIGURE).unwrap();

    let mut cmd = Command::cargo_bin("spatplot").unwrap();
    cmd.arg("geojson").arg(&input).args(["--precision", "1"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with(r#"{"type":"FeatureCollection""#))
        .stdout(predicate::str::contains("[[13.4,52.5],[2.4,48.9]]"));
}

#[test]
fn cli_rejects_unknown_tiles() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("fig.json");
    fs::write(&input, FIGURE).unwrap();

    let mut cmd = Command::cargo_bin("spatplot").unwrap();
    cmd.arg("render")
        .arg(&input)
        .arg("--out")
        .arg(dir.path().join("x.html"))
        .args(["--tiles", "mapquest"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown tile provider"));
}

#[test]
fn cli_rejects_crs_with_epsg() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("fig.json");
    fs::write(&input, FIGURE).unwrap();

    let mut cmd = Command::cargo_bin("spatplot").unwrap();
    cmd.arg("geojson")
        .arg(&input)
        .args(["--crs", "EPSG:4326", "--epsg", "4326"]);
    cmd.assert().failure();
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn cli_embeds_leaflet_assets() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("fig.json");
    let out = dir.path().join("map.html");
    fs::write(&input, FIGURE).unwrap();

    let mut cmd = Command::cargo_bin("spatplot").unwrap();
    cmd.arg("render")
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .arg("--embed-links");
    cmd.assert().success();

    let html = fs::read_to_string(&out).unwrap();
    assert!(!html.contains("<script src="));
    assert!(html.contains(".leaflet-container"));
}
