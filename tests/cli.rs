use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn write_fixture(dir: &Path) {
    let square = |name: &str, x: f64, y: f64| {
        format!(
            r#"{{"type":"Feature","properties":{{"nom":"{name}"}},"geometry":{{"type":"Polygon","coordinates":[[[{x},{y}],[{x1},{y}],[{x1},{y1}],[{x},{y1}],[{x},{y}]]]}}}}"#,
            x1 = x + 1.0,
            y1 = y + 1.0
        )
    };
    let maps = dir.join("maps");
    fs::create_dir(&maps).unwrap();
    fs::write(
        maps.join("regions.geojson"),
        format!(
            r#"{{"type":"FeatureCollection","features":[{},{},{}]}}"#,
            square("Bretagne", -4.0, 47.5),
            square("Normandie", -1.0, 48.5),
            square("Pays", -2.0, 47.0)
        ),
    )
    .unwrap();
    fs::write(dir.join("rows.csv"), "name,value\nBretagne,10\nNormandie,40\n").unwrap();
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("choro").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("choro"));
}

#[test]
fn levels_lists_every_boundary_level() {
    let mut cmd = Command::cargo_bin("choro").unwrap();
    cmd.arg("levels");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("regions"))
        .stdout(predicate::str::contains("zones_emploi"))
        .stdout(predicate::str::contains("iris"));
}

#[test]
fn render_writes_svg_and_dump() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let out = dir.path().join("map.svg");
    let dump = dir.path().join("frame.json");

    let mut cmd = Command::cargo_bin("choro").unwrap();
    cmd.arg("render")
        .arg("--geometry")
        .arg(dir.path().join("maps"))
        .arg("--data")
        .arg(dir.path().join("rows.csv"))
        .arg("--out")
        .arg(&out)
        .arg("--dump")
        .arg(&dump)
        .args(["--select", "Bretagne", "--select", "Normandie"]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("2 of 3 feature(s) with data"));

    assert!(fs::read_to_string(&out).unwrap().starts_with("<svg"));
    let frame: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&dump).unwrap()).unwrap();
    assert_eq!(frame["kind"], "map");
    assert_eq!(frame["level"], "regions");
    let kinds: Vec<&str> = frame["features"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| !f["value"].is_null())
        .map(|f| f["style"]["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["selected", "selected"]);
}

#[test]
fn render_with_settings_and_drill_level() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let settings = dir.path().join("settings.json");
    fs::write(&settings, r#"{"map": {"level2": "regions"}, "scale": {"show": false}}"#).unwrap();
    let out = dir.path().join("map.png");

    let mut cmd = Command::cargo_bin("choro").unwrap();
    cmd.arg("render")
        .arg("--geometry")
        .arg(dir.path().join("maps"))
        .arg("--data")
        .arg(dir.path().join("rows.csv"))
        .arg("--settings")
        .arg(&settings)
        .args(["--drill-level", "1"])
        .arg("--out")
        .arg(&out);
    cmd.assert().success();
    assert!(fs::metadata(&out).unwrap().len() > 0);
}

#[test]
fn render_fails_without_geometry_dir() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let mut cmd = Command::cargo_bin("choro").unwrap();
    cmd.arg("render")
        .arg("--geometry")
        .arg(dir.path().join("missing"))
        .arg("--data")
        .arg(dir.path().join("rows.csv"))
        .arg("--out")
        .arg(dir.path().join("map.svg"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("geometry directory not found"));
}

#[test]
fn properties_prints_enumeration() {
    let mut cmd = Command::cargo_bin("choro").unwrap();
    cmd.args(["properties", "--object", "scale"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"objectName\": \"scale\""))
        .stdout(predicate::str::contains("\"validValues\""));
}

#[test]
fn properties_rejects_unknown_object() {
    let mut cmd = Command::cargo_bin("choro").unwrap();
    cmd.args(["properties", "--object", "legend"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown object"));
}
