use choropleth_rs::storage;
use choropleth_rs::{BoundaryLevel, GeometryProvider};
use std::fs;
use tempfile::tempdir;

fn feature(props: &str, x: f64, y: f64) -> String {
    format!(
        r#"{{"type":"Feature","properties":{props},"geometry":{{"type":"Polygon","coordinates":[[[{x},{y}],[{x1},{y}],[{x1},{y1}],[{x},{y1}],[{x},{y}]]]}}}}"#,
        x1 = x + 0.5,
        y1 = y + 0.5
    )
}

fn collection(features: &[String]) -> String {
    format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","))
}

#[test]
fn geometry_dir_loads_known_levels_only() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("regions.geojson"),
        collection(&[
            feature(r#"{"nom":"Bretagne"}"#, -3.0, 48.0),
            feature(r#"{"nom":"Normandie"}"#, 0.0, 49.0),
            feature(r#"{"code":"53"}"#, 1.0, 47.0),
        ]),
    )
    .unwrap();
    fs::write(
        dir.path().join("departements.json"),
        collection(&[feature(r#"{"nom":29}"#, -4.0, 48.0)]),
    )
    .unwrap();
    fs::write(dir.path().join("provinces.geojson"), collection(&[])).unwrap();

    let geometry = storage::load_geometry_dir(dir.path(), storage::DEFAULT_NAME_PROPERTY).unwrap();
    assert_eq!(
        geometry.levels(),
        vec![BoundaryLevel::Regions, BoundaryLevel::Departements]
    );
    // Features without a name are skipped.
    let regions = geometry.collection(BoundaryLevel::Regions).unwrap();
    assert_eq!(regions.len(), 2);
    let deps = geometry.collection(BoundaryLevel::Departements).unwrap();
    assert_eq!(deps.features[0].name, "29");
}

#[test]
fn custom_name_property() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("regions.geojson");
    fs::write(&path, collection(&[feature(r#"{"code":"53"}"#, 1.0, 47.0)])).unwrap();
    let regions = storage::load_geometry_file(&path, BoundaryLevel::Regions, "code").unwrap();
    assert_eq!(regions.features[0].name, "53");
}

#[test]
fn non_collection_geojson_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("regions.geojson");
    fs::write(&path, feature(r#"{"nom":"x"}"#, 0.0, 0.0)).unwrap();
    assert!(storage::load_geometry_file(&path, BoundaryLevel::Regions, "nom").is_err());
}

#[test]
fn settings_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let objects = serde_json::json!({"couleur": {"colorRange": 8}, "scale": {"show": false}});
    storage::save_json(&objects, &path).unwrap();
    assert_eq!(storage::load_objects_json(&path).unwrap(), objects);
}

#[test]
fn rows_csv_rejects_bad_numbers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rows.csv");
    fs::write(&path, "name,value\nBretagne,abc\n").unwrap();
    assert!(storage::load_rows_csv(&path).is_err());
}
