use crate::geometry::{GeometryCollection, InMemoryGeometry};
use crate::models::{BoundaryLevel, DataRow, SelectionId};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Default GeoJSON property holding the feature name.
pub const DEFAULT_NAME_PROPERTY: &str = "nom";

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    value: Option<f64>,
    #[serde(default)]
    highlight: Option<f64>,
    /// Raw JSON token; `{"feature": name}` when absent.
    #[serde(default)]
    selection_id: Option<String>,
}

/// Load rows from a CSV with header `name,value[,highlight][,selection_id]`.
///
/// Rows without a value are skipped.
pub fn load_rows_csv<P: AsRef<Path>>(path: P) -> Result<Vec<DataRow>> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    let mut rows = Vec::new();
    for (line, record) in rdr.deserialize::<CsvRow>().enumerate() {
        let record =
            record.with_context(|| format!("{}: bad record {}", path.display(), line + 1))?;
        let Some(value) = record.value else {
            warn!("{}: {:?} has no value, skipped", path.display(), record.name);
            continue;
        };
        let selection_id = match record.selection_id.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => SelectionId::new(
                serde_json::from_str(raw)
                    .with_context(|| format!("{}: invalid selection_id {raw:?}", path.display()))?,
            ),
            None => SelectionId::for_feature(&record.name),
        };
        rows.push(DataRow {
            name: record.name,
            value,
            highlight: record.highlight,
            selection_id,
        });
    }
    Ok(rows)
}

/// Load the host property bag (`{"map": {..}, "couleur": {..}, ..}`).
pub fn load_objects_json<P: AsRef<Path>>(path: P) -> Result<serde_json::Value> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings JSON: {}", path.display()))
}

/// Load one GeoJSON FeatureCollection as the collection for `level`.
pub fn load_geometry_file<P: AsRef<Path>>(
    path: P,
    level: BoundaryLevel,
    name_property: &str,
) -> Result<GeometryCollection> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read GeoJSON file: {}", path.display()))?;
    GeometryCollection::from_geojson_str(level, &content, name_property)
        .with_context(|| format!("Failed to decode {}", path.display()))
}

/// Load every `<level>.geojson` (or `<level>.json`) present in `dir`.
pub fn load_geometry_dir<P: AsRef<Path>>(dir: P, name_property: &str) -> Result<InMemoryGeometry> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        anyhow::bail!("geometry directory not found: {}", dir.display());
    }
    let mut provider = InMemoryGeometry::new();
    for level in BoundaryLevel::ALL {
        let candidates = [
            dir.join(format!("{}.geojson", level.name())),
            dir.join(format!("{}.json", level.name())),
        ];
        if let Some(path) = candidates.iter().find(|p| p.is_file()) {
            let collection = load_geometry_file(path, level, name_property)?;
            info!("{level}: {} feature(s) from {}", collection.len(), path.display());
            provider.insert(collection);
        }
    }
    Ok(provider)
}

/// Save any serializable value as pretty JSON.
pub fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let s = serde_json::to_string_pretty(value)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_rows_with_optional_columns() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("rows.csv");
        fs::write(
            &p,
            "name,value,highlight,selection_id\n\
             Bretagne,12.5,,\n\
             Normandie, 3 ,0,\n\
             Corse,,1,\n\
             Occitanie,7,1,\"{\"\"key\"\": 9}\"\n",
        )
        .unwrap();
        let rows = load_rows_csv(&p).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].selection_id, SelectionId::for_feature("Bretagne"));
        assert_eq!(rows[1].value, 3.0);
        assert_eq!(rows[1].highlight, Some(0.0));
        assert_eq!(rows[2].selection_id, SelectionId::new(serde_json::json!({"key": 9})));
    }

    #[test]
    fn missing_geometry_dir_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_geometry_dir(dir.path().join("nope"), DEFAULT_NAME_PROPERTY).is_err());
    }
}
