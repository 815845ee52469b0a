//! Joins tabular rows to the active level's geometry.

use crate::color::{ColorError, ColorScale, Rgb, ValueDomain};
use crate::geometry::{GeometryCollection, GeometryProvider};
use crate::models::{BoundaryLevel, DataModel, DataPoint, DataRow, ValueRange};
use crate::settings::VisualSettings;
use ahash::AHashMap;
use log::{debug, warn};

/// Build the model for `level`, fetching its collection from `provider`.
///
/// A missing collection yields an empty model; rows are still reported as dropped.
pub fn build_for_level<G: GeometryProvider + ?Sized>(
    level: BoundaryLevel,
    rows: &[DataRow],
    provider: &G,
    settings: &VisualSettings,
) -> Result<DataModel, ColorError> {
    match provider.collection(level) {
        Some(collection) => build_data_model(rows, collection, settings),
        None => {
            warn!("no geometry for level {level}, {} row(s) cannot render", rows.len());
            Ok(DataModel {
                level: Some(level),
                ..DataModel::default()
            })
        }
    }
}

/// Partition `collection` into matched features (in `data`) and unmatched ones
/// (in `empty_shape`), resolving each matched value to a scale color.
///
/// Names match exactly. Rows naming no feature, rows with non-finite values and
/// repeated names after the first are dropped.
pub fn build_data_model(
    rows: &[DataRow],
    collection: &GeometryCollection,
    settings: &VisualSettings,
) -> Result<DataModel, ColorError> {
    let mut by_name: AHashMap<&str, &DataRow> = AHashMap::with_capacity(rows.len());
    for row in rows {
        if !row.value.is_finite() {
            warn!("dropping row {:?}: non-finite value {}", row.name, row.value);
            continue;
        }
        if by_name.contains_key(row.name.as_str()) {
            warn!("dropping duplicate row {:?}", row.name);
            continue;
        }
        by_name.insert(row.name.as_str(), row);
    }

    let range = collection
        .features
        .iter()
        .filter_map(|f| by_name.get(f.name.as_str()))
        .map(|row| row.value)
        .fold(None, |acc: Option<ValueRange>, v| match acc {
            None => Some(ValueRange { min: v, max: v }),
            Some(r) => Some(ValueRange {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        });

    let scale = settings.color_scale_spec().to_scale()?;
    let domain = range.map(|r| settings.value_domain(r));

    let mut data = Vec::new();
    let mut empty_shape = Vec::new();
    for feature in &collection.features {
        match by_name.remove(feature.name.as_str()) {
            Some(row) => {
                let color = match domain {
                    Some(d) => Some(color_for(&scale, &d, row.value)?),
                    None => None,
                };
                data.push(DataPoint {
                    name: feature.name.clone(),
                    value: Some(row.value),
                    color,
                    highlight: row.highlight,
                    selection_id: Some(row.selection_id.clone()),
                    map_data: feature.geometry.clone(),
                });
            }
            None => empty_shape.push(DataPoint {
                name: feature.name.clone(),
                value: None,
                color: None,
                highlight: None,
                selection_id: None,
                map_data: feature.geometry.clone(),
            }),
        }
    }

    if !by_name.is_empty() {
        debug!(
            "{}: {} row(s) match no feature: {:?}",
            collection.level,
            by_name.len(),
            by_name.keys().take(5).collect::<Vec<_>>()
        );
    }

    Ok(DataModel {
        level: Some(collection.level),
        data,
        empty_shape,
        range,
    })
}

/// Clamped bucket lookup; never asks the scale for an out-of-range index.
pub fn color_for(
    scale: &ColorScale,
    domain: &ValueDomain,
    value: f64,
) -> Result<Rgb, ColorError> {
    let bucket = domain.bucket(value, scale.len());
    scale.get_color(bucket)
}
