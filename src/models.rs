use crate::color::Rgb;
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// Administrative granularity of a boundary collection, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryLevel {
    Regions,
    Departements,
    /// Employment zones (`zones_emploi`).
    #[serde(rename = "zones_emploi")]
    EmploymentZones,
    Arrondissements,
    Cantons,
    Communes,
    Iris,
}

impl BoundaryLevel {
    /// Every known level, coarsest to finest.
    pub const ALL: [BoundaryLevel; 7] = [
        BoundaryLevel::Regions,
        BoundaryLevel::Departements,
        BoundaryLevel::EmploymentZones,
        BoundaryLevel::Arrondissements,
        BoundaryLevel::Cantons,
        BoundaryLevel::Communes,
        BoundaryLevel::Iris,
    ];

    /// Geometry collection key, also the settings value (`"regions"`, …).
    pub fn name(&self) -> &'static str {
        match self {
            BoundaryLevel::Regions => "regions",
            BoundaryLevel::Departements => "departements",
            BoundaryLevel::EmploymentZones => "zones_emploi",
            BoundaryLevel::Arrondissements => "arrondissements",
            BoundaryLevel::Cantons => "cantons",
            BoundaryLevel::Communes => "communes",
            BoundaryLevel::Iris => "iris",
        }
    }
}

impl fmt::Display for BoundaryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a level name is not one of [`BoundaryLevel::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown boundary level: {0:?}")]
pub struct UnknownLevel(pub String);

impl FromStr for BoundaryLevel {
    type Err = UnknownLevel;

    /// Exact, case-sensitive match on the collection key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoundaryLevel::ALL
            .iter()
            .copied()
            .find(|level| level.name() == s)
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}

/// One named polygon set inside a level's collection. Geometry is shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryFeature {
    pub name: String,
    pub geometry: Arc<MultiPolygon<f64>>,
}

impl GeometryFeature {
    pub fn new(name: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            name: name.into(),
            geometry: Arc::new(geometry),
        }
    }
}

/// Selection identity token issued by the external selection authority.
///
/// Two tokens are equal when their canonical JSON serializations are equal,
/// so structurally identical tokens re-issued across renders still match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub struct SelectionId {
    value: serde_json::Value,
    canonical: String,
}

impl SelectionId {
    pub fn new(value: serde_json::Value) -> Self {
        let canonical = sorted_keys(&value).to_string();
        Self { value, canonical }
    }

    /// Token used by the CLI and tests: `{"feature": name}`.
    pub fn for_feature(name: &str) -> Self {
        Self::new(serde_json::json!({ "feature": name }))
    }

    /// Empty token, used for background context menus.
    pub fn empty() -> Self {
        Self::new(serde_json::Value::Null)
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }
}

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Copy of `value` with every object's keys inserted in sorted order and
/// integral floats written as integers, so `1.0` and `1` compare equal.
fn sorted_keys(value: &serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sorted_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted_keys).collect()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER => {
                Value::from(f as i64)
            }
            _ => value.clone(),
        },
        other => other.clone(),
    }
}

impl From<serde_json::Value> for SelectionId {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}

impl From<SelectionId> for serde_json::Value {
    fn from(id: SelectionId) -> Self {
        id.value
    }
}

impl PartialEq for SelectionId {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for SelectionId {}

impl Hash for SelectionId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

/// One tabular record from the host's data view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    pub name: String,
    pub value: f64,
    /// `None` when the host provides no highlight context.
    pub highlight: Option<f64>,
    pub selection_id: SelectionId,
}

impl DataRow {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        let name = name.into();
        let selection_id = SelectionId::for_feature(&name);
        Self {
            name,
            value,
            highlight: None,
            selection_id,
        }
    }

    pub fn with_highlight(mut self, highlight: f64) -> Self {
        self.highlight = Some(highlight);
        self
    }
}

/// Host highlight tri-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// No highlight context.
    None,
    NotHighlighted,
    Highlighted,
}

impl From<Option<f64>> for Highlight {
    fn from(h: Option<f64>) -> Self {
        match h {
            None => Highlight::None,
            Some(v) if v == 0.0 => Highlight::NotHighlighted,
            Some(_) => Highlight::Highlighted,
        }
    }
}

/// A drawable feature, assembled fresh on every rebuild.
///
/// Empty shapes (no matching row) carry no value, color or selection id.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub name: String,
    pub value: Option<f64>,
    pub color: Option<Rgb>,
    pub highlight: Option<f64>,
    pub selection_id: Option<SelectionId>,
    pub map_data: Arc<MultiPolygon<f64>>,
}

impl DataPoint {
    pub fn is_empty_shape(&self) -> bool {
        self.value.is_none()
    }

    pub fn highlight_state(&self) -> Highlight {
        Highlight::from(self.highlight)
    }
}

/// Observed value extremes over matched rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

/// Result of joining rows to one level's geometry.
///
/// `data` and `empty_shape` partition the level's collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataModel {
    pub level: Option<BoundaryLevel>,
    pub data: Vec<DataPoint>,
    pub empty_shape: Vec<DataPoint>,
    /// `None` when no row matched.
    pub range: Option<ValueRange>,
}

impl DataModel {
    pub fn min_value(&self) -> Option<f64> {
        self.range.map(|r| r.min)
    }

    pub fn max_value(&self) -> Option<f64> {
        self.range.map(|r| r.max)
    }

    /// Features carrying a value (matched rows).
    pub fn matched(&self) -> impl Iterator<Item = &DataPoint> {
        self.data.iter().filter(|p| !p.is_empty_shape())
    }

    pub fn matched_count(&self) -> usize {
        self.matched().count()
    }

    pub fn feature_count(&self) -> usize {
        self.data.len() + self.empty_shape.len()
    }
}
