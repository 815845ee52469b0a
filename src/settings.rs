//! Visual settings resolved from the host's property bag.
//!
//! The host hands over loosely typed objects grouped by pane section
//! (`map`, `couleur`, `scale`, `tooltip`). They are read once per update into
//! the fixed [`VisualSettings`] struct; every option has a default and numeric
//! options are clamped here, so nothing downstream sees an invalid value.

use crate::color::{ColorScaleSpec, MAX_BUCKETS, MIN_BUCKETS, Rgb, ValueDomain};
use crate::models::{BoundaryLevel, ValueRange};
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

pub const DEFAULT_MIN_COLOR: Rgb = Rgb::new(0xFF, 0xFF, 0x00);
pub const DEFAULT_MAX_COLOR: Rgb = Rgb::new(0xFF, 0x00, 0x00);
pub const DEFAULT_MID_COLOR: Rgb = Rgb::new(0xFF, 0x88, 0x00);
pub const DEFAULT_COLOR_RANGE: usize = 6;
pub const DEFAULT_LEGEND_WIDTH: f64 = 150.0;
pub const MIN_LEGEND_WIDTH: f64 = 100.0;
pub const MAX_LEGEND_WIDTH: f64 = 1000.0;

/// Number of drill levels; the last one is always communes.
pub const LEVEL_COUNT: usize = 4;
const DEFAULT_LEVELS: [BoundaryLevel; LEVEL_COUNT] = [
    BoundaryLevel::Regions,
    BoundaryLevel::Departements,
    BoundaryLevel::Arrondissements,
    BoundaryLevel::Communes,
];

#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub levels: [BoundaryLevel; LEVEL_COUNT],
    pub drill_level: usize,
    pub selected_map: BoundaryLevel,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS,
            drill_level: 0,
            selected_map: DEFAULT_LEVELS[0],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorSettings {
    pub gradient_color: bool,
    pub min_color: Rgb,
    pub min_color_value: Option<f64>,
    pub max_color: Rgb,
    pub max_color_value: Option<f64>,
    pub divergent: bool,
    pub mid_color: Rgb,
    pub mid_color_value: Option<f64>,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            gradient_color: false,
            min_color: DEFAULT_MIN_COLOR,
            min_color_value: None,
            max_color: DEFAULT_MAX_COLOR,
            max_color_value: None,
            divergent: false,
            mid_color: DEFAULT_MID_COLOR,
            mid_color_value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSettings {
    /// Bucket count, `3..=30`.
    pub range_level: usize,
    pub show: bool,
    /// Legend panel width in pixels, `100..=1000`.
    pub width: f64,
    /// Only label the domain extremes on the legend axis.
    pub extremum: bool,
    pub min_value0: bool,
}

impl Default for ScaleSettings {
    fn default() -> Self {
        Self {
            range_level: DEFAULT_COLOR_RANGE,
            show: true,
            width: DEFAULT_LEGEND_WIDTH,
            extremum: false,
            min_value0: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipSettings {
    pub show: bool,
}

impl Default for TooltipSettings {
    fn default() -> Self {
        Self { show: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualSettings {
    pub map: MapSettings,
    pub color: ColorSettings,
    pub scale: ScaleSettings,
    pub tooltip: TooltipSettings,
}

impl VisualSettings {
    /// Resolve every option from `objects`, falling back to defaults.
    pub fn resolve(objects: &Value, drill_level: usize) -> Self {
        let mut levels = DEFAULT_LEVELS;
        for (slot, prop) in ["level1", "level2", "level3"].iter().enumerate() {
            let name: String =
                get_value(objects, "map", prop, DEFAULT_LEVELS[slot].name().to_string());
            levels[slot] = match name.parse() {
                Ok(level) => level,
                Err(e) => {
                    warn!("map.{prop}: {e}, using {}", DEFAULT_LEVELS[slot]);
                    DEFAULT_LEVELS[slot]
                }
            };
        }
        let clamped_drill = drill_level.min(LEVEL_COUNT - 1);
        if clamped_drill != drill_level {
            warn!("drill level {drill_level} clamped to {clamped_drill}");
        }
        let map = MapSettings {
            levels,
            drill_level: clamped_drill,
            selected_map: levels[clamped_drill],
        };

        let color = ColorSettings {
            gradient_color: get_value(objects, "couleur", "gradientColor", false),
            min_color: get_color(objects, "couleur", "minColor", DEFAULT_MIN_COLOR),
            min_color_value: get_number(objects, "couleur", "minColorValue"),
            max_color: get_color(objects, "couleur", "maxColor", DEFAULT_MAX_COLOR),
            max_color_value: get_number(objects, "couleur", "maxColorValue"),
            divergent: get_value(objects, "couleur", "divergentColorSwitch", false),
            mid_color: get_color(objects, "couleur", "middleColor", DEFAULT_MID_COLOR),
            mid_color_value: get_number(objects, "couleur", "middleColorValue"),
        };

        let range: f64 = get_value(objects, "couleur", "colorRange", DEFAULT_COLOR_RANGE as f64);
        let range_level = if range.is_finite() {
            range.round().clamp(MIN_BUCKETS as f64, MAX_BUCKETS as f64) as usize
        } else {
            DEFAULT_COLOR_RANGE
        };
        if range_level as f64 != range {
            warn!("couleur.colorRange {range} clamped to {range_level}");
        }
        let width: f64 = get_value(objects, "scale", "width", DEFAULT_LEGEND_WIDTH);
        let width = if width.is_finite() {
            width.clamp(MIN_LEGEND_WIDTH, MAX_LEGEND_WIDTH)
        } else {
            DEFAULT_LEGEND_WIDTH
        };
        let scale = ScaleSettings {
            range_level,
            show: get_value(objects, "scale", "show", true),
            width,
            extremum: get_value(objects, "scale", "extremum", false),
            min_value0: get_value(objects, "scale", "minValue0", false),
        };

        let tooltip = TooltipSettings {
            show: get_value(objects, "tooltip", "show", true),
        };

        Self {
            map,
            color,
            scale,
            tooltip,
        }
    }

    /// Whether a divergent scale is in effect. The switch is only offered in
    /// gradient mode, so it is ignored otherwise.
    pub fn is_divergent(&self) -> bool {
        self.color.gradient_color && self.color.divergent
    }

    pub fn color_scale_spec(&self) -> ColorScaleSpec {
        let divergent = self.is_divergent();
        ColorScaleSpec {
            min_color: self.color.min_color,
            max_color: self.color.max_color,
            mid_color: divergent.then_some(self.color.mid_color),
            bucket_count: self.scale.range_level,
            divergent,
        }
    }

    /// Bucketing domain for the observed range, honoring gradient value stops.
    pub fn value_domain(&self, range: ValueRange) -> ValueDomain {
        let mut domain = ValueDomain::from_range(range.min, range.max, self.scale.min_value0);
        if self.color.gradient_color {
            if let Some(floor) = self.color.min_color_value {
                domain.floor = floor;
            }
            if let Some(ceiling) = self.color.max_color_value {
                domain.ceiling = ceiling;
            }
            if self.color.divergent {
                domain = domain.with_pivot(self.color.mid_color_value);
            }
        }
        domain
    }

    /// Property pane enumeration for one settings group.
    pub fn enumerate_objects(&self, object_name: &str) -> Vec<ObjectInstance> {
        let mut properties = Map::new();
        let mut valid_values = BTreeMap::new();
        match object_name {
            "couleur" => {
                let c = &self.color;
                properties.insert("gradientColor".into(), json!(c.gradient_color));
                properties.insert("minColor".into(), solid(c.min_color));
                properties.insert("minColorValue".into(), json!(c.min_color_value));
                properties.insert("maxColor".into(), solid(c.max_color));
                properties.insert("maxColorValue".into(), json!(c.max_color_value));
                valid_values.insert("minColorValue".into(), NumberRange::any());
                valid_values.insert("maxColorValue".into(), NumberRange::any());
                if c.gradient_color {
                    properties.insert("divergentColorSwitch".into(), json!(c.divergent));
                    if c.divergent {
                        properties.insert("middleColor".into(), solid(c.mid_color));
                        properties.insert("middleColorValue".into(), json!(c.mid_color_value));
                        valid_values.insert("middleColorValue".into(), NumberRange::any());
                    }
                } else {
                    properties.insert("colorRange".into(), json!(self.scale.range_level));
                    valid_values.insert(
                        "colorRange".into(),
                        NumberRange::new(MIN_BUCKETS as f64, MAX_BUCKETS as f64),
                    );
                }
            }
            "tooltip" => {
                properties.insert("show".into(), json!(self.tooltip.show));
            }
            "scale" => {
                let s = &self.scale;
                properties.insert("show".into(), json!(s.show));
                properties.insert("width".into(), json!(s.width));
                properties.insert("extremum".into(), json!(s.extremum));
                properties.insert("minValue0".into(), json!(s.min_value0));
                valid_values.insert(
                    "width".into(),
                    NumberRange::new(MIN_LEGEND_WIDTH, MAX_LEGEND_WIDTH),
                );
            }
            "map" => {
                for (i, level) in self.map.levels.iter().enumerate() {
                    properties.insert(format!("level{}", i + 1), json!(level.name()));
                }
            }
            _ => return Vec::new(),
        }
        vec![ObjectInstance {
            object_name: object_name.to_string(),
            display_name: object_name.to_string(),
            properties,
            valid_values,
        }]
    }
}

/// Names of the groups [`VisualSettings::enumerate_objects`] knows about.
pub const OBJECT_NAMES: [&str; 4] = ["couleur", "tooltip", "scale", "map"];

/// One entry of the property enumeration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInstance {
    pub object_name: String,
    pub display_name: String,
    pub properties: Map<String, Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub valid_values: BTreeMap<String, NumberRange>,
}

/// Inclusive numeric range accepted by a property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumberRange {
    pub min: f64,
    pub max: f64,
}

impl NumberRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn any() -> Self {
        Self::new(f64::MIN, f64::MAX)
    }
}

fn solid(color: Rgb) -> Value {
    json!({ "solid": { "color": color.to_hex() } })
}

fn lookup<'a>(objects: &'a Value, group: &str, prop: &str) -> Option<&'a Value> {
    objects.get(group)?.get(prop).filter(|v| !v.is_null())
}

/// Typed lookup of `objects[group][prop]`; missing, null or mistyped values yield `default`.
pub fn get_value<T: DeserializeOwned>(objects: &Value, group: &str, prop: &str, default: T) -> T {
    match lookup(objects, group, prop) {
        None => default,
        Some(v) => match serde_json::from_value::<T>(v.clone()) {
            Ok(t) => t,
            Err(e) => {
                warn!("{group}.{prop}: {e}, using default");
                default
            }
        },
    }
}

fn get_number(objects: &Value, group: &str, prop: &str) -> Option<f64> {
    let v = lookup(objects, group, prop)?;
    match v.as_f64() {
        Some(n) => Some(n),
        None => {
            warn!("{group}.{prop}: expected a number, got {v}");
            None
        }
    }
}

/// Colors arrive either as a bare string or as `{"solid": {"color": ..}}`.
fn get_color(objects: &Value, group: &str, prop: &str, default: Rgb) -> Rgb {
    let Some(v) = lookup(objects, group, prop) else {
        return default;
    };
    let raw = v
        .as_str()
        .or_else(|| v.get("solid").and_then(|s| s.get("color")).and_then(Value::as_str));
    match raw.map(str::parse::<Rgb>) {
        Some(Ok(c)) => c,
        Some(Err(e)) => {
            warn!("{group}.{prop}: {e}, using {default}");
            default
        }
        None => {
            warn!("{group}.{prop}: unrecognized color value {v}, using {default}");
            default
        }
    }
}
