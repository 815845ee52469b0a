//! Boundary geometry: GeoJSON decoding, per-level collections, projection
//! and projected path measurement (bounds, centroid).

use crate::models::{BoundaryLevel, GeometryFeature};
use ahash::AHashMap;
use geo::{BoundingRect, Centroid, Coord, MapCoords, MultiPolygon, Point, Rect};
use geojson::GeoJson;
use log::debug;
use std::f64::consts::FRAC_PI_2;

#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("failed to parse GeoJSON: {0}")]
    Parse(#[from] geojson::Error),
    #[error("GeoJSON root must be a FeatureCollection")]
    NotACollection,
}

/// All features of one boundary level, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryCollection {
    pub level: BoundaryLevel,
    pub features: Vec<GeometryFeature>,
}

impl GeometryCollection {
    pub fn new(level: BoundaryLevel, features: Vec<GeometryFeature>) -> Self {
        Self { level, features }
    }

    /// Decode a FeatureCollection, keying each feature by `name_property`.
    ///
    /// Features without a usable name or without (multi)polygon geometry are skipped.
    pub fn from_geojson_str(
        level: BoundaryLevel,
        src: &str,
        name_property: &str,
    ) -> Result<Self, GeometryError> {
        let collection = match src.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(fc) => fc,
            _ => return Err(GeometryError::NotACollection),
        };

        let mut features = Vec::with_capacity(collection.features.len());
        for feature in collection.features {
            let name = match feature.property(name_property) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Number(n)) => n.to_string(),
                _ => {
                    debug!("{level}: skipping feature without {name_property:?}");
                    continue;
                }
            };
            let Some(geometry) = feature.geometry else {
                debug!("{level}: skipping {name:?}, no geometry");
                continue;
            };
            let multi = match geo::Geometry::<f64>::try_from(geometry.value) {
                Ok(geo::Geometry::MultiPolygon(mp)) => mp,
                Ok(geo::Geometry::Polygon(p)) => MultiPolygon::new(vec![p]),
                Ok(_) => {
                    debug!("{level}: skipping {name:?}, not a polygon");
                    continue;
                }
                Err(e) => {
                    debug!("{level}: skipping {name:?}: {e}");
                    continue;
                }
            };
            features.push(GeometryFeature::new(name, multi));
        }
        Ok(Self { level, features })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Lookup from boundary level to its geometry collection.
pub trait GeometryProvider {
    fn collection(&self, level: BoundaryLevel) -> Option<&GeometryCollection>;
}

/// Collections held in memory, loaded once and shared across renders.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGeometry {
    collections: AHashMap<BoundaryLevel, GeometryCollection>,
}

impl InMemoryGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, collection: GeometryCollection) {
        self.collections.insert(collection.level, collection);
    }

    pub fn with(mut self, collection: GeometryCollection) -> Self {
        self.insert(collection);
        self
    }

    /// Loaded levels, coarsest first.
    pub fn levels(&self) -> Vec<BoundaryLevel> {
        let mut levels: Vec<_> = self.collections.keys().copied().collect();
        levels.sort();
        levels
    }
}

impl GeometryProvider for InMemoryGeometry {
    fn collection(&self, level: BoundaryLevel) -> Option<&GeometryCollection> {
        self.collections.get(&level)
    }
}

/// Spherical (lon/lat degrees) to planar projection.
pub trait Projection {
    fn project(&self, lon: f64, lat: f64) -> Coord<f64>;
}

/// Lambert conformal conic projection with screen-space scale and translation.
///
/// Screen y grows downwards: `[tx + k*(x - cx), ty - k*(y - cy)]` where
/// `(cx, cy)` is the raw projection of `center`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConicConformal {
    /// Standard parallels in degrees.
    pub parallels: (f64, f64),
    /// Geographic point mapped onto `translate`, degrees.
    pub center: (f64, f64),
    pub scale: f64,
    pub translate: (f64, f64),
}

impl ConicConformal {
    /// Metropolitan France framing.
    pub fn france() -> Self {
        Self {
            parallels: (30.0, 30.0),
            center: (2.454071, 47.279229),
            scale: 2600.0,
            translate: (480.0, 250.0),
        }
    }

    pub fn with_translate(mut self, x: f64, y: f64) -> Self {
        self.translate = (x, y);
        self
    }

    fn raw(&self, lambda: f64, phi: f64) -> (f64, f64) {
        const EPSILON: f64 = 1e-6;
        let tany = |y: f64| ((FRAC_PI_2 + y) / 2.0).tan();
        let y0 = self.parallels.0.to_radians();
        let y1 = self.parallels.1.to_radians();
        let cy0 = y0.cos();
        let n = if y0 == y1 {
            y0.sin()
        } else {
            (cy0 / y1.cos()).ln() / (tany(y1) / tany(y0)).ln()
        };
        if n.abs() < EPSILON {
            // Parallels symmetric about the equator: Mercator.
            return (lambda, tany(phi).ln());
        }
        let f = cy0 * tany(y0).powf(n) / n;
        let phi = if f > 0.0 {
            phi.max(-FRAC_PI_2 + EPSILON)
        } else {
            phi.min(FRAC_PI_2 - EPSILON)
        };
        let r = f / tany(phi).powf(n);
        (r * (n * lambda).sin(), f - r * (n * lambda).cos())
    }
}

impl Default for ConicConformal {
    fn default() -> Self {
        Self::france()
    }
}

impl Projection for ConicConformal {
    fn project(&self, lon: f64, lat: f64) -> Coord<f64> {
        let (x, y) = self.raw(lon.to_radians(), lat.to_radians());
        let (cx, cy) = self.raw(self.center.0.to_radians(), self.center.1.to_radians());
        Coord {
            x: self.translate.0 + self.scale * (x - cx),
            y: self.translate.1 - self.scale * (y - cy),
        }
    }
}

/// Projection that leaves coordinates untouched; for pre-projected geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Identity;

impl Projection for Identity {
    fn project(&self, lon: f64, lat: f64) -> Coord<f64> {
        Coord { x: lon, y: lat }
    }
}

/// Measurements of a geometry after projection.
pub trait PathMeasure {
    fn project_geometry(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64>;

    fn bounds(&self, geometry: &MultiPolygon<f64>) -> Option<Rect<f64>> {
        self.project_geometry(geometry).bounding_rect()
    }

    /// Area-weighted planar centroid.
    fn centroid(&self, geometry: &MultiPolygon<f64>) -> Option<Point<f64>> {
        self.project_geometry(geometry).centroid()
    }
}

/// [`PathMeasure`] backed by a [`Projection`].
#[derive(Debug, Clone, Default)]
pub struct ProjectedPath<P> {
    pub projection: P,
}

impl<P: Projection> ProjectedPath<P> {
    pub fn new(projection: P) -> Self {
        Self { projection }
    }
}

impl<P: Projection> PathMeasure for ProjectedPath<P> {
    fn project_geometry(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        geometry.map_coords(|c| self.projection.project(c.x, c.y))
    }
}

/// Axis-aligned square polygon, handy for fixtures and tests.
pub fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
    use geo::{LineString, Polygon};
    let ring = LineString::from(vec![
        (x, y),
        (x + size, y),
        (x + size, y + size),
        (x, y + size),
        (x, y),
    ]);
    MultiPolygon::new(vec![Polygon::new(ring, vec![])])
}
