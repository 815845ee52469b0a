//! Zoom and translation that center the populated region in a viewport.
//!
//! All measurements are taken on projected geometry through a [`PathMeasure`].
//! The resulting [`MapTransform`] is one affine operation: `p' = translate + scale * p`.

use crate::geometry::PathMeasure;
use crate::models::{DataModel, DataPoint};
use geo::{Point, Rect};
use log::debug;
use serde::Serialize;

/// Vertical under-fit leaving a margin above and below the map.
pub const VERTICAL_FIT: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AutofitError {
    #[error("no matched geometry to fit")]
    EmptyRegion,
    #[error("matched geometry has a degenerate extent")]
    DegenerateExtent,
}

/// Uniform scale followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapTransform {
    pub scale: f64,
    pub translate: (f64, f64),
}

impl MapTransform {
    pub const IDENTITY: MapTransform = MapTransform {
        scale: 1.0,
        translate: (0.0, 0.0),
    };

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.translate.0 + self.scale * x,
            self.translate.1 + self.scale * y,
        )
    }
}

/// Union of the projected bounds of `points`.
pub fn extremum_bounds<'a, M: PathMeasure + ?Sized>(
    points: impl IntoIterator<Item = &'a DataPoint>,
    measure: &M,
) -> Option<Rect<f64>> {
    points
        .into_iter()
        .filter_map(|p| measure.bounds(&p.map_data))
        .reduce(|a, b| {
            Rect::new(
                (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
            )
        })
}

/// Center of the matched features' bounding region.
pub fn region_centroid<M: PathMeasure + ?Sized>(
    model: &DataModel,
    measure: &M,
) -> Option<Point<f64>> {
    extremum_bounds(model.matched(), measure).map(|r| Point::from(r.center()))
}

/// `min(width / shape_width, VERTICAL_FIT * height / shape_height)` over the matched region.
pub fn compute_zoom<M: PathMeasure + ?Sized>(
    model: &DataModel,
    measure: &M,
    width: f64,
    height: f64,
) -> Result<f64, AutofitError> {
    let bounds = extremum_bounds(model.matched(), measure).ok_or(AutofitError::EmptyRegion)?;
    let shape_width = bounds.width();
    let shape_height = bounds.height();
    let scale = (width / shape_width).min((height / shape_height) * VERTICAL_FIT);
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(AutofitError::DegenerateExtent)
    }
}

/// Translation that puts the region centroid on `(center_x, center_y)` after scaling.
///
/// `-(scale - 1) * center` undoes the drift of scaling about the origin;
/// `(center - c) * scale` moves the centroid onto the center.
pub fn compute_translation<M: PathMeasure + ?Sized>(
    model: &DataModel,
    measure: &M,
    center_x: f64,
    center_y: f64,
    scale: f64,
) -> Result<(f64, f64), AutofitError> {
    let c = region_centroid(model, measure).ok_or(AutofitError::EmptyRegion)?;
    Ok((
        -(scale - 1.0) * center_x + (center_x - c.x()) * scale,
        -(scale - 1.0) * center_y + (center_y - c.y()) * scale,
    ))
}

/// Move empty shapes whose centroid lies within the visible radius of the
/// region centroid from `empty_shape` to `data`. Returns how many moved.
pub fn cull_empty_shapes<M: PathMeasure + ?Sized>(
    model: &mut DataModel,
    measure: &M,
    width: f64,
    height: f64,
    scale: f64,
) -> Result<usize, AutofitError> {
    let c = region_centroid(model, measure).ok_or(AutofitError::EmptyRegion)?;
    let (w, h) = (width / scale, height / scale);
    let max_dist = w * w + h * h;

    let (near, far): (Vec<DataPoint>, Vec<DataPoint>) =
        std::mem::take(&mut model.empty_shape)
            .into_iter()
            .partition(|p| match measure.centroid(&p.map_data) {
                Some(pc) => {
                    let (dx, dy) = (pc.x() - c.x(), pc.y() - c.y());
                    dx * dx + dy * dy < max_dist
                }
                None => false,
            });
    let promoted = near.len();
    debug!("promoted {promoted} empty shape(s), culled {}", far.len());
    model.data.extend(near);
    model.empty_shape = far;
    Ok(promoted)
}

/// Zoom, translate and cull for a viewport of `width` x `height`, centered on its middle.
pub fn fit<M: PathMeasure + ?Sized>(
    model: &mut DataModel,
    measure: &M,
    width: f64,
    height: f64,
) -> Result<MapTransform, AutofitError> {
    let scale = compute_zoom(model, measure, width, height)?;
    let translate = compute_translation(model, measure, width / 2.0, height / 2.0, scale)?;
    cull_empty_shapes(model, measure, width, height, scale)?;
    Ok(MapTransform { scale, translate })
}
