//! Utility functions for rendering: colors, screen mapping, stroke widths.

use crate::autofit::MapTransform;
use crate::color::Rgb;
use crate::selection::FeatureStyle;
use crate::visual::Area;
use plotters::prelude::*;

/// Convert a scale color into a plotters color.
#[inline]
pub fn to_rgb(c: Rgb) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

/// Map a projected point to absolute canvas pixels: zoom and pan, then
/// offset into the map area.
pub fn to_screen(area: &Area, transform: &MapTransform, (x, y): (f64, f64)) -> (i32, i32) {
    let (sx, sy) = transform.apply(x, y);
    ((area.x + sx).round() as i32, (area.y + sy).round() as i32)
}

/// On-screen stroke width of a feature in whole pixels (at least 1).
/// Styles carry widths in map units, i.e. pre-divided by the zoom scale.
pub fn stroke_px(style: &FeatureStyle, transform: &MapTransform) -> u32 {
    let px = style.stroke_width * transform.scale;
    if px.is_finite() && px > 1.0 {
        px.round() as u32
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::StyleKind;

    #[test]
    fn screen_mapping_adds_area_offset() {
        let area = Area { x: 155.0, y: 0.0, width: 300.0, height: 200.0 };
        let t = MapTransform { scale: 2.0, translate: (10.0, -5.0) };
        assert_eq!(to_screen(&area, &t, (1.0, 3.0)), (167, 1));
    }

    #[test]
    fn selected_stroke_stays_one_pixel_at_any_zoom() {
        for scale in [0.5, 1.0, 4.0, 37.0] {
            let t = MapTransform { scale, translate: (0.0, 0.0) };
            let s = StyleKind::Selected.style(scale);
            assert_eq!(stroke_px(&s, &t), 1);
        }
    }
}
