//! Rendering: draw a computed [`Frame`] to **SVG** or **PNG**.
//!
//! - Features filled with their bucket color (empty shapes in a light neutral fill)
//! - Per-feature stroke and opacity from the selection style
//! - Legend bars and value axis in the legend panel
//!
//! Text is only emitted on the SVG path: the bitmap path has no font to rasterize with.

pub mod legend;
pub mod util;

use crate::autofit::MapTransform;
use crate::visual::{EMPTY_FILL, Frame, MapFrame};
use anyhow::{Result, anyhow};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use log::debug;
use std::path::Path;

use legend::draw_legend_panel;
use util::{stroke_px, to_rgb, to_screen};

/// Message shown when there is nothing to map yet.
pub const LANDING_MESSAGE: &str = "Add a location field and a numeric value to draw the map";

/// Render `frame` to `out_path` (`.svg` → SVG, anything else → PNG).
pub fn render_frame<P: AsRef<Path>>(
    frame: &Frame,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(anyhow!("canvas must be at least 1x1, got {width}x{height}"));
    }
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_frame(root, frame, true)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_frame(root, frame, false)?;
    }
    debug!("wrote {}", out_path.display());
    Ok(())
}

fn draw_frame<DB>(root: DrawingArea<DB, Shift>, frame: &Frame, labels: bool) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow::anyhow!("{:?}", e))?;
    match frame {
        Frame::Landing => {
            if labels {
                let (w, h) = root.dim_in_pixel();
                let style = TextStyle::from((FontFamily::SansSerif, 16))
                    .pos(Pos::new(HPos::Center, VPos::Center));
                root.draw(&Text::new(LANDING_MESSAGE, (w as i32 / 2, h as i32 / 2), style))
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            }
        }
        Frame::Map(map) => draw_map(&root, map, labels)?,
    }
    root.present().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_map<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    frame: &MapFrame,
    labels: bool,
) -> Result<()> {
    let area = frame.layout.map;
    let transform = frame.transform.unwrap_or(MapTransform::IDENTITY);

    for feature in &frame.features {
        let fill = to_rgb(feature.fill.unwrap_or(EMPTY_FILL)).mix(feature.style.opacity);
        let stroke = ShapeStyle {
            color: to_rgb(feature.style.stroke).mix(feature.style.opacity),
            filled: false,
            stroke_width: stroke_px(&feature.style, &transform),
        };
        for ring in &feature.rings {
            if ring.len() < 3 {
                continue;
            }
            let pts: Vec<(i32, i32)> = ring
                .iter()
                .map(|&p| to_screen(&area, &transform, p))
                .collect();
            root.draw(&Polygon::new(pts.clone(), fill.filled()))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            root.draw(&PathElement::new(pts, stroke))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        }
    }

    if let (Some(legend_area), Some(layout)) = (frame.layout.legend, frame.legend.as_ref()) {
        draw_legend_panel(root, &legend_area, layout, labels)?;
    }
    Ok(())
}
