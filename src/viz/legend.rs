//! Legend drawing: color bars, the value axis and its tick labels.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::util::to_rgb;
use crate::legend::LegendLayout;
use crate::visual::Area;

const TICK_LEN: i32 = 4;
const LABEL_FONT_PX: u32 = 11;

/// Draw `layout` inside `area` of `root`. Tick labels are drawn only when
/// `labels` is set; tick marks are always drawn.
pub fn draw_legend_panel<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    area: &Area,
    layout: &LegendLayout,
    labels: bool,
) -> Result<()> {
    let ox = area.x;
    let oy = area.y;
    let px = |x: f64, y: f64| ((ox + x).round() as i32, (oy + y).round() as i32);

    for bar in &layout.bars {
        let top_left = px(bar.x, bar.y);
        let bottom_right = px(bar.x + bar.width, bar.y + bar.height);
        root.draw(&Rectangle::new(
            [top_left, bottom_right],
            to_rgb(bar.color).filled(),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    }

    let axis_top = px(layout.axis_x, layout.axis_span.0);
    let axis_bottom = px(layout.axis_x, layout.axis_span.1);
    root.draw(&PathElement::new(vec![axis_top, axis_bottom], BLACK))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;

    let label_style = TextStyle::from((FontFamily::SansSerif, LABEL_FONT_PX))
        .pos(Pos::new(HPos::Right, VPos::Center));
    for tick in &layout.ticks {
        let (x, y) = px(layout.axis_x, tick.y);
        root.draw(&PathElement::new(vec![(x - TICK_LEN, y), (x, y)], BLACK))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        if labels {
            root.draw(&Text::new(
                tick.label.clone(),
                (x - TICK_LEN - 2, y),
                label_style.clone(),
            ))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        }
    }
    Ok(())
}
