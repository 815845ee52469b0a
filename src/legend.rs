//! Legend layout: stacked color bars plus a value axis on their left.

use crate::color::{ColorScale, Rgb, ValueDomain};
use crate::tooltip::format_thousands;
use serde::Serialize;

/// Width of each color bar in pixels.
pub const BAR_WIDTH: f64 = 20.0;
/// Gap between the axis line and the bars.
pub const AXIS_OFFSET: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendBar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendTick {
    pub value: f64,
    pub y: f64,
    pub label: String,
}

/// Everything needed to draw the legend, in legend-panel pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendLayout {
    pub bars: Vec<LegendBar>,
    pub axis_x: f64,
    /// Top and bottom of the axis line.
    pub axis_span: (f64, f64),
    /// Empty when there is no value domain.
    pub ticks: Vec<LegendTick>,
}

/// Lay out a legend `width` x `height` pixels for `scale` over `domain`.
///
/// Bars fill 60% of the height starting 20% from the top. With `extremum`
/// only the domain ends are labeled, otherwise `n - 1` nice ticks are requested.
pub fn layout_legend(
    scale: &ColorScale,
    domain: Option<ValueDomain>,
    width: f64,
    height: f64,
    extremum: bool,
) -> LegendLayout {
    let n = scale.len().max(1);
    let bar_height = height * 0.6 / n as f64;
    let x = width / 2.0;
    let y = height * 0.2;
    let bars = scale
        .colors()
        .iter()
        .enumerate()
        .map(|(i, &color)| LegendBar {
            x,
            y: y + i as f64 * bar_height,
            width: BAR_WIDTH,
            height: bar_height,
            color,
        })
        .collect();

    let span = n as f64 * bar_height;
    let ticks = match domain {
        None => Vec::new(),
        Some(d) => {
            let values = if d.is_degenerate() {
                vec![d.floor]
            } else if extremum {
                vec![d.floor, d.ceiling]
            } else {
                nice_ticks(d.floor, d.ceiling, scale.len().saturating_sub(1))
            };
            values
                .into_iter()
                .map(|value| LegendTick {
                    value,
                    y: y + linear(d, value) * span,
                    label: format_thousands(value),
                })
                .collect()
        }
    };

    LegendLayout {
        bars,
        axis_x: x - AXIS_OFFSET,
        axis_span: (y, y + span),
        ticks,
    }
}

/// Plain linear position of `value` in the domain (the axis ignores any pivot).
fn linear(d: ValueDomain, value: f64) -> f64 {
    if d.is_degenerate() {
        0.0
    } else {
        (value - d.floor) / d.width()
    }
}

/// Round tick step for roughly `count` intervals; negative results are inverse steps.
fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

/// Evenly spaced round values in `[start, stop]`.
pub fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !(start.is_finite() && stop.is_finite()) || count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi, reverse) = if stop < start {
        (stop, start, true)
    } else {
        (start, stop, false)
    };
    let inc = tick_increment(lo, hi, count);
    if inc == 0.0 || !inc.is_finite() {
        return Vec::new();
    }
    let mut ticks: Vec<f64> = if inc > 0.0 {
        let r0 = (lo / inc).ceil() as i64;
        let r1 = (hi / inc).floor() as i64;
        (r0..=r1).map(|i| i as f64 * inc).collect()
    } else {
        let inv = -inc;
        let r0 = (lo * inv).ceil() as i64;
        let r1 = (hi * inv).floor() as i64;
        (r0..=r1).map(|i| i as f64 / inv).collect()
    };
    if reverse {
        ticks.reverse();
    }
    ticks
}
