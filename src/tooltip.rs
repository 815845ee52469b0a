//! Tooltip data for hovered features.

use crate::models::DataPoint;
use num_format::{CustomFormat, Grouping, ToFormattedString};
use serde::Serialize;

const EXPONENT_THRESHOLD: f64 = 1e21;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipItem {
    pub display_name: String,
    pub value: String,
}

/// Name/value pair for a feature; `None` for shapes without a value.
pub fn tooltip_for(point: &DataPoint) -> Option<TooltipItem> {
    let value = point.value?;
    Some(TooltipItem {
        display_name: point.name.clone(),
        value: format_thousands(value),
    })
}

/// Shortest decimal form of `value` with its integer part grouped by three
/// digits with spaces: `1234567.891` → `"1 234 567.891"`.
/// Magnitudes of `1e21` and above switch to exponent form.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value.abs() >= EXPONENT_THRESHOLD {
        return format!("{value:e}");
    }
    let raw = if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    };
    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let grouped = match (int_part.parse::<u128>(), space_grouping()) {
        (Ok(n), Some(format)) => n.to_formatted_string(&format),
        _ => int_part.to_string(),
    };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

fn space_grouping() -> Option<CustomFormat> {
    CustomFormat::builder()
        .grouping(Grouping::Standard)
        .separator(" ")
        .build()
        .ok()
}
