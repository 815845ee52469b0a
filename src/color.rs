//! Quantized color scales and value → bucket mapping.
//!
//! A [`ColorScale`] holds `n` discrete colors interpolated per RGB channel,
//! either linearly between two endpoints or divergently through a midpoint.
//! [`ValueDomain`] maps a continuous value to one of those buckets.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Smallest and largest supported bucket counts.
pub const MIN_BUCKETS: usize = 3;
pub const MAX_BUCKETS: usize = 30;

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?(?:([0-9a-fA-F]{6})|([0-9a-fA-F]{3}))$").expect("valid hex color regex")
});

static RGB_FUNC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rgb\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)$")
        .expect("valid rgb() regex")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid color: {0:?}")]
    InvalidColor(String),
    #[error("bucket index {index} out of range for a scale of {len} colors")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("bucket count {0} is outside 3..=30")]
    InvalidRange(usize),
    #[error("divergent scale requires a middle color")]
    MissingMidColor,
    #[error("scale has not been generated")]
    NotGenerated,
}

/// Opaque RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const GREY: Rgb = Rgb::new(128, 128, 128);

    /// Channel-wise interpolation, `t` in `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let (a, b) = (a as f64, b as f64);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    /// Accepts `#RRGGBB`, `#RGB` (leading `#` optional) and `rgb(r, g, b)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ColorError::InvalidColor(s.to_string());
        if let Some(caps) = HEX_COLOR.captures(s) {
            let digits: String = match (caps.get(1), caps.get(2)) {
                (Some(full), _) => full.as_str().to_string(),
                (None, Some(short)) => short.as_str().chars().flat_map(|c| [c, c]).collect(),
                _ => return Err(invalid()),
            };
            let channel =
                |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
            return Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?));
        }
        if let Some(caps) = RGB_FUNC.captures(s) {
            let channel = |i: usize| -> Result<u8, ColorError> {
                caps[i].parse::<u8>().map_err(|_| invalid())
            };
            return Ok(Rgb::new(channel(1)?, channel(2)?, channel(3)?));
        }
        Err(invalid())
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parameters of a quantized scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScaleSpec {
    pub min_color: Rgb,
    pub max_color: Rgb,
    pub mid_color: Option<Rgb>,
    pub bucket_count: usize,
    pub divergent: bool,
}

impl ColorScaleSpec {
    /// Build and generate the scale in one go.
    pub fn to_scale(&self) -> Result<ColorScale, ColorError> {
        let mut scale = ColorScale::default();
        scale.set_color(self.min_color, self.max_color);
        if let Some(mid) = self.mid_color {
            scale.set_mid_color(mid);
        }
        scale.set_range(self.bucket_count);
        scale.generate_scale(self.divergent)?;
        Ok(scale)
    }
}

/// Discrete color list for binning continuous values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    min: Rgb,
    max: Rgb,
    mid: Option<Rgb>,
    range: usize,
    colors: Vec<Rgb>,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            min: Rgb::new(0xFF, 0xFF, 0x00),
            max: Rgb::new(0xFF, 0x00, 0x00),
            mid: None,
            range: 6,
            colors: Vec::new(),
        }
    }
}

impl ColorScale {
    pub fn set_color(&mut self, min: Rgb, max: Rgb) {
        self.min = min;
        self.max = max;
        self.colors.clear();
    }

    pub fn set_mid_color(&mut self, mid: Rgb) {
        self.mid = Some(mid);
        self.colors.clear();
    }

    pub fn set_range(&mut self, n: usize) {
        self.range = n;
        self.colors.clear();
    }

    pub fn range(&self) -> usize {
        self.range
    }

    /// Regenerate the color list. The middle color is ignored unless `divergent`.
    pub fn generate_scale(&mut self, divergent: bool) -> Result<(), ColorError> {
        let n = self.range;
        if !(MIN_BUCKETS..=MAX_BUCKETS).contains(&n) {
            return Err(ColorError::InvalidRange(n));
        }
        let last = (n - 1) as f64;
        self.colors = if divergent {
            let mid = self.mid.ok_or(ColorError::MissingMidColor)?;
            // Fractional for even n; for odd n the middle index hits `mid` exactly.
            let center = last / 2.0;
            (0..n)
                .map(|i| {
                    let i = i as f64;
                    if i <= center {
                        self.min.lerp(mid, i / center)
                    } else {
                        mid.lerp(self.max, (i - center) / (last - center))
                    }
                })
                .collect()
        } else {
            (0..n).map(|i| self.min.lerp(self.max, i as f64 / last)).collect()
        };
        Ok(())
    }

    pub fn get_color(&self, index: usize) -> Result<Rgb, ColorError> {
        if self.colors.is_empty() {
            return Err(ColorError::NotGenerated);
        }
        self.colors
            .get(index)
            .copied()
            .ok_or(ColorError::IndexOutOfRange {
                index,
                len: self.colors.len(),
            })
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Value interval divided into equal-width buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueDomain {
    pub floor: f64,
    pub ceiling: f64,
    /// Optional pivot mapped to the middle of the scale (divergent gradients).
    pub pivot: Option<f64>,
}

impl ValueDomain {
    /// Floor is `0` when `min_value0` is set or the data is non-negative, else the minimum.
    pub fn from_range(min: f64, max: f64, min_value0: bool) -> Self {
        let floor = if min_value0 || min >= 0.0 { 0.0 } else { min };
        Self {
            floor,
            ceiling: max,
            pivot: None,
        }
    }

    pub fn with_pivot(mut self, pivot: Option<f64>) -> Self {
        self.pivot = pivot.filter(|p| *p > self.floor && *p < self.ceiling);
        self
    }

    pub fn width(&self) -> f64 {
        self.ceiling - self.floor
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0) || !self.width().is_finite()
    }

    /// Position of `value` in `[0, 1]`, monotonic and clamped.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return if value >= self.ceiling { 1.0 } else { 0.0 };
        }
        let t = match self.pivot {
            Some(p) if value <= p => 0.5 * (value - self.floor) / (p - self.floor),
            Some(p) => 0.5 + 0.5 * (value - p) / (self.ceiling - p),
            None => (value - self.floor) / self.width(),
        };
        if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
    }

    /// Bucket index in `[0, n-1]`; the ceiling itself lands in the last bucket.
    pub fn bucket(&self, value: f64, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let idx = (self.normalize(value) * n as f64).floor() as usize;
        idx.min(n - 1)
    }
}
