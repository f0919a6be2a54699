use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::karst_errors::KarstError;

/// An RGB color with channels normalized to 0..1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    /// Parse a `#rrggbb` hex literal.
    ///
    /// Arguments
    /// ---------
    /// * `literal`: color string, leading `#` optional
    ///
    /// Return
    /// ------
    /// * the parsed color, or [`KarstError::InvalidColorLiteral`]
    pub fn from_hex(literal: &str) -> Result<Self, KarstError> {
        let digits = literal.strip_prefix('#').unwrap_or(literal);
        if digits.len() != 6 {
            return Err(KarstError::InvalidColorLiteral(literal.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .map(|v| v as f64 / 255.0)
                .ok_or_else(|| KarstError::InvalidColorLiteral(literal.to_string()))
        };
        Ok(Color {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Format as a `#rrggbb` literal, rounding each channel.
    pub fn to_hex(&self) -> String {
        let byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }

    /// Linear interpolation towards `other`, `t` in 0..1.
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }
}

/// One breakpoint of a color ramp: the color the ramp passes through at
/// `threshold` (relative depth or distance, conventionally 0–100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub threshold: NotNan<f64>,
    pub color: Color,
}

impl GradientStop {
    /// Build a stop, rejecting NaN thresholds.
    pub fn new(threshold: f64, color: Color) -> Result<Self, KarstError> {
        Ok(GradientStop {
            threshold: NotNan::new(threshold)?,
            color,
        })
    }
}

/// A piecewise-linear color ramp over ascending breakpoints.
///
/// Fewer than two breakpoints is a configuration error; values outside the
/// breakpoint range clamp to the nearest endpoint color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    stops: Vec<GradientStop>,
}

impl ColorRamp {
    /// Build a ramp from breakpoints, sorting them ascending.
    ///
    /// Arguments
    /// ---------
    /// * `stops`: at least two breakpoints, any order
    ///
    /// Return
    /// ------
    /// * the ramp, or [`KarstError::TooFewGradientStops`]
    pub fn new(mut stops: Vec<GradientStop>) -> Result<Self, KarstError> {
        if stops.len() < 2 {
            return Err(KarstError::TooFewGradientStops(stops.len()));
        }
        stops.sort_by_key(|stop| stop.threshold);
        Ok(ColorRamp { stops })
    }

    /// The interpolated color at `value`.
    pub fn sample(&self, value: f64) -> Color {
        let first = &self.stops[0];
        let last = &self.stops[self.stops.len() - 1];
        if value <= first.threshold.into_inner() {
            return first.color;
        }
        if value >= last.threshold.into_inner() {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            let hi = upper.threshold.into_inner();
            if value <= hi {
                let lo = lower.threshold.into_inner();
                let span = hi - lo;
                if span <= 0.0 {
                    return upper.color;
                }
                return lower.color.lerp(&upper.color, (value - lo) / span);
            }
        }
        last.color
    }
}
