//! Colors
//!
//! Translucent RGBA colors used for inline background formatting.

use std::fmt;

use serde::{Deserialize, Serialize};

/// RGBA color with fractional channels
///
/// Channels `r`, `g`, `b` are in `0.0..=255.0`, alpha in `0.0..=1.0`.
/// Channels stay fractional so a heat gradient can land between integers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Channel-wise comparison with a tolerance
    pub fn approx_eq(&self, other: &Rgba, epsilon: f64) -> bool {
        (self.r - other.r).abs() <= epsilon
            && (self.g - other.g).abs() <= epsilon
            && (self.b - other.b).abs() <= epsilon
            && (self.a - other.a).abs() <= epsilon
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}
