//! Levels — slider percentages and the hub's native brightness scale.
//!
//! Sliders work in percent (`0..=100`, fractional while dragging). The hub
//! stores brightness as `0..=255`. Converting back and forth is lossy by at
//! most one percent.

use serde::{Deserialize, Serialize};

/// Upper bound of the hub brightness scale.
const BRIGHTNESS_MAX: f64 = 255.0;

/// A slider value clamped to `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Percentage(f64);

impl Percentage {
    pub const MIN: Self = Self(0.0);
    pub const MAX: Self = Self(100.0);

    /// Clamp an arbitrary value into `[0, 100]`. `NaN` becomes `0`.
    #[must_use]
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        Self(value.clamp(0.0, 100.0))
    }

    /// Percentage of the hub brightness: `round(brightness / 255 * 100)`.
    #[must_use]
    pub fn from_brightness(brightness: Brightness) -> Self {
        Self((f64::from(brightness.0) / BRIGHTNESS_MAX * 100.0).round())
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Whole-percent value shown in the slider label.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rounded(self) -> u8 {
        self.0.round() as u8
    }
}

impl From<f64> for Percentage {
    fn from(value: f64) -> Self {
        Self::clamped(value)
    }
}

impl From<Percentage> for f64 {
    fn from(pct: Percentage) -> Self {
        pct.0
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.rounded())
    }
}

/// Hub brightness on the native `0..=255` scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Brightness(u8);

impl Brightness {
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value)
    }

    /// Brightness for a slider value: `round(percentage / 100 * 255)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_percentage(pct: Percentage) -> Self {
        Self((pct.0 / 100.0 * BRIGHTNESS_MAX).round() as u8)
    }

    /// Read a brightness from a numeric hub attribute, clamping out-of-range
    /// values. Non-finite numbers yield `None`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_attribute(raw: f64) -> Option<Self> {
        if !raw.is_finite() {
            return None;
        }
        Some(Self(raw.round().clamp(0.0, BRIGHTNESS_MAX) as u8))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}
