//! Remap curves: how raw attention values become blend weights.

use crate::core::error::HeatmapError;
use serde::{Deserialize, Serialize};

/// A per-value transfer function applied to raw heatmap weights.
///
/// Implementations must be pure: the same input always maps to the same
/// output. The result does not need to be clamped; the remapper clamps it.
pub trait RemapStrategy: Send + Sync {
    /// Transform one weight.
    fn apply(&self, value: f32) -> f32;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Built-in remap curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemapCurve {
    /// `v`
    #[default]
    Identity,
    /// `gain * v + offset`
    Linear {
        /// Slope
        #[serde(default = "one")]
        gain: f32,
        /// Added after scaling
        #[serde(default)]
        offset: f32,
    },
    /// `0` below `threshold`, `v` otherwise.
    Threshold {
        /// Cut-off, inclusive on the kept side
        #[serde(default = "half")]
        threshold: f32,
    },
    /// `v ^ gamma`
    Gamma {
        /// Exponent
        #[serde(default = "one")]
        gamma: f32,
    },
}

fn one() -> f32 {
    1.0
}

fn half() -> f32 {
    0.5
}

impl RemapCurve {
    /// Linear gain with zero offset.
    pub fn gain(gain: f32) -> Self {
        RemapCurve::Linear { gain, offset: 0.0 }
    }

    /// Check the curve parameters.
    pub fn validate(&self) -> Result<(), HeatmapError> {
        let invalid = |parameter: &str, error: String| HeatmapError::InvalidCurve {
            parameter: parameter.to_string(),
            error,
        };

        match *self {
            RemapCurve::Identity => Ok(()),
            RemapCurve::Linear { gain, offset } => {
                if !gain.is_finite() || gain < 0.0 {
                    return Err(invalid("gain", format!("must be finite and >= 0, got {}", gain)));
                }
                if !offset.is_finite() {
                    return Err(invalid("offset", format!("must be finite, got {}", offset)));
                }
                Ok(())
            }
            RemapCurve::Threshold { threshold } => {
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(invalid("threshold", format!("must be in [0, 1], got {}", threshold)));
                }
                Ok(())
            }
            RemapCurve::Gamma { gamma } => {
                if !gamma.is_finite() || gamma <= 0.0 {
                    return Err(invalid("gamma", format!("must be finite and > 0, got {}", gamma)));
                }
                Ok(())
            }
        }
    }
}

impl RemapStrategy for RemapCurve {
    fn apply(&self, value: f32) -> f32 {
        match *self {
            RemapCurve::Identity => value,
            RemapCurve::Linear { gain, offset } => gain * value + offset,
            RemapCurve::Threshold { threshold } => {
                if value < threshold {
                    0.0
                } else {
                    value
                }
            }
            RemapCurve::Gamma { gamma } => value.max(0.0).powf(gamma),
        }
    }

    fn name(&self) -> &str {
        match self {
            RemapCurve::Identity => "identity",
            RemapCurve::Linear { .. } => "linear",
            RemapCurve::Threshold { .. } => "threshold",
            RemapCurve::Gamma { .. } => "gamma",
        }
    }
}

/// The current heatmap adjustment: a curve, optionally inverted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RemapConfig {
    /// Swap attended and unattended regions after the curve
    pub invert: bool,
    /// Transfer curve
    pub curve: RemapCurve,
}

impl RemapConfig {
    /// Create a config from a curve, not inverted.
    pub fn new(curve: RemapCurve) -> Self {
        Self { invert: false, curve }
    }

    /// Set inversion.
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Check the curve parameters.
    pub fn validate(&self) -> Result<(), HeatmapError> {
        self.curve.validate()
    }
}

/// Apply a strategy to one weight, then inversion and clamping.
#[inline]
pub fn adjust(strategy: &dyn RemapStrategy, invert: bool, value: f32) -> f32 {
    let value = if value.is_nan() { 0.0 } else { value };
    let mut out = strategy.apply(value);
    if invert {
        out = 1.0 - out;
    }
    if out.is_nan() {
        0.0
    } else {
        out.clamp(0.0, 1.0)
    }
}
