// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for the reference scene.
//!
//! The retimer only ever touches keyframe *time*; values are carried along
//! untouched so a retimed scene round-trips with its animation intact.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframeId(pub Uuid);

impl KeyframeId {
    /// Create a new random keyframe ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Tangent mode of a key, as stored by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum TangentMode {
    /// Stepped
    Step,
    /// Linear
    Linear,
    /// Spline / auto tangents
    #[default]
    Auto,
}

/// Value stored in a keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeyframeValue {
    /// Float value
    Float(f32),
    /// 3D vector
    Vec3([f32; 3]),
    /// 4D vector / quaternion
    Vec4([f32; 4]),
    /// Boolean
    Bool(bool),
}

/// A keyframe on an animation track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Unique keyframe ID
    #[serde(default)]
    pub id: KeyframeId,
    /// Time in frames
    pub time: f64,
    /// Value at this keyframe
    pub value: KeyframeValue,
    /// Tangent mode
    #[serde(default)]
    pub tangent: TangentMode,
}

impl Keyframe {
    /// Create a new keyframe
    pub fn new(time: f64, value: KeyframeValue) -> Self {
        Self {
            id: KeyframeId::new(),
            time,
            value,
            tangent: TangentMode::Auto,
        }
    }

    /// Create a float keyframe
    pub fn float(time: f64, value: f32) -> Self {
        Self::new(time, KeyframeValue::Float(value))
    }

    /// Set tangent mode
    pub fn with_tangent(mut self, mode: TangentMode) -> Self {
        self.tangent = mode;
        self
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation that returns `a` at `t == 0` and `b` at `t == 1` exactly
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a * (1.0 - t) + b * t
    }

    /// Map `x` from `[in_min, in_max]` onto `[out_min, out_max]`.
    ///
    /// A degenerate input range maps everything to `out_min`.
    pub fn remap(x: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
        if in_max == in_min || out_max == out_min {
            return out_min;
        }
        if x == in_min {
            return out_min;
        }
        if x == in_max {
            return out_max;
        }
        Self::lerp(out_min, out_max, (x - in_min) / (in_max - in_min))
    }
}
