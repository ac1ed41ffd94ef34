//! Keyframe interpolation for scripted motion (camera flights, moving lights).

use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// How a segment blends from its starting keyframe to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interpolation {
    /// Hold the starting value until the next key.
    Constant,
    #[default]
    Linear,
    /// Ease in and out: `t' = (1 - cos(pi * t)) / 2`.
    Sine,
}

impl Interpolation {
    fn ease(self, t: f32) -> f32 {
        match self {
            Self::Constant => 0.0,
            Self::Linear => t,
            Self::Sine => (1.0 - (PI * t).cos()) * 0.5,
        }
    }
}

/// Values that can be linearly blended.
pub trait Lerp: Copy {
    #[must_use]
    fn lerp_to(self, other: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp_to(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec2 {
    fn lerp_to(self, other: Self, t: f32) -> Self {
        self.lerp(other, t)
    }
}

impl Lerp for Vec3 {
    fn lerp_to(self, other: Self, t: f32) -> Self {
        self.lerp(other, t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    pub time_ms: f32,
    pub value: T,
    pub interpolation: Interpolation,
}

/// Time-ordered keyframes sampled at arbitrary times.
///
/// The interpolation mode of the earlier key governs each segment. Before the
/// first key the first value is returned, after the last key the last value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyframeInterpolator<T> {
    keys: Vec<Keyframe<T>>,
}

impl<T: Lerp> KeyframeInterpolator<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Inserts a key, keeping keys sorted by time. Equal times keep insertion order.
    pub fn add_keyframe(&mut self, time_ms: f32, value: T, interpolation: Interpolation) {
        let at = self.keys.partition_point(|k| k.time_ms <= time_ms);
        self.keys.insert(
            at,
            Keyframe {
                time_ms,
                value,
                interpolation,
            },
        );
    }

    #[must_use]
    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    /// Time of the last key, 0 when empty.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.keys.last().map_or(0.0, |k| k.time_ms)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Value at `time_ms`, `None` without keys.
    #[must_use]
    pub fn sample(&self, time_ms: f32) -> Option<T> {
        let first = self.keys.first()?;
        if time_ms <= first.time_ms {
            return Some(first.value);
        }

        let next = self.keys.partition_point(|k| k.time_ms <= time_ms);
        let Some(to) = self.keys.get(next) else {
            return self.keys.last().map(|k| k.value);
        };
        let from = &self.keys[next - 1];

        let span = to.time_ms - from.time_ms;
        let t = if span > 0.0 {
            ((time_ms - from.time_ms) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Some(from.value.lerp_to(to.value, from.interpolation.ease(t)))
    }
}
