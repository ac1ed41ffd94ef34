//! Render Settings
//!
//! Startup configuration for the render context and the wgpu backend.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lumen::renderer::RenderSettings;
//!
//! // Defaults: 800x600, 95 degree FOV, no fog
//! let settings = RenderSettings::default();
//!
//! // Foggy scene, read from disk
//! let settings = RenderSettings::load("assets/scene.json")?;
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::renderer::uniforms::MAX_SHADOWS;

// ---------------------------------------------------------------------------
// PowerPreference
// ---------------------------------------------------------------------------

/// GPU adapter selection preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerPreference {
    /// Prefer a discrete GPU.
    #[default]
    HighPerformance,
    /// Prefer an integrated GPU.
    LowPower,
}

impl PowerPreference {
    #[must_use]
    pub fn to_wgpu(self) -> wgpu::PowerPreference {
        match self {
            Self::HighPerformance => wgpu::PowerPreference::HighPerformance,
            Self::LowPower => wgpu::PowerPreference::LowPower,
        }
    }
}

// ---------------------------------------------------------------------------
// RenderSettings
// ---------------------------------------------------------------------------

/// Global configuration consumed by [`RenderContext::new`](super::RenderContext::new).
///
/// | Field                  | Description                                | Default        |
/// |------------------------|--------------------------------------------|----------------|
/// | `width`, `height`      | Viewport size in pixels                    | 800 x 600      |
/// | `fov`                  | Vertical field of view in degrees          | 95             |
/// | `near`, `far`          | Clip planes                                | 0.05, 100      |
/// | `fog_distance`         | Distance at which fog is opaque, 0 = off   | 0              |
/// | `background_color`     | Clear color, also the fog color            | Black          |
/// | `light_direction`      | Global directional light                   | (1, -1, 1)     |
/// | `light_color`          | Global light color                         | White          |
/// | `lod_interval`         | Frames between LOD recomputations          | 16             |
/// | `max_shadows`          | Shadow blobs pushed per draw (at most 16)  | 16             |
/// | `power_preference`     | GPU adapter selection                      | HighPerformance|
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    // === Viewport ===
    pub width: u32,
    pub height: u32,

    // === Projection ===
    pub fov: f32,
    pub near: f32,
    pub far: f32,

    // === Environment ===
    pub fog_distance: f32,
    pub background_color: Vec3,
    pub light_direction: Vec3,
    pub light_color: Vec3,

    // === Scheduling ===
    /// LOD meshes pick their level only on every `lod_interval`-th frame.
    pub lod_interval: u32,

    /// Clamped to [`MAX_SHADOWS`] by [`effective_max_shadows`](Self::effective_max_shadows).
    pub max_shadows: usize,

    // === GPU ===
    pub power_preference: PowerPreference,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            fov: 95.0,
            near: 0.05,
            far: 100.0,
            fog_distance: 0.0,
            background_color: Vec3::ZERO,
            light_direction: Vec3::new(1.0, -1.0, 1.0),
            light_color: Vec3::ONE,
            lod_interval: 16,
            max_shadows: MAX_SHADOWS,
            power_preference: PowerPreference::default(),
        }
    }
}

impl RenderSettings {
    /// Reads settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    #[inline]
    #[must_use]
    pub fn effective_max_shadows(&self) -> usize {
        self.max_shadows.min(MAX_SHADOWS)
    }

    /// Never zero.
    #[inline]
    #[must_use]
    pub fn effective_lod_interval(&self) -> u32 {
        self.lod_interval.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = RenderSettings::from_json(r#"{ "fog_distance": 40.0, "max_shadows": 64 }"#).unwrap();
        assert_eq!(settings.fog_distance, 40.0);
        assert_eq!(settings.fov, 95.0);
        assert_eq!(settings.effective_max_shadows(), MAX_SHADOWS);
        assert_eq!(settings.lod_interval, 16);
    }

    #[test]
    fn zero_interval_is_treated_as_every_frame() {
        let settings = RenderSettings {
            lod_interval: 0,
            ..Default::default()
        };
        assert_eq!(settings.effective_lod_interval(), 1);
    }
}
