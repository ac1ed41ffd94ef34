//! Per-mesh surface description.
//!
//! A [`Material`] is the object half of the uniform block: color, lighting
//! factors, render mode, texture layers and shadow blobs. It is shared by static,
//! animated, LOD and 2D meshes.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::renderer::device::{PolygonMode, TextureId};
use crate::renderer::uniforms::{FrameUniforms, MAX_SHADOWS, ShaderUniforms};
use crate::resources::TextureHandle;
use crate::resources::texture::Texture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// Flat color or texture, no lighting.
    NoLight,
    /// Lighting evaluated per vertex.
    #[default]
    ShadedGouraud,
    /// Lighting evaluated per fragment.
    ShadedPhong,
    /// Gouraud shading drawn as lines.
    Wireframe,
}

impl RenderMode {
    /// Value of the `render_mode` uniform.
    #[must_use]
    pub const fn shader_value(self) -> u32 {
        match self {
            Self::NoLight => 0,
            Self::ShadedGouraud => 1,
            Self::ShadedPhong => 2,
            Self::Wireframe => 3,
        }
    }

    #[must_use]
    pub const fn polygon_mode(self) -> PolygonMode {
        match self {
            Self::Wireframe => PolygonMode::Line,
            _ => PolygonMode::Fill,
        }
    }
}

/// A round darkening in texture space, used for cheap contact shadows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowBlob {
    pub u: f32,
    pub v: f32,
    pub radius: f32,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Used when no texture is bound.
    pub color: Vec3,
    ambient: f32,
    diffuse: f32,
    specular: f32,
    pub specular_exponent: f32,
    pub render_mode: RenderMode,
    /// Whether global fog applies to this mesh.
    pub use_fog: bool,
    pub texture: Option<TextureHandle>,
    pub texture2: Option<TextureHandle>,
    shadows: Vec<ShadowBlob>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec3::splat(0.7),
            ambient: 0.2,
            diffuse: 0.5,
            specular: 0.8,
            specular_exponent: 100.0,
            render_mode: RenderMode::default(),
            use_fog: true,
            texture: None,
            texture2: None,
            shadows: Vec::new(),
        }
    }
}

impl Material {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets ambient, diffuse and specular factors, each clamped to `[0, 1]`.
    pub fn set_lighting_properties(&mut self, ambient: f32, diffuse: f32, specular: f32, exponent: f32) {
        self.ambient = ambient.clamp(0.0, 1.0);
        self.diffuse = diffuse.clamp(0.0, 1.0);
        self.specular = specular.clamp(0.0, 1.0);
        self.specular_exponent = exponent;
    }

    #[must_use]
    pub fn ambient(&self) -> f32 {
        self.ambient
    }

    #[must_use]
    pub fn diffuse(&self) -> f32 {
        self.diffuse
    }

    #[must_use]
    pub fn specular(&self) -> f32 {
        self.specular
    }

    /// Adds a shadow blob. Returns `false` (and logs) once [`MAX_SHADOWS`] are present.
    pub fn add_shadow(&mut self, u: f32, v: f32, radius: f32, intensity: f32) -> bool {
        if self.shadows.len() >= MAX_SHADOWS {
            log::warn!("Shadow blob rejected: a mesh holds at most {MAX_SHADOWS}");
            return false;
        }
        self.shadows.push(ShadowBlob {
            u,
            v,
            radius,
            intensity,
        });
        true
    }

    pub fn clear_shadows(&mut self) {
        self.shadows.clear();
    }

    #[must_use]
    pub fn shadows(&self) -> &[ShadowBlob] {
        &self.shadows
    }

    /// Builds the complete uniform block for one draw of an object with this material.
    pub(crate) fn uniforms(
        &self,
        frame: &FrameUniforms,
        world: Mat4,
        textures: &[Option<&Texture>; 2],
    ) -> ShaderUniforms {
        let mut u = ShaderUniforms::from_frame(frame);
        u.world = world.to_cols_array_2d();
        u.mesh_color = self.color.extend(1.0).to_array();
        u.material = [self.ambient, self.diffuse, self.specular, self.specular_exponent];

        let layers = textures.iter().take_while(|t| t.is_some()).count() as u32;
        let (transparent_color, transparency) = match textures[0] {
            Some(t) => (t.transparent_color_f32(), t.transparency()),
            None => (Vec3::ZERO, false),
        };
        u.transparent_color = transparent_color.extend(1.0).to_array();
        u.flags = [
            self.render_mode.shader_value(),
            layers,
            u32::from(transparency),
            u32::from(self.use_fog && frame.fog_distance > 0.0),
        ];

        let pushed = self.shadows.len().min(frame.max_shadows.min(MAX_SHADOWS));
        for (slot, blob) in u.shadows.iter_mut().zip(&self.shadows[..pushed]) {
            *slot = [blob.u, blob.v, blob.radius, blob.intensity];
        }
        u.flags2[1] = pushed as u32;
        u
    }
}

/// Resolves the material's texture handles to uploaded textures.
///
/// Layer 2 is only bound together with layer 1.
pub(crate) fn bound_textures<'a>(
    material: &Material,
    textures: &'a slotmap::SlotMap<TextureHandle, Texture>,
) -> ([Option<&'a Texture>; 2], [Option<TextureId>; 2]) {
    let first = material
        .texture
        .and_then(|h| textures.get(h))
        .filter(|t| t.gpu_handle().is_some());
    let second = first.and(
        material
            .texture2
            .and_then(|h| textures.get(h))
            .filter(|t| t.gpu_handle().is_some()),
    );
    (
        [first, second],
        [
            first.and_then(Texture::gpu_handle),
            second.and_then(Texture::gpu_handle),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lighting_factors_are_clamped() {
        let mut m = Material::new();
        m.set_lighting_properties(-1.0, 0.4, 7.0, 250.0);
        assert_eq!(m.ambient(), 0.0);
        assert_eq!(m.diffuse(), 0.4);
        assert_eq!(m.specular(), 1.0);
        assert_eq!(m.specular_exponent, 250.0);
    }

    #[test]
    fn shadows_past_capacity_are_rejected() {
        let mut m = Material::new();
        for i in 0..MAX_SHADOWS {
            assert!(m.add_shadow(i as f32 * 0.01, 0.5, 0.1, 0.5));
        }
        assert!(!m.add_shadow(0.9, 0.9, 0.1, 0.5));
        assert_eq!(m.shadows().len(), MAX_SHADOWS);

        let u = m.uniforms(&FrameUniforms::default(), Mat4::IDENTITY, &[None, None]);
        assert_eq!(u.shadow_count(), MAX_SHADOWS as u32);
        assert_eq!(u.shadows[3], [3.0 * 0.01, 0.5, 0.1, 0.5]);
    }

    #[test]
    fn fog_flag_requires_global_fog() {
        let m = Material::new();
        let mut frame = FrameUniforms::default();
        assert_eq!(m.uniforms(&frame, Mat4::IDENTITY, &[None, None]).flags[3], 0);
        frame.fog_distance = 40.0;
        assert_eq!(m.uniforms(&frame, Mat4::IDENTITY, &[None, None]).flags[3], 1);
    }
}
