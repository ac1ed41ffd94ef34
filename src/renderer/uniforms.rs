//! Uniform block pushed with every draw call.
//!
//! The layout mirrors `Uniforms` in `shader.wgsl`. Every field is a 16-byte
//! column so the struct is valid for WGSL uniform address space without padding.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Compile-time capacity of the shadow blob array.
pub const MAX_SHADOWS: usize = 16;

/// Per-frame state shared by every draw: camera, projection, light, fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub perspective: Mat4,
    pub camera_position: Vec3,
    pub light_direction: Vec3,
    pub light_color: Vec3,
    pub background_color: Vec3,
    /// 0 disables fog.
    pub fog_distance: f32,
    pub far_plane: f32,
    /// Shadow blobs pushed per draw, at most [`MAX_SHADOWS`].
    pub max_shadows: usize,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            perspective: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            light_direction: Vec3::new(1.0, -1.0, 1.0).normalize(),
            light_color: Vec3::ONE,
            background_color: Vec3::ZERO,
            fog_distance: 0.0,
            far_plane: 100.0,
            max_shadows: MAX_SHADOWS,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShaderUniforms {
    pub view: [[f32; 4]; 4],
    pub perspective: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub light_direction: [f32; 4],
    pub light_color: [f32; 4],
    pub background_color: [f32; 4],
    pub mesh_color: [f32; 4],
    pub transparent_color: [f32; 4],
    /// ambient, diffuse, specular, specular exponent
    pub material: [f32; 4],
    /// fog distance, far plane, animation blend, unused
    pub params: [f32; 4],
    /// render mode, texture layers, transparency enabled, fog enabled
    pub flags: [u32; 4],
    /// 2D draw, shadow count, unused, unused
    pub flags2: [u32; 4],
    /// u, v, radius, intensity
    pub shadows: [[f32; 4]; MAX_SHADOWS],
}

impl ShaderUniforms {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Starts a uniform block from the frame state with identity world and zeroed object fields.
    #[must_use]
    pub fn from_frame(frame: &FrameUniforms) -> Self {
        let mut u = Self::zeroed();
        u.view = frame.view.to_cols_array_2d();
        u.perspective = frame.perspective.to_cols_array_2d();
        u.world = Mat4::IDENTITY.to_cols_array_2d();
        u.camera_position = frame.camera_position.extend(1.0).to_array();
        u.light_direction = frame.light_direction.extend(0.0).to_array();
        u.light_color = frame.light_color.extend(1.0).to_array();
        u.background_color = frame.background_color.extend(1.0).to_array();
        u.params[0] = frame.fog_distance;
        u.params[1] = frame.far_plane;
        u
    }

    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.world)
    }

    #[must_use]
    pub fn animation_blend(&self) -> f32 {
        self.params[2]
    }

    #[must_use]
    pub fn is_2d(&self) -> bool {
        self.flags2[0] != 0
    }

    #[must_use]
    pub fn shadow_count(&self) -> u32 {
        self.flags2[1]
    }

    #[must_use]
    pub fn texture_layers(&self) -> u32 {
        self.flags[1]
    }
}
