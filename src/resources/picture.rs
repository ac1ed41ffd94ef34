use glam::{Mat4, Vec2, Vec3};
use slotmap::SlotMap;

use crate::renderer::DrawContext;
use crate::renderer::device::{GpuDevice, VertexLayout};
use crate::resources::material::RenderMode;
use crate::resources::mesh::{StaticMesh, submit_draw};
use crate::resources::primitives::{PlaneOptions, create_plane};
use crate::resources::texture::Texture;
use crate::resources::{GpuObject, TextureHandle};

/// A textured quad drawn in screen space, bypassing view and projection.
///
/// Position and size are normalized to the viewport: `(0, 0)` is the
/// bottom-left corner and `(1, 1)` the top-right one. Rotation is in degrees
/// around the quad's lower-left corner.
#[derive(Debug, Clone)]
pub struct Picture2d {
    pub mesh: StaticMesh,
    position: Vec2,
    size: Vec2,
    rotation: f32,
}

impl Default for Picture2d {
    fn default() -> Self {
        Self::new()
    }
}

impl Picture2d {
    #[must_use]
    pub fn new() -> Self {
        let mut mesh = create_plane(PlaneOptions::default());
        mesh.apply_matrix(&Mat4::from_translation(Vec3::new(0.5, 0.5, 0.0)));
        mesh.material.render_mode = RenderMode::NoLight;
        mesh.material.use_fog = false;
        Self {
            mesh,
            position: Vec2::ZERO,
            size: Vec2::ONE,
            rotation: 0.0,
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = crate::math::normalize_angle(degrees);
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    #[must_use]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_texture(&mut self, texture: Option<TextureHandle>) {
        self.mesh.set_texture(texture);
    }

    /// Maps the unit quad into clip space.
    #[must_use]
    pub fn screen_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(
            2.0 * self.position.x - 1.0,
            2.0 * self.position.y - 1.0,
            0.0,
        )) * Mat4::from_rotation_z(self.rotation.to_radians())
            * Mat4::from_scale(Vec3::new(2.0 * self.size.x, 2.0 * self.size.y, 1.0))
    }

    pub(crate) fn draw(&self, textures: &SlotMap<TextureHandle, Texture>, ctx: &mut DrawContext<'_>) {
        if !self.mesh.visible {
            return;
        }
        let Some(buffers) = self.mesh.buffers else {
            log::warn!("Picture drawn before upload");
            return;
        };
        submit_draw(
            ctx,
            &self.mesh.material,
            self.screen_matrix(),
            &buffers,
            VertexLayout::Single,
            textures,
            |u| u.flags2[0] = 1,
        );
    }
}

impl GpuObject for Picture2d {
    fn update(&mut self, device: &mut dyn GpuDevice) {
        self.mesh.update(device);
    }

    fn unload(&mut self, device: &mut dyn GpuDevice) {
        self.mesh.unload(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::transform_point;

    #[test]
    fn full_screen_picture_covers_clip_space() {
        let pic = Picture2d::new();
        let m = pic.screen_matrix();
        assert!((transform_point(&m, Vec3::ZERO) - Vec3::new(-1.0, -1.0, 0.0)).length() < 1e-6);
        assert!((transform_point(&m, Vec3::new(1.0, 1.0, 0.0)) - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn quad_spans_unit_square() {
        let pic = Picture2d::new();
        let bb = pic.mesh.bounding_box().unwrap();
        assert_eq!(bb.min, Vec3::ZERO);
        assert_eq!(bb.max, Vec3::new(1.0, 1.0, 0.0));
    }
}
