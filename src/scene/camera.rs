use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::app::input::{Key, Keyboard};
use crate::math::{
    Direction, RotationOrder, normalize_rotation, perspective_matrix, rotation_matrix, safe_normalize,
};
use crate::renderer::DrawContext;
use crate::renderer::device::GpuDevice;
use crate::resources::mesh::StaticMesh;
use crate::resources::texture::Texture;
use crate::resources::{GpuObject, TextureHandle};

/// Keys driving [`Camera::handle_fps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub go_forward: Key,
    pub go_backward: Key,
    pub go_left: Key,
    pub go_right: Key,
    pub go_up: Key,
    pub go_down: Key,
    pub rotate_x_cw: Key,
    pub rotate_x_ccw: Key,
    pub rotate_y_cw: Key,
    pub rotate_y_ccw: Key,
    pub rotate_z_cw: Key,
    pub rotate_z_ccw: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            go_forward: Key::ArrowUp,
            go_backward: Key::ArrowDown,
            go_left: Key::ArrowLeft,
            go_right: Key::ArrowRight,
            go_up: Key::Q,
            go_down: Key::E,
            rotate_x_cw: Key::W,
            rotate_x_ccw: Key::S,
            rotate_y_cw: Key::D,
            rotate_y_ccw: Key::A,
            rotate_z_cw: Key::Y,
            rotate_z_ccw: Key::X,
        }
    }
}

/// FPS-style camera
///
/// Rotation is stored in degrees, normalized to `[0, 360)`, and applied in
/// Y-X-Z order for the view matrix. The world-space basis vectors come from the
/// inverse composition (Z-X-Y of the negated angles), so `forward` is always the
/// direction the view looks at.
///
/// An optional skybox follows the camera's position (never its rotation).
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    rotation: Vec3,
    forward: Vec3,
    left: Vec3,
    up: Vec3,
    view_matrix: Mat4,

    // === Projection ===
    pub(crate) fov: f32,
    pub(crate) aspect: f32,
    pub(crate) near: f32,
    pub(crate) far: f32,
    pub(crate) projection_matrix: Mat4,

    skybox: Option<StaticMesh>,

    /// Distance per millisecond.
    pub movement_speed: f32,
    /// Degrees per millisecond.
    pub rotation_speed: f32,
    /// Keep pitch within `[0, 90] ∪ [270, 360)` in [`handle_fps`](Self::handle_fps).
    pub limit_pitch: bool,
    pub key_bindings: KeyBindings,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_perspective(95.0, 1.0, 0.05, 100.0)
    }
}

impl Camera {
    /// Camera at the origin looking along +Z. `fov` is the vertical field of view in degrees.
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            forward: Vec3::Z,
            left: Vec3::NEG_X,
            up: Vec3::Y,
            view_matrix: Mat4::IDENTITY,
            fov,
            aspect,
            near,
            far,
            projection_matrix: Mat4::IDENTITY,
            skybox: None,
            movement_speed: 0.01,
            rotation_speed: 0.1,
            limit_pitch: true,
            key_bindings: KeyBindings::default(),
        };
        cam.update_projection_matrix();
        cam.set_rotation(0.0, 0.0, 0.0);
        cam
    }

    // ========================================================================
    // Projection
    // ========================================================================

    pub fn set_perspective(&mut self, fov: f32, near: f32, far: f32) {
        self.fov = fov;
        self.near = near;
        self.far = far;
        self.update_projection_matrix();
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    fn update_projection_matrix(&mut self) {
        self.projection_matrix = perspective_matrix(self.fov, self.aspect, self.near, self.far);
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    #[must_use]
    pub fn far(&self) -> f32 {
        self.far
    }

    // ========================================================================
    // Position & Rotation
    // ========================================================================

    /// Moves the camera and any attached skybox.
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
        if let Some(skybox) = &mut self.skybox {
            skybox.set_position(x, y, z);
        }
        self.update_view_matrix();
    }

    /// Sets rotation in degrees and recomputes the basis vectors.
    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = normalize_rotation(Vec3::new(x, y, z));

        let orientation = rotation_matrix(-self.rotation, RotationOrder::Zxy);
        let basis = |v: Vec3| (orientation * Vec4::new(v.x, v.y, v.z, 0.0)).truncate();
        self.forward = safe_normalize(basis(Vec3::Z));
        self.left = basis(Vec3::NEG_X);
        self.up = basis(Vec3::Y);

        self.update_view_matrix();
    }

    pub fn move_by(&mut self, dx: f32, dy: f32, dz: f32) {
        let p = self.position;
        self.set_position(p.x + dx, p.y + dy, p.z + dz);
    }

    pub fn rotate_by(&mut self, dx: f32, dy: f32, dz: f32) {
        let r = self.rotation;
        self.set_rotation(r.x + dx, r.y + dy, r.z + dz);
    }

    /// Moves `distance` along one of the camera's own basis vectors.
    pub fn go(&mut self, direction: Direction, distance: f32) {
        let step = match direction {
            Direction::Forward => self.forward * distance,
            Direction::Backward => self.forward * -distance,
            Direction::Left => self.left * distance,
            Direction::Right => self.left * -distance,
            Direction::Up => self.up * distance,
            Direction::Down => self.up * -distance,
        };
        self.move_by(step.x, step.y, step.z);
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    #[must_use]
    pub fn left(&self) -> Vec3 {
        self.left
    }

    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// `R(Y-X-Z) * T(-position)`.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    fn update_view_matrix(&mut self) {
        self.view_matrix =
            rotation_matrix(self.rotation, RotationOrder::Yxz) * Mat4::from_translation(-self.position);
    }

    // ========================================================================
    // FPS controls
    // ========================================================================

    /// Moves and turns the camera from the held keys, scaled by `elapsed_ms`.
    pub fn handle_fps(&mut self, keyboard: &Keyboard, elapsed_ms: f32) {
        let keys = self.key_bindings;
        let distance = elapsed_ms * self.movement_speed;
        let angle = elapsed_ms * self.rotation_speed;

        if keyboard.is_held(keys.go_forward) {
            self.go(Direction::Forward, distance);
        } else if keyboard.is_held(keys.go_backward) {
            self.go(Direction::Backward, distance);
        }

        if keyboard.is_held(keys.go_left) {
            self.go(Direction::Left, distance);
        } else if keyboard.is_held(keys.go_right) {
            self.go(Direction::Right, distance);
        }

        if keyboard.is_held(keys.go_up) {
            self.go(Direction::Up, distance);
        } else if keyboard.is_held(keys.go_down) {
            self.go(Direction::Down, distance);
        }

        if keyboard.is_held(keys.rotate_x_cw) {
            self.rotate_by(-angle, 0.0, 0.0);
        } else if keyboard.is_held(keys.rotate_x_ccw) {
            self.rotate_by(angle, 0.0, 0.0);
        }

        if self.limit_pitch {
            self.clamp_pitch();
        }

        if keyboard.is_held(keys.rotate_y_cw) {
            self.rotate_by(0.0, angle, 0.0);
        } else if keyboard.is_held(keys.rotate_y_ccw) {
            self.rotate_by(0.0, -angle, 0.0);
        }

        if keyboard.is_held(keys.rotate_z_cw) {
            self.rotate_by(0.0, 0.0, angle);
        } else if keyboard.is_held(keys.rotate_z_ccw) {
            self.rotate_by(0.0, 0.0, -angle);
        }
    }

    /// Locks pitch to 90 or 270 degrees instead of letting it pass vertical.
    fn clamp_pitch(&mut self) {
        let Vec3 { x, y, z } = self.rotation;
        if x > 180.0 && x < 270.0 {
            self.set_rotation(270.0, y, z);
        } else if x > 90.0 && x < 270.0 {
            self.set_rotation(90.0, y, z);
        }
    }

    // ========================================================================
    // Skybox
    // ========================================================================

    /// Attaches a skybox and moves it to the camera.
    pub fn set_skybox(&mut self, mut skybox: Option<StaticMesh>) {
        if let Some(mesh) = &mut skybox {
            mesh.set_position(self.position.x, self.position.y, self.position.z);
        }
        self.skybox = skybox;
    }

    #[must_use]
    pub fn skybox(&self) -> Option<&StaticMesh> {
        self.skybox.as_ref()
    }

    /// Mutable access for material or geometry edits. Keep the position untouched.
    pub fn skybox_mut(&mut self) -> Option<&mut StaticMesh> {
        self.skybox.as_mut()
    }

    pub fn update_skybox(&mut self, device: &mut dyn GpuDevice) {
        if let Some(skybox) = &mut self.skybox {
            skybox.update(device);
        }
    }

    pub(crate) fn draw_skybox(&self, textures: &SlotMap<TextureHandle, Texture>, ctx: &mut DrawContext<'_>) {
        let Some(skybox) = &self.skybox else {
            return;
        };
        if !skybox.visible {
            return;
        }
        match skybox.buffers {
            Some(buffers) => skybox.draw_with(&buffers, textures, ctx),
            None => log::warn!("Skybox drawn before upload"),
        }
    }
}
