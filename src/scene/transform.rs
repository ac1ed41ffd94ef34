use glam::{Mat4, Vec3};

use crate::math::{RotationOrder, normalize_rotation, rotation_matrix, scale_matrix, translation_matrix};

/// Transform component
///
/// Position, rotation in degrees (always kept in `[0, 360)`) and non-uniform
/// scale, plus the combined matrix `T * R * S`. The matrix is rebuilt eagerly
/// inside every setter, so readers never see a stale value.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    order: RotationOrder,
    matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Identity transform using the object rotation order (Z, X, Y).
    #[must_use]
    pub fn new() -> Self {
        Self::with_order(RotationOrder::Zxy)
    }

    #[must_use]
    pub fn with_order(order: RotationOrder) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            order,
            matrix: Mat4::IDENTITY,
        }
    }

    // ========================================================================
    // Setters (each rebuilds the matrix)
    // ========================================================================

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.rebuild();
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = normalize_rotation(rotation);
        self.rebuild();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.rebuild();
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.set_position(self.position + offset);
    }

    pub fn rotate(&mut self, delta: Vec3) {
        self.set_rotation(self.rotation + delta);
    }

    // ========================================================================
    // Getters
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Rotation part only.
    #[must_use]
    pub fn rotation_matrix(&self) -> Mat4 {
        rotation_matrix(self.rotation, self.order)
    }

    /// Combined `T * R * S` matrix.
    #[inline]
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    fn rebuild(&mut self) {
        self.matrix = translation_matrix(self.position)
            * rotation_matrix(self.rotation, self.order)
            * scale_matrix(self.scale);
    }
}
