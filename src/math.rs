//! Math helpers
//!
//! Thin wrappers over `glam` that encode the engine's conventions:
//!
//! - Left-handed coordinates, the camera looks along +Z.
//! - Rotations are stored in degrees and normalized to `[0, 360)`.
//! - A rotation order `ABC` builds `(Ra * Rb * Rc)^T`. Objects use [`RotationOrder::Zxy`],
//!   the camera uses [`RotationOrder::Yxz`].

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Fallback used wherever a direction cannot be normalized (zero length or NaN).
pub const DEFAULT_NORMAL: Vec3 = Vec3::X;

/// One of the six axis directions, relative to whatever frame the caller uses
/// (world axes for UV projection, camera basis for movement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Forward,
    Backward,
    Up,
    Down,
}

/// Order in which the three axis rotations are composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationOrder {
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

impl RotationOrder {
    /// The axes in composition order (0 = X, 1 = Y, 2 = Z).
    #[must_use]
    pub const fn axes(self) -> [usize; 3] {
        match self {
            Self::Xyz => [0, 1, 2],
            Self::Xzy => [0, 2, 1],
            Self::Yxz => [1, 0, 2],
            Self::Yzx => [1, 2, 0],
            Self::Zxy => [2, 0, 1],
            Self::Zyx => [2, 1, 0],
        }
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
///
/// `450 -> 90`, `-10 -> 350`.
#[must_use]
pub fn normalize_angle(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Normalizes every component of a rotation vector, see [`normalize_angle`].
#[must_use]
pub fn normalize_rotation(rotation: Vec3) -> Vec3 {
    Vec3::new(
        normalize_angle(rotation.x),
        normalize_angle(rotation.y),
        normalize_angle(rotation.z),
    )
}

/// Normalizes `v`, falling back to [`DEFAULT_NORMAL`] for zero or non-finite input.
#[must_use]
pub fn safe_normalize(v: Vec3) -> Vec3 {
    v.try_normalize().unwrap_or(DEFAULT_NORMAL)
}

fn axis_rotation(axis: usize, degrees: f32) -> Mat4 {
    let radians = degrees.to_radians();
    match axis {
        0 => Mat4::from_rotation_x(radians),
        1 => Mat4::from_rotation_y(radians),
        _ => Mat4::from_rotation_z(radians),
    }
}

/// Builds the rotation matrix for `rotation` (degrees per axis) in the given order.
#[must_use]
pub fn rotation_matrix(rotation: Vec3, order: RotationOrder) -> Mat4 {
    let [a, b, c] = order.axes();
    let angles = rotation.to_array();
    let combined =
        axis_rotation(a, angles[a]) * axis_rotation(b, angles[b]) * axis_rotation(c, angles[c]);
    combined.transpose()
}

#[inline]
#[must_use]
pub fn translation_matrix(offset: Vec3) -> Mat4 {
    Mat4::from_translation(offset)
}

#[inline]
#[must_use]
pub fn scale_matrix(scale: Vec3) -> Mat4 {
    Mat4::from_scale(scale)
}

/// Left-handed perspective projection with a vertical field of view in degrees,
/// mapping depth to `[0, 1]`.
#[must_use]
pub fn perspective_matrix(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let aspect = if aspect > 0.0 && aspect.is_finite() { aspect } else { 1.0 };
    Mat4::perspective_lh(fov_degrees.to_radians(), aspect, near, far)
}

/// Transforms a point (w = 1).
#[inline]
#[must_use]
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    (*m * Vec4::new(p.x, p.y, p.z, 1.0)).truncate()
}

/// Transforms a direction (w = 0) and renormalizes it.
#[inline]
#[must_use]
pub fn transform_normal(m: &Mat4, n: Vec3) -> Vec3 {
    safe_normalize((*m * Vec4::new(n.x, n.y, n.z, 0.0)).truncate())
}
