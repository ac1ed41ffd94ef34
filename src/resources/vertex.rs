//! Vertex and triangle layouts shared by every mesh kind.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::math::safe_normalize;

/// A single mesh vertex as it is laid out in GPU memory (36 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Vec2,
    /// Always unit length, see [`Vertex::new`].
    pub normal: Vec3,
    /// Blend between texture layer 1 (1.0) and layer 2 (0.0).
    pub texture_ratio: f32,
}

impl Vertex {
    /// Byte stride of one vertex.
    pub const STRIDE: u64 = std::mem::size_of::<Self>() as u64;

    /// Creates a vertex. The normal is normalized, zero input becomes the default unit vector.
    #[must_use]
    pub fn new(position: Vec3, uv: Vec2, normal: Vec3) -> Self {
        Self {
            position,
            uv,
            normal: safe_normalize(normal),
            texture_ratio: 1.0,
        }
    }

    pub fn set_normal(&mut self, normal: Vec3) {
        self.normal = safe_normalize(normal);
    }
}

/// Three indices into the owning mesh's vertex list.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Triangle {
    pub indices: [u32; 3],
}

impl Triangle {
    #[inline]
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self { indices: [a, b, c] }
    }

    /// True when two corners share a vertex.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.indices;
        a == b || b == c || a == c
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Box around a set of points, `None` for an empty set.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bb = Self { min: first, max: first };
        for p in iter {
            bb.min = bb.min.min(p);
            bb.max = bb.max.max(p);
        }
        Some(bb)
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}
