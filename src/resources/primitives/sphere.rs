use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::resources::mesh::StaticMesh;

pub struct SphereOptions {
    pub radius: f32,
    /// Segments around the Y axis.
    pub sides: u32,
    /// Segments from pole to pole.
    pub height_segments: u32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            sides: 16,
            height_segments: 8,
        }
    }
}

/// A UV sphere around the origin with single-vertex poles.
///
/// `2 + (height_segments - 1) * sides` vertices and
/// `2 * sides * (height_segments - 1)` triangles.
#[must_use]
pub fn create_sphere(options: SphereOptions) -> StaticMesh {
    let radius = options.radius;
    let sides = options.sides.max(3);
    let height_segments = options.height_segments.max(2);

    let mut mesh = StaticMesh::new();
    mesh.add_vertex(Vec3::new(0.0, -radius, 0.0), Vec2::splat(0.5), Vec3::NEG_Y);
    mesh.add_vertex(Vec3::new(0.0, radius, 0.0), Vec2::splat(0.5), Vec3::Y);

    let angle_step = 2.0 * PI / sides as f32;
    // first vertex of ring j (1-based ring numbering)
    let ring = |j: u32| (j - 1) * sides + 2;

    for j in 1..height_segments {
        let latitude = j as f32 / height_segments as f32 * PI;
        let y = -latitude.cos();
        let ring_radius = latitude.sin();

        for i in 0..sides {
            let x = (i as f32 * angle_step).sin() * ring_radius;
            let z = (i as f32 * angle_step).cos() * ring_radius;
            mesh.add_vertex(
                Vec3::new(x * radius, y * radius, z * radius),
                Vec2::new(x, z),
                Vec3::new(x, y, z),
            );
        }
    }

    for j in 1..height_segments {
        let first = ring(j);
        for i in 0..sides {
            let current = first + i;
            let next = first + (i + 1) % sides;

            if j == 1 {
                mesh.add_triangle(0, next, current);
            }
            if j == height_segments - 1 {
                mesh.add_triangle(1, current, next);
            } else {
                mesh.add_triangle(current, next, next + sides);
                mesh.add_triangle(current, next + sides, current + sides);
            }
        }
    }

    mesh
}
