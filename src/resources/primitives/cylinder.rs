use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::resources::mesh::StaticMesh;

fn circle_point(i: u32, sides: u32, radius: f32) -> (f32, f32) {
    let angle = 2.0 * PI * i as f32 / sides as f32;
    (angle.cos() * radius, angle.sin() * radius)
}

/// A cone standing on the XZ plane with its tip at `(0, height, 0)`.
///
/// Vertices: base center, tip, then `sides` rim vertices (`2 + sides`).
/// Each side contributes one base and one mantle triangle.
#[must_use]
pub fn create_cone(radius: f32, height: f32, sides: u32) -> StaticMesh {
    let sides = sides.max(3);
    let mut mesh = StaticMesh::new();

    mesh.add_vertex(Vec3::ZERO, Vec2::ZERO, Vec3::NEG_Y);
    mesh.add_vertex(Vec3::new(0.0, height, 0.0), Vec2::new(0.5, 1.0), Vec3::Y);

    let texture_step = 1.0 / sides as f32;
    for i in 0..sides {
        let (x, z) = circle_point(i, sides, radius);
        mesh.add_vertex(
            Vec3::new(x, 0.0, z),
            Vec2::new(i as f32 * texture_step, 0.0),
            Vec3::new(x, 0.0, z),
        );
    }

    for i in 0..sides {
        let current = 2 + i;
        let next = 2 + (i + 1) % sides;
        mesh.add_triangle(0, current, next);
        mesh.add_triangle(1, next, current);
    }

    mesh
}

/// A closed cylinder standing on the XZ plane.
///
/// Vertices: bottom center, top center, then a bottom/top pair per side
/// (`2 + 2 * sides`). Each side contributes two cap and two mantle triangles.
#[must_use]
pub fn create_cylinder(radius: f32, height: f32, sides: u32) -> StaticMesh {
    let sides = sides.max(3);
    let mut mesh = StaticMesh::new();

    mesh.add_vertex(Vec3::ZERO, Vec2::ZERO, Vec3::NEG_Y);
    mesh.add_vertex(Vec3::new(0.0, height, 0.0), Vec2::ZERO, Vec3::Y);

    let texture_step = 1.0 / sides as f32;
    for i in 0..sides {
        let (x, z) = circle_point(i, sides, radius);
        let u = i as f32 * texture_step;
        let normal = Vec3::new(x, 0.0, z);
        mesh.add_vertex(Vec3::new(x, 0.0, z), Vec2::new(u, 0.0), normal);
        mesh.add_vertex(Vec3::new(x, height, z), Vec2::new(u, 1.0), normal);
    }

    for i in 0..sides {
        let bottom = 2 + 2 * i;
        let top = bottom + 1;
        let next_bottom = 2 + 2 * ((i + 1) % sides);
        let next_top = next_bottom + 1;

        mesh.add_triangle(0, bottom, next_bottom);
        mesh.add_triangle(1, next_top, top);
        mesh.add_triangle(bottom, top, next_bottom);
        mesh.add_triangle(top, next_top, next_bottom);
    }

    mesh
}
