use glam::{Vec2, Vec3};

use crate::resources::mesh::StaticMesh;

/// A box with 8 shared corners and averaged (diagonal) normals.
///
/// Corners share vertices, so lighting looks rounded. Use [`create_sharp_cuboid`]
/// for flat faces.
#[must_use]
pub fn create_cuboid(width: f32, height: f32, depth: f32) -> StaticMesh {
    let x = width / 2.0;
    let y = height / 2.0;
    let z = depth / 2.0;

    // Format: [position, uv]
    let corners: [([f32; 3], [f32; 2]); 8] = [
        ([-x, -y, z], [0.0, 0.0]),
        ([x, -y, z], [1.0, 0.0]),
        ([-x, y, z], [0.0, 1.0]),
        ([x, y, z], [1.0, 1.0]),
        ([-x, -y, -z], [1.0, 1.0]),
        ([x, -y, -z], [0.0, 1.0]),
        ([-x, y, -z], [1.0, 0.0]),
        ([x, y, -z], [0.0, 0.0]),
    ];

    let triangles: [[u32; 3]; 12] = [
        [0, 1, 2],
        [1, 3, 2],
        [3, 5, 7],
        [3, 1, 5],
        [5, 4, 6],
        [6, 7, 5],
        [6, 4, 2],
        [4, 0, 2],
        [6, 2, 3],
        [6, 3, 7],
        [1, 0, 4],
        [5, 1, 4],
    ];

    let mut mesh = StaticMesh::new();
    for (p, uv) in corners {
        let position = Vec3::from(p);
        // outward diagonal: the sign of each coordinate
        mesh.add_vertex(position, Vec2::from(uv), position.signum());
    }
    for [a, b, c] in triangles {
        mesh.add_triangle(a, b, c);
    }
    mesh
}

/// A box with 4 vertices per face (24 total) and flat face normals.
///
/// UVs follow a 4x2 atlas: top row front/right/back/left, bottom row top/bottom.
#[must_use]
pub fn create_sharp_cuboid(width: f32, height: f32, depth: f32) -> StaticMesh {
    let x = width / 2.0;
    let y = height / 2.0;
    let z = depth / 2.0;

    // Format: (normal, [(position, uv); 4], two triangles with face-local indices)
    let faces: [([f32; 3], [([f32; 3], [f32; 2]); 4], [[u32; 3]; 2]); 6] = [
        // Back (+Z)
        (
            [0.0, 0.0, 1.0],
            [
                ([-x, -y, z], [0.75, 0.5]),
                ([x, -y, z], [0.5, 0.5]),
                ([-x, y, z], [0.75, 0.0]),
                ([x, y, z], [0.5, 0.0]),
            ],
            [[0, 1, 2], [1, 3, 2]],
        ),
        // Front (-Z)
        (
            [0.0, 0.0, -1.0],
            [
                ([-x, -y, -z], [0.0, 0.5]),
                ([x, -y, -z], [0.25, 0.5]),
                ([-x, y, -z], [0.0, 0.0]),
                ([x, y, -z], [0.25, 0.0]),
            ],
            [[1, 0, 2], [2, 3, 1]],
        ),
        // Left (-X)
        (
            [-1.0, 0.0, 0.0],
            [
                ([-x, -y, -z], [1.0, 0.5]),
                ([-x, -y, z], [0.75, 0.5]),
                ([-x, y, -z], [1.0, 0.0]),
                ([-x, y, z], [0.75, 0.0]),
            ],
            [[0, 1, 2], [3, 2, 1]],
        ),
        // Right (+X)
        (
            [1.0, 0.0, 0.0],
            [
                ([x, -y, -z], [0.25, 0.5]),
                ([x, -y, z], [0.5, 0.5]),
                ([x, y, -z], [0.25, 0.0]),
                ([x, y, z], [0.5, 0.0]),
            ],
            [[0, 2, 1], [3, 1, 2]],
        ),
        // Top (+Y)
        (
            [0.0, 1.0, 0.0],
            [
                ([-x, y, -z], [0.0, 1.0]),
                ([x, y, -z], [0.25, 1.0]),
                ([-x, y, z], [0.0, 0.5]),
                ([x, y, z], [0.25, 0.5]),
            ],
            [[2, 1, 0], [2, 3, 1]],
        ),
        // Bottom (-Y)
        (
            [0.0, -1.0, 0.0],
            [
                ([-x, -y, -z], [0.25, 0.5]),
                ([x, -y, -z], [0.5, 0.5]),
                ([-x, -y, z], [0.25, 1.0]),
                ([x, -y, z], [0.5, 1.0]),
            ],
            [[2, 0, 1], [3, 2, 1]],
        ),
    ];

    let mut mesh = StaticMesh::new();
    for (normal, corners, triangles) in faces {
        let base = mesh.vertex_count() as u32;
        for (p, uv) in corners {
            mesh.add_vertex(Vec3::from(p), Vec2::from(uv), Vec3::from(normal));
        }
        for [a, b, c] in triangles {
            mesh.add_triangle(base + a, base + b, base + c);
        }
    }
    mesh
}
