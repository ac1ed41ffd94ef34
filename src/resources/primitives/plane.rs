use glam::{Mat4, Vec2, Vec3};

use crate::resources::mesh::{Direction, StaticMesh};
use crate::resources::texture::Texture;

pub struct PlaneOptions {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for PlaneOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            width_segments: 1,
            height_segments: 1,
        }
    }
}

/// A grid in the XY plane centered on the origin, facing -Z (towards the default camera).
///
/// `(segments_x + 1) * (segments_y + 1)` vertices, two triangles per cell.
#[must_use]
pub fn create_plane(options: PlaneOptions) -> StaticMesh {
    let grid_x = options.width_segments.max(1);
    let grid_y = options.height_segments.max(1);
    let half_width = options.width / 2.0;
    let half_height = options.height / 2.0;
    let step_x = options.width / grid_x as f32;
    let step_y = options.height / grid_y as f32;

    let mut mesh = StaticMesh::new();

    for j in 0..=grid_y {
        for i in 0..=grid_x {
            mesh.add_vertex(
                Vec3::new(step_x * i as f32 - half_width, step_y * j as f32 - half_height, 0.0),
                Vec2::new(i as f32 / grid_x as f32, j as f32 / grid_y as f32),
                Vec3::NEG_Z,
            );
        }
    }

    let row = grid_x + 1;
    for j in 0..grid_y {
        for i in 0..grid_x {
            let b = j * row + i;
            mesh.add_triangle(b, b + row, b + 1);
            mesh.add_triangle(b + row + 1, b + 1, b + row);
        }
    }

    mesh
}

/// Part of a heightmap to sample, in normalized `[0, 1]` texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightmapRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for HeightmapRegion {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

pub struct TerrainOptions<'a> {
    pub size_x: f32,
    pub size_z: f32,
    /// Height of a fully red heightmap pixel.
    pub height: f32,
    pub resolution_x: u32,
    pub resolution_z: u32,
    pub heightmap: Option<&'a Texture>,
    pub region: HeightmapRegion,
}

impl Default for TerrainOptions<'_> {
    fn default() -> Self {
        Self {
            size_x: 10.0,
            size_z: 10.0,
            height: 1.0,
            resolution_x: 16,
            resolution_z: 16,
            heightmap: None,
            region: HeightmapRegion::default(),
        }
    }
}

/// A grid in the XZ plane (normals up) displaced by a heightmap's red channel.
///
/// Cells alternate their diagonal so the surface has no directional bias. UVs
/// are projected from above and normals smoothed afterwards.
#[must_use]
pub fn create_terrain(options: &TerrainOptions<'_>) -> StaticMesh {
    let grid_x = options.resolution_x.max(1);
    let grid_z = options.resolution_z.max(1);

    let mut mesh = create_plane(PlaneOptions {
        width: options.size_x,
        height: options.size_z,
        width_segments: grid_x,
        height_segments: grid_z,
    });
    mesh.apply_matrix(&Mat4::from_rotation_x(90f32.to_radians()));

    let row = grid_x + 1;
    mesh.triangles.clear();
    for j in 0..grid_z {
        for i in 0..grid_x {
            let b = j * row + i;
            if (i + j) % 2 == 0 {
                mesh.add_triangle(b, b + row, b + 1);
                mesh.add_triangle(b + row + 1, b + 1, b + row);
            } else {
                mesh.add_triangle(b, b + row + 1, b + 1);
                mesh.add_triangle(b, b + row, b + row + 1);
            }
        }
    }

    if let Some(heightmap) = options.heightmap {
        let region = options.region;
        let max_x = heightmap.width().saturating_sub(1) as f32;
        let max_y = heightmap.height().saturating_sub(1) as f32;
        for v in mesh.vertices_mut() {
            let rx = (v.position.x + options.size_x / 2.0) / options.size_x;
            let rz = (v.position.z + options.size_z / 2.0) / options.size_z;
            let px = (region.x + rx * region.width).clamp(0.0, 1.0) * max_x;
            let py = (region.y + rz * region.height).clamp(0.0, 1.0) * max_y;
            let [r, _, _] = heightmap.get_pixel(px as u32, py as u32);
            v.position.y += f32::from(r) / 255.0 * options.height;
        }
    }

    mesh.texture_map_plane(Direction::Down, 1.0, 1.0);
    mesh.smooth_normals();
    mesh
}
