//! Static triangle mesh.
//!
//! [`StaticMesh`] owns editable geometry, a transform, a material and (once
//! uploaded) a vertex/index buffer pair. Meshes normally live in the
//! [`Resources`](crate::resources::Resources) arena, which resolves instancing:
//! an instance keeps its own transform and material but draws with the buffers of
//! the mesh it was made an instance of.

use glam::{Mat4, Vec2, Vec3};
use slotmap::SlotMap;

pub use crate::math::Direction;
use crate::math::{safe_normalize, transform_normal, transform_point};
use crate::renderer::DrawContext;
use crate::renderer::device::{DrawCall, GpuBuffers, GpuDevice, VertexLayout, allocate_buffers};
use crate::renderer::uniforms::ShaderUniforms;
use crate::resources::material::{Material, bound_textures};
use crate::resources::texture::Texture;
use crate::resources::vertex::{BoundingBox, Triangle, Vertex};
use crate::resources::{GpuObject, MeshHandle, TextureHandle};
use crate::scene::transform::Transform;

#[derive(Debug, Clone)]
pub struct StaticMesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) triangles: Vec<Triangle>,
    pub(crate) buffers: Option<GpuBuffers>,
    pub(crate) parent: Option<MeshHandle>,
    pub transform: Transform,
    pub material: Material,
    pub visible: bool,
}

impl Default for StaticMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticMesh {
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            buffers: None,
            parent: None,
            transform: Transform::new(),
            material: Material::new(),
            visible: true,
        }
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Appends a vertex and returns its index. The normal is stored normalized.
    pub fn add_vertex(&mut self, position: Vec3, uv: Vec2, normal: Vec3) -> u32 {
        self.vertices.push(Vertex::new(position, uv, normal));
        (self.vertices.len() - 1) as u32
    }

    /// Appends a triangle. Indices are not validated.
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.triangles.push(Triangle::new(a, b, c));
    }

    /// Removes all geometry (GPU buffers keep their old content until `update`).
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.triangles.clear();
    }

    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of vertices in this mesh's own list.
    ///
    /// For an instance use [`Resources::mesh_vertex_count`](crate::resources::Resources::mesh_vertex_count),
    /// which follows the parent.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[must_use]
    pub fn is_instance(&self) -> bool {
        self.parent.is_some()
    }

    #[must_use]
    pub fn instance_parent(&self) -> Option<MeshHandle> {
        self.parent
    }

    /// Buffers owned by this mesh, `None` before upload and for instances.
    #[must_use]
    pub fn gpu_buffers(&self) -> Option<GpuBuffers> {
        self.buffers
    }

    // ========================================================================
    // Transform & Material shortcuts
    // ========================================================================

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.transform.set_position(Vec3::new(x, y, z));
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.transform.set_rotation(Vec3::new(x, y, z));
    }

    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        self.transform.set_scale(Vec3::new(x, y, z));
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.transform.set_scale(Vec3::splat(scale));
    }

    pub fn set_texture(&mut self, texture: Option<TextureHandle>) {
        self.material.texture = texture;
    }

    pub fn set_texture2(&mut self, texture: Option<TextureHandle>) {
        self.material.texture2 = texture;
    }

    /// Sets the flat color from 8-bit components.
    pub fn set_color(&mut self, r: u8, g: u8, b: u8) {
        self.material.color = Vec3::new(f32::from(r), f32::from(g), f32::from(b)) / 255.0;
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Appends `other`'s geometry, offsetting its triangle indices.
    pub fn merge(&mut self, other: &StaticMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.triangles.extend(other.triangles.iter().map(|t| {
            let [a, b, c] = t.indices;
            Triangle::new(a + offset, b + offset, c + offset)
        }));
    }

    /// Bakes `matrix` into the geometry: positions as points, normals as directions.
    pub fn apply_matrix(&mut self, matrix: &Mat4) {
        for v in &mut self.vertices {
            v.position = transform_point(matrix, v.position);
            v.normal = transform_normal(matrix, v.normal);
        }
    }

    /// Collapses vertex `i2` into `i1` and removes `i2`.
    ///
    /// Triangles pointing at `i2` are redirected to `i1`, indices above `i2`
    /// shift down by one. Degenerate triangles are left in place, see
    /// [`remove_useless_triangles`](Self::remove_useless_triangles).
    /// Returns `false` for equal or out-of-range indices.
    pub fn merge_vertices(&mut self, i1: u32, i2: u32, average: bool) -> bool {
        let count = self.vertices.len() as u32;
        if i1 == i2 || i1 >= count || i2 >= count {
            return false;
        }

        if average {
            let a = self.vertices[i1 as usize];
            let b = self.vertices[i2 as usize];
            let merged = &mut self.vertices[i1 as usize];
            merged.position = (a.position + b.position) * 0.5;
            merged.uv = (a.uv + b.uv) * 0.5;
            merged.normal = safe_normalize(a.normal + b.normal);
            merged.texture_ratio = (a.texture_ratio + b.texture_ratio) * 0.5;
        }

        self.vertices.remove(i2 as usize);

        for triangle in &mut self.triangles {
            for index in &mut triangle.indices {
                if *index == i2 {
                    *index = i1;
                }
                if *index > i2 {
                    *index -= 1;
                }
            }
        }
        true
    }

    /// Drops triangles that reference the same vertex twice. Returns how many were removed.
    pub fn remove_useless_triangles(&mut self) -> usize {
        let before = self.triangles.len();
        self.triangles.retain(|t| !t.is_degenerate());
        before - self.triangles.len()
    }

    /// Merges the globally closest vertex pair `iterations` times.
    ///
    /// Quadratic per iteration: an offline tool for authoring LOD levels.
    /// Normals are recomputed once at the end.
    pub fn simplify(&mut self, iterations: usize) {
        for _ in 0..iterations {
            let Some((i1, i2)) = self.closest_vertex_pair() else {
                break;
            };
            self.merge_vertices(i1, i2, true);
        }
        self.remove_useless_triangles();
        self.smooth_normals();
    }

    /// Simplifies until roughly `ratio` of the vertices remain.
    pub fn simplify_to_ratio(&mut self, ratio: f32) {
        let count = self.vertices.len();
        let keep = (count as f32 * ratio.clamp(0.0, 1.0)).ceil() as usize;
        self.simplify(count.saturating_sub(keep));
    }

    fn closest_vertex_pair(&self) -> Option<(u32, u32)> {
        let mut best: Option<(u32, u32, f32)> = None;
        for (i, a) in self.vertices.iter().enumerate() {
            for (j, b) in self.vertices.iter().enumerate().skip(i + 1) {
                let d = a.position.distance_squared(b.position);
                if best.is_none_or(|(_, _, bd)| d < bd) {
                    best = Some((i as u32, j as u32, d));
                }
            }
        }
        best.map(|(i, j, _)| (i, j))
    }

    /// Turns the mesh inside out: normals negated, winding reversed.
    pub fn flip_triangles(&mut self) {
        for v in &mut self.vertices {
            v.normal = -v.normal;
        }
        for t in &mut self.triangles {
            t.indices.swap(0, 1);
        }
    }

    /// Recomputes normals as the average of adjacent face normals.
    ///
    /// Vertices not referenced by any triangle get the default normal.
    pub fn smooth_normals(&mut self) {
        let mut sums = vec![Vec3::ZERO; self.vertices.len()];
        let mut referenced = vec![false; self.vertices.len()];

        for t in &self.triangles {
            let [a, b, c] = t.indices.map(|i| i as usize);
            let (Some(pa), Some(pb), Some(pc)) = (
                self.vertices.get(a),
                self.vertices.get(b),
                self.vertices.get(c),
            ) else {
                continue;
            };
            let face = (pa.position - pb.position)
                .cross(pa.position - pc.position)
                .try_normalize()
                .unwrap_or(Vec3::ZERO);
            for i in [a, b, c] {
                sums[i] += face;
                referenced[i] = true;
            }
        }

        for ((v, sum), used) in self.vertices.iter_mut().zip(sums).zip(referenced) {
            v.set_normal(if used { sum } else { Vec3::ZERO });
        }
    }

    /// Planar UV projection along `direction`, spanning the bounding box and
    /// tiled `width` x `height` times.
    pub fn texture_map_plane(&mut self, direction: Direction, width: f32, height: f32) {
        let Some(bb) = self.bounding_box() else {
            return;
        };
        let size = bb.size();
        let ratio = |value: f32, min: f32, extent: f32| {
            if extent > 0.0 { (value - min) / extent } else { 0.0 }
        };

        for v in &mut self.vertices {
            let p = v.position;
            let rx = ratio(p.x, bb.min.x, size.x);
            let ry = ratio(p.y, bb.min.y, size.y);
            let rz = ratio(p.z, bb.min.z, size.z);
            let (u, w) = match direction {
                Direction::Left => (rz, ry),
                Direction::Right => (1.0 - rz, 1.0 - ry),
                Direction::Forward => (rx, ry),
                Direction::Backward => (1.0 - rx, 1.0 - ry),
                Direction::Up => (rx, rz),
                Direction::Down => (1.0 - rx, 1.0 - rz),
            };
            v.uv = Vec2::new(u * width, w * height);
        }
    }

    /// Sets each vertex's texture blend ratio from the red channel of `mask`,
    /// sampled by the vertex's X/Z position within the bounding box.
    pub fn texture_map_layer_mask(&mut self, mask: &Texture) {
        let Some(bb) = self.bounding_box() else {
            return;
        };
        let size = bb.size();
        let max_x = mask.width().saturating_sub(1) as f32;
        let max_y = mask.height().saturating_sub(1) as f32;

        for v in &mut self.vertices {
            let u = if size.x > 0.0 { (v.position.x - bb.min.x) / size.x } else { 0.0 };
            let w = if size.z > 0.0 { (v.position.z - bb.min.z) / size.z } else { 0.0 };
            let [r, _, _] = mask.get_pixel((u * max_x).round() as u32, (w * max_y).round() as u32);
            v.texture_ratio = f32::from(r) / 255.0;
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Axis-aligned bounds of the vertex positions, `None` for an empty mesh.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices.iter().map(|v| v.position))
    }

    /// Extents of the bounding box (zero for an empty mesh).
    #[must_use]
    pub fn get_size(&self) -> Vec3 {
        self.bounding_box().map_or(Vec3::ZERO, |bb| bb.size())
    }

    /// Uniformly scales so the largest extent equals `size`, either into the
    /// vertex data or into the transform.
    pub fn scale_to_size(&mut self, size: f32, apply_to_geometry: bool) {
        let largest = self.get_size().max_element();
        if largest <= 0.0 {
            return;
        }
        let factor = size / largest;
        if apply_to_geometry {
            for v in &mut self.vertices {
                v.position *= factor;
            }
        } else {
            self.set_uniform_scale(factor);
        }
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Releases owned buffers and starts delegating to `parent`.
    pub(crate) fn become_instance(&mut self, parent: MeshHandle, device: &mut dyn GpuDevice) {
        self.unload(device);
        self.parent = Some(parent);
    }

    /// Draws with this mesh's material and transform using `buffers`, which may
    /// belong to another mesh (instance parent, LOD level).
    pub(crate) fn draw_with(
        &self,
        buffers: &GpuBuffers,
        textures: &SlotMap<TextureHandle, Texture>,
        ctx: &mut DrawContext<'_>,
    ) {
        submit_draw(
            ctx,
            &self.material,
            self.transform.matrix(),
            buffers,
            VertexLayout::Single,
            textures,
            |_| {},
        );
    }
}

/// Builds the uniforms for one object and hands the draw to the device.
///
/// `adjust` patches object-specific uniforms (animation blend, 2D flag).
pub(crate) fn submit_draw(
    ctx: &mut DrawContext<'_>,
    material: &Material,
    world: Mat4,
    buffers: &GpuBuffers,
    layout: VertexLayout,
    textures: &SlotMap<TextureHandle, Texture>,
    adjust: impl FnOnce(&mut ShaderUniforms),
) {
    if buffers.index_count == 0 {
        return;
    }
    let (bound, ids) = bound_textures(material, textures);
    let mut uniforms = material.uniforms(ctx.frame, world, &bound);
    adjust(&mut uniforms);
    ctx.device.draw(&DrawCall {
        vertex_buffer: buffers.vertex,
        index_buffer: buffers.index,
        index_count: buffers.index_count,
        layout,
        polygon_mode: material.render_mode.polygon_mode(),
        textures: ids,
        uniforms,
    });
}

impl GpuObject for StaticMesh {
    /// Uploads vertices and triangles. Instances upload nothing.
    fn update(&mut self, device: &mut dyn GpuDevice) {
        if self.parent.is_some() {
            log::trace!("Skipping geometry upload for mesh instance");
            return;
        }
        if self.buffers.is_none() {
            self.buffers = allocate_buffers(device, "static mesh");
        }
        if let Some(buffers) = &mut self.buffers {
            device.write_buffer(buffers.vertex, bytemuck::cast_slice(&self.vertices));
            device.write_buffer(buffers.index, bytemuck::cast_slice(&self.triangles));
            buffers.index_count = (self.triangles.len() * 3) as u32;
        }
    }

    fn unload(&mut self, device: &mut dyn GpuDevice) {
        if let Some(buffers) = self.buffers.take() {
            device.release_buffer(buffers.vertex);
            device.release_buffer(buffers.index);
        }
    }
}
