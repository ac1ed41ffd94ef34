//! GPU device boundary
//!
//! Meshes and textures never talk to a graphics API directly. They allocate and
//! fill opaque buffer/texture handles through [`GpuDevice`] and describe each draw
//! with a [`DrawCall`] that carries the complete uniform block for that object.
//!
//! Allocation returns `Option`: `None` is the null handle. Callers log it and keep
//! going, drawing with a missing handle is skipped.

use glam::Vec3;

use crate::renderer::uniforms::ShaderUniforms;

/// Opaque buffer handle handed out by a [`GpuDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// Opaque texture handle handed out by a [`GpuDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// How a vertex buffer feeds the 8 attribute slots.
///
/// Slots 0-3 are position, uv, normal and blend ratio. Slots 4-7 repeat them for
/// the second animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexLayout {
    /// One 36-byte vertex, slots 4-7 alias slots 0-3.
    Single,
    /// Two vertices per element (this frame, next frame), 72-byte stride.
    Interleaved,
}

impl VertexLayout {
    #[must_use]
    pub const fn stride(self) -> u64 {
        match self {
            Self::Single => 36,
            Self::Interleaved => 72,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

/// A pair of buffers holding a mesh's vertices and triangle indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuBuffers {
    pub vertex: BufferId,
    pub index: BufferId,
    /// Number of indices uploaded by the last `update()`.
    pub index_count: u32,
}

/// Everything a device needs to issue one indexed triangle draw.
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub vertex_buffer: BufferId,
    pub index_buffer: BufferId,
    pub index_count: u32,
    pub layout: VertexLayout,
    pub polygon_mode: PolygonMode,
    pub textures: [Option<TextureId>; 2],
    pub uniforms: ShaderUniforms,
}

/// The render driver as seen by resources.
pub trait GpuDevice {
    fn create_buffer(&mut self, kind: BufferKind) -> Option<BufferId>;

    /// Replaces the whole content of a buffer, growing it when needed.
    fn write_buffer(&mut self, id: BufferId, data: &[u8]);

    fn release_buffer(&mut self, id: BufferId);

    fn create_texture(&mut self, width: u32, height: u32) -> Option<TextureId>;

    /// Uploads tightly packed RGB rows, top row first.
    fn write_texture(&mut self, id: TextureId, width: u32, height: u32, rgb: &[u8]);

    fn release_texture(&mut self, id: TextureId);

    /// Viewport size changed. Devices without a render target ignore it.
    fn resize(&mut self, _width: u32, _height: u32) {}

    fn begin_frame(&mut self, clear_color: Vec3);

    fn draw(&mut self, call: &DrawCall);

    fn end_frame(&mut self);
}

/// Allocates a vertex/index buffer pair, releasing the first if the second fails.
pub(crate) fn allocate_buffers(device: &mut dyn GpuDevice, label: &str) -> Option<GpuBuffers> {
    let Some(vertex) = device.create_buffer(BufferKind::Vertex) else {
        log::error!("Failed to allocate vertex buffer for {label}");
        return None;
    };
    let Some(index) = device.create_buffer(BufferKind::Index) else {
        log::error!("Failed to allocate index buffer for {label}");
        device.release_buffer(vertex);
        return None;
    };
    Some(GpuBuffers {
        vertex,
        index,
        index_count: 0,
    })
}
