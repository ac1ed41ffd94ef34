//! In-memory device that records every call.
//!
//! Used by tests and headless tools to observe the upload lifecycle, instancing
//! and per-draw uniform pushes without a GPU.

use std::collections::HashMap;

use glam::Vec3;

use crate::renderer::device::{BufferId, BufferKind, DrawCall, GpuDevice, TextureId};

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    CreateBuffer(BufferId, BufferKind),
    WriteBuffer(BufferId, usize),
    ReleaseBuffer(BufferId),
    CreateTexture(TextureId, u32, u32),
    WriteTexture(TextureId, u32, u32),
    ReleaseTexture(TextureId),
    BeginFrame(Vec3),
    Draw(BufferId, u32),
    EndFrame,
}

#[derive(Debug, Clone)]
pub struct RecordedBuffer {
    pub kind: BufferKind,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RecordedTexture {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct RecordingDevice {
    next_id: u32,
    buffers: HashMap<BufferId, RecordedBuffer>,
    textures: HashMap<TextureId, RecordedTexture>,
    /// Draw calls since the last `begin_frame`.
    pub draws: Vec<DrawCall>,
    pub events: Vec<DeviceEvent>,
    pub frames_finished: u32,
    /// Remaining allocations before every allocation returns the null handle.
    /// `None` never fails.
    pub fail_after: Option<u32>,
}

impl RecordingDevice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes allocations fail once `count` more have succeeded.
    pub fn fail_allocations_after(&mut self, count: u32) {
        self.fail_after = Some(count);
    }

    fn allocate(&mut self) -> Option<u32> {
        if let Some(left) = &mut self.fail_after {
            if *left == 0 {
                return None;
            }
            *left -= 1;
        }
        self.next_id += 1;
        Some(self.next_id)
    }

    #[must_use]
    pub fn buffer(&self, id: BufferId) -> Option<&RecordedBuffer> {
        self.buffers.get(&id)
    }

    #[must_use]
    pub fn texture(&self, id: TextureId) -> Option<&RecordedTexture> {
        self.textures.get(&id)
    }

    /// Buffers allocated and not yet released.
    #[must_use]
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    #[must_use]
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Number of `WriteBuffer` events so far.
    #[must_use]
    pub fn buffer_writes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, DeviceEvent::WriteBuffer(..)))
            .count()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

impl GpuDevice for RecordingDevice {
    fn create_buffer(&mut self, kind: BufferKind) -> Option<BufferId> {
        let id = BufferId(self.allocate()?);
        self.buffers.insert(id, RecordedBuffer { kind, data: Vec::new() });
        self.events.push(DeviceEvent::CreateBuffer(id, kind));
        Some(id)
    }

    fn write_buffer(&mut self, id: BufferId, data: &[u8]) {
        match self.buffers.get_mut(&id) {
            Some(buffer) => {
                buffer.data.clear();
                buffer.data.extend_from_slice(data);
                self.events.push(DeviceEvent::WriteBuffer(id, data.len()));
            }
            None => log::warn!("Write to unknown buffer {id:?}"),
        }
    }

    fn release_buffer(&mut self, id: BufferId) {
        if self.buffers.remove(&id).is_some() {
            self.events.push(DeviceEvent::ReleaseBuffer(id));
        }
    }

    fn create_texture(&mut self, width: u32, height: u32) -> Option<TextureId> {
        let id = TextureId(self.allocate()?);
        self.textures.insert(
            id,
            RecordedTexture {
                width,
                height,
                rgb: Vec::new(),
            },
        );
        self.events.push(DeviceEvent::CreateTexture(id, width, height));
        Some(id)
    }

    fn write_texture(&mut self, id: TextureId, width: u32, height: u32, rgb: &[u8]) {
        match self.textures.get_mut(&id) {
            Some(texture) => {
                texture.width = width;
                texture.height = height;
                texture.rgb = rgb.to_vec();
                self.events.push(DeviceEvent::WriteTexture(id, width, height));
            }
            None => log::warn!("Write to unknown texture {id:?}"),
        }
    }

    fn release_texture(&mut self, id: TextureId) {
        if self.textures.remove(&id).is_some() {
            self.events.push(DeviceEvent::ReleaseTexture(id));
        }
    }

    fn begin_frame(&mut self, clear_color: Vec3) {
        self.draws.clear();
        self.events.push(DeviceEvent::BeginFrame(clear_color));
    }

    fn draw(&mut self, call: &DrawCall) {
        self.events.push(DeviceEvent::Draw(call.vertex_buffer, call.index_count));
        self.draws.push(call.clone());
    }

    fn end_frame(&mut self) {
        self.frames_finished += 1;
        self.events.push(DeviceEvent::EndFrame);
    }
}
