//! Frame-based (vertex snapshot) animation.
//!
//! Each [`AnimationFrame`] is a copy of a static mesh's geometry plus a duration.
//! On upload every frame gets one interleaved buffer holding its own vertex and
//! the matching vertex of the following frame, so the shader can blend the two
//! with a single factor. The last frame blends towards frame 0.

use slotmap::SlotMap;

use crate::renderer::DrawContext;
use crate::renderer::device::{GpuBuffers, GpuDevice, VertexLayout, allocate_buffers};
use crate::resources::material::Material;
use crate::resources::mesh::{StaticMesh, submit_draw};
use crate::resources::texture::Texture;
use crate::resources::vertex::{Triangle, Vertex};
use crate::resources::{AnimatedMeshHandle, GpuObject, TextureHandle};
use crate::scene::transform::Transform;

#[derive(Debug, Clone)]
pub struct AnimationFrame {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) triangles: Vec<Triangle>,
    /// Duration in milliseconds.
    pub length_ms: f32,
    pub(crate) buffers: Option<GpuBuffers>,
}

impl AnimationFrame {
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// `None` until uploaded.
    #[must_use]
    pub fn gpu_buffers(&self) -> Option<GpuBuffers> {
        self.buffers
    }
}

/// Shortest accepted frame duration; shorter lengths are clamped to it.
pub const MIN_FRAME_LENGTH_MS: f32 = 1.0;

/// Playback position and settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playback {
    pub current_frame: usize,
    /// Progress towards the next frame, in `[0, 1)`.
    pub frame_percentage: f32,
    pub playing: bool,
    pub looping: bool,
    /// Blend between frames instead of switching discretely.
    pub interpolate: bool,
    /// Multiplier on elapsed time; negative plays backwards.
    pub speed: f32,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            current_frame: 0,
            frame_percentage: 0.0,
            playing: false,
            looping: true,
            interpolate: true,
            speed: 1.0,
        }
    }
}

impl Playback {
    /// Advances by `elapsed_ms` over frames of the given lengths.
    ///
    /// Progress is measured against the current frame's length. The whole
    /// number of frames crossed is applied in one step, so any elapsed time
    /// finishes in constant time. Without looping, passing either end stops
    /// playback at percentage 0.
    pub fn advance(&mut self, elapsed_ms: f32, frame_lengths: &[f32]) {
        let count = frame_lengths.len();
        if !self.playing || count == 0 {
            return;
        }
        if self.current_frame >= count {
            self.current_frame = 0;
        }

        let length = frame_lengths[self.current_frame].max(MIN_FRAME_LENGTH_MS);
        let progress = self.frame_percentage + self.speed * (elapsed_ms / length);
        if !progress.is_finite() {
            log::warn!("Animation progress is not finite, resetting frame {}", self.current_frame);
            self.frame_percentage = 0.0;
            return;
        }

        let mut steps = progress.floor();
        let mut remainder = progress - steps;
        // a tiny negative progress rounds up to exactly 1.0
        if remainder >= 1.0 {
            remainder = 0.0;
            steps += 1.0;
        }
        if steps == 0.0 {
            self.frame_percentage = remainder;
            return;
        }

        let count_f = count as f32;
        if self.looping {
            let shift = steps.rem_euclid(count_f) as usize % count;
            self.current_frame = (self.current_frame + shift) % count;
            self.frame_percentage = remainder;
            return;
        }

        let target = self.current_frame as f32 + steps;
        if target >= count_f {
            self.current_frame = count - 1;
            self.stop_at_end();
        } else if target < 0.0 {
            self.current_frame = 0;
            self.stop_at_end();
        } else {
            self.current_frame = target as usize;
            self.frame_percentage = remainder;
        }
    }

    fn stop_at_end(&mut self) {
        self.playing = false;
        self.frame_percentage = 0.0;
    }

    /// Blend factor pushed to the shader.
    #[must_use]
    pub fn blend(&self) -> f32 {
        if self.interpolate {
            self.frame_percentage
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnimatedMesh {
    pub(crate) frames: Vec<AnimationFrame>,
    pub(crate) parent: Option<AnimatedMeshHandle>,
    pub playback: Playback,
    pub transform: Transform,
    pub material: Material,
    pub visible: bool,
}

impl Default for AnimatedMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimatedMesh {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            parent: None,
            playback: Playback::default(),
            transform: Transform::new(),
            material: Material::new(),
            visible: true,
        }
    }

    /// Appends a frame by copying `mesh`'s geometry. The mesh is not retained.
    ///
    /// Lengths below [`MIN_FRAME_LENGTH_MS`] (or not finite) are clamped to it.
    pub fn add_frame(&mut self, mesh: &StaticMesh, length_ms: f32) {
        let length_ms = if length_ms.is_finite() && length_ms >= MIN_FRAME_LENGTH_MS {
            length_ms
        } else {
            log::warn!("Animation frame length {length_ms} ms clamped to {MIN_FRAME_LENGTH_MS} ms");
            MIN_FRAME_LENGTH_MS
        };
        self.frames.push(AnimationFrame {
            vertices: mesh.vertices().to_vec(),
            triangles: mesh.triangles().to_vec(),
            length_ms,
            buffers: None,
        });
    }

    #[must_use]
    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    /// Frames owned by this mesh (an instance owns none that matter).
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_instance(&self) -> bool {
        self.parent.is_some()
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playback.playing = playing;
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.playback.looping = looping;
    }

    pub fn set_interpolate(&mut self, interpolate: bool) {
        self.playback.interpolate = interpolate;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.playback.speed = speed;
    }

    /// Jumps to a frame, resetting the sub-frame progress.
    pub fn set_frame(&mut self, frame: usize) {
        self.playback.current_frame = frame;
        self.playback.frame_percentage = 0.0;
    }

    pub(crate) fn frame_lengths(&self) -> Vec<f32> {
        self.frames.iter().map(|f| f.length_ms).collect()
    }

    pub(crate) fn become_instance(&mut self, parent: AnimatedMeshHandle, device: &mut dyn GpuDevice) {
        self.unload(device);
        self.parent = Some(parent);
    }

    /// Draws frame `frame` of `frames` (own or parent's) with this mesh's state.
    pub(crate) fn draw_frame(
        &self,
        frames: &[AnimationFrame],
        textures: &SlotMap<TextureHandle, Texture>,
        ctx: &mut DrawContext<'_>,
    ) {
        let Some(frame) = frames.get(self.playback.current_frame) else {
            return;
        };
        let Some(buffers) = frame.buffers else {
            log::warn!("Animated mesh drawn before upload");
            return;
        };
        let blend = self.playback.blend();
        submit_draw(
            ctx,
            &self.material,
            self.transform.matrix(),
            &buffers,
            VertexLayout::Interleaved,
            textures,
            |u| u.params[2] = blend,
        );
    }
}

/// Builds the interleaved vertex stream `[this_0, next_0, this_1, next_1, ...]`.
///
/// When the frames disagree on vertex count the missing partners repeat the
/// frame's own vertex, so that frame renders without blending.
fn interleave(this: &[Vertex], next: &[Vertex]) -> Vec<Vertex> {
    if this.len() != next.len() {
        log::warn!(
            "Animation frames differ in vertex count ({} vs {}), blending disabled for this frame",
            this.len(),
            next.len()
        );
    }
    let mut out = Vec::with_capacity(this.len() * 2);
    for (i, v) in this.iter().enumerate() {
        out.push(*v);
        out.push(if this.len() == next.len() { next[i] } else { *v });
    }
    out
}

impl GpuObject for AnimatedMesh {
    fn update(&mut self, device: &mut dyn GpuDevice) {
        if self.parent.is_some() {
            return;
        }
        let count = self.frames.len();
        for i in 0..count {
            let data = interleave(&self.frames[i].vertices, &self.frames[(i + 1) % count].vertices);
            let frame = &mut self.frames[i];
            if frame.buffers.is_none() {
                frame.buffers = allocate_buffers(device, "animation frame");
            }
            if let Some(buffers) = &mut frame.buffers {
                device.write_buffer(buffers.vertex, bytemuck::cast_slice(&data));
                device.write_buffer(buffers.index, bytemuck::cast_slice(&frame.triangles));
                buffers.index_count = (frame.triangles.len() * 3) as u32;
            }
        }
    }

    fn unload(&mut self, device: &mut dyn GpuDevice) {
        for frame in &mut self.frames {
            if let Some(buffers) = frame.buffers.take() {
                device.release_buffer(buffers.vertex);
                device.release_buffer(buffers.index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> Playback {
        Playback {
            playing: true,
            ..Playback::default()
        }
    }

    #[test]
    fn advance_lands_mid_second_frame() {
        let mut p = playing();
        p.advance(1500.0, &[1000.0, 1000.0]);
        assert_eq!(p.current_frame, 1);
        assert!((p.frame_percentage - 0.5).abs() < 1e-6);
    }

    #[test]
    fn advance_wraps_when_looping() {
        let mut p = playing();
        p.advance(2250.0, &[1000.0, 1000.0]);
        assert_eq!(p.current_frame, 0);
        assert!((p.frame_percentage - 0.25).abs() < 1e-6);
    }

    #[test]
    fn advance_backwards() {
        let mut p = playing();
        p.speed = -1.0;
        p.advance(250.0, &[1000.0, 1000.0, 1000.0]);
        assert_eq!(p.current_frame, 2);
        assert!((p.frame_percentage - 0.75).abs() < 1e-6);
    }

    #[test]
    fn non_looping_stops_at_wrap() {
        let mut p = playing();
        p.looping = false;
        p.advance(2500.0, &[1000.0, 1000.0]);
        assert!(!p.playing);
        assert_eq!(p.current_frame, 1);
        assert_eq!(p.frame_percentage, 0.0);
    }

    #[test]
    fn zero_length_frame_is_treated_as_shortest_frame() {
        let mut p = playing();
        p.advance(16.0, &[0.0, 1000.0]);
        // 16 frames of 1 ms crossed over two frames: lands back on frame 0
        assert_eq!(p.current_frame, 0);
        assert_eq!(p.frame_percentage, 0.0);
        assert!(p.playing);
    }

    #[test]
    fn huge_elapsed_time_finishes() {
        let mut p = playing();
        p.advance(1.0e12, &[1.0, 1.0, 1.0]);
        assert!(p.current_frame < 3);
        assert!((0.0..1.0).contains(&p.frame_percentage));

        let mut p = playing();
        p.speed = -1.0;
        p.advance(f32::MAX, &[1.0, 1.0]);
        assert!(p.current_frame < 2);
        assert!((0.0..1.0).contains(&p.frame_percentage));
    }

    #[test]
    fn non_looping_huge_step_stops_at_last_frame() {
        let mut p = playing();
        p.looping = false;
        p.advance(1.0e12, &[1000.0, 1000.0, 1000.0]);
        assert!(!p.playing);
        assert_eq!(p.current_frame, 2);
    }

    #[test]
    fn non_finite_progress_resets() {
        let mut p = playing();
        p.frame_percentage = 0.3;
        p.advance(f32::NAN, &[1000.0]);
        assert_eq!(p.frame_percentage, 0.0);
        assert_eq!(p.current_frame, 0);
    }

    #[test]
    fn paused_playback_does_not_move() {
        let mut p = Playback::default();
        p.advance(500.0, &[1000.0]);
        assert_eq!(p.frame_percentage, 0.0);
    }
}
