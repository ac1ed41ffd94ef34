//! Rendering System
//!
//! - [`device`]: the [`GpuDevice`] boundary and draw call description
//! - [`uniforms`]: the uniform block pushed with every draw
//! - [`wgpu_backend`]: the wgpu implementation
//! - [`recording`]: an in-memory device for tests and tooling
//! - [`RenderContext`]: per-application driver owning the device, camera,
//!   keyboard state, frame clock and global frame uniforms
//!
//! # Frame Loop
//!
//! ```rust,ignore
//! let mut ctx = RenderContext::with_wgpu(RenderSettings::default())?;
//! while ctx.render_frame(|ctx| {
//!     ctx.handle_fps();
//!     ctx.draw_skybox(&resources);
//!     ctx.draw(&mut resources, terrain);
//! }) {}
//! ```

pub mod device;
pub mod recording;
pub mod settings;
pub mod uniforms;
pub mod wgpu_backend;

use std::time::Instant;

use glam::Vec3;

use crate::app::input::{ButtonState, InputEvent, Key, Keyboard};
use crate::errors::Result;
use crate::math::safe_normalize;
use crate::resources::{DrawableHandle, Resources};
use crate::scene::camera::Camera;
use crate::utils::{FpsCounter, FrameClock};

pub use device::{BufferId, DrawCall, GpuBuffers, GpuDevice, PolygonMode, TextureId, VertexLayout};
pub use recording::RecordingDevice;
pub use settings::RenderSettings;
pub use uniforms::{FrameUniforms, MAX_SHADOWS, ShaderUniforms};
pub use wgpu_backend::WgpuDevice;

/// What a draw needs from the frame: the device and the frame-wide uniforms.
pub struct DrawContext<'a> {
    pub device: &'a mut dyn GpuDevice,
    pub frame: &'a FrameUniforms,
    /// Milliseconds since the previous frame, drives animation playback.
    pub elapsed_ms: f32,
    /// Whether LOD meshes re-pick their level this frame.
    pub lod_frame: bool,
}

/// Render driver state for one application.
pub struct RenderContext<D: GpuDevice> {
    device: D,
    pub camera: Camera,
    pub keyboard: Keyboard,
    settings: RenderSettings,
    frame: FrameUniforms,
    clock: FrameClock,
    fps: FpsCounter,
    stop_requested: bool,
}

impl RenderContext<WgpuDevice> {
    /// Opens the default adapter and renders offscreen at the configured size.
    pub fn with_wgpu(settings: RenderSettings) -> Result<Self> {
        let device = WgpuDevice::new(&settings)?;
        Ok(Self::new(settings, device))
    }
}

impl<D: GpuDevice> RenderContext<D> {
    #[must_use]
    pub fn new(settings: RenderSettings, device: D) -> Self {
        Self::starting_at(settings, device, Instant::now())
    }

    /// Like [`new`](Self::new) with an explicit start instant for the frame clock.
    #[must_use]
    pub fn starting_at(settings: RenderSettings, device: D, start: Instant) -> Self {
        let camera = Camera::new_perspective(settings.fov, settings.aspect_ratio(), settings.near, settings.far);
        let frame = FrameUniforms {
            light_direction: safe_normalize(settings.light_direction),
            light_color: settings.light_color,
            background_color: settings.background_color,
            fog_distance: settings.fog_distance.max(0.0),
            far_plane: settings.far,
            max_shadows: settings.effective_max_shadows(),
            ..FrameUniforms::default()
        };

        log::debug!(
            "Render context {}x{}, fov {}, lod interval {}",
            settings.width,
            settings.height,
            settings.fov,
            settings.effective_lod_interval()
        );

        Self {
            device,
            camera,
            keyboard: Keyboard::new(),
            settings,
            frame,
            clock: FrameClock::starting_at(start),
            fps: FpsCounter::starting_at(start),
            stop_requested: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    #[must_use]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    #[must_use]
    pub fn frame_uniforms(&self) -> &FrameUniforms {
        &self.frame
    }

    // ========================================================================
    // Global state
    // ========================================================================

    pub fn set_perspective(&mut self, fov: f32, near: f32, far: f32) {
        self.settings.fov = fov;
        self.settings.near = near;
        self.settings.far = far;
        self.camera.set_perspective(fov, near, far);
        self.frame.far_plane = far;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {width}x{height}");
            return;
        }
        self.settings.width = width;
        self.settings.height = height;
        self.camera.set_aspect(self.settings.aspect_ratio());
        self.device.resize(width, height);
    }

    /// Sets the global directional light. A zero direction falls back to +X.
    pub fn set_global_light(&mut self, direction: Vec3, color: Vec3) {
        self.frame.light_direction = safe_normalize(direction);
        self.frame.light_color = color;
    }

    /// Clear color, also used as the fog color.
    pub fn set_background_color(&mut self, color: Vec3) {
        self.frame.background_color = color;
    }

    /// Distance at which fog fully covers geometry. 0 turns fog off.
    pub fn set_fog(&mut self, distance: f32) {
        self.frame.fog_distance = distance.max(0.0);
    }

    // ========================================================================
    // Timing
    // ========================================================================

    /// Milliseconds between the last two frames.
    #[must_use]
    pub fn frame_time_difference(&self) -> f32 {
        self.clock.delta_ms()
    }

    /// Milliseconds since the context was created, as of the current frame.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.clock.elapsed_ms()
    }

    #[must_use]
    pub fn fps(&self) -> f32 {
        self.fps.current_fps
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.clock.frame_count
    }

    /// True on the first frame and every `lod_interval` frames after it.
    #[must_use]
    pub fn is_lod_frame(&self) -> bool {
        let interval = u64::from(self.settings.effective_lod_interval());
        self.clock.frame_count.saturating_sub(1) % interval == 0
    }

    // ========================================================================
    // Input
    // ========================================================================

    pub fn inject_key(&mut self, key: Key, state: ButtonState) {
        self.keyboard.inject_key(key, state);
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.keyboard.drain_events()
    }

    /// Moves the camera from the held keys using the last frame time.
    pub fn handle_fps(&mut self) {
        let elapsed = self.frame_time_difference();
        self.camera.handle_fps(&self.keyboard, elapsed);
    }

    // ========================================================================
    // Frame loop
    // ========================================================================

    /// Asks the loop to stop. Observed at the top of the next frame.
    pub fn stop_rendering(&mut self) {
        self.stop_requested = true;
    }

    #[must_use]
    pub fn is_stopping(&self) -> bool {
        self.stop_requested
    }

    /// Starts a frame at `now`. Returns false once a stop was requested.
    pub fn begin_frame_at(&mut self, now: Instant) -> bool {
        if self.stop_requested {
            log::info!("Render loop stopped after {} frames", self.clock.frame_count);
            return false;
        }
        self.clock.tick_at(now);
        if let Some(fps) = self.fps.update_at(now) {
            log::trace!("{fps:.1} fps");
        }
        self.refresh_camera_uniforms();
        self.device.begin_frame(self.frame.background_color);
        true
    }

    pub fn begin_frame(&mut self) -> bool {
        self.begin_frame_at(Instant::now())
    }

    pub fn end_frame(&mut self) {
        self.device.end_frame();
    }

    /// Runs one frame around `draw`. Returns false, without drawing, once
    /// [`stop_rendering`](Self::stop_rendering) has been called.
    pub fn render_frame(&mut self, draw: impl FnOnce(&mut Self)) -> bool {
        self.render_frame_at(Instant::now(), draw)
    }

    pub fn render_frame_at(&mut self, now: Instant, draw: impl FnOnce(&mut Self)) -> bool {
        if !self.begin_frame_at(now) {
            return false;
        }
        draw(self);
        self.end_frame();
        true
    }

    /// Copies the camera into the frame uniforms. Done by `begin_frame`, call
    /// again after moving the camera mid-frame.
    pub fn refresh_camera_uniforms(&mut self) {
        self.frame.view = self.camera.view_matrix();
        self.frame.perspective = self.camera.projection_matrix();
        self.frame.camera_position = self.camera.position();
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    pub fn draw_context(&mut self) -> DrawContext<'_> {
        DrawContext {
            elapsed_ms: self.clock.delta_ms(),
            lod_frame: self.is_lod_frame(),
            device: &mut self.device,
            frame: &self.frame,
        }
    }

    /// Draws any resource with the current frame state.
    pub fn draw(&mut self, resources: &mut Resources, handle: impl Into<DrawableHandle>) {
        let mut ctx = self.draw_context();
        resources.draw(handle, &mut ctx);
    }

    /// Uploads a resource (or every LOD level it needs) to this context's device.
    pub fn upload(&mut self, resources: &mut Resources, handle: impl Into<DrawableHandle>) {
        resources.update(handle, &mut self.device);
    }

    pub fn upload_skybox(&mut self) {
        self.camera.update_skybox(&mut self.device);
    }

    pub fn draw_skybox(&mut self, resources: &Resources) {
        let mut ctx = DrawContext {
            elapsed_ms: self.clock.delta_ms(),
            lod_frame: false,
            device: &mut self.device,
            frame: &self.frame,
        };
        self.camera.draw_skybox(&resources.textures, &mut ctx);
    }
}
