use std::path::Path;

use glam::Vec3;

use crate::errors::{EngineError, Result};
use crate::renderer::device::{GpuDevice, TextureId};
use crate::resources::GpuObject;
use crate::resources::ppm;

/// An RGB texture with an optional keyed transparent color.
///
/// Pixels live on the CPU until [`GpuObject::update`] pushes them into a device
/// texture (sampled with linear filtering). Transparency is not an alpha channel:
/// fragments whose color matches the key within a small tolerance are discarded.
#[derive(Debug, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    data: Vec<u8>,
    transparent_color: [u8; 3],
    transparency: bool,
    gpu: Option<TextureId>,
}

impl Texture {
    /// Creates a black texture. Both dimensions must be non-zero powers of two.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if !width.is_power_of_two() || !height.is_power_of_two() {
            return Err(EngineError::InvalidTextureSize { width, height });
        }
        let len = ppm::rgb_len(width, height).ok_or(EngineError::InvalidTextureSize { width, height })?;
        Ok(Self::from_rgb_unchecked(width, height, vec![0; len]))
    }

    /// Wraps existing RGB bytes. `data` must hold exactly `width * height * 3` bytes.
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = ppm::rgb_len(width, height).ok_or(EngineError::InvalidTextureSize { width, height })?;
        if data.len() != expected {
            return Err(EngineError::TruncatedImage {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self::from_rgb_unchecked(width, height, data))
    }

    fn from_rgb_unchecked(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
            transparent_color: [0, 0, 0],
            transparency: false,
            gpu: None,
        }
    }

    // ========================================================================
    // Loading & Saving
    // ========================================================================

    /// Loads a binary PPM file.
    pub fn load_ppm(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let image = ppm::decode(&bytes)?;
        if !image.width.is_power_of_two() || !image.height.is_power_of_two() {
            log::warn!(
                "Texture {} is {}x{}, not a power of two",
                path.display(),
                image.width,
                image.height
            );
        }
        log::debug!("Loaded texture {} ({}x{})", path.display(), image.width, image.height);
        Ok(Self::from_rgb_unchecked(image.width, image.height, image.data))
    }

    /// Saves the pixels as a binary PPM file.
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, ppm::encode(self.width, self.height, &self.data))?;
        Ok(())
    }

    /// Loads any format the `image` crate can decode (alpha is dropped).
    pub fn load_image(path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path.as_ref())?.to_rgb8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgb_unchecked(width, height, img.into_raw()))
    }

    // ========================================================================
    // Pixel Access
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB bytes, row-major from the top-left pixel.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 3)
    }

    /// Out-of-range coordinates read as black.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.offset(x, y)
            .map_or([0, 0, 0], |i| [self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + 3].copy_from_slice(&rgb);
        }
    }

    // ========================================================================
    // Transparency
    // ========================================================================

    pub fn set_transparent_color(&mut self, r: u8, g: u8, b: u8) {
        self.transparent_color = [r, g, b];
    }

    #[must_use]
    pub fn transparent_color(&self) -> [u8; 3] {
        self.transparent_color
    }

    /// The key color as normalized floats, the form the shader compares against.
    #[must_use]
    pub fn transparent_color_f32(&self) -> Vec3 {
        let [r, g, b] = self.transparent_color;
        Vec3::new(f32::from(r), f32::from(g), f32::from(b)) / 255.0
    }

    pub fn set_transparency(&mut self, enabled: bool) {
        self.transparency = enabled;
    }

    #[must_use]
    pub fn transparency(&self) -> bool {
        self.transparency
    }

    /// Device handle, `None` until uploaded.
    #[must_use]
    pub fn gpu_handle(&self) -> Option<TextureId> {
        self.gpu
    }
}

impl GpuObject for Texture {
    fn update(&mut self, device: &mut dyn GpuDevice) {
        if self.gpu.is_none() {
            self.gpu = device.create_texture(self.width, self.height);
            if self.gpu.is_none() {
                log::error!("Failed to allocate {}x{} texture", self.width, self.height);
                return;
            }
        }
        if let Some(id) = self.gpu {
            device.write_texture(id, self.width, self.height, &self.data);
        }
    }

    fn unload(&mut self, device: &mut dyn GpuDevice) {
        if let Some(id) = self.gpu.take() {
            device.release_texture(id);
        }
    }
}
