//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`EngineError`] covers the recoverable failure modes:
//! - Resource loading (image header, bit depth, truncated data, model syntax)
//! - Resource handles that no longer resolve
//! - GPU adapter/device initialization and shader compilation
//!
//! GPU allocation failures during `update()` are *not* errors: they are logged
//! and the resource keeps an unallocated handle.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen::errors::Result;
//!
//! fn load_assets() -> Result<()> {
//!     let texture = lumen::Texture::load_ppm("grass.ppm")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// The shading program could not be compiled or validated.
    #[error("Shader compilation failed: {0}")]
    ShaderCompilation(String),

    // ========================================================================
    // Image & Texture Errors
    // ========================================================================
    /// The image header is not the expected binary RGB raster header.
    #[error("Invalid image header: {0}")]
    InvalidImageHeader(String),

    /// Only 8-bit components (max value 255) are supported.
    #[error("Unsupported image bit depth: max component value {0} (expected 255)")]
    UnsupportedBitDepth(u32),

    /// The pixel payload is shorter than the header promises.
    #[error("Truncated image data: expected {expected} bytes, got {actual}")]
    TruncatedImage {
        /// Number of payload bytes announced by the header
        expected: usize,
        /// Number of payload bytes actually present
        actual: usize,
    },

    /// Texture dimensions must be non-zero powers of two.
    #[error("Invalid texture size {width}x{height}: dimensions must be powers of two")]
    InvalidTextureSize {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Image decoding error (formats handled by the `image` crate).
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    // ========================================================================
    // Model Errors
    // ========================================================================
    /// A model file line could not be parsed.
    #[error("Model parse error at line {line}: {message}")]
    ModelParse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// A handle does not refer to a live resource.
    #[error("Invalid resource handle: {0}")]
    InvalidHandle(&'static str),

    /// A mesh cannot become an instance of itself.
    #[error("Invalid instancing: {0}")]
    InvalidInstance(String),

    // ========================================================================
    // I/O & Configuration Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for EngineError {
    fn from(err: image::ImageError) -> Self {
        EngineError::ImageDecode(err.to_string())
    }
}

/// Alias for `Result<T, EngineError>`.
pub type Result<T> = std::result::Result<T, EngineError>;
