//! Core resource definitions
//!
//! CPU-side data for everything that can be drawn, independent of the GPU backend:
//! - [`StaticMesh`]: editable triangle mesh, optionally an instance of another mesh
//! - [`AnimatedMesh`]: vertex-snapshot animation with interpolated playback
//! - [`LodMesh`]: distance-based choice between static meshes
//! - [`Picture2d`]: screen-space quad
//! - [`Texture`]: RGB pixels with keyed transparency
//!
//! Resources live in the [`Resources`] arena and are addressed by slotmap handles.

pub mod animated;
pub mod arena;
pub mod lod;
pub mod material;
pub mod mesh;
pub mod obj;
pub mod picture;
pub mod ppm;
pub mod primitives;
pub mod texture;
pub mod vertex;

use slotmap::new_key_type;

use crate::renderer::device::GpuDevice;

new_key_type! {
    pub struct MeshHandle;
    pub struct AnimatedMeshHandle;
    pub struct LodMeshHandle;
    pub struct PictureHandle;
    pub struct TextureHandle;
}

/// Something with a GPU-resident copy that can be (re)uploaded and released.
pub trait GpuObject {
    /// Pushes the current CPU data to the device, allocating on first use.
    ///
    /// Allocation failure is logged and leaves the object unallocated.
    fn update(&mut self, device: &mut dyn GpuDevice);

    /// Releases owned device resources. Safe to call repeatedly.
    fn unload(&mut self, device: &mut dyn GpuDevice);
}

pub use animated::{AnimatedMesh, AnimationFrame, Playback};
pub use arena::{DrawableHandle, Resources};
pub use lod::{DetailLevel, LodMesh};
pub use material::{Material, RenderMode, ShadowBlob};
pub use mesh::{Direction, StaticMesh};
pub use picture::Picture2d;
pub use texture::Texture;
pub use vertex::{BoundingBox, Triangle, Vertex};
