#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod app;
pub mod errors;
pub mod math;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod utils;

pub use app::input::{ButtonState, InputEvent, Key, Keyboard};
pub use errors::{EngineError, Result};
pub use math::{Direction, RotationOrder};
pub use renderer::{DrawContext, GpuDevice, RecordingDevice, RenderContext, RenderSettings, WgpuDevice};
pub use resources::primitives::*;
pub use resources::{
    AnimatedMesh, AnimatedMeshHandle, LodMesh, LodMeshHandle, Material, MeshHandle, Picture2d,
    PictureHandle, RenderMode, Resources, StaticMesh, Texture, TextureHandle,
};
pub use scene::{Camera, Interpolation, KeyBindings, KeyframeInterpolator, Transform};
pub use utils::{FpsCounter, FrameClock};
