//! Scene-level helpers
//!
//! - [`Transform`]: position, rotation and scale with an eagerly rebuilt matrix
//! - [`Camera`]: FPS camera with an optional skybox
//! - [`KeyframeInterpolator`]: timed keyframes for scripted motion

pub mod camera;
pub mod interpolator;
pub mod transform;

pub use camera::{Camera, KeyBindings};
pub use interpolator::{Interpolation, Keyframe, KeyframeInterpolator, Lerp};
pub use transform::Transform;
