//! Utility Module
//!
//! - [`FrameClock`]: per-frame delta and total elapsed time
//! - [`FpsCounter`]: frame rate measurement

pub mod fps_counter;
pub mod time;

pub use fps_counter::FpsCounter;
pub use time::FrameClock;
