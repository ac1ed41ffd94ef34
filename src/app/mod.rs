//! Application-facing input
//!
//! - [`input`]: platform-agnostic keys, held-key table and event queue
//! - [`input_adapter`]: translation from winit window events

pub mod input;
pub mod input_adapter;

pub use input::{ButtonState, InputEvent, Key, Keyboard};
pub use input_adapter::process_window_event;
