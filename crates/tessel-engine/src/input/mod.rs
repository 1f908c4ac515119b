//! Keyboard input.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates window events into `InputEvent`s.

pub(crate) mod platform;
mod state;
mod types;

pub use state::{InputState, KeyInput};
pub use types::{InputEvent, Key, KeyState};
