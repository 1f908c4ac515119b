//! Tessel engine crate.
//!
//! A textured-quad rendering pipeline on wgpu: graphics device and back
//! buffer, texture decoding and upload, quad geometry, shader program and a
//! free-fly camera, plus the winit runtime that hosts them.

pub mod camera;
pub mod core;
pub mod device;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod shader;
pub mod texture;
pub mod time;
pub mod window;

pub use error::{RenderError, RenderResult};
