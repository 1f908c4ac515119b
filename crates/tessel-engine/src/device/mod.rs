//! Graphics device, back buffer and per-frame scene bracketing.
//!
//! This module is responsible for:
//! - acquiring the adapter, device and queue
//! - owning the swap chain (or an offscreen target), depth buffer and fixed
//!   render states
//! - the projection, world and orthographic transforms
//! - `begin_scene` / `end_scene`

mod error;
mod frame;
mod graphics;
mod init;
mod scope;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::Scene;
pub use graphics::{AdapterSummary, GraphicsDevice, DEPTH_FORMAT};
pub use init::DeviceInit;
pub(crate) use scope::GpuErrorScope;
