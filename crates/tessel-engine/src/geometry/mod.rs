//! Quad geometry: vertex layout, fixed data and GPU buffers.

mod buffer;
mod vertex;

pub use buffer::GeometryBuffer;
pub use vertex::{GeometryVertex, QUAD_INDICES, QUAD_TOPOLOGY, QUAD_VERTICES};
