//! Texture container decoding and GPU texture resources.

pub mod decoder;
mod mipmap;
mod texture;

pub use decoder::{decode_file, DecodedImage};
pub use mipmap::mip_level_count;
pub(crate) use mipmap::MipmapGenerator;
pub use texture::{Texture, TEXTURE_FORMAT};
