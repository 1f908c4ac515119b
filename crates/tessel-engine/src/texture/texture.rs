use std::path::Path;

use crate::device::{GpuErrorScope, GraphicsDevice};
use crate::error::{RenderError, RenderResult};

use super::decoder::{self, DecodedImage};
use super::mipmap::mip_level_count;

/// Format of every decoded texture on the GPU.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A decoded image resident on the GPU with a full mip chain.
///
/// The CPU-side pixels are dropped as soon as the base level is uploaded.
pub struct Texture {
    texture: Option<wgpu::Texture>,
    view: Option<wgpu::TextureView>,
    width: u32,
    height: u32,
    mip_level_count: u32,
}

impl Texture {
    /// Decodes the container at `path` and uploads it.
    ///
    /// A decode failure returns before any GPU object is created.
    pub fn initialize(gpu: &GraphicsDevice<'_>, path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let image = decoder::decode_file(path)?;
        let texture = Self::from_image(gpu, image)?;
        log::info!(
            "texture {} loaded ({}x{}, {} mip levels)",
            path.display(),
            texture.width,
            texture.height,
            texture.mip_level_count
        );
        Ok(texture)
    }

    /// Uploads an already decoded image, consuming it.
    pub fn from_image(gpu: &GraphicsDevice<'_>, image: DecodedImage) -> RenderResult<Self> {
        let device = gpu.device()?;
        let queue = gpu.queue()?;

        let (width, height) = (image.width(), image.height());
        let max_dim = device.limits().max_texture_dimension_2d;
        if width > max_dim || height > max_dim {
            return Err(RenderError::gpu_resource(
                "texture",
                format!("{width}x{height} exceeds the adapter limit of {max_dim}"),
            ));
        }

        let mip_level_count = mip_level_count(width, height);
        let scope = GpuErrorScope::push(device);
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tessel texture"),
            size,
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            // Render attachment lets the mip levels be generated on the GPU.
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.bytes_per_row()),
                rows_per_image: Some(height),
            },
            size,
        );
        drop(image);

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("tessel texture view"),
            ..Default::default()
        });

        let mipmapped = gpu.generate_mipmaps(&texture);
        let rejected = scope.pop();

        if let Err(err) = mipmapped {
            texture.destroy();
            return Err(err);
        }
        if let Some(err) = rejected {
            drop(view);
            texture.destroy();
            return Err(RenderError::gpu_resource("texture", err.to_string()));
        }

        Ok(Self {
            texture: Some(texture),
            view: Some(view),
            width,
            height,
            mip_level_count,
        })
    }

    /// Shader-readable view over every mip level.
    pub fn view(&self) -> RenderResult<&wgpu::TextureView> {
        self.view.as_ref().ok_or_else(|| RenderError::released("texture"))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mip_level_count(&self) -> u32 {
        self.mip_level_count
    }

    pub fn is_shut_down(&self) -> bool {
        self.texture.is_none() && self.view.is_none()
    }

    /// Releases the view, then the texture. Safe to call again.
    pub fn shutdown(&mut self) {
        if self.view.take().is_some() {
            log::debug!("released texture view");
        }
        if let Some(texture) = self.texture.take() {
            texture.destroy();
            log::debug!("released texture");
        }
    }
}
