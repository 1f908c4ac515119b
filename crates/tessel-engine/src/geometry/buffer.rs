use std::path::Path;

use wgpu::util::DeviceExt;

use crate::device::{GpuErrorScope, GraphicsDevice, Scene};
use crate::error::{RenderError, RenderResult};
use crate::texture::Texture;

use super::vertex::{QUAD_INDICES, QUAD_VERTICES};

/// The drawable quad: immutable vertex and index buffers plus its texture.
pub struct GeometryBuffer {
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    texture: Option<Texture>,
    index_count: u32,
}

impl GeometryBuffer {
    /// Uploads the quad and loads the texture at `texture_path`.
    ///
    /// On failure nothing created here outlives the call.
    pub fn initialize(gpu: &GraphicsDevice<'_>, texture_path: impl AsRef<Path>) -> RenderResult<Self> {
        let device = gpu.device()?;
        let scope = GpuErrorScope::push(device);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tessel quad vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tessel quad indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        if let Some(err) = scope.pop() {
            index_buffer.destroy();
            vertex_buffer.destroy();
            return Err(RenderError::gpu_resource("quad buffers", err.to_string()));
        }

        let texture = match Texture::initialize(gpu, texture_path) {
            Ok(texture) => texture,
            Err(err) => {
                index_buffer.destroy();
                vertex_buffer.destroy();
                return Err(err);
            }
        };

        log::debug!(
            "geometry uploaded: {} vertices, {} indices",
            QUAD_VERTICES.len(),
            QUAD_INDICES.len()
        );

        Ok(Self {
            vertex_buffer: Some(vertex_buffer),
            index_buffer: Some(index_buffer),
            texture: Some(texture),
            index_count: QUAD_INDICES.len() as u32,
        })
    }

    /// Makes the quad the active input of the scene's pass.
    ///
    /// Required before [`ShaderProgram::render`](crate::shader::ShaderProgram::render).
    pub fn bind(&self, scene: &mut Scene) -> RenderResult<()> {
        let (Some(vertex_buffer), Some(index_buffer)) = (&self.vertex_buffer, &self.index_buffer) else {
            return Err(RenderError::released("geometry buffer"));
        };

        let pass = scene.pass_mut()?;
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        scene.mark_geometry_bound(self.index_count);
        Ok(())
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn texture(&self) -> RenderResult<&Texture> {
        self.texture
            .as_ref()
            .ok_or_else(|| RenderError::released("geometry buffer"))
    }

    pub fn is_shut_down(&self) -> bool {
        self.vertex_buffer.is_none() && self.index_buffer.is_none() && self.texture.is_none()
    }

    /// Releases the index buffer, the vertex buffer, then the texture.
    /// Safe to call again.
    pub fn shutdown(&mut self) {
        if let Some(buffer) = self.index_buffer.take() {
            buffer.destroy();
            log::debug!("released index buffer");
        }
        if let Some(buffer) = self.vertex_buffer.take() {
            buffer.destroy();
            log::debug!("released vertex buffer");
        }
        if let Some(mut texture) = self.texture.take() {
            texture.shutdown();
        }
    }
}
