use crate::error::{RenderError, RenderResult};

/// One open frame, from `begin_scene` to `end_scene`.
///
/// Holds the cleared render pass that geometry and shader binds record into.
/// Dropping a scene without handing it to
/// [`GraphicsDevice::end_scene`](super::GraphicsDevice::end_scene) abandons the
/// frame: nothing is submitted and nothing is presented.
pub struct Scene {
    pass: Option<wgpu::RenderPass<'static>>,
    encoder: Option<wgpu::CommandEncoder>,
    queue: wgpu::Queue,
    surface_texture: Option<wgpu::SurfaceTexture>,
    bound_index_count: Option<u32>,
}

impl Scene {
    pub(crate) fn new(
        pass: wgpu::RenderPass<'static>,
        encoder: wgpu::CommandEncoder,
        queue: wgpu::Queue,
        surface_texture: Option<wgpu::SurfaceTexture>,
    ) -> Self {
        Self {
            pass: Some(pass),
            encoder: Some(encoder),
            queue,
            surface_texture,
            bound_index_count: None,
        }
    }

    /// The queue uniform writes go through.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub(crate) fn pass_mut(&mut self) -> RenderResult<&mut wgpu::RenderPass<'static>> {
        self.pass
            .as_mut()
            .ok_or_else(|| RenderError::InvalidState("render pass already closed".into()))
    }

    /// Records that a geometry buffer with `index_count` indices is bound.
    pub(crate) fn mark_geometry_bound(&mut self, index_count: u32) {
        self.bound_index_count = Some(index_count);
    }

    /// Index count of the bound geometry, if any was bound this frame.
    pub fn bound_index_count(&self) -> Option<u32> {
        self.bound_index_count
    }

    /// Closes the pass and hands back what submission needs.
    pub(crate) fn finish(mut self) -> RenderResult<(wgpu::CommandBuffer, Option<wgpu::SurfaceTexture>)> {
        drop(self.pass.take());
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| RenderError::InvalidState("frame encoder already finished".into()))?;
        Ok((encoder.finish(), self.surface_texture.take()))
    }
}
