use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use glam::Mat4;

use crate::device::{GpuErrorScope, GraphicsDevice, Scene};
use crate::error::{RenderError, RenderResult};
use crate::geometry::{GeometryVertex, QUAD_TOPOLOGY};

use super::compiler::{compile_stage, CompiledStage, ShaderProfile, ShaderStage};
use super::diagnostics::DiagnosticsSink;
use super::uniforms::TransformUniformBlock;

/// Where the two stages are read from and their entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex_path: PathBuf,
    pub vertex_entry: String,
    pub pixel_path: PathBuf,
    pub pixel_entry: String,
}

impl ShaderSources {
    /// Re-roots relative source paths under `root`.
    pub fn rooted_at(&self, root: &Path) -> Self {
        Self {
            vertex_path: root.join(&self.vertex_path),
            vertex_entry: self.vertex_entry.clone(),
            pixel_path: root.join(&self.pixel_path),
            pixel_entry: self.pixel_entry.clone(),
        }
    }
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            vertex_path: PathBuf::from("assets/shaders/texture.vs.wgsl"),
            vertex_entry: "VertexShader_Textured".into(),
            pixel_path: PathBuf::from("assets/shaders/texture.ps.wgsl"),
            pixel_entry: "PixelShader_Textured".into(),
        }
    }
}

/// Textured-quad program: both stages, the vertex input layout, the matrix
/// constant buffer and a sampler.
///
/// Bind groups: group 0 holds the matrices (vertex stage), group 1 the
/// texture and sampler (pixel stage).
pub struct ShaderProgram {
    device: Option<wgpu::Device>,

    vertex_stage: Option<wgpu::ShaderModule>,
    pixel_stage: Option<wgpu::ShaderModule>,

    matrix_layout: Option<wgpu::BindGroupLayout>,
    texture_layout: Option<wgpu::BindGroupLayout>,
    pipeline_layout: Option<wgpu::PipelineLayout>,
    pipeline: Option<wgpu::RenderPipeline>,

    matrix_buffer: Option<wgpu::Buffer>,
    matrix_bind_group: Option<wgpu::BindGroup>,
    sampler: Option<wgpu::Sampler>,
}

impl ShaderProgram {
    /// Compiles both stages and builds the GPU objects that use them.
    ///
    /// Both stages are compiled before any GPU object is created, so a compile
    /// failure leaves nothing behind. Stages that compile alone but disagree
    /// with each other or with the vertex layout fail with
    /// [`RenderError::GpuResource`] and release what was created.
    pub fn initialize(
        gpu: &GraphicsDevice<'_>,
        sources: &ShaderSources,
        diagnostics: &mut dyn DiagnosticsSink,
    ) -> RenderResult<Self> {
        let vertex = compile_stage(
            &sources.vertex_path,
            &sources.vertex_entry,
            ShaderProfile::baseline(ShaderStage::Vertex),
            diagnostics,
        )?;
        let pixel = compile_stage(
            &sources.pixel_path,
            &sources.pixel_entry,
            ShaderProfile::baseline(ShaderStage::Pixel),
            diagnostics,
        )?;

        let device = gpu.device()?;
        let depth_stencil = gpu.depth_stencil_state()?;
        let primitive = wgpu::PrimitiveState {
            topology: QUAD_TOPOLOGY,
            ..gpu.rasterizer_state()?
        };

        let scope = GpuErrorScope::push(device);

        let vertex_stage = create_module(device, &vertex, "tessel vertex stage");
        let pixel_stage = create_module(device, &pixel, "tessel pixel stage");

        let matrix_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessel matrix bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(TransformUniformBlock::SIZE),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessel texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessel textured pipeline layout"),
            bind_group_layouts: &[&matrix_layout, &texture_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tessel textured pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_stage,
                entry_point: Some(vertex.entry_point()),
                compilation_options: Default::default(),
                buffers: &[GeometryVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &pixel_stage,
                entry_point: Some(pixel.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.color_format(),
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive,
            depth_stencil: Some(depth_stencil),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let matrix_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessel matrix buffer"),
            size: TransformUniformBlock::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let matrix_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessel matrix bind group"),
            layout: &matrix_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: matrix_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tessel linear wrap sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        if let Some(err) = scope.pop() {
            matrix_buffer.destroy();
            log::error!("shader program objects rejected by the device: {err}");
            return Err(RenderError::gpu_resource("shader program", err.to_string()));
        }

        log::info!(
            "shader program ready ({} {}, {} {})",
            vertex.profile().name(),
            vertex.path().display(),
            pixel.profile().name(),
            pixel.path().display()
        );

        Ok(Self {
            device: Some(device.clone()),
            vertex_stage: Some(vertex_stage),
            pixel_stage: Some(pixel_stage),
            matrix_layout: Some(matrix_layout),
            texture_layout: Some(texture_layout),
            pipeline_layout: Some(pipeline_layout),
            pipeline: Some(pipeline),
            matrix_buffer: Some(matrix_buffer),
            matrix_bind_group: Some(matrix_bind_group),
            sampler: Some(sampler),
        })
    }

    /// Uploads the transforms, binds the program and texture, and draws
    /// `index_count` indices of the bound geometry.
    ///
    /// Fails with [`RenderError::Map`] when the matrix buffer cannot be
    /// written; only that frame is lost.
    pub fn render(
        &self,
        scene: &mut Scene,
        index_count: u32,
        world: Mat4,
        view: Mat4,
        projection: Mat4,
        texture_view: &wgpu::TextureView,
    ) -> RenderResult<()> {
        let (
            Some(device),
            Some(pipeline),
            Some(texture_layout),
            Some(matrix_buffer),
            Some(matrix_bind_group),
            Some(sampler),
        ) = (
            &self.device,
            &self.pipeline,
            &self.texture_layout,
            &self.matrix_buffer,
            &self.matrix_bind_group,
            &self.sampler,
        )
        else {
            return Err(RenderError::released("shader program"));
        };

        match scene.bound_index_count() {
            None => {
                return Err(RenderError::InvalidState(
                    "geometry must be bound before drawing".into(),
                ));
            }
            Some(bound) if index_count > bound => {
                return Err(RenderError::InvalidState(format!(
                    "draw of {index_count} indices exceeds the {bound} bound"
                )));
            }
            Some(_) => {}
        }

        let block = TransformUniformBlock::new(world, view, projection);
        write_transforms(device, scene.queue(), matrix_buffer, &block)?;

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessel texture bind group"),
            layout: texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        let pass = scene.pass_mut()?;
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, matrix_bind_group, &[]);
        pass.set_bind_group(1, &texture_bind_group, &[]);
        pass.draw_indexed(0..index_count, 0, 0..1);

        log::trace!("drew {index_count} indices");
        Ok(())
    }

    pub fn is_shut_down(&self) -> bool {
        self.device.is_none()
    }

    /// Releases the sampler, the matrix buffer, the input layout (pipeline and
    /// bind group layouts), the pixel stage, then the vertex stage.
    /// Safe to call again.
    pub fn shutdown(&mut self) {
        if self.sampler.take().is_some() {
            log::debug!("released sampler");
        }
        self.matrix_bind_group = None;
        if let Some(buffer) = self.matrix_buffer.take() {
            buffer.destroy();
            log::debug!("released matrix buffer");
        }
        if self.pipeline.take().is_some() {
            self.pipeline_layout = None;
            self.texture_layout = None;
            self.matrix_layout = None;
            log::debug!("released input layout");
        }
        if self.pixel_stage.take().is_some() {
            log::debug!("released pixel stage");
        }
        if self.vertex_stage.take().is_some() {
            log::debug!("released vertex stage");
        }
        self.device = None;
    }
}

fn create_module(device: &wgpu::Device, stage: &CompiledStage, label: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(stage.source().into()),
    })
}

/// Writes the block through a staging view; the view is unmapped when it drops.
///
/// A rejected write is reported as [`RenderError::Map`], which costs only the
/// current frame.
pub(crate) fn write_transforms(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    buffer: &wgpu::Buffer,
    block: &TransformUniformBlock,
) -> RenderResult<()> {
    let map_error = || RenderError::Map {
        resource: "matrix buffer",
    };
    let size = NonZeroU64::new(TransformUniformBlock::SIZE).ok_or_else(map_error)?;

    let scope = GpuErrorScope::push(device);
    let written = match queue.write_buffer_with(buffer, 0, size) {
        Some(mut mapped) => {
            mapped.copy_from_slice(bytemuck::bytes_of(block));
            true
        }
        None => false,
    };

    match scope.pop() {
        Some(err) => {
            log::warn!("matrix buffer write rejected: {err}");
            Err(map_error())
        }
        None if !written => Err(map_error()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceInit;

    #[test]
    fn rejected_matrix_write_costs_only_the_frame() {
        let gpu = match GraphicsDevice::headless(DeviceInit {
            width: 16,
            height: 16,
            ..DeviceInit::default()
        }) {
            Ok(gpu) => gpu,
            Err(RenderError::DeviceInit(reason)) => {
                eprintln!("skipping: no headless adapter ({reason})");
                return;
            }
            Err(err) => panic!("unexpected device error: {err}"),
        };
        let device = gpu.device().unwrap();
        let queue = gpu.queue().unwrap();

        // No COPY_DST, so the queue may not write into it.
        let read_only = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("read-only matrix buffer"),
            size: TransformUniformBlock::SIZE,
            usage: wgpu::BufferUsages::UNIFORM,
            mapped_at_creation: false,
        });
        let block = TransformUniformBlock::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY);

        let err = write_transforms(device, queue, &read_only, &block).unwrap_err();
        assert!(matches!(err, RenderError::Map { .. }), "{err:?}");
        assert!(err.is_frame_recoverable());

        let writable = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("matrix buffer"),
            size: TransformUniformBlock::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        write_transforms(device, queue, &writable, &block).unwrap();
    }
}
