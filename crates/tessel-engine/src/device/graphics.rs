use std::cell::OnceCell;
use std::fmt;

use glam::Mat4;
use winit::dpi::PhysicalSize;
use winit::window::{Fullscreen, Window};

use crate::error::{RenderError, RenderResult};
use crate::texture::MipmapGenerator;

use super::{surface, DeviceInit, GpuErrorScope, Scene};

/// Depth/stencil format of the depth buffer.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Color format of headless render targets.
const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Adapter identification, logged at init.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterSummary {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
}

impl From<wgpu::AdapterInfo> for AdapterSummary {
    fn from(info: wgpu::AdapterInfo) -> Self {
        Self {
            name: info.name,
            backend: info.backend,
            device_type: info.device_type,
        }
    }
}

impl fmt::Display for AdapterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}, {:?})", self.name, self.backend, self.device_type)
    }
}

struct SwapChain<'w> {
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
}

struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Owns the device, queue, back buffer, depth buffer and fixed render states.
///
/// Windowed devices present to a surface bound to the window for `'w`.
/// Headless devices render into an offscreen color texture and never present.
///
/// Every GPU object sits in an `Option` and is released once by
/// [`shutdown`](Self::shutdown); any use afterwards is an
/// [`RenderError::InvalidState`].
pub struct GraphicsDevice<'w> {
    window: Option<&'w Window>,
    fullscreen: bool,

    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,

    swap_chain: Option<SwapChain<'w>>,
    offscreen: Option<OffscreenTarget>,
    color_format: wgpu::TextureFormat,
    size: (u32, u32),

    depth_texture: Option<wgpu::Texture>,
    depth_view: Option<wgpu::TextureView>,
    depth_stencil_state: Option<wgpu::DepthStencilState>,
    rasterizer: Option<wgpu::PrimitiveState>,

    mipmaps: OnceCell<MipmapGenerator>,

    adapter: AdapterSummary,
    world: Mat4,
    projection: Mat4,
    ortho: Mat4,
    presented_frames: u64,
}

impl<'w> GraphicsDevice<'w> {
    /// Creates a device presenting to `window`.
    ///
    /// Blocks until the adapter and device are acquired.
    pub fn new(window: &'w Window, init: DeviceInit) -> RenderResult<Self> {
        pollster::block_on(Self::create(Some(window), init))
    }

    async fn create(window: Option<&'w Window>, init: DeviceInit) -> RenderResult<Self> {
        if init.width == 0 || init.height == 0 {
            return Err(RenderError::DeviceInit(format!(
                "back buffer has zero size ({}x{})",
                init.width, init.height
            )));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = match window {
            Some(window) => Some(
                instance
                    .create_surface(window)
                    .map_err(|e| RenderError::DeviceInit(format!("failed to create surface: {e}")))?,
            ),
            None => None,
        };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: surface.as_ref(),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::DeviceInit(format!("no suitable adapter: {e}")))?;

        let adapter_summary = AdapterSummary::from(adapter.get_info());
        log::info!("adapter: {adapter_summary}");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("tessel device"),
                required_features: wgpu::Features::empty(),
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| RenderError::DeviceInit(format!("failed to create device: {e}")))?;

        // Enter fullscreen before sizing so the swap chain matches the mode the
        // window is actually in.
        let fullscreen = init.fullscreen && window.is_some();
        if fullscreen {
            if let Some(window) = window {
                window.set_fullscreen(Some(Fullscreen::Borderless(None)));
                log::info!("entered fullscreen");
            }
        }

        let built = Self::build_targets(
            window,
            fullscreen,
            &init,
            surface,
            &adapter,
            device,
            queue,
            adapter_summary,
        );
        if built.is_err() && fullscreen {
            if let Some(window) = window {
                window.set_fullscreen(None);
                log::info!("left fullscreen after a failed init");
            }
        }
        built
    }

    /// Sizes and creates the back buffer, depth buffer and transforms on an
    /// acquired device. Creation errors reported by the device become
    /// [`RenderError::DeviceInit`].
    #[allow(clippy::too_many_arguments)]
    fn build_targets(
        window: Option<&'w Window>,
        fullscreen: bool,
        init: &DeviceInit,
        surface: Option<wgpu::Surface<'w>>,
        adapter: &wgpu::Adapter,
        device: wgpu::Device,
        queue: wgpu::Queue,
        adapter_summary: AdapterSummary,
    ) -> RenderResult<Self> {
        let size = back_buffer_size(
            (init.width, init.height),
            window.map(|w| w.inner_size()),
            window.and_then(|w| w.current_monitor()).map(|m| m.size()),
            fullscreen,
        );

        let max_dim = device.limits().max_texture_dimension_2d;
        if size.0 > max_dim || size.1 > max_dim {
            return Err(RenderError::DeviceInit(format!(
                "back buffer {}x{} exceeds the adapter limit of {max_dim}",
                size.0, size.1
            )));
        }

        let scope = GpuErrorScope::push(&device);

        let (swap_chain, offscreen, color_format) = match surface {
            Some(surface) => {
                let caps = surface.get_capabilities(adapter);
                let format = surface::choose_surface_format(&caps.formats, init.prefer_srgb)
                    .ok_or_else(|| RenderError::DeviceInit("surface offers no formats".into()))?;

                let config = wgpu::SurfaceConfiguration {
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    format,
                    width: size.0,
                    height: size.1,
                    present_mode: init.present_mode(),
                    alpha_mode: surface::choose_alpha_mode(&caps.alpha_modes),
                    view_formats: vec![],
                    desired_maximum_frame_latency: init.desired_maximum_frame_latency,
                };
                surface.configure(&device, &config);
                log::info!(
                    "surface configured: {format:?} {}x{} {:?}",
                    size.0,
                    size.1,
                    config.present_mode
                );

                (Some(SwapChain { surface, config }), None, format)
            }
            None => {
                let format = if init.prefer_srgb {
                    OFFSCREEN_FORMAT.add_srgb_suffix()
                } else {
                    OFFSCREEN_FORMAT
                };
                let texture = device.create_texture(&wgpu::TextureDescriptor {
                    label: Some("tessel offscreen color"),
                    size: extent(size),
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
                    view_formats: &[],
                });
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                log::info!("offscreen target: {format:?} {}x{}", size.0, size.1);

                (None, Some(OffscreenTarget { texture, view }), format)
            }
        };

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tessel depth buffer"),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let aspect = size.0 as f32 / size.1 as f32;
        let projection = Mat4::perspective_lh(init.field_of_view, aspect, init.screen_near, init.screen_depth);
        let ortho = Mat4::orthographic_lh(
            -(size.0 as f32) / 2.0,
            size.0 as f32 / 2.0,
            -(size.1 as f32) / 2.0,
            size.1 as f32 / 2.0,
            init.screen_near,
            init.screen_depth,
        );

        if let Some(err) = scope.pop() {
            depth_texture.destroy();
            if let Some(OffscreenTarget { texture, .. }) = &offscreen {
                texture.destroy();
            }
            return Err(RenderError::DeviceInit(format!("render target creation failed: {err}")));
        }

        Ok(Self {
            window,
            fullscreen,
            device: Some(device),
            queue: Some(queue),
            swap_chain,
            offscreen,
            color_format,
            size,
            depth_texture: Some(depth_texture),
            depth_view: Some(depth_view),
            depth_stencil_state: Some(depth_stencil_state()),
            rasterizer: Some(rasterizer_state()),
            mipmaps: OnceCell::new(),
            adapter: adapter_summary,
            world: Mat4::IDENTITY,
            projection,
            ortho,
            presented_frames: 0,
        })
    }

    pub fn device(&self) -> RenderResult<&wgpu::Device> {
        self.device
            .as_ref()
            .ok_or_else(|| RenderError::released("graphics device"))
    }

    pub fn queue(&self) -> RenderResult<&wgpu::Queue> {
        self.queue
            .as_ref()
            .ok_or_else(|| RenderError::released("graphics device"))
    }

    /// Format pipelines must target to draw into the back buffer.
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    /// Back buffer size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn adapter_summary(&self) -> &AdapterSummary {
        &self.adapter
    }

    pub fn depth_stencil_state(&self) -> RenderResult<wgpu::DepthStencilState> {
        self.depth_stencil_state
            .clone()
            .ok_or_else(|| RenderError::released("depth stencil state"))
    }

    pub fn rasterizer_state(&self) -> RenderResult<wgpu::PrimitiveState> {
        self.rasterizer
            .ok_or_else(|| RenderError::released("rasterizer state"))
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn ortho_matrix(&self) -> Mat4 {
        self.ortho
    }

    /// Frames handed to the presentation engine (or submitted, when headless).
    pub fn presented_frames(&self) -> u64 {
        self.presented_frames
    }

    pub fn is_headless(&self) -> bool {
        self.offscreen.is_some()
    }

    /// Offscreen color texture of a headless device.
    pub fn offscreen_texture(&self) -> Option<&wgpu::Texture> {
        self.offscreen.as_ref().map(|t| &t.texture)
    }

    pub fn is_shut_down(&self) -> bool {
        self.device.is_none()
    }

    /// Acquires the back buffer and opens a pass that clears color to `rgba`,
    /// depth to 1 and stencil to 0.
    pub fn begin_scene(&mut self, rgba: [f32; 4]) -> RenderResult<Scene> {
        let device = self.device()?;
        let queue = self.queue()?.clone();
        let depth_view = self
            .depth_view
            .as_ref()
            .ok_or_else(|| RenderError::released("depth stencil view"))?;

        let (surface_texture, frame_view) = match (&self.swap_chain, &self.offscreen) {
            (Some(chain), _) => {
                let surface_texture = chain.surface.get_current_texture().map_err(|source| {
                    let action = surface::map_surface_error(&chain.surface, device, &chain.config, &source);
                    RenderError::Surface { source, action }
                })?;
                let view = surface_texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                (Some(surface_texture), view)
            }
            (None, Some(offscreen)) => (None, offscreen.view.clone()),
            (None, None) => return Err(RenderError::released("render target")),
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("tessel frame encoder"),
        });

        let [r, g, b, a] = rgba;
        let pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tessel scene"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            })
            .forget_lifetime();

        log::trace!("scene begun (frame {})", self.presented_frames);
        Ok(Scene::new(pass, encoder, queue, surface_texture))
    }

    /// Submits the frame's commands and presents the back buffer.
    ///
    /// With vsync the presentation engine paces frames to the display refresh.
    pub fn end_scene(&mut self, scene: Scene) -> RenderResult<()> {
        let queue = self.queue()?;
        let (commands, surface_texture) = scene.finish()?;

        queue.submit(std::iter::once(commands));

        if let Some(surface_texture) = surface_texture {
            if let Some(window) = self.window {
                window.pre_present_notify();
            }
            surface_texture.present();
        }

        self.presented_frames += 1;
        log::trace!("scene presented (frame {})", self.presented_frames);
        Ok(())
    }

    /// Fills every mip level of `texture` below the base level.
    pub fn generate_mipmaps(&self, texture: &wgpu::Texture) -> RenderResult<()> {
        let device = self.device()?;
        let queue = self.queue()?;
        let generator = self
            .mipmaps
            .get_or_init(|| MipmapGenerator::new(device, texture.format()));

        if generator.format() != texture.format() {
            return Err(RenderError::InvalidState(format!(
                "mipmap generator built for {:?}, texture is {:?}",
                generator.format(),
                texture.format()
            )));
        }

        generator.generate(device, queue, texture);
        Ok(())
    }

    /// Releases everything in reverse acquisition order. Safe to call again.
    ///
    /// Leaves fullscreen first so the display mode change made at init is
    /// always undone.
    pub fn shutdown(&mut self) {
        if self.device.is_none() {
            return;
        }

        if self.fullscreen {
            if let Some(window) = self.window {
                window.set_fullscreen(None);
            }
            self.fullscreen = false;
        }

        if self.mipmaps.take().is_some() {
            log::debug!("released mipmap generator");
        }
        if self.rasterizer.take().is_some() {
            log::debug!("released rasterizer state");
        }
        if self.depth_view.take().is_some() {
            log::debug!("released depth stencil view");
        }
        if self.depth_stencil_state.take().is_some() {
            log::debug!("released depth stencil state");
        }
        if let Some(texture) = self.depth_texture.take() {
            texture.destroy();
            log::debug!("released depth stencil buffer");
        }
        if let Some(OffscreenTarget { texture, view }) = self.offscreen.take() {
            drop(view);
            texture.destroy();
            log::debug!("released render target");
        }
        if self.queue.take().is_some() {
            log::debug!("released queue");
        }
        if let Some(device) = self.device.take() {
            device.destroy();
            log::debug!("released device");
        }
        if self.swap_chain.take().is_some() {
            log::debug!("released swap chain");
        }

        log::info!(
            "graphics device shut down after {} presented frames",
            self.presented_frames
        );
    }
}

impl GraphicsDevice<'static> {
    /// Creates a device without a window, rendering into an offscreen target.
    pub fn headless(init: DeviceInit) -> RenderResult<Self> {
        pollster::block_on(Self::create(None, init))
    }
}

/// Fullscreen back buffers match the monitor, windowed ones the client area.
/// Falls back to the requested size when the platform reports nothing usable.
fn back_buffer_size(
    requested: (u32, u32),
    client: Option<PhysicalSize<u32>>,
    monitor: Option<PhysicalSize<u32>>,
    fullscreen: bool,
) -> (u32, u32) {
    let reported = if fullscreen { monitor } else { client };
    reported
        .filter(|s| s.width > 0 && s.height > 0)
        .map(|s| (s.width, s.height))
        .unwrap_or(requested)
}

fn extent((width, height): (u32, u32)) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

/// Less-than depth test with writes on; stencil always passes and wraps on
/// depth failure (increment for front faces, decrement for back faces).
pub(crate) fn depth_stencil_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState {
            front: wgpu::StencilFaceState {
                compare: wgpu::CompareFunction::Always,
                fail_op: wgpu::StencilOperation::Keep,
                depth_fail_op: wgpu::StencilOperation::IncrementWrap,
                pass_op: wgpu::StencilOperation::Keep,
            },
            back: wgpu::StencilFaceState {
                compare: wgpu::CompareFunction::Always,
                fail_op: wgpu::StencilOperation::Keep,
                depth_fail_op: wgpu::StencilOperation::DecrementWrap,
                pass_op: wgpu::StencilOperation::Keep,
            },
            read_mask: 0xFF,
            write_mask: 0xFF,
        },
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Solid fill, back faces culled, clockwise triangles face the viewer.
pub(crate) fn rasterizer_state() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Cw,
        cull_mode: Some(wgpu::Face::Back),
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}
