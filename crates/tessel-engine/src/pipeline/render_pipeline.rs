use winit::window::Window;

use crate::camera::Camera;
use crate::device::GraphicsDevice;
use crate::error::{RenderError, RenderResult};
use crate::geometry::GeometryBuffer;
use crate::shader::{DiagnosticsSink, FileDiagnostics, ShaderProgram};

use super::PipelineConfig;

/// Device, camera, geometry and shader, driven as one frame at a time.
///
/// Parts are built in that order and torn down in reverse. A failed build
/// releases what it had already built.
pub struct RenderPipeline<'w> {
    device: Option<GraphicsDevice<'w>>,
    camera: Option<Camera>,
    geometry: Option<GeometryBuffer>,
    shader: Option<ShaderProgram>,
    clear_color: [f32; 4],
}

impl<'w> RenderPipeline<'w> {
    /// Builds a pipeline presenting to `window`. Shader diagnostics go to
    /// `config.diagnostics_path`.
    pub fn new(window: &'w Window, config: PipelineConfig) -> RenderResult<Self> {
        let mut diagnostics = FileDiagnostics::new(&config.diagnostics_path);
        let device = GraphicsDevice::new(window, config.device.clone())?;
        Self::assemble(device, &config, &mut diagnostics)
    }

    /// Builds the rest of the pipeline on an existing device.
    ///
    /// The device is shut down if anything after it fails.
    pub fn assemble(
        mut device: GraphicsDevice<'w>,
        config: &PipelineConfig,
        diagnostics: &mut dyn DiagnosticsSink,
    ) -> RenderResult<Self> {
        let mut camera = Camera::new();
        let p = config.camera_position;
        camera.set_position(p.x, p.y, p.z);

        let mut geometry = match GeometryBuffer::initialize(&device, &config.texture_path) {
            Ok(geometry) => geometry,
            Err(err) => {
                log::error!("geometry initialization failed: {err}");
                device.shutdown();
                return Err(err);
            }
        };

        let shader = match ShaderProgram::initialize(&device, &config.shaders, diagnostics) {
            Ok(shader) => shader,
            Err(err) => {
                log::error!("shader initialization failed: {err}");
                geometry.shutdown();
                device.shutdown();
                return Err(err);
            }
        };

        log::info!("render pipeline ready on {}", device.adapter_summary());

        Ok(Self {
            device: Some(device),
            camera: Some(camera),
            geometry: Some(geometry),
            shader: Some(shader),
            clear_color: config.clear_color,
        })
    }

    /// Renders one frame.
    pub fn frame(&mut self) -> RenderResult<()> {
        self.render()
    }

    /// Clear, compute the view, bind geometry, draw, present.
    ///
    /// A failure before present abandons the frame; nothing is presented.
    fn render(&mut self) -> RenderResult<()> {
        let (Some(device), Some(camera), Some(geometry), Some(shader)) = (
            self.device.as_mut(),
            self.camera.as_mut(),
            self.geometry.as_ref(),
            self.shader.as_ref(),
        ) else {
            return Err(RenderError::released("render pipeline"));
        };

        let mut scene = device.begin_scene(self.clear_color)?;

        camera.compute_view();
        let view = camera.view_matrix();
        let world = device.world_matrix();
        let projection = device.projection_matrix();

        geometry.bind(&mut scene)?;
        shader.render(
            &mut scene,
            geometry.index_count(),
            world,
            view,
            projection,
            geometry.texture()?.view()?,
        )?;

        device.end_scene(scene)
    }

    pub fn device(&self) -> Option<&GraphicsDevice<'w>> {
        self.device.as_ref()
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// The camera is moved by the host between frames.
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    pub fn geometry(&self) -> Option<&GeometryBuffer> {
        self.geometry.as_ref()
    }

    pub fn is_shut_down(&self) -> bool {
        self.device.is_none()
            && self.camera.is_none()
            && self.geometry.is_none()
            && self.shader.is_none()
    }

    /// Tears down shader, geometry, camera, then device. Safe to call again.
    pub fn shutdown(&mut self) {
        if let Some(mut shader) = self.shader.take() {
            shader.shutdown();
        }
        if let Some(mut geometry) = self.geometry.take() {
            geometry.shutdown();
        }
        self.camera = None;
        if let Some(mut device) = self.device.take() {
            device.shutdown();
            log::info!("render pipeline shut down");
        }
    }
}

impl RenderPipeline<'static> {
    /// Builds a pipeline on a headless device. Shader diagnostics go to
    /// `config.diagnostics_path`.
    pub fn headless(config: PipelineConfig) -> RenderResult<Self> {
        let mut diagnostics = FileDiagnostics::new(&config.diagnostics_path);
        Self::headless_with_diagnostics(config, &mut diagnostics)
    }

    pub fn headless_with_diagnostics(
        config: PipelineConfig,
        diagnostics: &mut dyn DiagnosticsSink,
    ) -> RenderResult<Self> {
        let device = GraphicsDevice::headless(config.device.clone())?;
        Self::assemble(device, &config, diagnostics)
    }
}

impl Drop for RenderPipeline<'_> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
