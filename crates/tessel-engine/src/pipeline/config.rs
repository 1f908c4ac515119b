use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::device::DeviceInit;
use crate::shader::{ShaderSources, DEFAULT_DIAGNOSTICS_FILE};

/// Everything [`RenderPipeline`](super::RenderPipeline) needs at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub device: DeviceInit,
    pub texture_path: PathBuf,
    pub shaders: ShaderSources,
    pub diagnostics_path: PathBuf,
    pub clear_color: [f32; 4],
    pub camera_position: Vec3,
}

impl PipelineConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.device.width = width;
        self.device.height = height;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.device.vsync = vsync;
        self
    }

    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.device.fullscreen = fullscreen;
        self
    }

    pub fn with_texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.texture_path = path.into();
        self
    }

    pub fn with_shaders(mut self, shaders: ShaderSources) -> Self {
        self.shaders = shaders;
        self
    }

    pub fn with_diagnostics_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.diagnostics_path = path.into();
        self
    }

    pub fn with_clear_color(mut self, rgba: [f32; 4]) -> Self {
        self.clear_color = rgba;
        self
    }

    pub fn with_camera_position(mut self, position: Vec3) -> Self {
        self.camera_position = position;
        self
    }

    /// Resolves the texture and shader paths against `root`.
    ///
    /// Absolute paths are left as they are.
    pub fn with_asset_root(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        self.texture_path = root.join(&self.texture_path);
        self.shaders = self.shaders.rooted_at(root);
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            device: DeviceInit::default(),
            texture_path: PathBuf::from("assets/textures/checker.tga"),
            shaders: ShaderSources::default(),
            diagnostics_path: PathBuf::from(DEFAULT_DIAGNOSTICS_FILE),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            camera_position: Vec3::new(0.0, 0.0, -5.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_stock_scene() {
        let config = PipelineConfig::default();
        assert_eq!(config.camera_position, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(config.clear_color, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(config.diagnostics_path, PathBuf::from("shader-error.txt"));
        assert_eq!(config.shaders.vertex_entry, "VertexShader_Textured");
        assert_eq!(config.shaders.pixel_entry, "PixelShader_Textured");
        assert!(config.device.vsync);
        assert!(!config.device.fullscreen);
        assert_eq!(config.device.screen_depth, 1000.0);
        assert_eq!(config.device.screen_near, 0.1);
    }

    #[test]
    fn asset_root_prefixes_relative_paths_only() {
        let root = std::env::temp_dir().join("tessel-assets");
        let absolute = std::env::temp_dir().join("elsewhere.tga");
        let config = PipelineConfig::default()
            .with_texture(&absolute)
            .with_asset_root(&root);

        assert_eq!(config.texture_path, absolute);
        assert_eq!(
            config.shaders.vertex_path,
            root.join("assets/shaders/texture.vs.wgsl")
        );
        assert_eq!(
            config.shaders.pixel_path,
            root.join("assets/shaders/texture.ps.wgsl")
        );
        // Diagnostics stay next to the process.
        assert_eq!(config.diagnostics_path, PathBuf::from("shader-error.txt"));
    }

    #[test]
    fn builders_override_device_settings() {
        let config = PipelineConfig::default()
            .with_size(2, 2)
            .with_vsync(false)
            .with_fullscreen(true);
        assert_eq!((config.device.width, config.device.height), (2, 2));
        assert!(!config.device.vsync);
        assert!(config.device.fullscreen);
    }
}
