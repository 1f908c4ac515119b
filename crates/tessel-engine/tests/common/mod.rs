#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tessel_engine::device::{DeviceInit, GraphicsDevice};
use tessel_engine::pipeline::PipelineConfig;
use tessel_engine::shader::ShaderSources;
use tessel_engine::{RenderError, RenderResult};

pub const VERTEX_SHADER: &str = include_str!("../../../tessel-viewer/assets/shaders/texture.vs.wgsl");
pub const PIXEL_SHADER: &str = include_str!("../../../tessel-viewer/assets/shaders/texture.ps.wgsl");

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Fresh, empty directory under the system temp dir.
pub fn fixture_dir(name: &str) -> PathBuf {
    let n = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("tessel-{name}-{}-{n}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Writes a container with a 2x2 checker pattern (or zero bytes for
/// unsupported depths) and returns its path.
pub fn write_texture(dir: &Path, name: &str, width: u16, height: u16, bpp: u8) -> PathBuf {
    let mut bytes = vec![0u8; 12];
    bytes.extend_from_slice(&width.to_le_bytes());
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes.push(bpp);
    bytes.push(0);
    for y in 0..height {
        for x in 0..width {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            bytes.extend_from_slice(&[v, 128, 255 - v, 255]);
        }
    }
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

/// Writes the shipped shader pair into `dir`.
pub fn write_shaders(dir: &Path) -> ShaderSources {
    let sources = ShaderSources {
        vertex_path: dir.join("texture.vs.wgsl"),
        pixel_path: dir.join("texture.ps.wgsl"),
        ..ShaderSources::default()
    };
    fs::write(&sources.vertex_path, VERTEX_SHADER).unwrap();
    fs::write(&sources.pixel_path, PIXEL_SHADER).unwrap();
    sources
}

pub fn device_init() -> DeviceInit {
    DeviceInit {
        width: 64,
        height: 64,
        vsync: false,
        ..DeviceInit::default()
    }
}

/// A complete, valid headless configuration rooted in `dir`.
pub fn valid_config(dir: &Path) -> PipelineConfig {
    let texture = write_texture(dir, "test.tga", 2, 2, 32);
    PipelineConfig {
        device: device_init(),
        shaders: write_shaders(dir),
        diagnostics_path: dir.join("shader-error.txt"),
        ..PipelineConfig::default()
    }
    .with_texture(texture)
}

/// Returns `None` (and says so) when the machine has no usable adapter.
pub fn skip_without_adapter<T>(result: RenderResult<T>) -> Option<RenderResult<T>> {
    match result {
        Err(RenderError::DeviceInit(reason)) => {
            eprintln!("skipping: no headless adapter ({reason})");
            None
        }
        other => Some(other),
    }
}

pub fn headless_device() -> Option<GraphicsDevice<'static>> {
    match skip_without_adapter(GraphicsDevice::headless(device_init()))? {
        Ok(device) => Some(device),
        Err(err) => panic!("unexpected device error: {err}"),
    }
}
