use std::path::PathBuf;

use anyhow::Result;
use tessel_engine::camera::FlyController;
use tessel_engine::core::{App, AppControl, FrameCtx};
use tessel_engine::input::{Key, KeyInput};
use tessel_engine::logging::{init_logging, LoggingConfig};
use tessel_engine::pipeline::PipelineConfig;
use tessel_engine::window::{Runtime, RuntimeConfig};

/// Flies the camera around the textured quad; Escape quits.
struct Viewer {
    controller: FlyController,
}

impl App for Viewer {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input.is_key_down(Key::Escape) {
            log::info!("escape pressed, exiting");
            return AppControl::Exit;
        }

        if let Some(camera) = ctx.pipeline.camera_mut() {
            self.controller.update(camera, ctx.input, ctx.time.dt);
        }

        ctx.render()
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    // Assets live next to this crate unless a directory is given.
    let asset_root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")));
    log::info!("asset root: {}", asset_root.display());

    let config = RuntimeConfig {
        title: "tessel viewer".to_string(),
        pipeline: PipelineConfig::default().with_asset_root(&asset_root),
        ..RuntimeConfig::default()
    };

    Runtime::run(
        config,
        Viewer {
            controller: FlyController::default(),
        },
    )
}
