//! Frame orchestration: device, camera, geometry and shader in one pipeline.

mod config;
mod render_pipeline;

pub use config::PipelineConfig;
pub use render_pipeline::RenderPipeline;
