use winit::window::Window;

use crate::input::InputState;
use crate::pipeline::RenderPipeline;
use crate::time::FrameTime;

use super::app::AppControl;

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window borrow carried by `RenderPipeline<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub pipeline: &'a mut RenderPipeline<'w>,
    pub input: &'a InputState,
    pub time: FrameTime,
}

impl FrameCtx<'_, '_> {
    /// Renders one pipeline frame.
    ///
    /// Frame-local failures are logged and the loop continues; anything else
    /// asks the runtime to exit.
    pub fn render(&mut self) -> AppControl {
        match self.pipeline.frame() {
            Ok(()) => AppControl::Continue,
            Err(err) if err.is_frame_recoverable() => {
                log::warn!("frame {} dropped: {err}", self.time.frame_index);
                AppControl::Continue
            }
            Err(err) => {
                log::error!("rendering failed: {err}");
                AppControl::Exit
            }
        }
    }
}
