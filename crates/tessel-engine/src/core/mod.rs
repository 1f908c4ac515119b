//! Contracts between the runtime loop and the host application.
//!
//! The runtime passes the window, pipeline and input to the app explicitly;
//! there is no global back-reference to the running instance.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
