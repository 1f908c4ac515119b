//! Engine error taxonomy.
//!
//! Every fallible engine operation returns [`RenderError`]. Initialization-type
//! operations are all-or-nothing: the first failure short-circuits and is handed
//! to the immediate caller. Per-frame failures are classified with
//! [`RenderError::is_frame_recoverable`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::device::SurfaceErrorAction;
use crate::shader::ShaderStage;

/// Result alias used across the engine.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Adapter, device, surface, render-target or depth-buffer creation failed.
    #[error("graphics device initialization failed: {0}")]
    DeviceInit(String),

    /// The texture container declares a layout the decoder does not accept.
    #[error("unsupported texture container {}: {detail}", path.display())]
    Format { path: PathBuf, detail: String },

    /// A texture asset could not be opened or was truncated.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A shader stage failed to compile; `diagnostics` holds the compiler output.
    #[error("failed to compile {stage} shader {}", path.display())]
    Compile {
        path: PathBuf,
        stage: ShaderStage,
        diagnostics: String,
    },

    /// A shader source file does not exist.
    #[error("missing shader file {}", path.display())]
    FileNotFound { path: PathBuf },

    /// A buffer, view, state or pipeline object could not be created.
    #[error("failed to create {resource}: {reason}")]
    GpuResource {
        resource: &'static str,
        reason: String,
    },

    /// The per-frame constant buffer could not be mapped for writing.
    #[error("failed to map {resource} for writing")]
    Map { resource: &'static str },

    /// Frame acquisition or presentation failed.
    #[error("surface error ({action:?}): {source}")]
    Surface {
        #[source]
        source: wgpu::SurfaceError,
        action: SurfaceErrorAction,
    },

    /// A component was used after shutdown or before a required bind.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl RenderError {
    pub(crate) fn gpu_resource(resource: &'static str, reason: impl Into<String>) -> Self {
        Self::GpuResource {
            resource,
            reason: reason.into(),
        }
    }

    pub(crate) fn released(component: &str) -> Self {
        Self::InvalidState(format!("{component} used after shutdown"))
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` when only the current frame is lost and the next frame may
    /// be attempted.
    pub fn is_frame_recoverable(&self) -> bool {
        match self {
            Self::Map { .. } => true,
            Self::Surface { action, .. } => *action != SurfaceErrorAction::Fatal,
            _ => false,
        }
    }
}
