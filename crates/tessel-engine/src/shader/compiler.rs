use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::{RenderError, RenderResult};

use super::diagnostics::DiagnosticsSink;

/// Pipeline stage a source file is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl ShaderStage {
    pub(crate) fn naga_stage(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Pixel => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Pixel => "pixel",
        })
    }
}

/// Compilation target: the stage plus the capability set validation allows.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ShaderProfile {
    pub stage: ShaderStage,
    pub capabilities: Capabilities,
}

impl ShaderProfile {
    /// Baseline profile: no optional capabilities.
    pub fn baseline(stage: ShaderStage) -> Self {
        Self {
            stage,
            capabilities: Capabilities::empty(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self.stage {
            ShaderStage::Vertex => "wgsl_vs",
            ShaderStage::Pixel => "wgsl_ps",
        }
    }
}

/// A validated WGSL stage, ready to become a GPU shader module.
#[derive(Debug)]
pub struct CompiledStage {
    path: PathBuf,
    profile: ShaderProfile,
    entry_point: String,
    source: String,
}

impl CompiledStage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self) -> ShaderProfile {
        self.profile
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub(crate) fn source(&self) -> &str {
        &self.source
    }
}

/// Reads, parses and validates one stage, and checks that `entry_point`
/// exists for it.
///
/// A missing file fails with [`RenderError::FileNotFound`] and writes nothing
/// to `diagnostics`. Any compiler complaint is written to `diagnostics` and
/// fails with [`RenderError::Compile`].
pub fn compile_stage(
    path: impl AsRef<Path>,
    entry_point: &str,
    profile: ShaderProfile,
    diagnostics: &mut dyn DiagnosticsSink,
) -> RenderResult<CompiledStage> {
    let path = path.as_ref();

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(RenderError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(RenderError::io(path, e)),
    };

    if let Err(text) = check_source(&source, entry_point, profile) {
        let text = format!("{}: {text}", path.display());
        log::error!("{} shader compile failed:\n{text}", profile.stage);
        if let Err(e) = diagnostics.write_diagnostic(&text) {
            log::warn!("failed to write shader diagnostics: {e}");
        }
        return Err(RenderError::Compile {
            path: path.to_path_buf(),
            stage: profile.stage,
            diagnostics: text,
        });
    }

    log::debug!(
        "compiled {} ({}, entry {entry_point})",
        path.display(),
        profile.name()
    );

    Ok(CompiledStage {
        path: path.to_path_buf(),
        profile,
        entry_point: entry_point.to_owned(),
        source,
    })
}

/// Returns the compiler's diagnostic text on failure.
fn check_source(source: &str, entry_point: &str, profile: ShaderProfile) -> Result<(), String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    Validator::new(ValidationFlags::all(), profile.capabilities)
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let stage = profile.stage.naga_stage();
    if module
        .entry_points
        .iter()
        .any(|ep| ep.name == entry_point && ep.stage == stage)
    {
        Ok(())
    } else {
        Err(format!(
            "error: entry point `{entry_point}` not found for the {} stage",
            profile.stage
        ))
    }
}
