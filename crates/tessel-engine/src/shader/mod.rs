//! Shader compilation, diagnostics and the textured-quad program.

mod compiler;
mod diagnostics;
mod program;
mod uniforms;

pub use compiler::{compile_stage, CompiledStage, ShaderProfile, ShaderStage};
pub use diagnostics::{DiagnosticsSink, FileDiagnostics, MemoryDiagnostics, DEFAULT_DIAGNOSTICS_FILE};
pub use program::{ShaderProgram, ShaderSources};
pub use uniforms::TransformUniformBlock;
