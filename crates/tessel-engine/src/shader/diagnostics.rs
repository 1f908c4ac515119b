use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default file compiler diagnostics are written to.
pub const DEFAULT_DIAGNOSTICS_FILE: &str = "shader-error.txt";

/// Receives raw shader compiler output.
pub trait DiagnosticsSink {
    fn write_diagnostic(&mut self, text: &str) -> io::Result<()>;
}

/// Writes each diagnostic to a file, replacing the previous contents.
#[derive(Debug, Clone)]
pub struct FileDiagnostics {
    path: PathBuf,
}

impl FileDiagnostics {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileDiagnostics {
    fn default() -> Self {
        Self::new(DEFAULT_DIAGNOSTICS_FILE)
    }
}

impl DiagnosticsSink for FileDiagnostics {
    fn write_diagnostic(&mut self, text: &str) -> io::Result<()> {
        fs::write(&self.path, text)
    }
}

/// Keeps diagnostics in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryDiagnostics {
    pub entries: Vec<String>,
}

impl MemoryDiagnostics {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DiagnosticsSink for MemoryDiagnostics {
    fn write_diagnostic(&mut self, text: &str) -> io::Result<()> {
        self.entries.push(text.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_replaces_previous_output() {
        let dir = std::env::temp_dir().join(format!("tessel-diag-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(DEFAULT_DIAGNOSTICS_FILE);

        let mut sink = FileDiagnostics::new(&path);
        sink.write_diagnostic("first error").unwrap();
        sink.write_diagnostic("second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn memory_sink_collects_in_order() {
        let mut sink = MemoryDiagnostics::default();
        assert!(sink.is_empty());
        sink.write_diagnostic("a").unwrap();
        sink.write_diagnostic("b").unwrap();
        assert_eq!(sink.entries, ["a", "b"]);
    }
}
