use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output};

use thiserror::Error;

use crate::config::VerifierConfig;

/// Environment variable overriding the configured `javap` executable.
pub const JAVAP_ENV: &str = "BYTECODE_DIFF_JAVAP";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Exit { tool: String, status: ExitStatus, stderr: String },

    /// The tool succeeded but printed nothing for `input`.
    #[error("{tool} produced no output for {}", .input.display())]
    MissingOutput { tool: String, input: PathBuf },
}

/// Unpacks a build archive into a version folder.
pub trait ArchiveExtractor: Send + Sync {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ToolError>;
    fn name(&self) -> &str;
}

/// The two text artifacts produced for one class file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassemblyArtifacts {
    /// Instruction-level disassembly with comment-annotated references.
    pub full: String,
    /// Plain member signature listing.
    pub signatures: String,
}

/// Disassembles one class file, relative to the version folder it was extracted into.
pub trait Disassembler: Send + Sync {
    fn disassemble(&self, version_dir: &Path, class_file: &Path)
        -> Result<DisassemblyArtifacts, ToolError>;
    fn name(&self) -> &str;
}

/// Extracts archives with `tar -xf`, which handles jar files as plain zip archives.
pub struct TarExtractor {
    program: PathBuf,
}

impl TarExtractor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    pub fn from_config(config: &VerifierConfig) -> Self {
        Self::new(&config.tar)
    }
}

impl ArchiveExtractor for TarExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ToolError> {
        let output = Command::new(&self.program)
            .arg("-xf")
            .arg(archive)
            .current_dir(dest)
            .output()
            .map_err(|source| ToolError::Spawn { tool: self.name().to_string(), source })?;
        check_status(self.name(), &output)
    }

    fn name(&self) -> &str {
        "tar"
    }
}

/// Runs the JDK `javap` disassembler twice per class: with and without `-c`.
pub struct JavapDisassembler {
    program: PathBuf,
}

impl JavapDisassembler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    /// Use `BYTECODE_DIFF_JAVAP` when set, otherwise the configured executable.
    pub fn from_config(config: &VerifierConfig) -> Self {
        Self::new(resolve_javap_path(config))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(
        &self,
        version_dir: &Path,
        class_file: &Path,
        flags: &[&OsStr],
    ) -> Result<String, ToolError> {
        let output = Command::new(&self.program)
            .args(flags)
            .arg(class_file)
            .current_dir(version_dir)
            .output()
            .map_err(|source| ToolError::Spawn { tool: self.name().to_string(), source })?;
        check_status(self.name(), &output)?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if stdout.trim().is_empty() {
            return Err(ToolError::MissingOutput {
                tool: self.name().to_string(),
                input: class_file.to_path_buf(),
            });
        }
        Ok(stdout)
    }
}

impl Disassembler for JavapDisassembler {
    fn disassemble(
        &self,
        version_dir: &Path,
        class_file: &Path,
    ) -> Result<DisassemblyArtifacts, ToolError> {
        let full = self.run(version_dir, class_file, &[OsStr::new("-c")])?;
        let signatures = self.run(version_dir, class_file, &[])?;
        Ok(DisassemblyArtifacts { full, signatures })
    }

    fn name(&self) -> &str {
        "javap"
    }
}

fn resolve_javap_path(config: &VerifierConfig) -> PathBuf {
    std::env::var_os(JAVAP_ENV).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(&config.javap))
}

fn check_status(tool: &str, output: &Output) -> Result<(), ToolError> {
    if output.status.success() {
        return Ok(());
    }
    Err(ToolError::Exit {
        tool: tool.to_string(),
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let javap = JavapDisassembler::new(dir.path().join("no-such-javap"));
        let err = javap.disassemble(dir.path(), Path::new("Foo.class")).unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }), "{err:?}");
        assert!(err.to_string().contains("javap"));
    }

    #[cfg(unix)]
    #[test]
    fn silent_success_is_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        // `true` accepts any arguments, exits 0 and prints nothing.
        let javap = JavapDisassembler::new("true");
        match javap.disassemble(dir.path(), Path::new("Foo.class")) {
            Err(ToolError::MissingOutput { tool, input }) => {
                assert_eq!(tool, "javap");
                assert_eq!(input, Path::new("Foo.class"));
            }
            // Hosts without `true` on the path.
            Err(ToolError::Spawn { .. }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_reported_with_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("missing.jar");
        let err = TarExtractor::new("tar").extract(&archive, dir.path());
        // Hosts without tar surface a spawn error instead.
        match err {
            Err(ToolError::Exit { tool, .. }) => assert_eq!(tool, "tar"),
            Err(ToolError::Spawn { .. }) => {}
            Ok(()) => panic!("extracting a missing archive should fail"),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
}
