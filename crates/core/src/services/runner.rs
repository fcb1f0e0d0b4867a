use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::diff::{Accumulated, ConsistencyAccumulator, DivergenceError};
use crate::analysis::record::{build_legacy_record, build_record, RecordError};
use crate::analysis::sanity::{sanity_check, InconsistencyError};
use crate::analysis::symbols::SymbolExtractor;
use crate::config::{ConfigError, VerifierConfig};
use crate::layout::WorkspaceLayout;
use crate::model::{BytecodeRecord, MethodSignature};
use crate::services::discovery::{
    clean_version_dir, discover_classes, discover_versions, find_archive, read_artifact_lines,
};
use crate::services::tools::{ArchiveExtractor, Disassembler, ToolError};

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Required artifact missing: {0}")]
    MissingArtifact(PathBuf),

    #[error("Nothing to verify: {0}")]
    NothingToVerify(String),

    /// The whole-run sanity check disagreed with the incremental comparison.
    #[error(transparent)]
    Inconsistency(#[from] InconsistencyError),
}

/// How records are produced and keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Directory mode: every class of every version folder, outer loop over versions.
    PerClass,
    /// One unnamed class given as a list of `javap -c` files, in the order given.
    Legacy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Reuse the classes already extracted in each version folder.
    pub skip_extract: bool,
    /// Reuse disassembly artifacts already written to each version folder.
    pub skip_disassemble: bool,
    /// Keep comparing a class after its first divergence.
    pub keep_going: bool,
}

/// A (version, class) pair whose record could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFailure {
    pub version: String,
    pub signature: MethodSignature,
    pub message: String,
}

impl From<RecordError> for BuildFailure {
    fn from(err: RecordError) -> Self {
        let message = err.to_string();
        match err {
            RecordError::MissingMethodBody { version, signature, .. } => {
                Self { version, signature, message }
            }
        }
    }
}

/// Per-class verification result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Versions whose record compared equal to (or became) the baseline, in iteration order.
    pub versions: Vec<String>,
    pub divergences: Vec<DivergenceError>,
    pub build_failures: Vec<BuildFailure>,
    /// Set when later versions were skipped after a divergence.
    pub halted: bool,
}

impl ClassReport {
    fn new(class_name: Option<String>) -> Self {
        Self {
            class_name,
            versions: Vec::new(),
            divergences: Vec::new(),
            build_failures: Vec::new(),
            halted: false,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.divergences.is_empty() && self.build_failures.is_empty()
    }
}

/// Result of a complete run that passed the sanity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub generated_at: String,
    pub mode: RunMode,
    pub versions: Vec<String>,
    pub classes: Vec<ClassReport>,
}

impl VerificationReport {
    pub fn success(&self) -> bool {
        self.classes.iter().all(ClassReport::is_consistent)
    }

    pub fn divergences(&self) -> impl Iterator<Item = &DivergenceError> {
        self.classes.iter().flat_map(|class| class.divergences.iter())
    }
}

/// Accumulation state shared by both run modes.
struct Session {
    accumulator: ConsistencyAccumulator,
    /// Every record built so far, in iteration order.
    seen: Vec<BytecodeRecord>,
    classes: Vec<ClassReport>,
    keep_going: bool,
}

impl Session {
    fn new(keep_going: bool) -> Self {
        Self {
            accumulator: ConsistencyAccumulator::new(),
            seen: Vec::new(),
            classes: Vec::new(),
            keep_going,
        }
    }

    fn class_mut(&mut self, class_name: Option<&str>) -> &mut ClassReport {
        let index = match self.classes.iter().position(|c| c.class_name.as_deref() == class_name) {
            Some(index) => index,
            None => {
                self.classes.push(ClassReport::new(class_name.map(str::to_string)));
                self.classes.len() - 1
            }
        };
        &mut self.classes[index]
    }

    fn is_halted(&self, class_name: Option<&str>) -> bool {
        self.classes.iter().any(|c| c.class_name.as_deref() == class_name && c.halted)
    }

    fn fail(&mut self, class_name: Option<&str>, err: RecordError) {
        tracing::error!(error = %err, "could not build bytecode record");
        self.class_mut(class_name).build_failures.push(err.into());
    }

    fn offer(&mut self, record: BytecodeRecord) {
        let outcome = self.accumulator.accumulate(&record);
        let class_name = record.class_name().map(str::to_string);
        self.seen.push(record);
        let version = self.seen.last().map(|r| r.version().to_string()).unwrap_or_default();

        match outcome {
            Ok(Accumulated::Baseline) => {
                tracing::debug!(
                    class = class_name.as_deref(),
                    version = %version,
                    "baseline recorded"
                );
                self.class_mut(class_name.as_deref()).versions.push(version);
            }
            Ok(Accumulated::Compared { previous_version }) => {
                tracing::debug!(
                    class = class_name.as_deref(),
                    version = %version,
                    previous_version = %previous_version,
                    "identical to previous version"
                );
                self.class_mut(class_name.as_deref()).versions.push(version);
            }
            Err(divergence) => {
                let history = self.seen.iter().filter(|r| r.class_name() == class_name.as_deref());
                let divergence = divergence.with_history(history);
                tracing::warn!(%divergence, "divergence detected");
                let keep_going = self.keep_going;
                let class = self.class_mut(class_name.as_deref());
                class.divergences.push(divergence);
                class.halted = !keep_going;
            }
        }
    }

    /// Run the sanity check over every consistent class and produce the report.
    fn finish(
        self,
        mode: RunMode,
        versions: Vec<String>,
    ) -> Result<VerificationReport, VerifyError> {
        tracing::info!("performing sanity check");
        let consistent: Vec<BytecodeRecord> = self
            .seen
            .into_iter()
            .filter(|record| {
                self.classes
                    .iter()
                    .any(|c| c.class_name.as_deref() == record.class_name() && c.is_consistent())
            })
            .collect();
        sanity_check(&consistent)?;

        Ok(VerificationReport {
            generated_at: Utc::now().to_rfc3339(),
            mode,
            versions,
            classes: self.classes,
        })
    }
}

/// Coordinator that ties the workspace layout, configuration, and external tools together.
pub struct VerificationRunner<'a> {
    pub layout: &'a WorkspaceLayout,
    pub config: &'a VerifierConfig,
    pub extractor: &'a dyn ArchiveExtractor,
    pub disassembler: &'a dyn Disassembler,
}

impl<'a> VerificationRunner<'a> {
    /// Verify every class of every version folder under the layout root.
    pub fn run(&self, options: &RunOptions) -> Result<VerificationReport, VerifyError> {
        let patterns = self.config.patterns()?;
        let versions = discover_versions(&self.layout.root, &patterns.version)?;
        tracing::info!(?versions, "discovered version folders");
        let Some(first_version) = versions.first() else {
            return Err(VerifyError::NothingToVerify(format!(
                "no version folders under {}",
                self.layout.root.display()
            )));
        };

        if !options.skip_extract {
            self.extract_archives(&versions, &patterns.archive)?;
        }

        let classes_dir = self.layout.classes_dir(first_version, &self.config.classes_dir);
        let classes = discover_classes(&classes_dir)?;
        tracing::info!(?classes, "discovered classes");
        if classes.is_empty() {
            return Err(VerifyError::NothingToVerify(format!(
                "no class files in {}",
                classes_dir.display()
            )));
        }

        if !options.skip_disassemble {
            self.write_artifacts(&versions, &classes)?;
        }

        tracing::info!("comparing all bytecodes");
        let symbols = self.config.symbol_extractor();
        let mut session = Session::new(options.keep_going);
        for version in &versions {
            for class_name in &classes {
                if session.is_halted(Some(class_name.as_str())) {
                    continue;
                }
                let paths = self.layout.artifact_paths(version, class_name);
                let Some(disassembly) = read_artifact_lines(&paths.disassembly)? else {
                    tracing::warn!(
                        version = %version,
                        class = %class_name,
                        "no disassembly for class, skipping"
                    );
                    continue;
                };
                let signatures = read_artifact_lines(&paths.signatures)?
                    .ok_or_else(|| VerifyError::MissingArtifact(paths.signatures.clone()))?;
                match build_record(version, class_name, &signatures, &disassembly, &symbols) {
                    Ok(record) => session.offer(record),
                    Err(err) => session.fail(Some(class_name.as_str()), err),
                }
            }
        }

        session.finish(RunMode::PerClass, versions)
    }

    fn extract_archives(
        &self,
        versions: &[String],
        archive_pattern: &regex::Regex,
    ) -> Result<(), VerifyError> {
        for version in versions {
            let version_dir = self.layout.version_dir(version);
            clean_version_dir(&version_dir, &self.config.clean_dirs)?;
            let Some(archive) = find_archive(&version_dir, archive_pattern)? else {
                tracing::warn!(version = %version, "no matching archive, nothing extracted");
                continue;
            };
            tracing::info!(archive = %archive.display(), tool = self.extractor.name(), "unzipping");
            self.extractor.extract(&archive, &version_dir)?;
        }
        Ok(())
    }

    fn write_artifacts(&self, versions: &[String], classes: &[String]) -> Result<(), VerifyError> {
        for version in versions {
            let version_dir = self.layout.version_dir(version);
            for class_name in classes {
                let paths = self.layout.artifact_paths(version, class_name);
                for stale in [&paths.disassembly, &paths.signatures] {
                    if stale.exists() {
                        fs::remove_file(stale)
                            .map_err(|source| VerifyError::Io { path: stale.clone(), source })?;
                    }
                }

                let class_file =
                    WorkspaceLayout::class_file_relative(&self.config.classes_dir, class_name);
                if !version_dir.join(&class_file).is_file() {
                    tracing::warn!(
                        version = %version,
                        class = %class_name,
                        "class file missing, not disassembled"
                    );
                    continue;
                }
                let artifacts = self.disassembler.disassemble(&version_dir, &class_file)?;
                write_artifact(&paths.disassembly, &artifacts.full)?;
                write_artifact(&paths.signatures, &artifacts.signatures)?;
                tracing::info!(version = %version, class = %class_name, "created bytecode files");
            }
        }
        Ok(())
    }
}

fn write_artifact(path: &Path, body: &str) -> Result<(), VerifyError> {
    fs::write(path, body).map_err(|source| VerifyError::Io { path: path.to_path_buf(), source })
}

/// One input of a legacy run: a version label and its `javap -c` output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyInput {
    pub version: String,
    pub path: PathBuf,
}

/// Verify a single unnamed class given as one disassembly file per version, in the given order.
pub fn run_legacy(
    inputs: &[LegacyInput],
    symbols: &SymbolExtractor,
    keep_going: bool,
) -> Result<VerificationReport, VerifyError> {
    if inputs.is_empty() {
        return Err(VerifyError::NothingToVerify("no disassembly files given".to_string()));
    }
    let mut session = Session::new(keep_going);
    for input in inputs {
        if session.is_halted(None) {
            break;
        }
        let lines = read_artifact_lines(&input.path)?
            .ok_or_else(|| VerifyError::MissingArtifact(input.path.clone()))?;
        match build_legacy_record(&input.version, &lines, symbols) {
            Ok(record) => session.offer(record),
            Err(err) => session.fail(None, err),
        }
    }
    let versions = inputs.iter().map(|input| input.version.clone()).collect();
    session.finish(RunMode::Legacy, versions)
}
