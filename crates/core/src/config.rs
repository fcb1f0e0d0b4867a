//! Verifier configuration.
//!
//! The configuration is optional: every field has a default matching the CommandAPI build layout.
//! It lives (when present) at `bytecode-diff.json` / `bytecode-diff.yaml` in the verification
//! root, or wherever `--config` points.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::symbols::{SymbolExtractor, DEFAULT_NAMESPACE_PREFIX};

/// File names probed, in order, when no explicit config path is given.
pub const CONFIG_FILE_NAMES: [&str; 3] =
    ["bytecode-diff.json", "bytecode-diff.yaml", "bytecode-diff.yml"];

pub const DEFAULT_CLASSES_DIR: &str = "dev/jorel/commandapi/nms";
pub const DEFAULT_VERSION_PATTERN: &str = r"(\d+)\.(\d+)\.(\d+)";
pub const DEFAULT_ARCHIVE_PATTERN: &str = r"CommandAPI-(\d+)\.(\d+)\.(\d+)(-SNAPSHOT)?_(\d{1,2})_(\w{3})_(\d{4})_\((\d{2}-\d{2}-\d{2}(am|pm|AM|PM))\)\.jar";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported config format '{0}' (expected json, yaml or yml)")]
    UnsupportedFormat(String),

    #[error("Invalid {field} `{pattern}`: {source}")]
    Pattern {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Serializable verifier settings. Unknown fields are rejected so typos surface early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    /// Internal-name prefix of the version-specific namespace (e.g. `net/minecraft/`).
    pub namespace_prefix: String,
    /// Package directory, inside an extracted version folder, holding the classes to verify.
    pub classes_dir: String,
    /// Pattern a directory name must fully match to count as a version folder.
    pub version_pattern: String,
    /// Pattern a file name must fully match to be extracted inside a version folder.
    pub archive_pattern: String,
    /// Directories removed from every version folder before extraction.
    pub clean_dirs: Vec<String>,
    /// Disassembler executable.
    pub javap: String,
    /// Archive extraction executable.
    pub tar: String,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            namespace_prefix: DEFAULT_NAMESPACE_PREFIX.to_string(),
            classes_dir: DEFAULT_CLASSES_DIR.to_string(),
            version_pattern: DEFAULT_VERSION_PATTERN.to_string(),
            archive_pattern: DEFAULT_ARCHIVE_PATTERN.to_string(),
            clean_dirs: vec!["dev".to_string(), "META-INF".to_string()],
            javap: "javap".to_string(),
            tar: "tar".to_string(),
        }
    }
}

/// Compiled, whole-name matchers for the configured patterns.
#[derive(Debug, Clone)]
pub struct NamePatterns {
    pub version: Regex,
    pub archive: Regex,
}

impl VerifierConfig {
    /// Load a config file; the format follows the extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let body = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let parse_error =
            |message: String| ConfigError::Parse { path: path.to_path_buf(), message };
        match ext {
            "json" => serde_json::from_str(&body).map_err(|e| parse_error(e.to_string())),
            "yaml" | "yml" => serde_yaml::from_str(&body).map_err(|e| parse_error(e.to_string())),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Load the first config file found in `root`, or defaults when there is none.
    ///
    /// Returns the path that was loaded alongside the config.
    pub fn discover(root: &Path) -> Result<(Self, Option<PathBuf>), ConfigError> {
        for name in CONFIG_FILE_NAMES {
            let candidate = root.join(name);
            if candidate.is_file() {
                return Ok((Self::load(&candidate)?, Some(candidate)));
            }
        }
        Ok((Self::default(), None))
    }

    /// Compile the name patterns. Patterns must match the whole name.
    pub fn patterns(&self) -> Result<NamePatterns, ConfigError> {
        Ok(NamePatterns {
            version: whole_match("version_pattern", &self.version_pattern)?,
            archive: whole_match("archive_pattern", &self.archive_pattern)?,
        })
    }

    pub fn symbol_extractor(&self) -> SymbolExtractor {
        SymbolExtractor::new(self.namespace_prefix.clone())
    }
}

fn whole_match(field: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| ConfigError::Pattern {
        field,
        pattern: pattern.to_string(),
        source,
    })
}
