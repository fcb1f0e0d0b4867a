use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use bytecode_diff_core::config::VerifierConfig;
use bytecode_diff_core::services::LegacyInput;
use tracing_subscriber::EnvFilter;

pub mod commands;

/// Canonicalize the root path if possible, falling back to the given string
/// relative to the current working directory.
pub fn canonicalize_or_current(root: &str) -> Result<PathBuf> {
    let path = Path::new(root);
    if path == Path::new(".") {
        Ok(env::current_dir().context("Failed to get current directory")?)
    } else {
        match path.canonicalize() {
            Ok(p) => Ok(p),
            Err(_) => {
                let cwd = env::current_dir().context("Failed to get current directory")?;
                Ok(cwd.join(path))
            }
        }
    }
}

/// Load the verifier config: an explicit path must exist, otherwise the root is probed and
/// defaults are used when nothing is found.
pub fn load_config(root: &Path, explicit: Option<&str>) -> Result<VerifierConfig> {
    match explicit {
        Some(path) => {
            let path = Path::new(path);
            VerifierConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        }
        None => {
            let (config, loaded) = VerifierConfig::discover(root)
                .with_context(|| format!("Failed to load config from {}", root.display()))?;
            if let Some(path) = loaded {
                tracing::info!(path = %path.display(), "loaded config");
            }
            Ok(config)
        }
    }
}

/// Parse a `VERSION=PATH` argument.
pub fn parse_legacy_input(arg: &str) -> Result<LegacyInput> {
    let (version, path) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected VERSION=PATH, got '{arg}'"))?;
    let version = version.trim();
    if version.is_empty() || path.is_empty() {
        return Err(anyhow!("Expected VERSION=PATH, got '{arg}'"));
    }
    Ok(LegacyInput { version: version.to_string(), path: PathBuf::from(path) })
}

/// Install the stderr log subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose {
        "warn,bytecode_diff=debug,bytecode_diff_core=debug"
    } else {
        "warn,bytecode_diff=info,bytecode_diff_core=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
