//! Filesystem discovery of version folders, class names, and build archives.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::services::runner::VerifyError;

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> VerifyError + '_ {
    move |source| VerifyError::Io { path: path.to_path_buf(), source }
}

/// Names of the entries in `dir` that satisfy `keep`, sorted lexically.
fn sorted_entry_names(
    dir: &Path,
    keep: impl Fn(&fs::DirEntry, &str) -> io::Result<bool>,
) -> Result<Vec<String>, VerifyError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if keep(&entry, &name).map_err(io_error(&entry.path()))? {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Version folders directly under `root`, in lexical order.
///
/// This order decides which version becomes each class's baseline.
pub fn discover_versions(root: &Path, version_pattern: &Regex) -> Result<Vec<String>, VerifyError> {
    sorted_entry_names(root, |entry, name| {
        Ok(entry.file_type()?.is_dir() && version_pattern.is_match(name))
    })
}

/// Class names (file stems of `*.class` files) inside `classes_dir`, sorted.
///
/// A missing directory yields no classes.
pub fn discover_classes(classes_dir: &Path) -> Result<Vec<String>, VerifyError> {
    if !classes_dir.is_dir() {
        return Ok(Vec::new());
    }
    let files = sorted_entry_names(classes_dir, |entry, name| {
        Ok(entry.file_type()?.is_file() && name.ends_with(".class"))
    })?;
    Ok(files.into_iter().map(|name| name.trim_end_matches(".class").to_string()).collect())
}

/// First file in `version_dir` (lexical order) whose name matches `archive_pattern`.
pub fn find_archive(
    version_dir: &Path,
    archive_pattern: &Regex,
) -> Result<Option<PathBuf>, VerifyError> {
    let matches = sorted_entry_names(version_dir, |entry, name| {
        Ok(entry.file_type()?.is_file() && archive_pattern.is_match(name))
    })?;
    Ok(matches.into_iter().next().map(|name| version_dir.join(name)))
}

/// Remove leftovers of a previous extraction from `version_dir`.
pub fn clean_version_dir(version_dir: &Path, clean_dirs: &[String]) -> Result<(), VerifyError> {
    for name in clean_dirs {
        let target = version_dir.join(name);
        if target.is_dir() {
            tracing::debug!(path = %target.display(), "removing previous extraction");
            fs::remove_dir_all(&target).map_err(io_error(&target))?;
        }
    }
    Ok(())
}

/// Read a text artifact as lines; `None` when the file does not exist.
pub fn read_artifact_lines(path: &Path) -> Result<Option<Vec<String>>, VerifyError> {
    match fs::read_to_string(path) {
        Ok(body) => Ok(Some(body.lines().map(str::to_string).collect())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(VerifyError::Io { path: path.to_path_buf(), source: err }),
    }
}
