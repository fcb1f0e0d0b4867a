use std::path::{Path, PathBuf};

/// Logical layout of a verification root on disk.
///
/// The root holds one folder per target-platform version; each version folder holds the build
/// archive, the extracted classes, and the disassembly artifacts written for every class.
/// This does *not* perform any IO itself.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    /// Root directory containing the version folders.
    pub root: PathBuf,
}

/// The two disassembly artifacts written for one (version, class) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Full instruction-level disassembly (`javap -c`).
    pub disassembly: PathBuf,
    /// Plain member signature listing (`javap`).
    pub signatures: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.root.join(version)
    }

    /// Directory holding the extracted classes of `version`.
    pub fn classes_dir(&self, version: &str, classes_subdir: &str) -> PathBuf {
        self.version_dir(version).join(classes_subdir)
    }

    /// Class file path relative to its version folder, as handed to the disassembler.
    pub fn class_file_relative(classes_subdir: &str, class_name: &str) -> PathBuf {
        Path::new(classes_subdir).join(format!("{class_name}.class"))
    }

    pub fn artifact_paths(&self, version: &str, class_name: &str) -> ArtifactPaths {
        let dir = self.version_dir(version);
        ArtifactPaths {
            disassembly: dir.join(format!("bytecode_{version}_{class_name}.txt")),
            signatures: dir.join(format!("bytecode_{version}_{class_name}_methods.txt")),
        }
    }
}
