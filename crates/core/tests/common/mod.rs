#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bytecode_diff_core::config::DEFAULT_CLASSES_DIR;
use bytecode_diff_core::layout::WorkspaceLayout;
use bytecode_diff_core::services::{
    ArchiveExtractor, Disassembler, DisassemblyArtifacts, ToolError,
};

/// One method of a synthetic class: declaration plus the external references its body makes.
pub type MethodFixture<'a> = (&'a str, &'a [&'a str]);

/// Render a `javap` member listing for `class_name`.
pub fn listing(class_name: &str, methods: &[MethodFixture<'_>]) -> String {
    let mut out = format!(
        "Compiled from \"{class_name}.java\"\npublic class dev.jorel.commandapi.nms.{class_name} {{\n"
    );
    for (signature, _) in methods {
        out.push_str(&format!("  {signature}\n"));
    }
    out.push_str("}\n");
    out
}

/// Render a `javap -c` disassembly whose bodies reference the given symbols.
pub fn disassembly(class_name: &str, methods: &[MethodFixture<'_>]) -> String {
    let mut out = format!(
        "Compiled from \"{class_name}.java\"\npublic class dev.jorel.commandapi.nms.{class_name} {{\n"
    );
    for (signature, symbols) in methods {
        out.push_str(&format!("  {signature}\n    Code:\n       0: aload_0\n"));
        for (index, symbol) in symbols.iter().enumerate() {
            out.push_str(&format!(
                "       {}: invokevirtual #{}                 // Method {symbol}\n",
                index + 1,
                index + 10
            ));
        }
        out.push_str(
            "      40: invokevirtual #99                 // Method java/lang/Object.toString:()Ljava/lang/String;\n",
        );
        out.push_str("      43: areturn\n\n");
    }
    out.push_str("}\n");
    out
}

/// Create a version folder holding an (empty) class file for every class.
pub fn create_version(root: &Path, version: &str, classes: &[&str]) -> PathBuf {
    let layout = WorkspaceLayout::new(root);
    let classes_dir = layout.classes_dir(version, DEFAULT_CLASSES_DIR);
    fs::create_dir_all(&classes_dir).expect("create classes dir");
    for class_name in classes {
        fs::write(classes_dir.join(format!("{class_name}.class")), b"\xCA\xFE\xBA\xBE")
            .expect("write class file");
    }
    layout.version_dir(version)
}

/// Write both artifacts for (version, class) as the disassembler would.
pub fn write_artifacts(
    root: &Path,
    version: &str,
    class_name: &str,
    methods: &[MethodFixture<'_>],
) {
    let paths = WorkspaceLayout::new(root).artifact_paths(version, class_name);
    fs::write(&paths.disassembly, disassembly(class_name, methods)).expect("write disassembly");
    fs::write(&paths.signatures, listing(class_name, methods)).expect("write listing");
}

/// Disassembler returning canned artifacts keyed by (version folder name, class file stem).
#[derive(Default)]
pub struct FakeDisassembler {
    pub artifacts: HashMap<(String, String), DisassemblyArtifacts>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeDisassembler {
    pub fn with(mut self, version: &str, class_name: &str, methods: &[MethodFixture<'_>]) -> Self {
        self.artifacts.insert(
            (version.to_string(), class_name.to_string()),
            DisassemblyArtifacts {
                full: disassembly(class_name, methods),
                signatures: listing(class_name, methods),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl Disassembler for FakeDisassembler {
    fn disassemble(
        &self,
        version_dir: &Path,
        class_file: &Path,
    ) -> Result<DisassemblyArtifacts, ToolError> {
        let version = version_dir.file_name().unwrap().to_string_lossy().to_string();
        let class_name = class_file.file_stem().unwrap().to_string_lossy().to_string();
        self.calls.lock().expect("calls lock").push((version.clone(), class_name.clone()));
        Ok(self.artifacts.get(&(version, class_name)).cloned().unwrap_or(DisassemblyArtifacts {
            full: String::new(),
            signatures: String::new(),
        }))
    }

    fn name(&self) -> &str {
        "fake-javap"
    }
}

/// Extractor that records each archive and "unpacks" it by creating the given class files.
#[derive(Default)]
pub struct RecordingExtractor {
    pub classes: Vec<String>,
    pub archives: Mutex<Vec<PathBuf>>,
}

impl RecordingExtractor {
    pub fn unpacking(classes: &[&str]) -> Self {
        Self { classes: classes.iter().map(|c| c.to_string()).collect(), ..Self::default() }
    }

    pub fn archives(&self) -> Vec<PathBuf> {
        self.archives.lock().expect("archives lock").clone()
    }
}

impl ArchiveExtractor for RecordingExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ToolError> {
        self.archives.lock().expect("archives lock").push(archive.to_path_buf());
        let classes_dir = dest.join(DEFAULT_CLASSES_DIR);
        fs::create_dir_all(&classes_dir).expect("create classes dir");
        for class_name in &self.classes {
            fs::write(classes_dir.join(format!("{class_name}.class")), b"\xCA\xFE\xBA\xBE")
                .expect("write class file");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
