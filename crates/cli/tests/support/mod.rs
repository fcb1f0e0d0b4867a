#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const GET_LEVEL: &str =
    "net/minecraft/commands/CommandSourceStack.getLevel:()Lnet/minecraft/server/level/ServerLevel;";
pub const GET_WORLD: &str =
    "net/minecraft/commands/CommandSourceStack.getWorld:()Lnet/minecraft/server/level/ServerLevel;";
pub const GET_WORLD_SIGNATURE: &str = "public java.lang.Object getWorld(java.lang.Object);";
pub const GET_PITCH_SIGNATURE: &str = "public float getPitch(java.lang.Object);";

/// Lay out `root/<version>/` with an extracted class file and precomputed artifacts for one class
/// whose `getWorld` body calls `world_symbol`.
pub fn write_version(root: &Path, version: &str, class_name: &str, world_symbol: &str) {
    let version_dir = root.join(version);
    let classes_dir = version_dir.join("dev/jorel/commandapi/nms");
    fs::create_dir_all(&classes_dir).expect("create classes dir");
    fs::write(classes_dir.join(format!("{class_name}.class")), b"\xCA\xFE\xBA\xBE")
        .expect("write class file");

    let header = format!(
        "Compiled from \"{class_name}.java\"\npublic class dev.jorel.commandapi.nms.{class_name} {{\n"
    );
    let listing = format!("{header}  {GET_WORLD_SIGNATURE}\n  {GET_PITCH_SIGNATURE}\n}}\n");
    let disassembly = format!(
        "{header}  {GET_WORLD_SIGNATURE}\n    Code:\n       0: aload_1\n       \
         1: invokevirtual #3                  // Method {world_symbol}\n       \
         4: areturn\n\n  {GET_PITCH_SIGNATURE}\n    Code:\n       0: aload_1\n       \
         1: invokevirtual #4                  // Method net/minecraft/world/phys/Vec2.getX:()F\n       \
         4: freturn\n}}\n"
    );
    fs::write(version_dir.join(format!("bytecode_{version}_{class_name}_methods.txt")), listing)
        .expect("write listing");
    fs::write(version_dir.join(format!("bytecode_{version}_{class_name}.txt")), disassembly)
        .expect("write disassembly");
}

/// Write a plain `javap -c` file in the indented layout the `compare` command expects.
pub fn write_legacy_file(dir: &Path, version: &str, world_symbol: &str) -> String {
    let body = format!(
        "Compiled from \"NMS.java\"\npublic class dev.jorel.commandapi.nms.NMS {{\n  \
         public final java.lang.Object getWorld(java.lang.Object);\n    Code:\n       \
         0: aload_1\n       1: invokevirtual #3                  // Method {world_symbol}\n       \
         4: areturn\n}}\n"
    );
    let path = dir.join(format!("bytecode_{version}.txt"));
    fs::write(&path, body).expect("write legacy file");
    format!("{version}={}", path.display())
}
