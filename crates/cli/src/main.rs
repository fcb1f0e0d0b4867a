use anyhow::Result;
use bytecode_diff::commands::*;
use bytecode_diff::init_logging;
use bytecode_diff_core::services::RunOptions;
use clap::{Args, Parser, Subcommand};

/// Cross-version bytecode consistency checker.
///
/// This CLI is a thin wrapper around `bytecode-diff-core` (exposed in code as
/// `bytecode_diff_core`). All comparison logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "bytecode-diff",
    version,
    about = "Verify that version-specific classes reference the same symbols in every version",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (overridden by `RUST_LOG`).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Settings shared by every subcommand that loads a config.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Explicit config file (`.json`, `.yaml` or `.yml`).
    ///
    /// Defaults to `bytecode-diff.*` in the root.
    #[arg(long)]
    config: Option<String>,

    /// Override the version-specific namespace prefix (e.g. `net/minecraft/`).
    #[arg(long)]
    namespace_prefix: Option<String>,

    /// Override the package directory holding the classes to verify.
    #[arg(long)]
    classes_dir: Option<String>,
}

impl ConfigArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            namespace_prefix: self.namespace_prefix.clone(),
            classes_dir: self.classes_dir.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify every class in every version folder under the root.
    ///
    /// This will:
    /// - Extract the build archive found in each version folder.
    /// - Disassemble every class into `bytecode_<version>_<class>.txt` files.
    /// - Compare each class across versions and run the sanity check.
    Verify {
        /// Root directory holding one folder per version. Defaults to the current directory.
        #[arg(long, default_value = ".")]
        root: String,

        #[command(flatten)]
        config: ConfigArgs,

        /// Reuse classes already extracted in each version folder.
        #[arg(long, default_value_t = false)]
        skip_extract: bool,

        /// Reuse disassembly files already written to each version folder.
        #[arg(long, default_value_t = false)]
        skip_disassemble: bool,

        /// Keep comparing a class after its first divergence.
        #[arg(long, default_value_t = false)]
        keep_going: bool,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Compare a single class given as one `javap -c` file per version.
    ///
    /// Files are compared in the order given.
    Compare {
        /// A `VERSION=PATH` pair; repeat for every version.
        #[arg(long = "file", value_name = "VERSION=PATH", required = true)]
        files: Vec<String>,

        #[command(flatten)]
        config: ConfigArgs,

        /// Keep comparing after the first divergence.
        #[arg(long, default_value_t = false)]
        keep_going: bool,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the effective configuration.
    ShowConfig {
        /// Root directory probed for a config file. Defaults to the current directory.
        #[arg(long, default_value = ".")]
        root: String,

        #[command(flatten)]
        config: ConfigArgs,

        /// Emit JSON instead of YAML.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Verify { root, config, skip_extract, skip_disassemble, keep_going, json } => {
            let options = RunOptions { skip_extract, skip_disassemble, keep_going };
            verify_command(&root, config.config.as_deref(), &config.overrides(), options, json)?
        }
        Command::Compare { files, config, keep_going, json } => compare_command(
            &files,
            config.config.as_deref(),
            &config.overrides(),
            keep_going,
            json,
        )?,
        Command::ShowConfig { root, config, json } => {
            show_config_command(&root, config.config.as_deref(), &config.overrides(), json)?
        }
    }

    Ok(())
}
