use anyhow::{anyhow, Result};
use bytecode_diff_core::config::VerifierConfig;
use bytecode_diff_core::layout::WorkspaceLayout;
use bytecode_diff_core::services::{
    run_legacy, JavapDisassembler, LegacyInput, RunOptions, TarExtractor, VerificationReport,
    VerificationRunner, VerifyError,
};

use crate::commands::report::render_report;
use crate::{canonicalize_or_current, load_config};

/// Command-line overrides applied on top of the loaded config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub namespace_prefix: Option<String>,
    pub classes_dir: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut VerifierConfig) {
        if let Some(prefix) = &self.namespace_prefix {
            config.namespace_prefix = prefix.clone();
        }
        if let Some(dir) = &self.classes_dir {
            config.classes_dir = dir.clone();
        }
    }
}

/// Verify every class of every version folder under `root`.
pub fn verify_command(
    root: &str,
    config_path: Option<&str>,
    overrides: &ConfigOverrides,
    options: RunOptions,
    json: bool,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let mut config = load_config(&root_path, config_path)?;
    overrides.apply(&mut config);

    let layout = WorkspaceLayout::new(&root_path);
    let extractor = TarExtractor::from_config(&config);
    let disassembler = JavapDisassembler::from_config(&config);
    let runner = VerificationRunner {
        layout: &layout,
        config: &config,
        extractor: &extractor,
        disassembler: &disassembler,
    };
    finish_run(runner.run(&options), json)
}

/// Compare one unnamed class given as `javap -c` files, in the order given.
pub fn compare_command(
    files: &[String],
    config_path: Option<&str>,
    overrides: &ConfigOverrides,
    keep_going: bool,
    json: bool,
) -> Result<()> {
    let cwd = canonicalize_or_current(".")?;
    let mut config = load_config(&cwd, config_path)?;
    overrides.apply(&mut config);

    let inputs = files
        .iter()
        .map(|arg| crate::parse_legacy_input(arg))
        .collect::<Result<Vec<LegacyInput>>>()?;
    finish_run(run_legacy(&inputs, &config.symbol_extractor(), keep_going), json)
}

/// Print the outcome of a run and turn an unsuccessful one into an error exit.
fn finish_run(outcome: Result<VerificationReport, VerifyError>, json: bool) -> Result<()> {
    // A failed sanity check surfaces here with its fixed message.
    let report = outcome?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    if report.success() {
        Ok(())
    } else {
        Err(anyhow!(
            "Bytecode verification failed for {} class(es)",
            report.classes.iter().filter(|c| !c.is_consistent()).count()
        ))
    }
}
