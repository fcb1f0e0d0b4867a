use anyhow::Result;

use crate::commands::verify::ConfigOverrides;
use crate::{canonicalize_or_current, load_config};

/// Print the effective configuration after file discovery and overrides.
pub fn show_config_command(
    root: &str,
    config_path: Option<&str>,
    overrides: &ConfigOverrides,
    json: bool,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let mut config = load_config(&root_path, config_path)?;
    overrides.apply(&mut config);
    // Surface bad patterns here rather than at the start of a run.
    config.patterns()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", serde_yaml::to_string(&config)?);
    }
    Ok(())
}
