use crate::config::Config;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Load, parse and validate configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    load_config_with_overrides(config_path, &CliOverrides::default())
}

/// Load configuration, apply CLI overrides, then validate the result once
pub fn load_config_with_overrides(config_path: &Path, overrides: &CliOverrides) -> Result<Config> {
    let mut config = read_config(config_path)?;
    apply_cli_overrides(&mut config, overrides)?;
    Ok(config)
}

fn read_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    info!(
        "Configuration describes {} clusters with {} nodes in total",
        config.clusters.len(),
        config.clusters.iter().map(|c| c.size as u64).sum::<u64>()
    );

    Ok(config)
}

/// Read `general.log_level` without parsing the rest of the file.
///
/// Used before the logger exists, so it stays silent and yields `None` on
/// any problem; `load_config` reports those properly.
pub fn peek_log_level(config_path: &Path) -> Option<String> {
    let file = File::open(config_path).ok()?;
    let value: serde_yaml::Value = serde_yaml::from_reader(file).ok()?;
    value
        .get("general")?
        .get("log_level")?
        .as_str()
        .map(str::to_string)
}

/// CLI arguments that can override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub seed: Option<u64>,
    pub stop_time: Option<Duration>,
}

/// Apply CLI overrides to a configuration
pub fn apply_cli_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(seed) = overrides.seed {
        info!("Overriding seed from command line: {}", seed);
        config.general.seed = Some(seed);
    }

    if let Some(stop_time) = overrides.stop_time {
        info!("Overriding stop time from command line: {:?}", stop_time);
        config.general.stop_time = stop_time;
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}
