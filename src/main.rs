use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use clustersim::config_loader::{self, CliOverrides};
use clustersim::orchestrator::generate_scenario;

/// Hierarchical clustered topology generator for network simulations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the topology configuration YAML file
    #[arg(short, long)]
    config: PathBuf,

    /// Output directory for the scenario and registry files
    #[arg(short, long, default_value = "scenario_output")]
    output: PathBuf,

    /// Seed for head selection (overrides general.seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation stop time, e.g. "30s" (overrides general.stop_time)
    #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
    stop_time: Option<Duration>,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Initialize logging with the configured level, "info" unless set
    let default_level =
        config_loader::peek_log_level(&args.config).unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("Starting ClusterSim topology generator");
    info!("Configuration file: {:?}", args.config);
    info!("Output directory: {:?}", args.output);

    let overrides = CliOverrides {
        seed: args.seed,
        stop_time: args.stop_time,
    };
    let config = config_loader::load_config_with_overrides(&args.config, &overrides)?;

    let topology = generate_scenario(&config, &args.output)?;

    info!(
        "Generated {} clusters ({} nodes) joined by a backbone of {} heads",
        topology.clusters().len(),
        topology.node_count(),
        topology.backbone().len()
    );
    info!("Topology generation completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(&["clustersim", "--config", "clusters.yaml"]);

        assert_eq!(args.config, PathBuf::from("clusters.yaml"));
        assert_eq!(args.output, PathBuf::from("scenario_output"));
        assert_eq!(args.seed, None);
        assert_eq!(args.stop_time, None);
    }

    #[test]
    fn test_override_args() {
        let args = Args::parse_from(&[
            "clustersim",
            "--config", "clusters.yaml",
            "--seed", "42",
            "--stop-time", "30s",
        ]);

        assert_eq!(args.seed, Some(42));
        assert_eq!(args.stop_time, Some(Duration::from_secs(30)));
    }
}
