//! Scenario generation orchestrator.
//!
//! This module coordinates the overall generation process: seeding the
//! randomness source once, assembling the topology against a simulation
//! engine, checking the sealed result, handing it to the engine lifecycle and
//! writing the output artifacts.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::engine::{ScenarioEngine, SimEngine};
use crate::registry::TopologyRegistry;
use crate::topology::{Topology, TopologyAssembler};
use crate::utils::validation::validate_blocks_disjoint;

pub const SCENARIO_FILE: &str = "scenario.yaml";
pub const REGISTRY_FILE: &str = "topology_registry.json";

/// The process-wide randomness source, seeded exactly once
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            info!("Seeding head selection with {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => {
            info!("Seeding head selection from OS entropy");
            StdRng::from_entropy()
        }
    }
}

/// Assemble the topology and run it through the engine lifecycle.
pub fn build_and_run<E: SimEngine + ?Sized>(
    config: &Config,
    engine: &mut E,
    rng: &mut StdRng,
) -> Result<Topology> {
    let topology = TopologyAssembler::assemble(config, engine, rng)
        .wrap_err("Topology assembly failed")?;

    validate_blocks_disjoint(&topology.address_blocks())
        .map_err(|e| eyre!("Sealed topology is inconsistent: {}", e))?;

    engine
        .schedule_stop(topology.stop_time())
        .wrap_err("Failed to schedule simulation stop")?;
    engine.run().wrap_err("Simulation engine failed to start")?;

    Ok(topology)
}

/// Generate `scenario.yaml` and `topology_registry.json` in `output_dir`
pub fn generate_scenario(config: &Config, output_dir: &Path) -> Result<Topology> {
    let mut rng = seeded_rng(config.general.seed);
    let mut engine = ScenarioEngine::new();

    let topology = build_and_run(config, &mut engine, &mut rng)?;

    fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", output_dir.display()))?;

    let scenario_path = output_dir.join(SCENARIO_FILE);
    let scenario_yaml = serde_yaml::to_string(&engine.scenario())?;
    fs::write(&scenario_path, scenario_yaml)
        .wrap_err_with(|| format!("Failed to write '{}'", scenario_path.display()))?;
    info!("Wrote scenario to {:?}", scenario_path);

    let registry_path = output_dir.join(REGISTRY_FILE);
    let registry_json = serde_json::to_string_pretty(&TopologyRegistry::from_topology(&topology))?;
    fs::write(&registry_path, registry_json)
        .wrap_err_with(|| format!("Failed to write '{}'", registry_path.display()))?;
    info!("Wrote topology registry to {:?}", registry_path);

    engine.destroy();

    Ok(topology)
}
