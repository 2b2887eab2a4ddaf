//! # ClusterSim - Hierarchical topology synthesis for network simulations
//!
//! This library builds clustered wireless topologies for a discrete-event
//! network simulator: a set of ad hoc wireless clusters, each with its own
//! address block, joined through one head node per cluster over a shared
//! wired backbone.
//!
//! ## Overview
//!
//! A build runs once, before the simulator takes over:
//!
//! 1. Each cluster is created in order on its own wireless channel, given an
//!    internet stack with proactive routing, numbered from a fresh address
//!    block, and placed on a grid with a bounded random-direction model
//! 2. One head is picked per cluster (uniformly at random by default)
//! 3. All heads are attached to one wired link numbered from the backbone block
//! 4. The sealed topology is handed to the simulation engine
//!
//! ## Architecture
//!
//! - `config`: Type-safe configuration structures and YAML parsing
//! - `config_loader`: Configuration file loading and CLI overrides
//! - `ip`: Address blocks, block cursors, and the per-build allocator state
//! - `engine`: The simulator seam and the recording `ScenarioEngine`
//! - `mobility`: Grid placement and movement model description
//! - `topology`: Cluster building, head selection and assembly
//! - `registry`: JSON registry of the sealed topology
//! - `utils`: Data rate parsing and validation helpers
//! - `orchestrator`: High-level orchestration of scenario generation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use clustersim::{config_loader, orchestrator};
//! use std::path::Path;
//!
//! let config = config_loader::load_config(Path::new("clusters.yaml"))?;
//! let topology = orchestrator::generate_scenario(&config, Path::new("scenario_output"))?;
//! println!("{} clusters, {} heads", topology.clusters().len(), topology.backbone().len());
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! general:
//!   stop_time: "20s"
//!   seed: 42
//!
//! clusters:
//!   - size: 4
//!     address_base: "192.167.0.0/24"
//!   - size: 3
//!     address_base: "192.168.0.0/24"
//!
//! backbone:
//!   address_base: "172.16.0.0/24"
//!   data_rate: "5Mbps"
//!   delay: "2ms"
//! ```
//!
//! ## Error Handling
//!
//! Library modules return typed errors (`TopologyError`, `AddressError`,
//! `EngineError`, `ValidationError`). The loader, orchestrator and binary use
//! `color_eyre` for reporting with context.

pub mod config;
pub mod config_loader;
pub mod engine;
pub mod ip;
pub mod mobility;
pub mod orchestrator;
pub mod registry;
pub mod topology;
pub mod utils;
