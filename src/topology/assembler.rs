//! Topology assembly.
//!
//! A `TopologyAssembler` is the building phase of a topology: clusters are
//! added one at a time, each immediately yielding its head. `seal` consumes
//! the assembler, attaches every head to one wired backbone and returns the
//! finished [`Topology`]. Since sealing consumes the assembler there is no
//! way to add clusters afterwards.

use log::info;
use rand::RngCore;
use std::net::Ipv4Addr;
use std::time::Duration;

use super::cluster::{ClusterBuilder, ClusterSpec};
use super::head::{selector_for, HeadSelector};
use super::types::{Backbone, BackboneMember, Cluster, ClusterId, NodeRef, Topology};
use super::{ConfigurationError, TopologyError};
use crate::config::{BackboneConfig, Config};
use crate::engine::SimEngine;
use crate::ip::{AddressBlock, AllocatorState};
use crate::utils::validation::MIN_STOP_TIME;

pub struct TopologyAssembler<'a> {
    builder: ClusterBuilder<'a>,
    selector: Box<dyn HeadSelector>,
    addresses: AllocatorState,
    clusters: Vec<Cluster>,
    heads: Vec<NodeRef>,
    stop_time: Duration,
}

impl<'a> TopologyAssembler<'a> {
    /// Start a build that will run until `stop_time`.
    ///
    /// Fails before anything is created when `stop_time` is below the minimum.
    pub fn new(
        stop_time: Duration,
        builder: ClusterBuilder<'a>,
        selector: Box<dyn HeadSelector>,
    ) -> Result<Self, TopologyError> {
        if stop_time < MIN_STOP_TIME {
            return Err(ConfigurationError::StopTimeTooShort {
                actual: stop_time,
                minimum: MIN_STOP_TIME,
            }
            .into());
        }
        Ok(TopologyAssembler {
            builder,
            selector,
            addresses: AllocatorState::new(),
            clusters: Vec::new(),
            heads: Vec::new(),
            stop_time,
        })
    }

    /// Build everything `config` describes.
    ///
    /// The whole address and placement plan is rehearsed on a scratch
    /// allocator first, so a configuration error never leaves nodes behind.
    pub fn assemble<E: SimEngine + ?Sized>(
        config: &'a Config,
        engine: &mut E,
        rng: &mut dyn RngCore,
    ) -> Result<Topology, TopologyError> {
        let builder = ClusterBuilder::new(&config.wireless, &config.mobility, config.routing);
        let mut assembler = Self::new(
            config.general.stop_time,
            builder,
            selector_for(config.head_selection),
        )?;

        if config.clusters.is_empty() {
            return Err(ConfigurationError::NoClusters.into());
        }
        let specs: Vec<ClusterSpec> = config
            .clusters
            .iter()
            .enumerate()
            .map(|(i, c)| ClusterSpec {
                size: c.size,
                address_base: config.cluster_base(i),
                origin: c.origin,
            })
            .collect();
        assembler.rehearse(&specs, &config.backbone)?;

        info!(
            "Assembling {} clusters (sizes {:?}) with {} head selection",
            specs.len(),
            config.cluster_sizes(),
            assembler.selector.name()
        );

        for spec in &specs {
            assembler.add_cluster(spec, engine, rng)?;
        }
        assembler.seal(&config.backbone, engine)
    }

    /// Run every configuration check for `specs` and the backbone without
    /// touching the engine.
    fn rehearse(
        &self,
        specs: &[ClusterSpec],
        backbone: &BackboneConfig,
    ) -> Result<(), ConfigurationError> {
        let mut scratch = self.addresses.clone();
        let offset = self.clusters.len();
        for (i, spec) in specs.iter().enumerate() {
            self.builder.plan(ClusterId(offset + i), spec, &mut scratch)?;
        }
        plan_backbone(backbone, self.heads.len() + specs.len(), &mut scratch)?;
        Ok(())
    }

    /// Build the next cluster and pick its head.
    pub fn add_cluster<E: SimEngine + ?Sized>(
        &mut self,
        spec: &ClusterSpec,
        engine: &mut E,
        rng: &mut dyn RngCore,
    ) -> Result<ClusterId, TopologyError> {
        let id = ClusterId(self.clusters.len());
        let cluster = self.builder.build(id, spec, &mut self.addresses, engine)?;

        let head = self.selector.select(&cluster, rng);
        if !cluster.contains(head) {
            return Err(ConfigurationError::InvalidHead {
                selector: self.selector.name(),
                cluster: id.0,
                index: head.index,
                size: cluster.len(),
            }
            .into());
        }
        if let Some(member) = cluster.member(head.index) {
            info!(
                "Cluster {} head: member {} ({}, {})",
                id.0, head.index, member.node, member.address
            );
        }

        self.clusters.push(cluster);
        self.heads.push(head);
        Ok(id)
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Heads chosen so far, one per cluster in build order.
    pub fn heads(&self) -> &[NodeRef] {
        &self.heads
    }

    /// Attach all heads to one wired link and finish the build.
    ///
    /// Heads already carry an internet stack from their cluster, so only the
    /// new wired devices are created and numbered.
    pub fn seal<E: SimEngine + ?Sized>(
        mut self,
        backbone: &BackboneConfig,
        engine: &mut E,
    ) -> Result<Topology, TopologyError> {
        if self.clusters.is_empty() {
            return Err(ConfigurationError::NoClusters.into());
        }
        let (data_rate, block, hosts) =
            plan_backbone(backbone, self.heads.len(), &mut self.addresses)?;

        let head_nodes = self
            .heads
            .iter()
            .map(|head| self.clusters[head.cluster.0].members()[head.index].node)
            .collect::<Vec<_>>();

        let link = engine.create_wired_link(data_rate, backbone.delay)?;
        let devices = engine.install_wired_devices(link, &head_nodes)?;

        let mut members = Vec::with_capacity(self.heads.len());
        for (((head, node), device), address) in self
            .heads
            .iter()
            .zip(head_nodes)
            .zip(devices)
            .zip(hosts)
        {
            engine.assign_address(device, address, block)?;
            members.push(BackboneMember {
                head: *head,
                node,
                device,
                address,
            });
        }

        info!(
            "Sealed topology: {} clusters, backbone of {} heads on {} ({} bps, {:?})",
            self.clusters.len(),
            members.len(),
            block,
            data_rate,
            backbone.delay
        );

        Ok(Topology {
            clusters: std::mem::take(&mut self.clusters),
            backbone: Backbone {
                members,
                block,
                link,
            },
            stop_time: self.stop_time,
        })
    }
}

/// Check the backbone settings and draw its block and one host per head.
fn plan_backbone(
    backbone: &BackboneConfig,
    heads: usize,
    addresses: &mut AllocatorState,
) -> Result<(u64, AddressBlock, Vec<Ipv4Addr>), ConfigurationError> {
    let data_rate = backbone
        .data_rate_bps()
        .map_err(ConfigurationError::Backbone)?;
    if addresses.has_base(&backbone.address_base) {
        return Err(ConfigurationError::Backbone(format!(
            "address base {} is already used by a cluster",
            backbone.address_base
        )));
    }
    let block = addresses.allocate(backbone.address_base)?;
    let hosts = block.hosts(heads)?;
    Ok((data_rate, block, hosts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClusterConfig, HeadPolicy};
    use crate::engine::{EngineError, ScenarioEngine};
    use crate::ip::AddressError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_scenario() {
        let config = Config::default();
        let mut engine = ScenarioEngine::new();
        let mut rng = StdRng::seed_from_u64(1);

        let topology = TopologyAssembler::assemble(&config, &mut engine, &mut rng).unwrap();

        assert_eq!(topology.clusters().len(), 2);
        assert_eq!(topology.clusters()[0].len(), 4);
        assert_eq!(topology.clusters()[1].len(), 3);
        assert_eq!(topology.backbone().len(), 2);
        assert_eq!(topology.backbone().block().to_string(), "172.16.0.0/24");
        assert_eq!(topology.node_count(), 7);
        // Backbone adds devices, not nodes
        assert_eq!(engine.node_count(), 7);
        assert_eq!(engine.device_count(), 9);
        assert_eq!(engine.channel_count(), 3);
    }

    #[test]
    fn test_stop_time_precondition() {
        let mut config = Config::default();
        config.general.stop_time = Duration::from_secs(9);
        let mut engine = ScenarioEngine::new();
        let mut rng = StdRng::seed_from_u64(1);

        let err = TopologyAssembler::assemble(&config, &mut engine, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            TopologyError::Configuration(ConfigurationError::StopTimeTooShort { .. })
        ));
        assert_eq!(engine.node_count(), 0);

        config.general.stop_time = Duration::from_secs(10);
        assert!(TopologyAssembler::assemble(&config, &mut engine, &mut rng).is_ok());
    }

    #[test]
    fn test_zero_size_cluster_aborts_before_creation() {
        let mut config = Config::default();
        config.clusters.push(ClusterConfig {
            size: 0,
            address_base: None,
            origin: None,
        });
        let mut engine = ScenarioEngine::new();
        let mut rng = StdRng::seed_from_u64(1);

        let err = TopologyAssembler::assemble(&config, &mut engine, &mut rng).unwrap_err();
        assert_eq!(
            err,
            TopologyError::Configuration(ConfigurationError::EmptyCluster(2))
        );
        assert_eq!(engine.node_count(), 0);
    }

    #[test]
    fn test_seal_without_clusters() {
        let config = Config::default();
        let builder = ClusterBuilder::new(&config.wireless, &config.mobility, config.routing);
        let assembler =
            TopologyAssembler::new(Duration::from_secs(20), builder, selector_for(HeadPolicy::First))
                .unwrap();
        let mut engine = ScenarioEngine::new();
        let err = assembler.seal(&config.backbone, &mut engine).unwrap_err();
        assert_eq!(err, TopologyError::Configuration(ConfigurationError::NoClusters));
    }

    #[test]
    fn test_incremental_build() {
        let config = Config::default();
        let builder = ClusterBuilder::new(&config.wireless, &config.mobility, config.routing);
        let mut assembler =
            TopologyAssembler::new(Duration::from_secs(20), builder, selector_for(HeadPolicy::First))
                .unwrap();
        let mut engine = ScenarioEngine::new();
        let mut rng = StdRng::seed_from_u64(3);

        for size in [2, 5, 1] {
            let spec = ClusterSpec {
                size,
                address_base: "10.10.0.0/24".parse().unwrap(),
                origin: Some([0.0, 0.0]),
            };
            assembler.add_cluster(&spec, &mut engine, &mut rng).unwrap();
        }
        assert_eq!(assembler.cluster_count(), 3);
        assert!(assembler.heads().iter().all(|h| h.index == 0));

        let topology = assembler.seal(&config.backbone, &mut engine).unwrap();
        let blocks: Vec<String> = topology.address_blocks().iter().map(|b| b.to_string()).collect();
        assert_eq!(
            blocks,
            vec!["10.10.0.0/24", "10.10.1.0/24", "10.10.2.0/24", "172.16.0.0/24"]
        );
        for (i, member) in topology.backbone().members().iter().enumerate() {
            assert_eq!(topology.head_of(ClusterId(i)), Some(member.head));
            assert_eq!(topology.resolve(member.head).unwrap().node, member.node);
        }
    }

    #[test]
    fn test_backbone_overlapping_a_cluster_is_rejected() {
        let mut config = Config::default();
        config.backbone.address_base = "192.167.0.0/16".parse().unwrap();
        let mut engine = ScenarioEngine::new();
        let mut rng = StdRng::seed_from_u64(1);

        let err = TopologyAssembler::assemble(&config, &mut engine, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            TopologyError::Configuration(ConfigurationError::Address(_))
        ));
        assert_eq!(engine.node_count(), 0);
        assert_eq!(engine.channel_count(), 0);
    }

    #[test]
    fn test_small_block_in_later_cluster_creates_nothing() {
        let mut config = Config::default();
        config.clusters[1].address_base = Some("10.0.0.0/30".parse().unwrap());
        let mut engine = ScenarioEngine::new();
        let mut rng = StdRng::seed_from_u64(1);

        let err = TopologyAssembler::assemble(&config, &mut engine, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            TopologyError::Configuration(ConfigurationError::Address(
                AddressError::HostsExhausted { .. }
            ))
        ));
        assert_eq!(engine.node_count(), 0);
    }

    #[test]
    fn test_later_cluster_outside_bounds_creates_nothing() {
        let mut config = Config::default();
        config.clusters[1].origin = Some([499.0, 0.0]);
        let mut engine = ScenarioEngine::new();
        let mut rng = StdRng::seed_from_u64(1);

        let err = TopologyAssembler::assemble(&config, &mut engine, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            TopologyError::Configuration(ConfigurationError::Mobility(_))
        ));
        assert_eq!(engine.node_count(), 0);
    }

    #[test]
    fn test_backbone_cannot_share_a_cluster_base() {
        let mut config = Config::default();
        config.backbone.address_base = config.cluster_base(1);
        let mut engine = ScenarioEngine::new();
        let mut rng = StdRng::seed_from_u64(1);

        let err = TopologyAssembler::assemble(&config, &mut engine, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            TopologyError::Configuration(ConfigurationError::Backbone(_))
        ));
        assert_eq!(engine.node_count(), 0);
    }

    /// Picks one past the last member
    struct OutOfRange;

    impl HeadSelector for OutOfRange {
        fn select(&self, cluster: &Cluster, _rng: &mut dyn RngCore) -> NodeRef {
            NodeRef {
                cluster: cluster.id(),
                index: cluster.len(),
            }
        }

        fn name(&self) -> &'static str {
            "out-of-range"
        }
    }

    #[test]
    fn test_head_outside_cluster_is_rejected() {
        let config = Config::default();
        let builder = ClusterBuilder::new(&config.wireless, &config.mobility, config.routing);
        let mut assembler =
            TopologyAssembler::new(Duration::from_secs(20), builder, Box::new(OutOfRange)).unwrap();
        let mut engine = ScenarioEngine::new();
        let mut rng = StdRng::seed_from_u64(3);

        let spec = ClusterSpec {
            size: 3,
            address_base: "10.20.0.0/24".parse().unwrap(),
            origin: None,
        };
        let err = assembler.add_cluster(&spec, &mut engine, &mut rng).unwrap_err();
        assert_eq!(
            err,
            TopologyError::Configuration(ConfigurationError::InvalidHead {
                selector: "out-of-range",
                cluster: 0,
                index: 3,
                size: 3,
            })
        );
        assert_eq!(assembler.cluster_count(), 0);
        assert!(assembler.heads().is_empty());
    }

    #[test]
    fn test_engine_failure_aborts() {
        let config = Config::default();
        let mut engine = ScenarioEngine::with_node_limit(5);
        let mut rng = StdRng::seed_from_u64(1);

        let err = TopologyAssembler::assemble(&config, &mut engine, &mut rng).unwrap_err();
        assert_eq!(
            err,
            TopologyError::ResourceCreation(EngineError::CapacityExceeded {
                requested: 3,
                available: 1
            })
        );
    }
}
