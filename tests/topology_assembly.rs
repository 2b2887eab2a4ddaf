use std::collections::HashSet;
use std::io::Write;
use std::net::Ipv4Addr;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::NamedTempFile;

use clustersim::config::{ClusterConfig, Config, RandomDirectionConfig, RoutingProtocol, WirelessConfig};
use clustersim::config_loader::load_config;
use clustersim::engine::{
    ChannelHandle, DeviceHandle, EngineError, NodeHandle, ScenarioEngine, SimEngine,
};
use clustersim::ip::{AddressAllocator, AddressBlock};
use clustersim::mobility::Position;
use clustersim::topology::{ConfigurationError, Topology, TopologyAssembler, TopologyError};
use clustersim::utils::validation::validate_blocks_disjoint;

fn config_with_sizes(sizes: &[u32]) -> Config {
    Config {
        clusters: sizes
            .iter()
            .map(|&size| ClusterConfig {
                size,
                address_base: None,
                // Keep many clusters inside the default movement bounds
                origin: Some([0.0, 0.0]),
            })
            .collect(),
        ..Config::default()
    }
}

fn assemble(config: &Config, seed: u64) -> Topology {
    let mut engine = ScenarioEngine::new();
    let mut rng = StdRng::seed_from_u64(seed);
    TopologyAssembler::assemble(config, &mut engine, &mut rng).unwrap()
}

#[test]
fn test_backbone_has_one_head_per_cluster() {
    for sizes in [vec![1], vec![4, 3], vec![2, 2, 2, 2], vec![1, 7, 1, 3, 5]] {
        let topology = assemble(&config_with_sizes(&sizes), 9);
        assert_eq!(topology.backbone().len(), sizes.len());
        assert_eq!(topology.clusters().len(), sizes.len());

        let clusters: HashSet<usize> = topology
            .backbone()
            .members()
            .iter()
            .map(|m| m.head.cluster.0)
            .collect();
        assert_eq!(clusters.len(), sizes.len());
    }
}

#[test]
fn test_all_blocks_are_disjoint() {
    let topology = assemble(&config_with_sizes(&[3, 3, 3, 3]), 1);
    let blocks = topology.address_blocks();
    assert_eq!(blocks.len(), 5);
    assert!(validate_blocks_disjoint(&blocks).is_ok());

    // Members of one cluster live inside that cluster's block only
    for cluster in topology.clusters() {
        for member in cluster.members() {
            assert!(cluster.block().contains(member.address));
            assert!(!topology.backbone().block().contains(member.address));
        }
    }
}

#[test]
fn test_allocator_never_repeats_a_block() {
    let mut allocator = AddressAllocator::new("10.0.0.0/24".parse().unwrap());
    let mut seen = HashSet::new();
    for _ in 0..64 {
        let block = allocator.allocate().unwrap();
        assert!(seen.insert(block));
    }
}

#[test]
fn test_heads_are_cluster_members() {
    let topology = assemble(&config_with_sizes(&[5, 1, 4]), 77);
    for member in topology.backbone().members() {
        let cluster = topology.cluster(member.head.cluster).unwrap();
        assert!(cluster.contains(member.head));
        assert_eq!(topology.resolve(member.head).unwrap().node, member.node);
    }

    // A single-node cluster always elects its only node
    let single = topology.clusters()[1].members()[0].node;
    assert_eq!(topology.backbone().members()[1].node, single);
}

#[test]
fn test_stop_time_boundary() {
    let mut config = Config::default();
    config.general.stop_time = Duration::from_secs(9);
    let mut engine = ScenarioEngine::new();
    let mut rng = StdRng::seed_from_u64(0);

    let err = TopologyAssembler::assemble(&config, &mut engine, &mut rng).unwrap_err();
    assert!(matches!(
        err,
        TopologyError::Configuration(ConfigurationError::StopTimeTooShort { .. })
    ));
    assert_eq!(engine.node_count(), 0);

    config.general.stop_time = Duration::from_secs(10);
    let topology = TopologyAssembler::assemble(&config, &mut engine, &mut rng).unwrap();
    assert_eq!(topology.stop_time(), Duration::from_secs(10));
}

#[test]
fn test_example_scenario_from_yaml() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
general:
  stop_time: "20s"
  seed: 2024
clusters:
  - size: 4
    address_base: "192.167.0.0/255.255.255.0"
  - size: 3
    address_base: "192.168.0.0/255.255.255.0"
backbone:
  address_base: "172.16.0.0/255.255.255.0"
  data_rate: "5000000"
  delay: "2ms"
"#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    let topology = assemble(&config, 2024);

    let sizes: Vec<usize> = topology.clusters().iter().map(|c| c.len()).collect();
    assert_eq!(sizes, vec![4, 3]);
    assert_eq!(topology.backbone().len(), 2);

    let blocks: Vec<String> = topology.address_blocks().iter().map(|b| b.to_string()).collect();
    assert_eq!(blocks, vec!["192.167.0.0/24", "192.168.0.0/24", "172.16.0.0/24"]);

    let backbone_addrs: Vec<Ipv4Addr> =
        topology.backbone().members().iter().map(|m| m.address).collect();
    assert_eq!(
        backbone_addrs,
        vec![Ipv4Addr::new(172, 16, 0, 1), Ipv4Addr::new(172, 16, 0, 2)]
    );
}

#[test]
fn test_same_seed_same_topology() {
    let config = config_with_sizes(&[6, 6, 6]);
    let a = assemble(&config, 123);
    let b = assemble(&config, 123);

    assert_eq!(a.address_blocks(), b.address_blocks());
    let heads_a: Vec<_> = a.backbone().members().iter().map(|m| m.head).collect();
    let heads_b: Vec<_> = b.backbone().members().iter().map(|m| m.head).collect();
    assert_eq!(heads_a, heads_b);

    // Another seed keeps the structure identical
    let c = assemble(&config, 456);
    assert_eq!(a.address_blocks(), c.address_blocks());
    let sizes_a: Vec<usize> = a.clusters().iter().map(|c| c.len()).collect();
    let sizes_c: Vec<usize> = c.clusters().iter().map(|c| c.len()).collect();
    assert_eq!(sizes_a, sizes_c);
}

#[test]
fn test_shared_rng_is_not_reseeded_per_cluster() {
    // With identical clusters, reseeding per cluster would repeat the same
    // choice every time; a shared stream varies across enough clusters.
    let config = config_with_sizes(&[8; 12]);
    let topology = assemble(&config, 5);
    let picks: HashSet<usize> = topology
        .backbone()
        .members()
        .iter()
        .map(|m| m.head.index)
        .collect();
    assert!(picks.len() > 1);
}

#[test]
fn test_shared_default_base_allocates_successive_blocks() {
    let topology = assemble(&config_with_sizes(&[2, 2, 2]), 0);
    let blocks: Vec<String> = topology.address_blocks().iter().map(|b| b.to_string()).collect();
    assert_eq!(
        blocks,
        vec!["192.168.0.0/24", "192.168.1.0/24", "192.168.2.0/24", "172.16.0.0/24"]
    );
}

/// Engine that fails when the backbone link is created
struct FailingBackbone {
    inner: ScenarioEngine,
}

impl SimEngine for FailingBackbone {
    fn create_nodes(&mut self, count: u32) -> Result<Vec<NodeHandle>, EngineError> {
        self.inner.create_nodes(count)
    }

    fn create_wireless_channel(&mut self, wireless: &WirelessConfig) -> Result<ChannelHandle, EngineError> {
        self.inner.create_wireless_channel(wireless)
    }

    fn install_wireless_devices(
        &mut self,
        channel: ChannelHandle,
        nodes: &[NodeHandle],
        wireless: &WirelessConfig,
    ) -> Result<Vec<DeviceHandle>, EngineError> {
        self.inner.install_wireless_devices(channel, nodes, wireless)
    }

    fn install_internet_stack(
        &mut self,
        nodes: &[NodeHandle],
        routing: RoutingProtocol,
    ) -> Result<(), EngineError> {
        self.inner.install_internet_stack(nodes, routing)
    }

    fn create_wired_link(&mut self, _data_rate_bps: u64, _delay: Duration) -> Result<ChannelHandle, EngineError> {
        Err(EngineError::CapacityExceeded {
            requested: 1,
            available: 0,
        })
    }

    fn install_wired_devices(
        &mut self,
        link: ChannelHandle,
        nodes: &[NodeHandle],
    ) -> Result<Vec<DeviceHandle>, EngineError> {
        self.inner.install_wired_devices(link, nodes)
    }

    fn assign_address(
        &mut self,
        device: DeviceHandle,
        address: Ipv4Addr,
        block: AddressBlock,
    ) -> Result<(), EngineError> {
        self.inner.assign_address(device, address, block)
    }

    fn install_mobility(
        &mut self,
        node: NodeHandle,
        position: Position,
        model: &RandomDirectionConfig,
    ) -> Result<(), EngineError> {
        self.inner.install_mobility(node, position, model)
    }

    fn schedule_stop(&mut self, at: Duration) -> Result<(), EngineError> {
        self.inner.schedule_stop(at)
    }

    fn run(&mut self) -> Result<(), EngineError> {
        self.inner.run()
    }

    fn destroy(&mut self) {
        self.inner.destroy()
    }
}

#[test]
fn test_backbone_resource_failure_aborts_assembly() {
    let config = Config::default();
    let mut engine = FailingBackbone {
        inner: ScenarioEngine::new(),
    };
    let mut rng = StdRng::seed_from_u64(0);

    let err = TopologyAssembler::assemble(&config, &mut engine, &mut rng).unwrap_err();
    assert!(matches!(err, TopologyError::ResourceCreation(_)));
}
