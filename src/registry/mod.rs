//! # Topology Registry Module
//!
//! This module produces `topology_registry.json`, a flat description of a
//! sealed topology meant for tooling that runs alongside the simulator
//! (traffic scripts, trace post-processing, plotting).
//!
//! ## Example Registry Structure
//!
//! ```json
//! {
//!   "clusters": [
//!     {
//!       "id": 0,
//!       "block": "192.167.0.0/24",
//!       "head": 2,
//!       "members": [
//!         { "node": "node000", "address": "192.167.0.1", "x": 50.0, "y": 20.0 }
//!       ]
//!     }
//!   ],
//!   "backbone": {
//!     "block": "172.16.0.0/24",
//!     "members": [ { "node": "node002", "cluster": 0, "address": "172.16.0.1" } ]
//!   }
//! }
//! ```

use serde::Serialize;

use crate::topology::Topology;

/// Registry of every cluster and the backbone.
#[derive(Serialize, Debug)]
pub struct TopologyRegistry {
    pub stop_time: f64,
    pub clusters: Vec<ClusterInfo>,
    pub backbone: BackboneInfo,
}

/// One cluster's block, members and chosen head.
#[derive(Serialize, Debug)]
pub struct ClusterInfo {
    pub id: usize,
    pub block: String,
    /// Index into `members` of the cluster head
    pub head: usize,
    pub members: Vec<MemberInfo>,
}

#[derive(Serialize, Debug)]
pub struct MemberInfo {
    pub node: String,
    pub address: String,
    pub x: f64,
    pub y: f64,
}

/// The backbone block and its heads.
#[derive(Serialize, Debug)]
pub struct BackboneInfo {
    pub block: String,
    pub members: Vec<BackboneMemberInfo>,
}

#[derive(Serialize, Debug)]
pub struct BackboneMemberInfo {
    pub node: String,
    pub cluster: usize,
    /// Backbone-side address; the cluster-side address is in `clusters`
    pub address: String,
}

impl TopologyRegistry {
    pub fn from_topology(topology: &Topology) -> Self {
        let clusters = topology
            .clusters()
            .iter()
            .map(|cluster| ClusterInfo {
                id: cluster.id().0,
                block: cluster.block().to_string(),
                head: topology.head_of(cluster.id()).map_or(0, |h| h.index),
                members: cluster
                    .members()
                    .iter()
                    .map(|m| MemberInfo {
                        node: m.node.to_string(),
                        address: m.address.to_string(),
                        x: m.position.x,
                        y: m.position.y,
                    })
                    .collect(),
            })
            .collect();

        let backbone = topology.backbone();
        TopologyRegistry {
            stop_time: topology.stop_time().as_secs_f64(),
            clusters,
            backbone: BackboneInfo {
                block: backbone.block().to_string(),
                members: backbone
                    .members()
                    .iter()
                    .map(|m| BackboneMemberInfo {
                        node: m.node.to_string(),
                        cluster: m.head.cluster.0,
                        address: m.address.to_string(),
                    })
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, HeadPolicy};
    use crate::engine::ScenarioEngine;
    use crate::topology::TopologyAssembler;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_registry_from_default_topology() {
        let config = Config {
            head_selection: HeadPolicy::First,
            ..Config::default()
        };
        let mut engine = ScenarioEngine::new();
        let mut rng = StdRng::seed_from_u64(0);
        let topology = TopologyAssembler::assemble(&config, &mut engine, &mut rng).unwrap();

        let registry = TopologyRegistry::from_topology(&topology);
        assert_eq!(registry.stop_time, 20.0);
        assert_eq!(registry.clusters.len(), 2);
        assert_eq!(registry.clusters[0].block, "192.167.0.0/24");
        assert_eq!(registry.clusters[1].members[0].node, "node004");
        assert_eq!(registry.clusters[1].members[0].address, "192.168.0.1");
        assert_eq!(registry.backbone.members[1].node, "node004");
        assert_eq!(registry.backbone.members[1].address, "172.16.0.2");

        let json = serde_json::to_value(&registry).unwrap();
        assert_eq!(json["backbone"]["block"], "172.16.0.0/24");
        assert_eq!(json["clusters"][0]["head"], 0);
    }
}
