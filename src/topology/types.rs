//! Topology data model.
//!
//! A [`Topology`] owns its clusters; each [`Cluster`] owns its members. The
//! backbone never owns nodes: each [`BackboneMember`] refers back to its
//! cluster member through a [`NodeRef`].

use serde::Serialize;
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::config::RandomDirectionConfig;
use crate::engine::{ChannelHandle, DeviceHandle, NodeHandle};
use crate::ip::AddressBlock;
use crate::mobility::Position;

/// Position of a cluster in build order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClusterId(pub usize);

/// Non-owning reference to a cluster member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeRef {
    pub cluster: ClusterId,
    pub index: usize,
}

/// A cluster node with its wireless device, address and initial position
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub node: NodeHandle,
    pub device: DeviceHandle,
    pub address: Ipv4Addr,
    pub position: Position,
}

/// Nodes sharing one wireless channel and one address block.
///
/// Always holds at least one member.
#[derive(Debug, Clone)]
pub struct Cluster {
    id: ClusterId,
    members: Vec<Member>,
    block: AddressBlock,
    channel: ChannelHandle,
    mobility: RandomDirectionConfig,
}

impl Cluster {
    pub(crate) fn new(
        id: ClusterId,
        members: Vec<Member>,
        block: AddressBlock,
        channel: ChannelHandle,
        mobility: RandomDirectionConfig,
    ) -> Self {
        debug_assert!(!members.is_empty());
        Cluster {
            id,
            members,
            block,
            channel,
            mobility,
        }
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, index: usize) -> Option<&Member> {
        self.members.get(index)
    }

    pub fn block(&self) -> AddressBlock {
        self.block
    }

    pub fn channel(&self) -> ChannelHandle {
        self.channel
    }

    pub fn mobility(&self) -> &RandomDirectionConfig {
        &self.mobility
    }

    /// Reference to the member at `index`, if it exists.
    pub fn node_ref(&self, index: usize) -> Option<NodeRef> {
        (index < self.members.len()).then_some(NodeRef {
            cluster: self.id,
            index,
        })
    }

    pub fn contains(&self, node: NodeRef) -> bool {
        node.cluster == self.id && node.index < self.members.len()
    }

    pub fn positions(&self) -> Vec<Position> {
        self.members.iter().map(|m| m.position).collect()
    }
}

/// A head's presence on the backbone
#[derive(Debug, Clone, PartialEq)]
pub struct BackboneMember {
    pub head: NodeRef,
    pub node: NodeHandle,
    pub device: DeviceHandle,
    pub address: Ipv4Addr,
}

/// Wired link joining one head per cluster
#[derive(Debug, Clone)]
pub struct Backbone {
    pub(crate) members: Vec<BackboneMember>,
    pub(crate) block: AddressBlock,
    pub(crate) link: ChannelHandle,
}

impl Backbone {
    pub fn members(&self) -> &[BackboneMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn block(&self) -> AddressBlock {
        self.block
    }

    pub fn link(&self) -> ChannelHandle {
        self.link
    }
}

/// The sealed result of a build: every cluster plus the backbone.
///
/// No structural mutation is possible once a `Topology` exists.
#[derive(Debug, Clone)]
pub struct Topology {
    pub(crate) clusters: Vec<Cluster>,
    pub(crate) backbone: Backbone,
    pub(crate) stop_time: Duration,
}

impl Topology {
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(id.0)
    }

    pub fn backbone(&self) -> &Backbone {
        &self.backbone
    }

    pub fn stop_time(&self) -> Duration {
        self.stop_time
    }

    /// Look up the member a reference points at.
    pub fn resolve(&self, node: NodeRef) -> Option<&Member> {
        self.cluster(node.cluster)?.member(node.index)
    }

    /// The head chosen for `cluster`.
    pub fn head_of(&self, cluster: ClusterId) -> Option<NodeRef> {
        self.backbone
            .members
            .iter()
            .find(|m| m.head.cluster == cluster)
            .map(|m| m.head)
    }

    /// Total number of cluster members.
    pub fn node_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }

    /// Every address block in use: clusters in build order, then the backbone.
    pub fn address_blocks(&self) -> Vec<AddressBlock> {
        self.clusters
            .iter()
            .map(Cluster::block)
            .chain(std::iter::once(self.backbone.block))
            .collect()
    }
}
