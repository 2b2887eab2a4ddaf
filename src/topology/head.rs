//! Cluster head selection policies.

use rand::{Rng, RngCore};

use super::types::{Cluster, NodeRef};
use crate::config::HeadPolicy;
use crate::mobility::centroid;

/// Picks the member that bridges a cluster onto the backbone.
///
/// Implementations must return a member of `cluster` and must not keep or
/// reseed `rng`; the same generator is shared across every cluster of a build.
pub trait HeadSelector {
    fn select(&self, cluster: &Cluster, rng: &mut dyn RngCore) -> NodeRef;

    fn name(&self) -> &'static str;
}

/// Uniformly random member
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomHead;

impl HeadSelector for RandomHead {
    fn select(&self, cluster: &Cluster, rng: &mut dyn RngCore) -> NodeRef {
        let index = rng.gen_range(0..cluster.len());
        NodeRef {
            cluster: cluster.id(),
            index,
        }
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// First member created
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstHead;

impl HeadSelector for FirstHead {
    fn select(&self, cluster: &Cluster, _rng: &mut dyn RngCore) -> NodeRef {
        NodeRef {
            cluster: cluster.id(),
            index: 0,
        }
    }

    fn name(&self) -> &'static str {
        "first"
    }
}

/// Member whose initial position is closest to the cluster centroid; ties go
/// to the lowest index
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidHead;

impl HeadSelector for CentroidHead {
    fn select(&self, cluster: &Cluster, _rng: &mut dyn RngCore) -> NodeRef {
        let positions = cluster.positions();
        let index = centroid(&positions)
            .and_then(|center| {
                positions
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| {
                        a.distance_squared(&center)
                            .total_cmp(&b.distance_squared(&center))
                    })
                    .map(|(i, _)| i)
            })
            .unwrap_or(0);
        NodeRef {
            cluster: cluster.id(),
            index,
        }
    }

    fn name(&self) -> &'static str {
        "centroid"
    }
}

/// Selector implementing `policy`
pub fn selector_for(policy: HeadPolicy) -> Box<dyn HeadSelector> {
    match policy {
        HeadPolicy::Random => Box::new(RandomHead),
        HeadPolicy::First => Box::new(FirstHead),
        HeadPolicy::Centroid => Box::new(CentroidHead),
    }
}
