//! Hierarchical topology synthesis.
//!
//! This module builds a set of wireless clusters, picks one head per cluster,
//! and joins the heads over a shared wired backbone:
//!
//! - `types`: the sealed [`Topology`] and its clusters, members and backbone
//! - `cluster`: [`ClusterBuilder`], one wireless cluster per call
//! - `head`: [`HeadSelector`] policies
//! - `assembler`: [`TopologyAssembler`], which drives the whole build
//!
//! Clusters are built strictly in order. Address blocks come from one
//! [`crate::ip::AllocatorState`] threaded through every call, so block order
//! follows cluster order and the backbone block comes last.

pub mod assembler;
pub mod cluster;
pub mod head;
pub mod types;

pub use assembler::TopologyAssembler;
pub use cluster::{ClusterBuilder, ClusterPlan, ClusterSpec};
pub use head::{selector_for, CentroidHead, FirstHead, HeadSelector, RandomHead};
pub use types::{Backbone, BackboneMember, Cluster, ClusterId, Member, NodeRef, Topology};

use std::time::Duration;

use crate::engine::EngineError;
use crate::ip::AddressError;

/// Fatal configuration problems, detected before or during construction
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Simulation stop time {actual:?} is below the minimum of {minimum:?}")]
    StopTimeTooShort { actual: Duration, minimum: Duration },
    #[error("Cluster {0} has size 0; every cluster needs at least one node")]
    EmptyCluster(usize),
    #[error("No clusters were built; the backbone needs at least one head")]
    NoClusters,
    #[error("Address allocation failed: {0}")]
    Address(#[from] AddressError),
    #[error("Invalid mobility configuration: {0}")]
    Mobility(String),
    #[error("Invalid backbone configuration: {0}")]
    Backbone(String),
    #[error("Head selector '{selector}' picked member {index} of cluster {cluster}, which has {size} members")]
    InvalidHead {
        selector: &'static str,
        cluster: usize,
        index: usize,
        size: usize,
    },
}

/// Topology build errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Resource creation failed: {0}")]
    ResourceCreation(#[from] EngineError),
}

impl From<AddressError> for TopologyError {
    fn from(err: AddressError) -> Self {
        TopologyError::Configuration(ConfigurationError::Address(err))
    }
}
