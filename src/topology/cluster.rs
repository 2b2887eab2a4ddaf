//! Wireless cluster construction.
//!
//! A cluster is built in one pass: its nodes are created, attached to a
//! private ad hoc wireless channel, given an internet stack, numbered from a
//! fresh address block and placed on a grid with a random-direction model.
//! All configuration checks run before the first engine call, so a bad
//! cluster never leaves nodes behind.

use log::{debug, info};
use std::net::Ipv4Addr;

use super::types::{Cluster, ClusterId, Member};
use super::{ConfigurationError, TopologyError};
use crate::config::{MobilityConfig, RoutingProtocol, WirelessConfig};
use crate::engine::SimEngine;
use crate::ip::{AddressBlock, AllocatorState};
use crate::mobility::{check_within_bounds, cluster_origin, grid_positions, Position};

/// What to build for one cluster
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSpec {
    pub size: u32,
    pub address_base: AddressBlock,
    /// Grid origin override
    pub origin: Option<[f64; 2]>,
}

/// Checked layout of one cluster, ready to hand to the engine
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterPlan {
    pub origin: [f64; 2],
    pub block: AddressBlock,
    pub hosts: Vec<Ipv4Addr>,
    pub positions: Vec<Position>,
}

/// Builds clusters that share channel, mobility and routing settings
#[derive(Debug, Clone, Copy)]
pub struct ClusterBuilder<'a> {
    wireless: &'a WirelessConfig,
    mobility: &'a MobilityConfig,
    routing: RoutingProtocol,
}

impl<'a> ClusterBuilder<'a> {
    pub fn new(
        wireless: &'a WirelessConfig,
        mobility: &'a MobilityConfig,
        routing: RoutingProtocol,
    ) -> Self {
        ClusterBuilder {
            wireless,
            mobility,
            routing,
        }
    }

    /// Run every configuration check for cluster `id` and draw its block.
    ///
    /// Touches only `addresses`, never the engine, so a whole build can be
    /// rehearsed on a scratch `AllocatorState`.
    pub fn plan(
        &self,
        id: ClusterId,
        spec: &ClusterSpec,
        addresses: &mut AllocatorState,
    ) -> Result<ClusterPlan, ConfigurationError> {
        if spec.size == 0 {
            return Err(ConfigurationError::EmptyCluster(id.0));
        }
        let size = spec.size as usize;

        let origin = cluster_origin(&self.mobility.grid, id.0, spec.origin);
        let positions = grid_positions(&self.mobility.grid, origin, size);
        check_within_bounds(&positions, &self.mobility.model)
            .map_err(|e| ConfigurationError::Mobility(format!("cluster {}: {}", id.0, e)))?;

        let block = addresses.allocate(spec.address_base)?;
        let hosts = block.hosts(size)?;

        Ok(ClusterPlan {
            origin,
            block,
            hosts,
            positions,
        })
    }

    /// Build cluster `id` from `spec`, drawing its block from `addresses`.
    pub fn build<E: SimEngine + ?Sized>(
        &self,
        id: ClusterId,
        spec: &ClusterSpec,
        addresses: &mut AllocatorState,
        engine: &mut E,
    ) -> Result<Cluster, TopologyError> {
        let ClusterPlan {
            origin,
            block,
            hosts,
            positions,
        } = self.plan(id, spec, addresses)?;
        let size = hosts.len();

        let nodes = engine.create_nodes(spec.size)?;
        let channel = engine.create_wireless_channel(self.wireless)?;
        let devices = engine.install_wireless_devices(channel, &nodes, self.wireless)?;
        engine.install_internet_stack(&nodes, self.routing)?;

        let mut members = Vec::with_capacity(size);
        for (((node, device), address), position) in nodes
            .into_iter()
            .zip(devices)
            .zip(hosts)
            .zip(positions)
        {
            engine.assign_address(device, address, block)?;
            engine.install_mobility(node, position, &self.mobility.model)?;
            debug!(
                "Cluster {} member {} at {} ({:.1}, {:.1})",
                id.0, node, address, position.x, position.y
            );
            members.push(Member {
                node,
                device,
                address,
                position,
            });
        }

        info!(
            "Built cluster {} with {} nodes on {} (origin {:?})",
            id.0, size, block, origin
        );

        Ok(Cluster::new(
            id,
            members,
            block,
            channel,
            self.mobility.model.clone(),
        ))
    }
}
