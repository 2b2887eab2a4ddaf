//! # Simulation Engine Interface
//!
//! This module defines the narrow seam between topology synthesis and the
//! discrete-event simulator that eventually runs it. Topology code only ever
//! sees opaque handles returned by factory calls on a [`SimEngine`].
//!
//! ## Key Components
//!
//! - `types.rs`: Serializable scenario document produced for the simulator
//! - `scenario.rs`: [`ScenarioEngine`], an engine that records every factory
//!   call into a [`Scenario`] which is written out as YAML
//!
//! ## Lifecycle
//!
//! 1. **Construction**: nodes, channels, devices, stacks, addresses, mobility
//! 2. **Stop scheduling**: the global clock's stop time is set once
//! 3. **Run**: the engine takes over; no further structural calls succeed
//! 4. **Destroy**: all engine-side state is released

pub mod scenario;
pub mod types;

pub use scenario::ScenarioEngine;
pub use types::{ChannelKind, Scenario, ScenarioChannel, ScenarioDevice, ScenarioMobility, ScenarioNode};

use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::config::{RandomDirectionConfig, RoutingProtocol, WirelessConfig};
use crate::ip::AddressBlock;
use crate::mobility::Position;

/// Opaque simulator node handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeHandle(pub u32);

/// Opaque network device handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceHandle(pub u32);

/// Opaque medium (wireless channel or wired link) handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChannelHandle(pub u32);

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node{:03}", self.0)
    }
}

/// Errors reported by the simulator while creating resources
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Unknown node handle {0:?}")]
    UnknownNode(NodeHandle),
    #[error("Unknown device handle {0:?}")]
    UnknownDevice(DeviceHandle),
    #[error("Unknown channel handle {0:?}")]
    UnknownChannel(ChannelHandle),
    #[error("Channel {channel:?} is not a {expected} medium")]
    ChannelKindMismatch {
        channel: ChannelHandle,
        expected: &'static str,
    },
    #[error("Node capacity exceeded: {requested} requested, {available} available")]
    CapacityExceeded { requested: usize, available: usize },
    #[error("Node {0} already has an internet stack")]
    StackAlreadyInstalled(NodeHandle),
    #[error("Node {0} has no internet stack")]
    NoInternetStack(NodeHandle),
    #[error("Device {0:?} already has an address")]
    AddressAlreadyAssigned(DeviceHandle),
    #[error("Node {0} already has a mobility model")]
    MobilityAlreadyInstalled(NodeHandle),
    #[error("No stop time scheduled before run")]
    NoStopScheduled,
    #[error("Engine is already running; structural changes are not permitted")]
    AlreadyRunning,
    #[error("Engine has been destroyed")]
    Destroyed,
}

/// Factory and lifecycle calls consumed from the discrete-event simulator
pub trait SimEngine {
    /// Create `count` fresh nodes.
    fn create_nodes(&mut self, count: u32) -> Result<Vec<NodeHandle>, EngineError>;

    /// Create a new, independent wireless channel.
    fn create_wireless_channel(
        &mut self,
        wireless: &WirelessConfig,
    ) -> Result<ChannelHandle, EngineError>;

    /// Attach one ad hoc wireless device per node to `channel`.
    fn install_wireless_devices(
        &mut self,
        channel: ChannelHandle,
        nodes: &[NodeHandle],
        wireless: &WirelessConfig,
    ) -> Result<Vec<DeviceHandle>, EngineError>;

    /// Install the network-layer stack with the given routing protocol.
    fn install_internet_stack(
        &mut self,
        nodes: &[NodeHandle],
        routing: RoutingProtocol,
    ) -> Result<(), EngineError>;

    /// Create a shared wired link.
    fn create_wired_link(
        &mut self,
        data_rate_bps: u64,
        delay: Duration,
    ) -> Result<ChannelHandle, EngineError>;

    /// Attach one wired device per node to `link`.
    fn install_wired_devices(
        &mut self,
        link: ChannelHandle,
        nodes: &[NodeHandle],
    ) -> Result<Vec<DeviceHandle>, EngineError>;

    /// Bind `address` (inside `block`) to `device`.
    fn assign_address(
        &mut self,
        device: DeviceHandle,
        address: Ipv4Addr,
        block: AddressBlock,
    ) -> Result<(), EngineError>;

    /// Place `node` at `position` and attach the movement model.
    fn install_mobility(
        &mut self,
        node: NodeHandle,
        position: Position,
        model: &RandomDirectionConfig,
    ) -> Result<(), EngineError>;

    /// Set the global clock's stop time.
    fn schedule_stop(&mut self, at: Duration) -> Result<(), EngineError>;

    /// Hand control to the simulator.
    fn run(&mut self) -> Result<(), EngineError>;

    /// Release all engine-side state.
    fn destroy(&mut self);
}
