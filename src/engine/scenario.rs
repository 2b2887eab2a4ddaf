//! Recording simulation engine.
//!
//! `ScenarioEngine` implements [`SimEngine`] by recording every factory call
//! into a [`Scenario`] document. It enforces the same structural rules a live
//! simulator would: handles must exist, a node gets one internet stack and
//! one mobility model, a device gets one address, and nothing structural
//! changes once the engine runs.

use log::{debug, info};
use std::net::Ipv4Addr;
use std::time::Duration;

use super::types::{
    ChannelKind, Scenario, ScenarioChannel, ScenarioDevice, ScenarioGeneral, ScenarioMobility,
    ScenarioNode,
};
use super::{ChannelHandle, DeviceHandle, EngineError, NodeHandle, SimEngine};
use crate::config::{RandomDirectionConfig, RoutingProtocol, WirelessConfig};
use crate::ip::AddressBlock;
use crate::mobility::{describe_model, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Configuring,
    Running,
    Destroyed,
}

/// Engine that records the scenario instead of executing it
#[derive(Debug)]
pub struct ScenarioEngine {
    nodes: Vec<ScenarioNode>,
    channels: Vec<ScenarioChannel>,
    /// Device id -> (node index, device index on that node)
    device_owner: Vec<(usize, usize)>,
    stop_time: Option<Duration>,
    max_nodes: Option<usize>,
    state: EngineState,
}

impl Default for ScenarioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioEngine {
    pub fn new() -> Self {
        ScenarioEngine {
            nodes: Vec::new(),
            channels: Vec::new(),
            device_owner: Vec::new(),
            stop_time: None,
            max_nodes: None,
            state: EngineState::Configuring,
        }
    }

    /// Engine that refuses to create more than `max_nodes` nodes.
    pub fn with_node_limit(max_nodes: usize) -> Self {
        ScenarioEngine {
            max_nodes: Some(max_nodes),
            ..Self::new()
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn device_count(&self) -> usize {
        self.device_owner.len()
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Snapshot of everything recorded so far.
    pub fn scenario(&self) -> Scenario {
        Scenario {
            general: ScenarioGeneral {
                stop_time: self.stop_time.map(|d| d.as_secs_f64()),
            },
            channels: self.channels.clone(),
            nodes: self
                .nodes
                .iter()
                .map(|node| (NodeHandle(node.id).to_string(), node.clone()))
                .collect(),
        }
    }

    fn ensure_configuring(&self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Configuring => Ok(()),
            EngineState::Running => Err(EngineError::AlreadyRunning),
            EngineState::Destroyed => Err(EngineError::Destroyed),
        }
    }

    fn node_index(&self, node: NodeHandle) -> Result<usize, EngineError> {
        let index = node.0 as usize;
        if index < self.nodes.len() {
            Ok(index)
        } else {
            Err(EngineError::UnknownNode(node))
        }
    }

    fn channel(&self, channel: ChannelHandle) -> Result<&ScenarioChannel, EngineError> {
        self.channels
            .get(channel.0 as usize)
            .ok_or(EngineError::UnknownChannel(channel))
    }

    fn create_channel(&mut self, kind: ChannelKind) -> ChannelHandle {
        let id = self.channels.len() as u32;
        self.channels.push(ScenarioChannel { id, kind });
        ChannelHandle(id)
    }

    fn attach_devices(
        &mut self,
        channel: ChannelHandle,
        nodes: &[NodeHandle],
        kind: &str,
    ) -> Result<Vec<DeviceHandle>, EngineError> {
        // Validate every handle before attaching anything
        let indices = nodes
            .iter()
            .map(|&node| self.node_index(node))
            .collect::<Result<Vec<_>, _>>()?;

        let mut devices = Vec::with_capacity(indices.len());
        for index in indices {
            let id = self.device_owner.len() as u32;
            let node = &mut self.nodes[index];
            node.devices.push(ScenarioDevice {
                id,
                channel: channel.0,
                kind: kind.to_string(),
                address: None,
                mask: None,
            });
            self.device_owner.push((index, node.devices.len() - 1));
            devices.push(DeviceHandle(id));
        }
        Ok(devices)
    }
}

impl SimEngine for ScenarioEngine {
    fn create_nodes(&mut self, count: u32) -> Result<Vec<NodeHandle>, EngineError> {
        self.ensure_configuring()?;
        let count = count as usize;
        if let Some(max) = self.max_nodes {
            let available = max.saturating_sub(self.nodes.len());
            if count > available {
                return Err(EngineError::CapacityExceeded {
                    requested: count,
                    available,
                });
            }
        }

        let first = self.nodes.len() as u32;
        let handles: Vec<NodeHandle> = (first..first + count as u32).map(NodeHandle).collect();
        for handle in &handles {
            self.nodes.push(ScenarioNode {
                id: handle.0,
                routing: None,
                devices: Vec::new(),
                mobility: None,
            });
        }
        debug!("Created {} nodes starting at {}", count, NodeHandle(first));
        Ok(handles)
    }

    fn create_wireless_channel(
        &mut self,
        wireless: &WirelessConfig,
    ) -> Result<ChannelHandle, EngineError> {
        self.ensure_configuring()?;
        Ok(self.create_channel(ChannelKind::Wireless {
            data_mode: wireless.data_mode.clone(),
            propagation_delay: wireless.propagation_delay.clone(),
            propagation_loss: wireless.propagation_loss.clone(),
        }))
    }

    fn install_wireless_devices(
        &mut self,
        channel: ChannelHandle,
        nodes: &[NodeHandle],
        _wireless: &WirelessConfig,
    ) -> Result<Vec<DeviceHandle>, EngineError> {
        self.ensure_configuring()?;
        if !self.channel(channel)?.kind.is_wireless() {
            return Err(EngineError::ChannelKindMismatch {
                channel,
                expected: "wireless",
            });
        }
        self.attach_devices(channel, nodes, "adhoc_wifi")
    }

    fn install_internet_stack(
        &mut self,
        nodes: &[NodeHandle],
        routing: RoutingProtocol,
    ) -> Result<(), EngineError> {
        self.ensure_configuring()?;
        for &node in nodes {
            let index = self.node_index(node)?;
            if self.nodes[index].routing.is_some() {
                return Err(EngineError::StackAlreadyInstalled(node));
            }
        }
        for &node in nodes {
            self.nodes[node.0 as usize].routing = Some(routing.helper_name().to_string());
        }
        Ok(())
    }

    fn create_wired_link(
        &mut self,
        data_rate_bps: u64,
        delay: Duration,
    ) -> Result<ChannelHandle, EngineError> {
        self.ensure_configuring()?;
        Ok(self.create_channel(ChannelKind::Wired {
            data_rate_bps,
            delay,
        }))
    }

    fn install_wired_devices(
        &mut self,
        link: ChannelHandle,
        nodes: &[NodeHandle],
    ) -> Result<Vec<DeviceHandle>, EngineError> {
        self.ensure_configuring()?;
        if self.channel(link)?.kind.is_wireless() {
            return Err(EngineError::ChannelKindMismatch {
                channel: link,
                expected: "wired",
            });
        }
        self.attach_devices(link, nodes, "csma")
    }

    fn assign_address(
        &mut self,
        device: DeviceHandle,
        address: Ipv4Addr,
        block: AddressBlock,
    ) -> Result<(), EngineError> {
        self.ensure_configuring()?;
        let &(node_index, device_index) = self
            .device_owner
            .get(device.0 as usize)
            .ok_or(EngineError::UnknownDevice(device))?;

        let node = &mut self.nodes[node_index];
        if node.routing.is_none() {
            return Err(EngineError::NoInternetStack(NodeHandle(node.id)));
        }
        let slot = &mut node.devices[device_index];
        if slot.address.is_some() {
            return Err(EngineError::AddressAlreadyAssigned(device));
        }
        slot.address = Some(address.to_string());
        slot.mask = Some(block.mask().to_string());
        Ok(())
    }

    fn install_mobility(
        &mut self,
        node: NodeHandle,
        position: Position,
        model: &RandomDirectionConfig,
    ) -> Result<(), EngineError> {
        self.ensure_configuring()?;
        let index = self.node_index(node)?;
        let entry = &mut self.nodes[index];
        if entry.mobility.is_some() {
            return Err(EngineError::MobilityAlreadyInstalled(node));
        }
        entry.mobility = Some(ScenarioMobility {
            position,
            model: describe_model(model),
        });
        Ok(())
    }

    fn schedule_stop(&mut self, at: Duration) -> Result<(), EngineError> {
        self.ensure_configuring()?;
        self.stop_time = Some(at);
        Ok(())
    }

    fn run(&mut self) -> Result<(), EngineError> {
        self.ensure_configuring()?;
        let stop = self.stop_time.ok_or(EngineError::NoStopScheduled)?;
        info!(
            "Scenario sealed for execution: {} nodes, {} channels, {} devices, stop at {:?}",
            self.nodes.len(),
            self.channels.len(),
            self.device_owner.len(),
            stop
        );
        self.state = EngineState::Running;
        Ok(())
    }

    fn destroy(&mut self) {
        self.nodes.clear();
        self.channels.clear();
        self.device_owner.clear();
        self.stop_time = None;
        self.state = EngineState::Destroyed;
    }
}
