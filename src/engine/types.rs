//! Scenario document types.
//!
//! These types make up the document a [`super::ScenarioEngine`] records and
//! which gets serialized to YAML for the external simulator.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::mobility::Position;

/// Root scenario document.
#[derive(Serialize, Debug, Clone, Default)]
pub struct Scenario {
    pub general: ScenarioGeneral,
    /// Every medium in creation order
    pub channels: Vec<ScenarioChannel>,
    /// Map of node name to node description
    pub nodes: BTreeMap<String, ScenarioNode>,
}

/// Global clock settings.
#[derive(Serialize, Debug, Clone, Default)]
pub struct ScenarioGeneral {
    /// Simulation stop time in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_time: Option<f64>,
}

/// One wireless channel or wired link.
#[derive(Serialize, Debug, Clone)]
pub struct ScenarioChannel {
    pub id: u32,
    #[serde(flatten)]
    pub kind: ChannelKind,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelKind {
    Wireless {
        data_mode: String,
        propagation_delay: String,
        propagation_loss: String,
    },
    Wired {
        data_rate_bps: u64,
        /// Propagation delay, e.g. "2ms"
        #[serde(with = "humantime_serde")]
        delay: Duration,
    },
}

impl ChannelKind {
    pub fn is_wireless(&self) -> bool {
        matches!(self, ChannelKind::Wireless { .. })
    }
}

/// One simulator node.
#[derive(Serialize, Debug, Clone)]
pub struct ScenarioNode {
    pub id: u32,
    /// Routing helper installed with the internet stack
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
    pub devices: Vec<ScenarioDevice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobility: Option<ScenarioMobility>,
}

/// One network device on a node.
#[derive(Serialize, Debug, Clone)]
pub struct ScenarioDevice {
    pub id: u32,
    pub channel: u32,
    /// "adhoc_wifi" or "csma"
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
}

/// Initial position plus movement model.
#[derive(Serialize, Debug, Clone)]
pub struct ScenarioMobility {
    pub position: Position,
    pub model: String,
}
