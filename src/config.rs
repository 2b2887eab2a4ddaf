use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::ip::AddressBlock;
use crate::utils::data_rate::parse_data_rate_bps;
use crate::utils::validation::validate_stop_time;

/// Routing protocol installed with the internet stack on cluster nodes
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingProtocol {
    /// Optimized Link State Routing (proactive)
    #[default]
    Olsr,
    /// Destination-Sequenced Distance Vector (proactive)
    Dsdv,
    /// Ad hoc On-Demand Distance Vector (reactive)
    Aodv,
}

impl RoutingProtocol {
    /// Simulator helper name for this protocol
    pub fn helper_name(&self) -> &'static str {
        match self {
            RoutingProtocol::Olsr => "ns3::OlsrHelper",
            RoutingProtocol::Dsdv => "ns3::DsdvHelper",
            RoutingProtocol::Aodv => "ns3::AodvHelper",
        }
    }
}

/// Policy used to pick each cluster's backbone head
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadPolicy {
    /// Uniformly random member, drawn from the process-wide rng
    #[default]
    Random,
    /// The first member created
    First,
    /// The member whose initial position is closest to the cluster centroid
    Centroid,
}

/// Grid layout order
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridLayout {
    /// Fill a row of `grid_width` nodes, then move down one row
    #[default]
    RowFirst,
    /// Fill a column of `grid_width` nodes, then move right one column
    ColumnFirst,
}

/// Root configuration for a clustered topology build
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    /// Clusters in build order; order fixes address-block and channel order
    #[serde(default = "default_clusters")]
    pub clusters: Vec<ClusterConfig>,
    /// Base used by clusters that don't name their own
    #[serde(default = "default_cluster_address_base")]
    pub cluster_address_base: AddressBlock,
    #[serde(default)]
    pub wireless: WirelessConfig,
    #[serde(default)]
    pub backbone: BackboneConfig,
    #[serde(default)]
    pub mobility: MobilityConfig,
    #[serde(default)]
    pub routing: RoutingProtocol,
    #[serde(default)]
    pub head_selection: HeadPolicy,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_stop_time(self.general.stop_time).map_err(ValidationError::InvalidGeneral)?;

        if self.clusters.is_empty() {
            return Err(ValidationError::InvalidCluster(
                "at least one cluster is required".to_string(),
            ));
        }
        for (i, cluster) in self.clusters.iter().enumerate() {
            if cluster.size == 0 {
                return Err(ValidationError::InvalidCluster(format!(
                    "cluster {} has size 0; every cluster needs at least one node",
                    i
                )));
            }
        }

        if self.wireless.data_mode.trim().is_empty() {
            return Err(ValidationError::InvalidWireless(
                "data_mode cannot be empty".to_string(),
            ));
        }

        let rate = self
            .backbone
            .data_rate_bps()
            .map_err(ValidationError::InvalidBackbone)?;
        if rate == 0 {
            return Err(ValidationError::InvalidBackbone(
                "data_rate must be positive".to_string(),
            ));
        }

        self.mobility.validate()?;

        Ok(())
    }

    /// Address base for the cluster at `index`
    pub fn cluster_base(&self, index: usize) -> AddressBlock {
        self.clusters
            .get(index)
            .and_then(|c| c.address_base)
            .unwrap_or(self.cluster_address_base)
    }

    /// Cluster sizes in build order
    pub fn cluster_sizes(&self) -> Vec<u32> {
        self.clusters.iter().map(|c| c.size).collect()
    }
}

/// Shared general configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneralConfig {
    /// Simulated time at which the run stops
    #[serde(with = "humantime_serde", default = "default_stop_time")]
    pub stop_time: Duration,
    /// Seed for head selection; drawn from OS entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// One cluster of wireless nodes
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClusterConfig {
    pub size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_base: Option<AddressBlock>,
    /// Grid origin override; defaults to `(i+1) * origin_step`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<[f64; 2]>,
}

/// Wireless medium settings, passed through to the simulator per cluster
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WirelessConfig {
    /// Constant-rate station manager data mode
    pub data_mode: String,
    pub propagation_delay: String,
    pub propagation_loss: String,
}

/// Wired backbone settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BackboneConfig {
    pub address_base: AddressBlock,
    /// e.g. "5Mbps", "100kb/s", or raw bits per second
    pub data_rate: String,
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

impl BackboneConfig {
    pub fn data_rate_bps(&self) -> Result<u64, String> {
        parse_data_rate_bps(&self.data_rate)
    }
}

/// Placement and movement of cluster members
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MobilityConfig {
    pub grid: GridConfig,
    pub model: RandomDirectionConfig,
}

impl MobilityConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let grid = &self.grid;
        if grid.grid_width == 0 {
            return Err(ValidationError::InvalidMobility(
                "grid_width must be at least 1".to_string(),
            ));
        }
        if grid.delta_x < 0.0 || grid.delta_y < 0.0 {
            return Err(ValidationError::InvalidMobility(
                "grid spacing cannot be negative".to_string(),
            ));
        }

        let bounds = &self.model.bounds;
        if bounds.x_min >= bounds.x_max || bounds.y_min >= bounds.y_max {
            return Err(ValidationError::InvalidMobility(format!(
                "movement bounds are empty or inverted: {:?}",
                bounds
            )));
        }

        self.model
            .speed
            .validate("speed")
            .map_err(ValidationError::InvalidMobility)?;
        self.model
            .pause
            .validate("pause")
            .map_err(ValidationError::InvalidMobility)?;

        Ok(())
    }
}

/// Grid position allocator parameters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Per-cluster x origin step; cluster `i` starts at `(i+1) * origin_step_x`
    pub origin_step_x: f64,
    pub origin_step_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub grid_width: u32,
    pub layout: GridLayout,
}

/// Bounded random-direction movement
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RandomDirectionConfig {
    pub bounds: Rectangle,
    pub speed: RandomVariable,
    pub pause: RandomVariable,
}

/// Axis-aligned rectangle
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Rectangle {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }
}

/// Random variable specification for speed and pause distributions
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RandomVariable {
    Constant(f64),
    Uniform { min: f64, max: f64 },
}

impl RandomVariable {
    fn validate(&self, name: &str) -> Result<(), String> {
        match *self {
            RandomVariable::Constant(value) if value < 0.0 || !value.is_finite() => {
                Err(format!("{} must be a finite non-negative value, got {}", name, value))
            }
            RandomVariable::Uniform { min, max } if min < 0.0 || min > max || !max.is_finite() => {
                Err(format!("{} range [{}, {}] is invalid", name, min, max))
            }
            _ => Ok(()),
        }
    }

    /// Attribute string understood by the simulator
    pub fn to_simulator_string(&self) -> String {
        match self {
            RandomVariable::Constant(value) => {
                format!("ns3::ConstantRandomVariable[Constant={}]", value)
            }
            RandomVariable::Uniform { min, max } => {
                format!("ns3::UniformRandomVariable[Min={}|Max={}]", min, max)
            }
        }
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid cluster configuration: {0}")]
    InvalidCluster(String),
    #[error("Invalid wireless configuration: {0}")]
    InvalidWireless(String),
    #[error("Invalid backbone configuration: {0}")]
    InvalidBackbone(String),
    #[error("Invalid mobility configuration: {0}")]
    InvalidMobility(String),
}

fn default_stop_time() -> Duration {
    Duration::from_secs(20)
}

fn default_clusters() -> Vec<ClusterConfig> {
    vec![
        ClusterConfig {
            size: 4,
            address_base: Some(AddressBlock::from_aligned(Ipv4Addr::new(192, 167, 0, 0), 24)),
            origin: None,
        },
        ClusterConfig {
            size: 3,
            address_base: Some(AddressBlock::from_aligned(Ipv4Addr::new(192, 168, 0, 0), 24)),
            origin: None,
        },
    ]
}

fn default_cluster_address_base() -> AddressBlock {
    AddressBlock::from_aligned(Ipv4Addr::new(192, 168, 0, 0), 24)
}

/// Default implementations
impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            clusters: default_clusters(),
            cluster_address_base: default_cluster_address_base(),
            wireless: WirelessConfig::default(),
            backbone: BackboneConfig::default(),
            mobility: MobilityConfig::default(),
            routing: RoutingProtocol::default(),
            head_selection: HeadPolicy::default(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            stop_time: default_stop_time(),
            seed: None,
            log_level: Some("info".to_string()),
        }
    }
}

impl Default for WirelessConfig {
    fn default() -> Self {
        Self {
            data_mode: "OfdmRate54Mbps".to_string(),
            propagation_delay: "ns3::ConstantSpeedPropagationDelayModel".to_string(),
            propagation_loss: "ns3::LogDistancePropagationLossModel".to_string(),
        }
    }
}

impl Default for BackboneConfig {
    fn default() -> Self {
        Self {
            address_base: AddressBlock::from_aligned(Ipv4Addr::new(172, 16, 0, 0), 24),
            data_rate: "5Mbps".to_string(),
            delay: Duration::from_millis(2),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            origin_step_x: 50.0,
            origin_step_y: 20.0,
            delta_x: 5.0,
            delta_y: 10.0,
            grid_width: 2,
            layout: GridLayout::RowFirst,
        }
    }
}

impl Default for RandomDirectionConfig {
    fn default() -> Self {
        Self {
            bounds: Rectangle {
                x_min: -500.0,
                x_max: 500.0,
                y_min: -500.0,
                y_max: 500.0,
            },
            speed: RandomVariable::Constant(2.0),
            pause: RandomVariable::Constant(0.2),
        }
    }
}
