//! Node placement and mobility description.
//!
//! Each cluster gets a grid placement followed by a bounded random-direction
//! movement model. Placement is computed here; movement itself is run by the
//! external simulator from the model description attached to each node.

pub mod grid;

pub use grid::{cluster_origin, grid_positions};

use serde::Serialize;

use crate::config::RandomDirectionConfig;

/// A point in the simulation plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y, z: 0.0 }
    }

    pub fn distance_squared(&self, other: &Position) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        dx * dx + dy * dy + dz * dz
    }
}

/// Mean of a set of positions, `None` when empty.
pub fn centroid(positions: &[Position]) -> Option<Position> {
    if positions.is_empty() {
        return None;
    }
    let n = positions.len() as f64;
    let (sx, sy, sz) = positions
        .iter()
        .fold((0.0, 0.0, 0.0), |(x, y, z), p| (x + p.x, y + p.y, z + p.z));
    Some(Position {
        x: sx / n,
        y: sy / n,
        z: sz / n,
    })
}

/// Check that every initial position lies inside the model's movement bounds.
///
/// The random-direction model cannot start a node outside its rectangle.
pub fn check_within_bounds(
    positions: &[Position],
    model: &RandomDirectionConfig,
) -> Result<(), String> {
    let bounds = &model.bounds;
    match positions.iter().position(|p| !bounds.contains(p.x, p.y)) {
        Some(index) => Err(format!(
            "node {} starts at ({}, {}), outside movement bounds x[{}, {}] y[{}, {}]",
            index,
            positions[index].x,
            positions[index].y,
            bounds.x_min,
            bounds.x_max,
            bounds.y_min,
            bounds.y_max
        )),
        None => Ok(()),
    }
}

/// Simulator-facing description of the movement model
pub fn describe_model(model: &RandomDirectionConfig) -> String {
    let b = &model.bounds;
    format!(
        "ns3::RandomDirection2dMobilityModel[Bounds={}|{}|{}|{}][Speed={}][Pause={}]",
        b.x_min,
        b.x_max,
        b.y_min,
        b.y_max,
        model.speed.to_simulator_string(),
        model.pause.to_simulator_string()
    )
}
