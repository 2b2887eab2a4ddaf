//! Grid position allocation.
//!
//! Members of a cluster are placed on a rectangular grid starting at the
//! cluster origin. With `RowFirst` layout node `n` lands at column
//! `n % grid_width` and row `n / grid_width`; `ColumnFirst` swaps the axes.

use crate::config::{GridConfig, GridLayout};

use super::Position;

/// Grid origin for the cluster at `index`, honoring a per-cluster override.
pub fn cluster_origin(grid: &GridConfig, index: usize, origin: Option<[f64; 2]>) -> [f64; 2] {
    origin.unwrap_or_else(|| {
        let step = (index + 1) as f64;
        [step * grid.origin_step_x, step * grid.origin_step_y]
    })
}

/// Initial positions for `count` nodes laid out from `origin`.
pub fn grid_positions(grid: &GridConfig, origin: [f64; 2], count: usize) -> Vec<Position> {
    let width = grid.grid_width.max(1) as usize;
    (0..count)
        .map(|n| {
            let (major, minor) = ((n / width) as f64, (n % width) as f64);
            let (x, y) = match grid.layout {
                GridLayout::RowFirst => (
                    origin[0] + grid.delta_x * minor,
                    origin[1] + grid.delta_y * major,
                ),
                GridLayout::ColumnFirst => (
                    origin[0] + grid.delta_x * major,
                    origin[1] + grid.delta_y * minor,
                ),
            };
            Position::new(x, y)
        })
        .collect()
}
