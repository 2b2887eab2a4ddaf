//! Shared utilities: data rate parsing and validation.

pub mod data_rate;
pub mod validation;

pub use data_rate::parse_data_rate_bps;
pub use validation::{validate_blocks_disjoint, validate_stop_time, MIN_STOP_TIME};
