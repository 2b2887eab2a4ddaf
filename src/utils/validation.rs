//! Configuration and topology validation utilities.
//!
//! This module provides validation functions for configuration
//! parameters and consistency checks over assembled address plans.

use crate::ip::AddressBlock;
use std::time::Duration;

/// Shortest simulation run a topology may be built for
pub const MIN_STOP_TIME: Duration = Duration::from_secs(10);

/// Validate the simulation stop time
///
/// # Arguments
/// * `stop_time` - The configured stop time
///
/// # Returns
/// * `Ok(())` if the stop time is at least `MIN_STOP_TIME`
/// * `Err(String)` with an error message otherwise
///
/// # Examples
/// ```
/// use clustersim::utils::validation::validate_stop_time;
/// use std::time::Duration;
///
/// assert!(validate_stop_time(Duration::from_secs(10)).is_ok());
/// assert!(validate_stop_time(Duration::from_secs(9)).is_err());
/// ```
pub fn validate_stop_time(stop_time: Duration) -> Result<(), String> {
    if stop_time < MIN_STOP_TIME {
        return Err(format!(
            "stop time {}s is below the minimum of {}s",
            stop_time.as_secs_f64(),
            MIN_STOP_TIME.as_secs()
        ));
    }
    Ok(())
}

/// Validate that address blocks are pairwise disjoint
///
/// # Arguments
/// * `blocks` - Every block in use by a topology
///
/// # Returns
/// * `Ok(())` if no two blocks overlap
/// * `Err(String)` naming the first overlapping pair
///
/// # Examples
/// ```
/// use clustersim::utils::validation::validate_blocks_disjoint;
/// use clustersim::ip::AddressBlock;
///
/// let a: AddressBlock = "192.168.0.0/24".parse().unwrap();
/// let b: AddressBlock = "192.168.1.0/24".parse().unwrap();
/// let wide: AddressBlock = "192.168.0.0/16".parse().unwrap();
/// assert!(validate_blocks_disjoint(&[a, b]).is_ok());
/// assert!(validate_blocks_disjoint(&[a, wide]).is_err());
/// ```
pub fn validate_blocks_disjoint(blocks: &[AddressBlock]) -> Result<(), String> {
    for (i, a) in blocks.iter().enumerate() {
        for b in &blocks[i + 1..] {
            if a.overlaps(b) {
                return Err(format!("Address blocks {} and {} overlap", a, b));
            }
        }
    }

    log::debug!("Validated {} disjoint address blocks", blocks.len());
    Ok(())
}
