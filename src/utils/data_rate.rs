//! Data rate parsing utilities.
//!
//! This module parses link data rate strings (e.g., "5Mbps", "100kb/s")
//! into bits per second.

use regex::Regex;

/// Parse a data rate string (e.g., "5Mbps", "100kb/s", "5000000") to bits per second
///
/// Supports:
/// - Raw bits per second: "5000000"
/// - Bits with SI prefixes: "5bps", "100kbps", "5Mbps", "1Gbps" (also "kb/s", "Mb/s", ...)
/// - Bytes with SI prefixes: "1MBps", "10KB/s" (multiplied by 8)
///
/// # Arguments
/// * `rate` - The data rate string to parse
///
/// # Returns
/// * `Ok(u64)` - The rate in bits per second if parsing succeeds
/// * `Err(String)` - An error message if parsing fails
///
/// # Examples
/// ```
/// use clustersim::utils::data_rate::parse_data_rate_bps;
///
/// assert_eq!(parse_data_rate_bps("5000000"), Ok(5_000_000));
/// assert_eq!(parse_data_rate_bps("5Mbps"), Ok(5_000_000));
/// assert_eq!(parse_data_rate_bps("100kb/s"), Ok(100_000));
/// assert!(parse_data_rate_bps("fast").is_err());
/// ```
pub fn parse_data_rate_bps(rate: &str) -> Result<u64, String> {
    let rate = rate.trim();

    if let Ok(bps) = rate.parse::<u64>() {
        return Ok(bps);
    }

    let pattern = Regex::new(r"^(\d+(?:\.\d+)?)\s*([kKmMgG]?)(b|B)(?:ps|/s)$")
        .map_err(|e| format!("Invalid data rate pattern: {}", e))?;
    let caps = pattern
        .captures(rate)
        .ok_or_else(|| format!("Invalid data rate format: {}", rate))?;

    let value: f64 = caps[1]
        .parse()
        .map_err(|_| format!("Invalid data rate value: {}", rate))?;
    let multiplier: f64 = match &caps[2] {
        "" => 1.0,
        "k" | "K" => 1e3,
        "m" | "M" => 1e6,
        _ => 1e9,
    };
    let unit: f64 = if &caps[3] == "B" { 8.0 } else { 1.0 };

    Ok((value * multiplier * unit).round() as u64)
}
