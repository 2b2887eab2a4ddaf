//! IPv4 address block type.
//!
//! An `AddressBlock` is a network prefix plus its length. Blocks are parsed
//! from `a.b.c.d/len` or `a.b.c.d/255.255.255.0` notation and serialize back
//! to the prefix-length form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use super::AddressError;

/// A contiguous IPv4 range described by its network address and prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AddressBlock {
    network: Ipv4Addr,
    prefix_len: u8,
}

impl AddressBlock {
    /// Create a block, clearing any host bits set in `network`.
    pub fn new(network: Ipv4Addr, prefix_len: u8) -> Result<Self, AddressError> {
        if prefix_len > 32 {
            return Err(AddressError::Parse(format!(
                "prefix length {} exceeds 32",
                prefix_len
            )));
        }
        let raw = u32::from(network);
        let masked = raw & prefix_mask(prefix_len);
        if masked != raw {
            log::warn!(
                "Address base {}/{} has host bits set, using {}/{}",
                network,
                prefix_len,
                Ipv4Addr::from(masked),
                prefix_len
            );
        }
        Ok(Self {
            network: Ipv4Addr::from(masked),
            prefix_len,
        })
    }

    /// Block from a network address already aligned to `prefix_len`.
    pub(crate) const fn from_aligned(network: Ipv4Addr, prefix_len: u8) -> Self {
        Self {
            network,
            prefix_len,
        }
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Dotted-quad netmask, e.g. `255.255.255.0` for a /24.
    pub fn mask(&self) -> Ipv4Addr {
        Ipv4Addr::from(prefix_mask(self.prefix_len))
    }

    /// Number of addresses covered by the block, including network and broadcast.
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len))
    }

    /// Number of assignable host addresses (network and broadcast excluded).
    pub fn host_capacity(&self) -> u64 {
        self.size().saturating_sub(2)
    }

    /// Last address in the block.
    pub fn last(&self) -> Ipv4Addr {
        Ipv4Addr::from((u64::from(u32::from(self.network)) + self.size() - 1) as u32)
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & prefix_mask(self.prefix_len) == u32::from(self.network)
    }

    /// Two prefixes overlap exactly when one contains the other's network address.
    pub fn overlaps(&self, other: &AddressBlock) -> bool {
        self.contains(other.network) || other.contains(self.network)
    }

    /// The block that immediately follows this one with the same prefix length.
    pub fn next(&self) -> Result<AddressBlock, AddressError> {
        let next = u64::from(u32::from(self.network)) + self.size();
        if next > u64::from(u32::MAX) {
            return Err(AddressError::Exhausted(*self));
        }
        Ok(AddressBlock {
            network: Ipv4Addr::from(next as u32),
            prefix_len: self.prefix_len,
        })
    }

    /// The first `count` host addresses, starting at network + 1.
    pub fn hosts(&self, count: usize) -> Result<Vec<Ipv4Addr>, AddressError> {
        if count as u64 > self.host_capacity() {
            return Err(AddressError::HostsExhausted {
                block: *self,
                requested: count,
                capacity: self.host_capacity(),
            });
        }
        let base = u32::from(self.network);
        Ok((1..=count as u32).map(|i| Ipv4Addr::from(base + i)).collect())
    }
}

fn prefix_mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix_len))
    }
}

/// Convert a dotted-quad netmask into a prefix length, rejecting non-contiguous masks.
fn mask_to_prefix(mask: Ipv4Addr) -> Result<u8, AddressError> {
    let raw = u32::from(mask);
    let prefix = raw.leading_ones();
    if raw.checked_shl(prefix).unwrap_or(0) != 0 {
        return Err(AddressError::Parse(format!("non-contiguous netmask {}", mask)));
    }
    Ok(prefix as u8)
}

impl FromStr for AddressBlock {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (addr, suffix) = s
            .split_once('/')
            .ok_or_else(|| AddressError::Parse(format!("missing '/' in address block '{}'", s)))?;

        let network: Ipv4Addr = addr
            .parse()
            .map_err(|_| AddressError::Parse(format!("invalid IPv4 address '{}'", addr)))?;

        let prefix_len = if suffix.contains('.') {
            let mask: Ipv4Addr = suffix
                .parse()
                .map_err(|_| AddressError::Parse(format!("invalid netmask '{}'", suffix)))?;
            mask_to_prefix(mask)?
        } else {
            suffix
                .parse::<u8>()
                .map_err(|_| AddressError::Parse(format!("invalid prefix length '{}'", suffix)))?
        };

        AddressBlock::new(network, prefix_len)
    }
}

impl TryFrom<String> for AddressBlock {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AddressBlock> for String {
    fn from(block: AddressBlock) -> Self {
        block.to_string()
    }
}

impl fmt::Display for AddressBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}
