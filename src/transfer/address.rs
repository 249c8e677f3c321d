// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{BridgeError, Result};
use std::fmt;

/// Fixed prefix of an encoded address string.
pub const ADDRESS_PREFIX: &str = "data:application/vnd.itk.address,0:";

/// An address inside some [`AddressSpace`](crate::reconstruct::AddressSpace),
/// as carried in descriptor JSON.
///
/// The number is only meaningful together with the address space that
/// produced it. It never becomes a host pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemoryAddress(pub usize);

impl MemoryAddress {
    pub fn is_encoded(text: &str) -> bool {
        text.starts_with(ADDRESS_PREFIX)
    }

    /// Parse `data:application/vnd.itk.address,0:<decimal>`.
    pub fn parse(text: &str) -> Result<Self> {
        let digits = text.strip_prefix(ADDRESS_PREFIX).ok_or_else(|| {
            BridgeError::malformed(format!("'{}' is not an encoded address", text))
        })?;
        digits
            .parse::<usize>()
            .map(MemoryAddress)
            .map_err(|e| BridgeError::malformed(format!("bad address '{}': {}", digits, e)))
    }

    pub fn encode(self) -> String {
        format!("{}{}", ADDRESS_PREFIX, self.0)
    }
}

impl fmt::Display for MemoryAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_35_characters() {
        assert_eq!(ADDRESS_PREFIX.len(), 35);
    }

    #[test]
    fn test_parse_and_encode() {
        let address = MemoryAddress::parse("data:application/vnd.itk.address,0:1024").unwrap();
        assert_eq!(address, MemoryAddress(1024));
        assert_eq!(address.encode(), "data:application/vnd.itk.address,0:1024");
    }

    #[test]
    fn test_rejects_plain_paths_and_garbage() {
        assert!(MemoryAddress::parse("image.json.data").is_err());
        assert!(MemoryAddress::parse("data:application/vnd.itk.address,0:-4").is_err());
        assert!(MemoryAddress::parse("data:application/vnd.itk.address,0:").is_err());
        assert!(!MemoryAddress::is_encoded("out/0.json"));
    }
}
