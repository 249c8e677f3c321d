// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Address spaces that encoded addresses are resolved against.
//!
//! An address is only a number. Resolving it yields a slice borrowed from
//! the space, so no view can outlive the memory it points into and an
//! address that falls outside the space is reported instead of followed.

use crate::transfer::MemoryAddress;
use std::collections::BTreeMap;

pub trait AddressSpace {
    /// The `len` bytes starting at `address`, if they are all inside the space.
    fn resolve(&self, address: MemoryAddress, len: usize) -> Option<&[u8]>;
}

/// A module's linear memory, addressed by offset.
#[derive(Debug, Clone, Copy)]
pub struct LinearMemory<'a> {
    bytes: &'a [u8],
}

impl<'a> LinearMemory<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AddressSpace for LinearMemory<'_> {
    fn resolve(&self, address: MemoryAddress, len: usize) -> Option<&[u8]> {
        let end = address.0.checked_add(len)?;
        self.bytes.get(address.0..end)
    }
}

/// Buffers registered by the host under sequential addresses.
///
/// Every region is backed by `u64` words, so each region start is aligned
/// for any numeric element type. Address 0 is never handed out.
#[derive(Debug, Default)]
pub struct HostArena {
    regions: BTreeMap<usize, Region>,
    next: usize,
}

#[derive(Debug)]
struct Region {
    words: Vec<u64>,
    len: usize,
}

impl Region {
    fn bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.len]
    }
}

const WORD: usize = std::mem::size_of::<u64>();

impl HostArena {
    pub fn new() -> Self {
        Self {
            regions: BTreeMap::new(),
            next: WORD,
        }
    }

    /// Copy `bytes` into the arena and return their address.
    pub fn register(&mut self, bytes: &[u8]) -> MemoryAddress {
        if self.next == 0 {
            self.next = WORD;
        }
        let word_count = bytes.len().div_ceil(WORD);
        let mut words = vec![0u64; word_count];
        bytemuck::cast_slice_mut::<u64, u8>(&mut words)[..bytes.len()].copy_from_slice(bytes);

        let address = self.next;
        // one spare word keeps adjacent regions from touching
        self.next += (word_count + 1) * WORD;
        self.regions.insert(
            address,
            Region {
                words,
                len: bytes.len(),
            },
        );
        MemoryAddress(address)
    }

    /// Register a typed buffer.
    pub fn register_values<T: bytemuck::Pod>(&mut self, values: &[T]) -> MemoryAddress {
        self.register(bytemuck::cast_slice(values))
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

impl AddressSpace for HostArena {
    fn resolve(&self, address: MemoryAddress, len: usize) -> Option<&[u8]> {
        let (start, region) = self.regions.range(..=address.0).next_back()?;
        let offset = address.0 - start;
        let end = offset.checked_add(len)?;
        region.bytes().get(offset..end)
    }
}
