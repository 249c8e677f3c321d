// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wire layout of pipeline inputs and outputs.
//!
//! Each logical value becomes a sidecar JSON descriptor plus raw buffers.
//! [`filesystem`] lays those out as files in a [`VirtualFs`](crate::vfs::VirtualFs);
//! [`memory`] stages them directly in module memory and refers to them by
//! [`MemoryAddress`].

mod address;
pub mod filesystem;
pub mod memory;
mod polydata;
mod wire;

pub use address::{MemoryAddress, ADDRESS_PREFIX};
pub use filesystem::{build_payload, output_keys, read_output, TransferPayload};
pub use memory::{MemoryInputSink, MemoryOutputSource};
pub use polydata::{PolyDataArray, WirePolyData, WirePolyDataType};
pub use wire::{MeshArray, WireImage, WireImageType, WireMesh, WireMeshType};

pub(crate) use wire::image_data_bytes;
