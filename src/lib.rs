// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed scientific data across a WebAssembly sandbox boundary.
//!
//! Images, meshes, polygonal datasets, text and raw bytes are laid out as
//! sidecar JSON plus raw buffers, written into a pipeline module's virtual
//! filesystem (or linear memory), and read back after the call. On the
//! native path, image descriptors carrying encoded addresses are rebuilt
//! into statically typed images without copying pixel data.

#[cfg(target_endian = "big")]
compile_error!("raw buffers are exchanged in little-endian byte order");

pub mod bridge;        // write / invoke / read protocol
pub mod codec;         // typed arrays over raw bytes
pub mod config;        // yaml configuration
pub mod errors;        // error handling
pub mod interface;     // logical data kinds
pub mod module;        // wasmtime execution module
pub mod observability;
pub mod reconstruct;   // typed image reconstruction
pub mod transfer;      // sidecar descriptors and transports
pub mod vfs;           // virtual filesystems
