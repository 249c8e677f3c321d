// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed-array codec.
//!
//! Maps a symbolic component-type tag onto a fixed-width element view over a
//! raw byte buffer, and back. Buffers on the wire are little-endian, which is
//! also the host byte order this crate builds for, so decoding is a single
//! aligned copy and encoding is a reinterpretation of the backing storage.
//!
//! Unknown tags are a hard failure: misreading a tag would corrupt every
//! numeric value that follows it.

mod component_type;
mod typed_array;

pub use component_type::ComponentType;
pub use typed_array::TypedArray;
