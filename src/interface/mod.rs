// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Logical values that cross the module boundary.
//!
//! These are the host-side, strongly-typed forms of what a pipeline consumes
//! and produces. How each one is laid out on the wire lives in
//! [`crate::transfer`]; this module only describes the values themselves.

mod image;
mod io_kind;
mod mesh;
mod metadata;
mod pipeline_io;
mod polydata;

pub use image::{Image, ImageType, PixelType};
pub(crate) use image::{checked_len, pixel_count};
pub use io_kind::IoKind;
pub use mesh::{Mesh, MeshType};
pub use metadata::{MetaDataDictionary, MetaValue};
pub use pipeline_io::{IoData, PipelineInput, PipelineOutput, PopulatedOutput};
pub use polydata::{
    ArrayValues, AttributeArray, BufferRef, DataArray, DataSetAttributes, PolyData,
    ATTRIBUTE_KEYS, TOPOLOGY_KEYS,
};
