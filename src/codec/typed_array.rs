// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::codec::ComponentType;
use crate::errors::{BridgeError, Result};
use bytemuck::Pod;

/// An owned, typed view of a numeric buffer.
///
/// The vector is the backing storage; [`TypedArray::as_bytes`] exposes the raw
/// bytes of the same allocation, so the typed view and its byte buffer can
/// never drift apart or outlive one another.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    UInt8(Vec<u8>),
    Int8(Vec<i8>),
    UInt16(Vec<u16>),
    Int16(Vec<i16>),
    UInt32(Vec<u32>),
    Int32(Vec<i32>),
    UInt64(Vec<u64>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// Dispatch `$body` over every variant with `$values` bound to the inner vector.
macro_rules! with_values {
    ($array:expr, $values:ident => $body:expr) => {
        match $array {
            TypedArray::UInt8($values) => $body,
            TypedArray::Int8($values) => $body,
            TypedArray::UInt16($values) => $body,
            TypedArray::Int16($values) => $body,
            TypedArray::UInt32($values) => $body,
            TypedArray::Int32($values) => $body,
            TypedArray::UInt64($values) => $body,
            TypedArray::Int64($values) => $body,
            TypedArray::Float32($values) => $body,
            TypedArray::Float64($values) => $body,
        }
    };
}

fn collect<T: Pod>(component_type: ComponentType, bytes: &[u8]) -> Result<Vec<T>> {
    let width = std::mem::size_of::<T>();
    if bytes.len() % width != 0 {
        return Err(BridgeError::BufferLength {
            component_type,
            len: bytes.len(),
        });
    }
    let mut values = vec![T::zeroed(); bytes.len() / width];
    bytemuck::cast_slice_mut::<T, u8>(&mut values).copy_from_slice(bytes);
    Ok(values)
}

impl TypedArray {
    /// Interpret `bytes` as elements of `component_type`.
    ///
    /// Returns `Ok(None)` for the `null` tag, which denotes an absent array.
    ///
    /// # Errors
    /// `BufferLength` when the byte count is not a multiple of the element
    /// width, or when bytes are supplied under the `null` tag.
    pub fn decode(component_type: ComponentType, bytes: &[u8]) -> Result<Option<Self>> {
        let array = match component_type {
            ComponentType::UInt8 => TypedArray::UInt8(bytes.to_vec()),
            ComponentType::Int8 => TypedArray::Int8(collect(component_type, bytes)?),
            ComponentType::UInt16 => TypedArray::UInt16(collect(component_type, bytes)?),
            ComponentType::Int16 => TypedArray::Int16(collect(component_type, bytes)?),
            ComponentType::UInt32 => TypedArray::UInt32(collect(component_type, bytes)?),
            ComponentType::Int32 => TypedArray::Int32(collect(component_type, bytes)?),
            ComponentType::UInt64 => TypedArray::UInt64(collect(component_type, bytes)?),
            ComponentType::Int64 => TypedArray::Int64(collect(component_type, bytes)?),
            ComponentType::Float32 => TypedArray::Float32(collect(component_type, bytes)?),
            ComponentType::Float64 => TypedArray::Float64(collect(component_type, bytes)?),
            ComponentType::Null if bytes.is_empty() => return Ok(None),
            ComponentType::Null => {
                return Err(BridgeError::BufferLength {
                    component_type,
                    len: bytes.len(),
                })
            }
        };
        Ok(Some(array))
    }

    /// Decode a buffer addressed by its string tag.
    pub fn decode_tagged(tag: &str, bytes: &[u8]) -> Result<Option<Self>> {
        Self::decode(tag.parse()?, bytes)
    }

    /// Zero-length view of the given element type.
    pub fn empty(component_type: ComponentType) -> Option<Self> {
        match Self::decode(component_type, &[]) {
            Ok(array) => array,
            Err(_) => None,
        }
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            TypedArray::UInt8(_) => ComponentType::UInt8,
            TypedArray::Int8(_) => ComponentType::Int8,
            TypedArray::UInt16(_) => ComponentType::UInt16,
            TypedArray::Int16(_) => ComponentType::Int16,
            TypedArray::UInt32(_) => ComponentType::UInt32,
            TypedArray::Int32(_) => ComponentType::Int32,
            TypedArray::UInt64(_) => ComponentType::UInt64,
            TypedArray::Int64(_) => ComponentType::Int64,
            TypedArray::Float32(_) => ComponentType::Float32,
            TypedArray::Float64(_) => ComponentType::Float64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        with_values!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The raw little-endian bytes backing this view.
    pub fn as_bytes(&self) -> &[u8] {
        with_values!(self, values => bytemuck::cast_slice(values.as_slice()))
    }

    pub fn byte_len(&self) -> usize {
        self.as_bytes().len()
    }
}

macro_rules! impl_from_vec {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for TypedArray {
                fn from(values: Vec<$ty>) -> Self {
                    TypedArray::$variant(values)
                }
            }
        )*
    };
}

impl_from_vec!(
    u8 => UInt8,
    i8 => Int8,
    u16 => UInt16,
    i16 => Int16,
    u32 => UInt32,
    i32 => Int32,
    u64 => UInt64,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
);
