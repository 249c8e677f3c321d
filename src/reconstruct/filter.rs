// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{BridgeError, Result};
use crate::interface::{checked_len, pixel_count, MetaDataDictionary};
use crate::observability::messages::reconstruct::{
    ImageReconstructed, UnalignedBufferCopied, ValidationRejected,
};
use crate::reconstruct::{AddressSpace, ComponentScalar, PixelTraits, TypedImage};
use crate::transfer::{MemoryAddress, WireImage};
use serde_json::Value;
use std::borrow::Cow;
use std::marker::PhantomData;

/// Rebuilds a [`TypedImage`] from a descriptor whose direction and pixel
/// data are encoded addresses into an [`AddressSpace`].
///
/// Validation stops at the first mismatch, in this order: JSON syntax,
/// dimension, component type, pixel type, component count. Nothing beyond
/// the image type is read until all of these pass.
#[derive(Debug)]
pub struct ImageReconstructor<P: PixelTraits, const D: usize> {
    _pixel: PhantomData<P>,
}

impl<P: PixelTraits, const D: usize> Default for ImageReconstructor<P, D> {
    fn default() -> Self {
        Self::new()
    }
}

fn reject<T>(check: &str, error: BridgeError) -> Result<T> {
    tracing::debug!(
        "{}",
        ValidationRejected {
            check,
            error: &error,
        }
    );
    Err(error)
}

fn array<const D: usize, T: Copy>(field: &str, values: &[T]) -> Result<[T; D]> {
    values.try_into().map_err(|_| {
        BridgeError::malformed(format!("'{}' has {} entries, expected {}", field, values.len(), D))
    })
}

fn address_field(field: &str, value: &Value) -> Result<MemoryAddress> {
    match value {
        Value::String(text) => MemoryAddress::parse(text),
        other => Err(BridgeError::malformed(format!(
            "'{}' must be an encoded address, found {}",
            field, other
        ))),
    }
}

fn resolve<'a, S: AddressSpace + ?Sized>(space: &'a S, address: MemoryAddress, len: usize) -> Result<&'a [u8]> {
    space.resolve(address, len).ok_or(BridgeError::UnresolvedAddress {
        address: address.0,
        len,
    })
}

impl<P: PixelTraits, const D: usize> ImageReconstructor<P, D> {
    pub fn new() -> Self {
        Self {
            _pixel: PhantomData,
        }
    }

    /// Validate `descriptor` against `P` and `D`, then import its geometry and pixels.
    ///
    /// # Errors
    /// * `MalformedDescriptor` - bad JSON, or geometry of the wrong length
    /// * `DimensionMismatch`, `ComponentTypeMismatch`, `PixelTypeMismatch`,
    ///   `ComponentCountMismatch` - the descriptor describes another image type
    /// * `UnresolvedAddress` - direction or data lies outside `space`
    pub fn reconstruct<'a, S>(&self, descriptor: &str, space: &'a S) -> Result<TypedImage<'a, P, D>>
    where
        S: AddressSpace + ?Sized,
    {
        let wire: WireImage = match serde_json::from_str(descriptor) {
            Ok(wire) => wire,
            Err(e) => return reject("parse", BridgeError::malformed(format!("image descriptor: {}", e))),
        };
        let components = self.validate(&wire)?;

        let origin = array::<D, f64>("origin", &wire.origin)?;
        let spacing = array::<D, f64>("spacing", &wire.spacing)?;
        let extents = array::<D, u64>("size", &wire.size)?;
        let total_size = pixel_count(extents)?;
        let size = extents.map(|extent| extent as usize);

        let direction_bytes = resolve(
            space,
            address_field("direction", &wire.direction)?,
            D * D * std::mem::size_of::<f64>(),
        )?;
        let mut direction = [[0.0f64; D]; D];
        for (cell, chunk) in direction
            .iter_mut()
            .flatten()
            .zip(direction_bytes.chunks_exact(std::mem::size_of::<f64>()))
        {
            *cell = bytemuck::pod_read_unaligned(chunk);
        }

        let element_count = checked_len("pixel components", total_size, components)?;
        let byte_len = checked_len("pixel bytes", element_count, std::mem::size_of::<P::Component>())?;
        let buffer = match &wire.data {
            Value::Null if byte_len == 0 => Cow::Borrowed(&[][..]),
            Value::Null => {
                return Err(BridgeError::MissingBuffer(format!(
                    "image '{}' declares {} pixel bytes but carries no data",
                    wire.name, byte_len
                )))
            }
            data => {
                let address = address_field("data", data)?;
                let bytes = resolve(space, address, byte_len)?;
                match bytemuck::try_cast_slice::<u8, P::Component>(bytes) {
                    Ok(values) => Cow::Borrowed(values),
                    Err(_) => {
                        tracing::debug!(
                            "{}",
                            UnalignedBufferCopied {
                                address: address.0,
                                byte_len,
                                alignment: std::mem::align_of::<P::Component>(),
                            }
                        );
                        let mut values = vec![<P::Component as bytemuck::Zeroable>::zeroed(); element_count];
                        bytemuck::cast_slice_mut::<P::Component, u8>(&mut values).copy_from_slice(bytes);
                        Cow::Owned(values)
                    }
                }
            }
        };

        let metadata = match &wire.metadata {
            Some(section) => MetaDataDictionary::from_json(section)?,
            None => MetaDataDictionary::default(),
        };

        let image = TypedImage {
            name: wire.name,
            origin,
            spacing,
            direction,
            size,
            components,
            buffer,
            metadata,
            _pixel: PhantomData,
        };
        tracing::debug!(
            "{}",
            ImageReconstructed {
                name: image.name(),
                dimension: D,
                pixel_type: P::PIXEL_TYPE.as_str(),
                component_type: <P::Component as ComponentScalar>::COMPONENT_TYPE.as_str(),
                pixels: total_size,
                borrowed: image.is_borrowed(),
            }
        );
        Ok(image)
    }

    /// Structural checks, in order. Returns the components per pixel to use.
    fn validate(&self, wire: &WireImage) -> Result<usize> {
        let declared = &wire.image_type;

        if declared.dimension != D as i64 {
            return reject(
                "dimension",
                BridgeError::DimensionMismatch {
                    expected: D,
                    found: declared.dimension,
                },
            );
        }

        let component_type = <P::Component as ComponentScalar>::COMPONENT_TYPE.as_str();
        if declared.component_type != component_type {
            return reject(
                "component type",
                BridgeError::ComponentTypeMismatch {
                    expected: component_type.to_string(),
                    found: declared.component_type.clone(),
                },
            );
        }

        let pixel_type = P::PIXEL_TYPE.as_str();
        if declared.pixel_type != pixel_type {
            return reject(
                "pixel type",
                BridgeError::PixelTypeMismatch {
                    expected: pixel_type.to_string(),
                    found: declared.pixel_type.clone(),
                },
            );
        }

        if P::COMPONENTS != 0 {
            if declared.components != P::COMPONENTS as i64 {
                return reject(
                    "component count",
                    BridgeError::ComponentCountMismatch {
                        expected: P::COMPONENTS,
                        found: declared.components,
                    },
                );
            }
            return Ok(P::COMPONENTS);
        }

        match usize::try_from(declared.components) {
            Ok(components) if components > 0 => Ok(components),
            _ => reject(
                "component count",
                BridgeError::malformed(format!(
                    "variable-length pixels need a positive component count, found {}",
                    declared.components
                )),
            ),
        }
    }
}
