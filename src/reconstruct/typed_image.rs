// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::codec::TypedArray;
use crate::errors::{BridgeError, Result};
use crate::interface::{Image, ImageType, MetaDataDictionary};
use crate::reconstruct::{ComponentScalar, PixelTraits};
use std::borrow::Cow;
use std::marker::PhantomData;

/// An image whose dimension and pixel type are fixed at compile time.
///
/// The pixel buffer is borrowed from the address space it was reconstructed
/// from whenever alignment allows; the image never frees that memory.
#[derive(Debug, Clone)]
pub struct TypedImage<'a, P: PixelTraits, const D: usize> {
    pub(crate) name: String,
    pub(crate) origin: [f64; D],
    pub(crate) spacing: [f64; D],
    pub(crate) direction: [[f64; D]; D],
    pub(crate) size: [usize; D],
    pub(crate) components: usize,
    pub(crate) buffer: Cow<'a, [P::Component]>,
    pub(crate) metadata: MetaDataDictionary,
    pub(crate) _pixel: PhantomData<P>,
}

impl<'a, P: PixelTraits, const D: usize> TypedImage<'a, P, D> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &[f64; D] {
        &self.origin
    }

    pub fn spacing(&self) -> &[f64; D] {
        &self.spacing
    }

    /// Direction cosines, `direction()[row][column]`.
    pub fn direction(&self) -> &[[f64; D]; D] {
        &self.direction
    }

    pub fn size(&self) -> &[usize; D] {
        &self.size
    }

    /// Components per pixel, from the pixel type or, for variable-length
    /// pixels, from the descriptor.
    pub fn components_per_pixel(&self) -> usize {
        self.components
    }

    pub fn number_of_pixels(&self) -> usize {
        // checked against overflow when the image was reconstructed
        self.size.iter().product()
    }

    pub fn buffer(&self) -> &[P::Component] {
        &self.buffer
    }

    /// True when the pixels are a view into the source address space.
    pub fn is_borrowed(&self) -> bool {
        matches!(self.buffer, Cow::Borrowed(_))
    }

    pub fn metadata(&self) -> &MetaDataDictionary {
        &self.metadata
    }

    /// Components of the pixel at `index`, first axis fastest.
    pub fn pixel(&self, index: [usize; D]) -> Option<&[P::Component]> {
        let mut offset = 0;
        let mut stride = 1;
        for axis in 0..D {
            if index[axis] >= self.size[axis] {
                return None;
            }
            offset += index[axis] * stride;
            stride *= self.size[axis];
        }
        let start = offset * self.components;
        self.buffer.get(start..start + self.components)
    }

    /// Detach from the source address space by copying the pixels if needed.
    pub fn into_owned(self) -> TypedImage<'static, P, D> {
        TypedImage {
            name: self.name,
            origin: self.origin,
            spacing: self.spacing,
            direction: self.direction,
            size: self.size,
            components: self.components,
            buffer: Cow::Owned(self.buffer.into_owned()),
            metadata: self.metadata,
            _pixel: PhantomData,
        }
    }

    /// Copy into the dynamically typed [`Image`].
    pub fn to_image(&self) -> Result<Image> {
        let component_type = <P::Component as ComponentScalar>::COMPONENT_TYPE;
        let data = TypedArray::decode(component_type, bytemuck::cast_slice(&self.buffer))?
            .ok_or_else(|| BridgeError::UnsupportedType(component_type.as_str().to_string()))?;
        Ok(Image {
            image_type: ImageType {
                dimension: D,
                component_type,
                pixel_type: P::PIXEL_TYPE,
                components: self.components,
            },
            name: self.name.clone(),
            origin: self.origin.to_vec(),
            spacing: self.spacing.to_vec(),
            direction: self.direction.iter().flatten().copied().collect(),
            size: self.size.to_vec(),
            data: Some(data),
            metadata: self.metadata.clone(),
        })
    }
}
