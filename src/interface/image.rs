// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::codec::{ComponentType, TypedArray};
use crate::errors::{BridgeError, Result};
use crate::interface::MetaDataDictionary;
use std::fmt;
use std::str::FromStr;

/// Pixel layout of an image.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PixelType {
    Unknown,
    Scalar,
    Rgb,
    Rgba,
    Offset,
    Vector,
    Point,
    CovariantVector,
    SymmetricSecondRankTensor,
    DiffusionTensor3D,
    Complex,
    FixedArray,
    Array,
    Matrix,
    VariableLengthVector,
    VariableSizeMatrix,
}

impl PixelType {
    pub const fn as_str(self) -> &'static str {
        match self {
            PixelType::Unknown => "Unknown",
            PixelType::Scalar => "Scalar",
            PixelType::Rgb => "RGB",
            PixelType::Rgba => "RGBA",
            PixelType::Offset => "Offset",
            PixelType::Vector => "Vector",
            PixelType::Point => "Point",
            PixelType::CovariantVector => "CovariantVector",
            PixelType::SymmetricSecondRankTensor => "SymmetricSecondRankTensor",
            PixelType::DiffusionTensor3D => "DiffusionTensor3D",
            PixelType::Complex => "Complex",
            PixelType::FixedArray => "FixedArray",
            PixelType::Array => "Array",
            PixelType::Matrix => "Matrix",
            PixelType::VariableLengthVector => "VariableLengthVector",
            PixelType::VariableSizeMatrix => "VariableSizeMatrix",
        }
    }

    /// Pixel types whose component count is carried per image rather than
    /// fixed by the type.
    pub const fn is_variable_length(self) -> bool {
        matches!(
            self,
            PixelType::VariableLengthVector | PixelType::VariableSizeMatrix
        )
    }
}

impl FromStr for PixelType {
    type Err = BridgeError;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        let pixel_type = match name {
            "Unknown" => PixelType::Unknown,
            "Scalar" => PixelType::Scalar,
            "RGB" => PixelType::Rgb,
            "RGBA" => PixelType::Rgba,
            "Offset" => PixelType::Offset,
            "Vector" => PixelType::Vector,
            "Point" => PixelType::Point,
            "CovariantVector" => PixelType::CovariantVector,
            "SymmetricSecondRankTensor" => PixelType::SymmetricSecondRankTensor,
            "DiffusionTensor3D" => PixelType::DiffusionTensor3D,
            "Complex" => PixelType::Complex,
            "FixedArray" => PixelType::FixedArray,
            "Array" => PixelType::Array,
            "Matrix" => PixelType::Matrix,
            "VariableLengthVector" => PixelType::VariableLengthVector,
            "VariableSizeMatrix" => PixelType::VariableSizeMatrix,
            other => return Err(BridgeError::UnsupportedType(other.to_string())),
        };
        Ok(pixel_type)
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural type of an image: what a consumer must agree on before it can
/// interpret the pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageType {
    pub dimension: usize,
    pub component_type: ComponentType,
    pub pixel_type: PixelType,
    pub components: usize,
}

impl Default for ImageType {
    fn default() -> Self {
        Self {
            dimension: 2,
            component_type: ComponentType::UInt8,
            pixel_type: PixelType::Scalar,
            components: 1,
        }
    }
}

/// A dimensioned, geometrically placed image with its pixel buffer.
///
/// `direction` is the D×D direction cosine matrix flattened row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub image_type: ImageType,
    pub name: String,
    pub origin: Vec<f64>,
    pub spacing: Vec<f64>,
    pub direction: Vec<f64>,
    pub size: Vec<usize>,
    pub data: Option<TypedArray>,
    pub metadata: MetaDataDictionary,
}

impl Image {
    /// An empty image at the origin with unit spacing and identity direction.
    pub fn new(image_type: ImageType) -> Self {
        let dimension = image_type.dimension;
        let mut direction = vec![0.0; dimension * dimension];
        for axis in 0..dimension {
            direction[axis * dimension + axis] = 1.0;
        }
        Self {
            image_type,
            name: "image".to_string(),
            origin: vec![0.0; dimension],
            spacing: vec![1.0; dimension],
            direction,
            size: vec![0; dimension],
            data: None,
            metadata: MetaDataDictionary::default(),
        }
    }

    /// Total number of pixels implied by `size`.
    pub fn number_of_pixels(&self) -> Result<usize> {
        pixel_count(self.size.iter().map(|&s| s as u64))
    }
}

/// Product of an image `size`. Extents that overflow `usize` are `MalformedDescriptor`.
pub(crate) fn pixel_count(size: impl IntoIterator<Item = u64>) -> Result<usize> {
    let mut total = 1usize;
    for extent in size {
        total = usize::try_from(extent)
            .ok()
            .and_then(|extent| total.checked_mul(extent))
            .ok_or_else(|| BridgeError::malformed(format!("image size overflows at extent {}", extent)))?;
    }
    Ok(total)
}

/// `count * factor`, or `MalformedDescriptor` naming `what` on overflow.
pub(crate) fn checked_len(what: &str, count: usize, factor: usize) -> Result<usize> {
    count
        .checked_mul(factor)
        .ok_or_else(|| BridgeError::malformed(format!("{} overflows: {} x {}", what, count, factor)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_image_has_identity_geometry() {
        let image = Image::new(ImageType {
            dimension: 3,
            ..ImageType::default()
        });
        assert_eq!(image.origin, vec![0.0, 0.0, 0.0]);
        assert_eq!(image.spacing, vec![1.0, 1.0, 1.0]);
        assert_eq!(
            image.direction,
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
        );
        assert_eq!(image.number_of_pixels().unwrap(), 0);
    }

    #[test]
    fn test_oversized_extents_are_malformed() {
        let mut image = Image::new(ImageType::default());
        image.size = vec![usize::MAX, 2];
        assert!(matches!(
            image.number_of_pixels(),
            Err(BridgeError::MalformedDescriptor(_))
        ));
        assert_eq!(pixel_count([3u64, 4, 5]).unwrap(), 60);
        assert!(checked_len("pixel bytes", usize::MAX, 2).is_err());
    }

    #[test]
    fn test_pixel_type_names() {
        assert_eq!("RGBA".parse::<PixelType>().unwrap(), PixelType::Rgba);
        assert_eq!(PixelType::DiffusionTensor3D.as_str(), "DiffusionTensor3D");
        assert!(PixelType::VariableSizeMatrix.is_variable_length());
        assert!(!PixelType::Vector.is_variable_length());
        assert!(matches!(
            "Quaternion".parse::<PixelType>(),
            Err(BridgeError::UnsupportedType(_))
        ));
    }
}
