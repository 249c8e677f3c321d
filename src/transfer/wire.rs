// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sidecar JSON shapes and their conversion to the interface types.
//!
//! Type tags stay strings here and are parsed on conversion, so an unknown
//! tag is reported as `UnsupportedType` rather than as a parse failure.
//! Geometry fields default to empty so structural checks can run first.

use crate::codec::{ComponentType, TypedArray};
use crate::errors::{BridgeError, Result};
use crate::interface::{checked_len, pixel_count, Image, ImageType, Mesh, MeshType, MetaDataDictionary};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireImageType {
    pub dimension: i64,
    pub component_type: String,
    pub pixel_type: String,
    pub components: i64,
}

impl WireImageType {
    pub fn describe(image_type: &ImageType) -> Self {
        Self {
            dimension: image_type.dimension as i64,
            component_type: image_type.component_type.as_str().to_string(),
            pixel_type: image_type.pixel_type.as_str().to_string(),
            components: image_type.components as i64,
        }
    }

    pub fn to_image_type(&self) -> Result<ImageType> {
        Ok(ImageType {
            dimension: positive("imageType.dimension", self.dimension)?,
            component_type: self.component_type.parse()?,
            pixel_type: self.pixel_type.parse()?,
            components: non_negative("imageType.components", self.components)?,
        })
    }
}

fn default_image_name() -> String {
    "image".to_string()
}

fn default_mesh_name() -> String {
    "mesh".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireImage {
    pub image_type: WireImageType,
    #[serde(default = "default_image_name")]
    pub name: String,
    #[serde(default)]
    pub origin: Vec<f64>,
    #[serde(default)]
    pub spacing: Vec<f64>,
    /// Flat row-major array, or an encoded address of `float64` values.
    #[serde(default)]
    pub direction: Value,
    #[serde(default)]
    pub size: Vec<u64>,
    /// Transport path, or an encoded address of the pixel buffer.
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl WireImage {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| BridgeError::malformed(format!("image descriptor: {}", e)))
    }

    /// Describe `image`, with the direction and data fields supplied by the transport.
    pub fn describe(image: &Image, direction: Value, data: Value) -> Self {
        Self {
            image_type: WireImageType::describe(&image.image_type),
            name: image.name.clone(),
            origin: image.origin.clone(),
            spacing: image.spacing.clone(),
            direction,
            size: image.size.iter().map(|&s| s as u64).collect(),
            data,
            metadata: (!image.metadata.is_empty()).then(|| image.metadata.to_json()),
        }
    }

    /// Origin, spacing and size must each hold `dimension` entries.
    pub fn check_geometry(&self, dimension: usize) -> Result<()> {
        for (field, len) in [
            ("origin", self.origin.len()),
            ("spacing", self.spacing.len()),
            ("size", self.size.len()),
        ] {
            if len != dimension {
                return Err(BridgeError::malformed(format!(
                    "'{}' has {} entries, expected {}",
                    field, len, dimension
                )));
            }
        }
        Ok(())
    }

    /// The direction matrix when carried inline as a flat array.
    pub fn flat_direction(&self, dimension: usize) -> Result<Vec<f64>> {
        let direction: Vec<f64> = serde_json::from_value(self.direction.clone()).map_err(|_| {
            BridgeError::malformed(format!(
                "'direction' must be a flat numeric array on this transport, found {}",
                self.direction
            ))
        })?;
        check_direction_len(&direction, dimension)?;
        Ok(direction)
    }

    /// Product of `size`.
    pub fn number_of_pixels(&self) -> Result<usize> {
        pixel_count(self.size.iter().copied())
    }

    /// Build the image once the transport has produced its direction and pixels.
    pub fn into_image(self, direction: Vec<f64>, data: Option<TypedArray>) -> Result<Image> {
        let image_type = self.image_type.to_image_type()?;
        self.check_geometry(image_type.dimension)?;
        check_direction_len(&direction, image_type.dimension)?;

        if let Some(array) = &data {
            expect_component_type(image_type.component_type, array)?;
            let expected = checked_len("pixel components", self.number_of_pixels()?, image_type.components)?;
            if image_type.components > 0 && array.len() != expected {
                return Err(BridgeError::malformed(format!(
                    "pixel buffer holds {} components, size and components imply {}",
                    array.len(),
                    expected
                )));
            }
        }

        let metadata = match &self.metadata {
            Some(section) => MetaDataDictionary::from_json(section)?,
            None => MetaDataDictionary::default(),
        };

        Ok(Image {
            image_type,
            name: self.name,
            origin: self.origin,
            spacing: self.spacing,
            direction,
            size: self.size.iter().map(|&s| s as usize).collect(),
            data,
            metadata,
        })
    }
}

fn check_direction_len(direction: &[f64], dimension: usize) -> Result<()> {
    if direction.len() != dimension * dimension {
        return Err(BridgeError::malformed(format!(
            "'direction' has {} entries, expected {}",
            direction.len(),
            dimension * dimension
        )));
    }
    Ok(())
}

pub(super) fn positive(field: &str, value: i64) -> Result<usize> {
    match usize::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(BridgeError::malformed(format!("'{}' must be positive, found {}", field, value))),
    }
}

fn non_negative(field: &str, value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| BridgeError::malformed(format!("'{}' must not be negative, found {}", field, value)))
}

pub(super) fn expect_component_type(declared: ComponentType, array: &TypedArray) -> Result<()> {
    if array.component_type() != declared {
        return Err(BridgeError::ComponentTypeMismatch {
            expected: declared.as_str().to_string(),
            found: array.component_type().as_str().to_string(),
        });
    }
    Ok(())
}

/// Pixel bytes of an image about to be transferred.
pub(crate) fn image_data_bytes(image: &Image) -> Result<&[u8]> {
    match &image.data {
        Some(array) => {
            expect_component_type(image.image_type.component_type, array)?;
            Ok(array.as_bytes())
        }
        None => match image.number_of_pixels()? {
            0 => Ok(&[]),
            pixels => Err(BridgeError::MissingBuffer(format!(
                "image '{}' declares {} pixels but has no data",
                image.name, pixels
            ))),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMeshType {
    pub dimension: i64,
    pub point_component_type: String,
    pub point_pixel_component_type: String,
    pub point_pixel_type: String,
    pub point_pixel_components: i64,
    pub cell_component_type: String,
    pub cell_pixel_component_type: String,
    pub cell_pixel_type: String,
    pub cell_pixel_components: i64,
}

impl WireMeshType {
    pub fn describe(mesh_type: &MeshType) -> Self {
        Self {
            dimension: mesh_type.dimension as i64,
            point_component_type: mesh_type.point_component_type.as_str().to_string(),
            point_pixel_component_type: mesh_type.point_pixel_component_type.as_str().to_string(),
            point_pixel_type: mesh_type.point_pixel_type.as_str().to_string(),
            point_pixel_components: mesh_type.point_pixel_components as i64,
            cell_component_type: mesh_type.cell_component_type.as_str().to_string(),
            cell_pixel_component_type: mesh_type.cell_pixel_component_type.as_str().to_string(),
            cell_pixel_type: mesh_type.cell_pixel_type.as_str().to_string(),
            cell_pixel_components: mesh_type.cell_pixel_components as i64,
        }
    }

    pub fn to_mesh_type(&self) -> Result<MeshType> {
        Ok(MeshType {
            dimension: positive("meshType.dimension", self.dimension)?,
            point_component_type: self.point_component_type.parse()?,
            point_pixel_component_type: self.point_pixel_component_type.parse()?,
            point_pixel_type: self.point_pixel_type.parse()?,
            point_pixel_components: non_negative(
                "meshType.pointPixelComponents",
                self.point_pixel_components,
            )?,
            cell_component_type: self.cell_component_type.parse()?,
            cell_pixel_component_type: self.cell_pixel_component_type.parse()?,
            cell_pixel_type: self.cell_pixel_type.parse()?,
            cell_pixel_components: non_negative(
                "meshType.cellPixelComponents",
                self.cell_pixel_components,
            )?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMesh {
    pub mesh_type: WireMeshType,
    #[serde(default = "default_mesh_name")]
    pub name: String,
    #[serde(default)]
    pub number_of_points: u64,
    #[serde(default)]
    pub points: Value,
    #[serde(default)]
    pub number_of_point_pixels: u64,
    #[serde(default)]
    pub point_data: Value,
    #[serde(default)]
    pub number_of_cells: u64,
    #[serde(default)]
    pub cells: Value,
    #[serde(default)]
    pub cell_buffer_size: u64,
    #[serde(default)]
    pub number_of_cell_pixels: u64,
    #[serde(default)]
    pub cell_data: Value,
}

impl WireMesh {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| BridgeError::malformed(format!("mesh descriptor: {}", e)))
    }

    /// Describe `mesh`, with one location per array supplied by the transport.
    pub fn describe(mesh: &Mesh, mut location: impl FnMut(MeshArray) -> Value) -> Self {
        Self {
            mesh_type: WireMeshType::describe(&mesh.mesh_type),
            name: mesh.name.clone(),
            number_of_points: mesh.number_of_points as u64,
            points: location(MeshArray::Points),
            number_of_point_pixels: mesh.number_of_point_pixels as u64,
            point_data: location(MeshArray::PointData),
            number_of_cells: mesh.number_of_cells as u64,
            cells: location(MeshArray::Cells),
            cell_buffer_size: mesh.cell_buffer_size as u64,
            number_of_cell_pixels: mesh.number_of_cell_pixels as u64,
            cell_data: location(MeshArray::CellData),
        }
    }

    /// Where the transport put `array`.
    pub fn location(&self, array: MeshArray) -> &Value {
        match array {
            MeshArray::Points => &self.points,
            MeshArray::PointData => &self.point_data,
            MeshArray::Cells => &self.cells,
            MeshArray::CellData => &self.cell_data,
        }
    }

    pub fn location_mut(&mut self, array: MeshArray) -> &mut Value {
        match array {
            MeshArray::Points => &mut self.points,
            MeshArray::PointData => &mut self.point_data,
            MeshArray::Cells => &mut self.cells,
            MeshArray::CellData => &mut self.cell_data,
        }
    }

    /// Mesh with counts filled in and every array unset.
    pub fn header(&self) -> Result<Mesh> {
        let mesh_type = self.mesh_type.to_mesh_type()?;
        Ok(Mesh {
            mesh_type,
            name: self.name.clone(),
            number_of_points: self.number_of_points as usize,
            points: None,
            number_of_point_pixels: self.number_of_point_pixels as usize,
            point_data: None,
            number_of_cells: self.number_of_cells as usize,
            cells: None,
            cell_buffer_size: self.cell_buffer_size as usize,
            number_of_cell_pixels: self.number_of_cell_pixels as usize,
            cell_data: None,
        })
    }
}

/// The four buffers of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshArray {
    Points,
    PointData,
    Cells,
    CellData,
}

impl MeshArray {
    pub const ALL: [MeshArray; 4] = [
        MeshArray::Points,
        MeshArray::PointData,
        MeshArray::Cells,
        MeshArray::CellData,
    ];

    /// Sidecar field name, also used as the file suffix.
    pub const fn field(self) -> &'static str {
        match self {
            MeshArray::Points => "points",
            MeshArray::PointData => "pointData",
            MeshArray::Cells => "cells",
            MeshArray::CellData => "cellData",
        }
    }

    /// Array slot in the memory transport.
    pub const fn sub_index(self) -> u32 {
        match self {
            MeshArray::Points => 0,
            MeshArray::Cells => 1,
            MeshArray::PointData => 2,
            MeshArray::CellData => 3,
        }
    }

    pub fn component_type(self, mesh_type: &MeshType) -> ComponentType {
        match self {
            MeshArray::Points => mesh_type.point_component_type,
            MeshArray::PointData => mesh_type.point_pixel_component_type,
            MeshArray::Cells => mesh_type.cell_component_type,
            MeshArray::CellData => mesh_type.cell_pixel_component_type,
        }
    }

    /// The count that decides whether this array is present.
    pub fn count(self, mesh: &Mesh) -> usize {
        match self {
            MeshArray::Points => mesh.number_of_points,
            MeshArray::PointData => mesh.number_of_point_pixels,
            MeshArray::Cells => mesh.number_of_cells,
            MeshArray::CellData => mesh.number_of_cell_pixels,
        }
    }

    pub fn get(self, mesh: &Mesh) -> Option<&TypedArray> {
        match self {
            MeshArray::Points => mesh.points.as_ref(),
            MeshArray::PointData => mesh.point_data.as_ref(),
            MeshArray::Cells => mesh.cells.as_ref(),
            MeshArray::CellData => mesh.cell_data.as_ref(),
        }
    }

    fn slot(self, mesh: &mut Mesh) -> &mut Option<TypedArray> {
        match self {
            MeshArray::Points => &mut mesh.points,
            MeshArray::PointData => &mut mesh.point_data,
            MeshArray::Cells => &mut mesh.cells,
            MeshArray::CellData => &mut mesh.cell_data,
        }
    }
}

/// Bytes of one mesh array about to be transferred; `None` when its count is zero.
pub(crate) fn mesh_array_bytes(mesh: &Mesh, array: MeshArray) -> Result<Option<&[u8]>> {
    if array.count(mesh) == 0 {
        return Ok(None);
    }
    let values = array.get(mesh).ok_or_else(|| {
        BridgeError::MissingBuffer(format!(
            "mesh '{}' declares {} {} but has no buffer",
            mesh.name,
            array.count(mesh),
            array.field()
        ))
    })?;
    expect_component_type(array.component_type(&mesh.mesh_type), values)?;
    Ok(Some(values.as_bytes()))
}

/// Populate every array of `mesh`, fetching bytes only for nonzero counts.
///
/// A zero count yields a zero-length view of the declared type without
/// calling `fetch`.
pub(crate) fn load_mesh_arrays<F>(mesh: &mut Mesh, mut fetch: F) -> Result<()>
where
    F: FnMut(MeshArray) -> Result<Vec<u8>>,
{
    for array in MeshArray::ALL {
        let component_type = array.component_type(&mesh.mesh_type);
        let values = if array.count(mesh) == 0 {
            TypedArray::empty(component_type)
        } else if component_type.is_null() {
            return Err(BridgeError::MissingBuffer(format!(
                "mesh '{}' declares {} {} with a null component type",
                mesh.name,
                array.count(mesh),
                array.field()
            )));
        } else {
            TypedArray::decode(component_type, &fetch(array)?)?
        };
        *array.slot(mesh) = values;
    }
    Ok(())
}
