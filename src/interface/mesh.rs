// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::codec::{ComponentType, TypedArray};
use crate::interface::PixelType;

/// Element and pixel types for the four arrays a mesh carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshType {
    pub dimension: usize,
    pub point_component_type: ComponentType,
    pub point_pixel_component_type: ComponentType,
    pub point_pixel_type: PixelType,
    pub point_pixel_components: usize,
    pub cell_component_type: ComponentType,
    pub cell_pixel_component_type: ComponentType,
    pub cell_pixel_type: PixelType,
    pub cell_pixel_components: usize,
}

impl Default for MeshType {
    fn default() -> Self {
        Self {
            dimension: 3,
            point_component_type: ComponentType::Float32,
            point_pixel_component_type: ComponentType::Float32,
            point_pixel_type: PixelType::Scalar,
            point_pixel_components: 1,
            cell_component_type: ComponentType::Int32,
            cell_pixel_component_type: ComponentType::Float32,
            cell_pixel_type: PixelType::Scalar,
            cell_pixel_components: 1,
        }
    }
}

/// Mesh topology with optional per-point and per-cell data.
///
/// Each array is meaningful only when its count is nonzero. An array whose
/// count is zero is carried as a zero-length view of its declared type (or
/// `None` when that type is `null`).
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub mesh_type: MeshType,
    pub name: String,
    pub number_of_points: usize,
    pub points: Option<TypedArray>,
    pub number_of_point_pixels: usize,
    pub point_data: Option<TypedArray>,
    pub number_of_cells: usize,
    pub cells: Option<TypedArray>,
    pub cell_buffer_size: usize,
    pub number_of_cell_pixels: usize,
    pub cell_data: Option<TypedArray>,
}

impl Mesh {
    /// A mesh with no points, cells or data.
    pub fn new(mesh_type: MeshType) -> Self {
        Self {
            mesh_type,
            name: "mesh".to_string(),
            number_of_points: 0,
            points: TypedArray::empty(mesh_type.point_component_type),
            number_of_point_pixels: 0,
            point_data: TypedArray::empty(mesh_type.point_pixel_component_type),
            number_of_cells: 0,
            cells: TypedArray::empty(mesh_type.cell_component_type),
            cell_buffer_size: 0,
            number_of_cell_pixels: 0,
            cell_data: TypedArray::empty(mesh_type.cell_pixel_component_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_mesh_carries_typed_empty_arrays() {
        let mesh = Mesh::new(MeshType::default());
        assert_eq!(mesh.points, Some(TypedArray::Float32(vec![])));
        assert_eq!(mesh.cells, Some(TypedArray::Int32(vec![])));
        assert_eq!(mesh.number_of_points, 0);
    }

    #[test]
    fn test_null_cell_type_means_no_cell_array() {
        let mesh = Mesh::new(MeshType {
            cell_component_type: ComponentType::Null,
            ..MeshType::default()
        });
        assert!(mesh.cells.is_none());
    }
}
