// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Flat polydata layout for the memory transport.
//!
//! The vtk.js document tree is flattened to seven buffers: float32 points,
//! four uint32 cell-topology buffers, and at most one point-data and one
//! cell-data array. Counts in the descriptor decide which buffers hold
//! bytes; a zero count reads back as an empty typed view.

use super::wire::{expect_component_type, positive};
use crate::codec::{ComponentType, TypedArray};
use crate::errors::{BridgeError, Result};
use crate::interface::{
    checked_len, ArrayValues, AttributeArray, DataArray, DataSetAttributes, PixelType, PolyData,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const POINT_COMPONENTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePolyDataType {
    pub point_pixel_component_type: String,
    pub point_pixel_type: String,
    pub point_pixel_components: i64,
    pub cell_pixel_component_type: String,
    pub cell_pixel_type: String,
    pub cell_pixel_components: i64,
}

impl Default for WirePolyDataType {
    fn default() -> Self {
        Self {
            point_pixel_component_type: ComponentType::Float32.as_str().to_string(),
            point_pixel_type: PixelType::Scalar.as_str().to_string(),
            point_pixel_components: 1,
            cell_pixel_component_type: ComponentType::Float32.as_str().to_string(),
            cell_pixel_type: PixelType::Scalar.as_str().to_string(),
            cell_pixel_components: 1,
        }
    }
}

/// Pixel layout of one attribute buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PixelLayout {
    component_type: ComponentType,
    components: usize,
}

impl WirePolyDataType {
    fn point_layout(&self) -> Result<PixelLayout> {
        layout(
            "polyDataType.pointPixel",
            &self.point_pixel_component_type,
            &self.point_pixel_type,
            self.point_pixel_components,
        )
    }

    fn cell_layout(&self) -> Result<PixelLayout> {
        layout(
            "polyDataType.cellPixel",
            &self.cell_pixel_component_type,
            &self.cell_pixel_type,
            self.cell_pixel_components,
        )
    }

    fn set(&mut self, array: PolyDataArray, values: &TypedArray, components: usize) {
        let component_type = values.component_type().as_str().to_string();
        let pixel_type = if components == 1 {
            PixelType::Scalar
        } else {
            PixelType::VariableLengthVector
        };
        let pixel_type = pixel_type.as_str().to_string();
        if array == PolyDataArray::PointData {
            self.point_pixel_component_type = component_type;
            self.point_pixel_type = pixel_type;
            self.point_pixel_components = components as i64;
        } else {
            self.cell_pixel_component_type = component_type;
            self.cell_pixel_type = pixel_type;
            self.cell_pixel_components = components as i64;
        }
    }
}

fn layout(field: &str, component_type: &str, pixel_type: &str, components: i64) -> Result<PixelLayout> {
    pixel_type.parse::<PixelType>()?;
    Ok(PixelLayout {
        component_type: component_type.parse()?,
        components: positive(&format!("{}Components", field), components)?,
    })
}

fn default_polydata_name() -> String {
    "PolyData".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePolyData {
    #[serde(default)]
    pub poly_data_type: WirePolyDataType,
    #[serde(default = "default_polydata_name")]
    pub name: String,
    #[serde(default)]
    pub number_of_points: u64,
    #[serde(default)]
    pub points: Value,
    #[serde(default)]
    pub vertices_buffer_size: u64,
    #[serde(default)]
    pub vertices: Value,
    #[serde(default)]
    pub lines_buffer_size: u64,
    #[serde(default)]
    pub lines: Value,
    #[serde(default)]
    pub polygons_buffer_size: u64,
    #[serde(default)]
    pub polygons: Value,
    #[serde(default)]
    pub triangle_strips_buffer_size: u64,
    #[serde(default)]
    pub triangle_strips: Value,
    #[serde(default)]
    pub number_of_point_pixels: u64,
    #[serde(default)]
    pub point_data: Value,
    #[serde(default)]
    pub number_of_cell_pixels: u64,
    #[serde(default)]
    pub cell_data: Value,
}

impl WirePolyData {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| BridgeError::malformed(format!("polydata descriptor: {}", e)))
    }

    fn empty(name: String) -> Self {
        Self {
            poly_data_type: WirePolyDataType::default(),
            name,
            number_of_points: 0,
            points: Value::Null,
            vertices_buffer_size: 0,
            vertices: Value::Null,
            lines_buffer_size: 0,
            lines: Value::Null,
            polygons_buffer_size: 0,
            polygons: Value::Null,
            triangle_strips_buffer_size: 0,
            triangle_strips: Value::Null,
            number_of_point_pixels: 0,
            point_data: Value::Null,
            number_of_cell_pixels: 0,
            cell_data: Value::Null,
        }
    }

    /// The count that decides whether `array` holds bytes.
    pub fn count(&self, array: PolyDataArray) -> u64 {
        match array {
            PolyDataArray::Points => self.number_of_points,
            PolyDataArray::Vertices => self.vertices_buffer_size,
            PolyDataArray::Lines => self.lines_buffer_size,
            PolyDataArray::Polygons => self.polygons_buffer_size,
            PolyDataArray::TriangleStrips => self.triangle_strips_buffer_size,
            PolyDataArray::PointData => self.number_of_point_pixels,
            PolyDataArray::CellData => self.number_of_cell_pixels,
        }
    }

    fn count_mut(&mut self, array: PolyDataArray) -> &mut u64 {
        match array {
            PolyDataArray::Points => &mut self.number_of_points,
            PolyDataArray::Vertices => &mut self.vertices_buffer_size,
            PolyDataArray::Lines => &mut self.lines_buffer_size,
            PolyDataArray::Polygons => &mut self.polygons_buffer_size,
            PolyDataArray::TriangleStrips => &mut self.triangle_strips_buffer_size,
            PolyDataArray::PointData => &mut self.number_of_point_pixels,
            PolyDataArray::CellData => &mut self.number_of_cell_pixels,
        }
    }

    pub fn location_mut(&mut self, array: PolyDataArray) -> &mut Value {
        match array {
            PolyDataArray::Points => &mut self.points,
            PolyDataArray::Vertices => &mut self.vertices,
            PolyDataArray::Lines => &mut self.lines,
            PolyDataArray::Polygons => &mut self.polygons,
            PolyDataArray::TriangleStrips => &mut self.triangle_strips,
            PolyDataArray::PointData => &mut self.point_data,
            PolyDataArray::CellData => &mut self.cell_data,
        }
    }

    /// Element type and elements per counted item for `array`.
    fn layout(&self, array: PolyDataArray) -> Result<PixelLayout> {
        match array {
            PolyDataArray::Points => Ok(PixelLayout {
                component_type: ComponentType::Float32,
                components: POINT_COMPONENTS,
            }),
            PolyDataArray::PointData => self.poly_data_type.point_layout(),
            PolyDataArray::CellData => self.poly_data_type.cell_layout(),
            _ => Ok(PixelLayout {
                component_type: ComponentType::UInt32,
                components: 1,
            }),
        }
    }
}

/// The seven buffers of a flattened polydata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyDataArray {
    Points,
    Vertices,
    Lines,
    Polygons,
    TriangleStrips,
    PointData,
    CellData,
}

impl PolyDataArray {
    pub const ALL: [PolyDataArray; 7] = [
        PolyDataArray::Points,
        PolyDataArray::Vertices,
        PolyDataArray::Lines,
        PolyDataArray::Polygons,
        PolyDataArray::TriangleStrips,
        PolyDataArray::PointData,
        PolyDataArray::CellData,
    ];

    pub const fn field(self) -> &'static str {
        match self {
            PolyDataArray::Points => "points",
            PolyDataArray::Vertices => "vertices",
            PolyDataArray::Lines => "lines",
            PolyDataArray::Polygons => "polygons",
            PolyDataArray::TriangleStrips => "triangleStrips",
            PolyDataArray::PointData => "pointData",
            PolyDataArray::CellData => "cellData",
        }
    }

    /// Array slot in the memory transport.
    pub const fn sub_index(self) -> u32 {
        match self {
            PolyDataArray::Points => 0,
            PolyDataArray::Vertices => 1,
            PolyDataArray::Lines => 2,
            PolyDataArray::Polygons => 3,
            PolyDataArray::TriangleStrips => 4,
            PolyDataArray::PointData => 5,
            PolyDataArray::CellData => 6,
        }
    }

    const fn position(self) -> usize {
        self.sub_index() as usize
    }

    /// Topology key in the vtk.js document; `None` for attribute data.
    const fn tree_key(self) -> Option<&'static str> {
        match self {
            PolyDataArray::Points => Some("points"),
            PolyDataArray::Vertices => Some("verts"),
            PolyDataArray::Lines => Some("lines"),
            PolyDataArray::Polygons => Some("polys"),
            PolyDataArray::TriangleStrips => Some("strips"),
            PolyDataArray::PointData | PolyDataArray::CellData => None,
        }
    }
}

/// A polydata laid out for transfer, borrowing the typed views of its tree.
#[derive(Debug)]
pub struct FlatPolyData<'a> {
    pub wire: WirePolyData,
    arrays: [Option<&'a TypedArray>; 7],
}

impl<'a> FlatPolyData<'a> {
    /// Bytes for `array`; empty when its count is zero.
    pub fn bytes(&self, array: PolyDataArray) -> &'a [u8] {
        self.arrays[array.position()].map(TypedArray::as_bytes).unwrap_or(&[])
    }
}

/// The typed view of one resolved leaf, or `None` when it holds nothing.
fn leaf<'a>(field: &str, array: &'a DataArray) -> Result<Option<&'a TypedArray>> {
    match &array.values {
        ArrayValues::Resolved(values) => Ok(Some(values)),
        ArrayValues::Empty => Ok(None),
        ArrayValues::Unresolved(buffer_ref) => Err(BridgeError::MissingBuffer(format!(
            "polydata '{}' references '{}' but it was never loaded",
            field,
            buffer_ref.relative_path()
        ))),
        ArrayValues::Inline(_) => Err(BridgeError::UnsupportedKind(format!(
            "inline polydata '{}' values on the memory transport",
            field
        ))),
    }
}

fn number_of_components(field: &str, array: &DataArray) -> Result<usize> {
    match array.attributes.get("numberOfComponents") {
        None => Ok(1),
        Some(value) => value
            .as_i64()
            .ok_or_else(|| BridgeError::malformed(format!("'{}.numberOfComponents' must be an integer", field)))
            .and_then(|n| positive(&format!("{}.numberOfComponents", field), n)),
    }
}

/// Counted items in `values`, which must hold a whole number of `components`.
fn count_items(field: &str, values: &TypedArray, components: usize) -> Result<u64> {
    if values.len() % components != 0 {
        return Err(BridgeError::malformed(format!(
            "'{}' holds {} values, not a multiple of {} components",
            field,
            values.len(),
            components
        )));
    }
    Ok((values.len() / components) as u64)
}

/// The single array of an attribute set, if any.
fn attribute_array<'a>(field: &str, attributes: Option<&'a DataSetAttributes>) -> Result<Option<&'a DataArray>> {
    let arrays = attributes.map(|a| a.arrays.as_slice()).unwrap_or(&[]);
    match arrays {
        [] => Ok(None),
        [only] => Ok(Some(&only.data)),
        many => Err(BridgeError::UnsupportedKind(format!(
            "polydata '{}' with {} arrays on the memory transport (at most one)",
            field,
            many.len()
        ))),
    }
}

/// Flatten a resolved polydata tree for the memory transport.
///
/// # Errors
/// * `MissingBuffer` - a leaf was never resolved
/// * `ComponentTypeMismatch` - points are not float32 or cells not uint32
/// * `UnsupportedKind` - field data, inline values, or more than one
///   point-data or cell-data array
/// * `MalformedDescriptor` - a buffer is not a whole number of items
pub fn flatten(poly_data: &PolyData) -> Result<FlatPolyData<'_>> {
    if poly_data.field_data.as_ref().is_some_and(|f| !f.arrays.is_empty()) {
        return Err(BridgeError::UnsupportedKind(
            "polydata fieldData on the memory transport".to_string(),
        ));
    }
    let name = poly_data
        .extra
        .get("name")
        .and_then(Value::as_str)
        .map_or_else(default_polydata_name, str::to_string);
    let mut flat = FlatPolyData {
        wire: WirePolyData::empty(name),
        arrays: [None; 7],
    };

    let topology = [
        (PolyDataArray::Points, poly_data.points.as_ref()),
        (PolyDataArray::Vertices, poly_data.verts.as_ref()),
        (PolyDataArray::Lines, poly_data.lines.as_ref()),
        (PolyDataArray::Polygons, poly_data.polys.as_ref()),
        (PolyDataArray::TriangleStrips, poly_data.strips.as_ref()),
    ];
    for (array, data) in topology {
        let Some(values) = data.map(|d| leaf(array.field(), d)).transpose()?.flatten() else {
            continue;
        };
        let layout = flat.wire.layout(array)?;
        expect_component_type(layout.component_type, values)?;
        *flat.wire.count_mut(array) = count_items(array.field(), values, layout.components)?;
        flat.arrays[array.position()] = Some(values);
    }

    let attributes = [
        (PolyDataArray::PointData, poly_data.point_data.as_ref()),
        (PolyDataArray::CellData, poly_data.cell_data.as_ref()),
    ];
    for (array, set) in attributes {
        let Some(data) = attribute_array(array.field(), set)? else {
            continue;
        };
        let Some(values) = leaf(array.field(), data)? else {
            continue;
        };
        let components = number_of_components(array.field(), data)?;
        flat.wire.poly_data_type.set(array, values, components);
        *flat.wire.count_mut(array) = count_items(array.field(), values, components)?;
        flat.arrays[array.position()] = Some(values);
    }
    Ok(flat)
}

fn data_array(values: TypedArray, components: usize, mut attributes: Map<String, Value>) -> DataArray {
    attributes.insert("numberOfComponents".to_string(), json!(components));
    attributes.insert("size".to_string(), json!(values.len()));
    DataArray {
        data_type: values.component_type().typed_array_name().map(str::to_string),
        values: ArrayValues::Resolved(values),
        attributes,
    }
}

fn attribute_set(name: &str, values: Option<TypedArray>, components: usize) -> DataSetAttributes {
    let mut set = DataSetAttributes::default();
    if let Some(values) = values.filter(|v| !v.is_empty()) {
        let mut attributes = Map::new();
        attributes.insert("name".to_string(), json!(name));
        set.arrays.push(AttributeArray {
            data: data_array(values, components, attributes),
            extra: Map::new(),
        });
        set.extra.insert("activeScalars".to_string(), json!(0));
    }
    set
}

/// Rebuild a resolved polydata tree, fetching bytes only for nonzero counts.
///
/// Topology with a zero count becomes an empty typed view; attribute data
/// with a zero count becomes an attribute set with no arrays.
pub fn unflatten<F>(wire: &WirePolyData, mut fetch: F) -> Result<PolyData>
where
    F: FnMut(PolyDataArray) -> Result<Vec<u8>>,
{
    let mut arrays: [Option<TypedArray>; 7] = Default::default();
    let mut components = [1usize; 7];
    for array in PolyDataArray::ALL {
        let layout = wire.layout(array)?;
        components[array.position()] = layout.components;
        let count = usize::try_from(wire.count(array))
            .map_err(|_| BridgeError::malformed(format!("'{}' count overflows", array.field())))?;
        arrays[array.position()] = if count == 0 {
            TypedArray::empty(layout.component_type)
        } else if layout.component_type.is_null() {
            return Err(BridgeError::MissingBuffer(format!(
                "polydata declares {} {} with a null component type",
                count,
                array.field()
            )));
        } else {
            let expected = checked_len(array.field(), count, layout.components)?;
            let values = TypedArray::decode(layout.component_type, &fetch(array)?)?;
            let found = values.as_ref().map_or(0, TypedArray::len);
            if found != expected {
                return Err(BridgeError::malformed(format!(
                    "'{}' holds {} values, expected {}",
                    array.field(),
                    found,
                    expected
                )));
            }
            values
        };
    }

    let mut poly_data = PolyData::default();
    for array in PolyDataArray::ALL {
        let values = arrays[array.position()].take();
        let components = components[array.position()];
        let slot = match array.tree_key() {
            Some("points") => &mut poly_data.points,
            Some("verts") => &mut poly_data.verts,
            Some("lines") => &mut poly_data.lines,
            Some("polys") => &mut poly_data.polys,
            Some(_) => &mut poly_data.strips,
            None => {
                let set = attribute_set(array.field(), values, components);
                if array == PolyDataArray::PointData {
                    poly_data.point_data = Some(set);
                } else {
                    poly_data.cell_data = Some(set);
                }
                continue;
            }
        };
        let class = if array == PolyDataArray::Points { "vtkPoints" } else { "vtkCellArray" };
        let mut attributes = Map::new();
        attributes.insert("vtkClass".to_string(), json!(class));
        *slot = values.map(|values| data_array(values, components, attributes));
    }
    poly_data.extra.insert("vtkClass".to_string(), json!("vtkPolyData"));
    poly_data.extra.insert("name".to_string(), json!(wire.name));
    Ok(poly_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolved_triangle() -> PolyData {
        let mut poly_data = PolyData::from_json(&json!({
            "vtkClass": "vtkPolyData",
            "name": "triangle",
            "points": {"vtkClass": "vtkPoints", "numberOfComponents": 3, "dataType": "Float32Array", "ref": {"id": "pts"}},
            "polys": {"dataType": "Uint32Array", "ref": {"id": "polys"}},
            "pointData": {"arrays": [
                {"data": {"name": "normals", "numberOfComponents": 3, "dataType": "Float64Array", "ref": {"id": "n"}}}
            ]}
        }))
        .unwrap();
        poly_data
            .resolve_refs(|buffer_ref| match buffer_ref.id.as_str() {
                "pts" => Ok(bytemuck::cast_slice(&[0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]).to_vec()),
                "polys" => Ok(bytemuck::cast_slice(&[3u32, 0, 1, 2]).to_vec()),
                _ => Ok(bytemuck::cast_slice(&[0.0f64, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]).to_vec()),
            })
            .unwrap();
        poly_data
    }

    #[test]
    fn test_flatten_counts_items_per_buffer() {
        let poly_data = resolved_triangle();
        let flat = flatten(&poly_data).unwrap();

        assert_eq!(flat.wire.name, "triangle");
        assert_eq!(flat.wire.number_of_points, 3);
        assert_eq!(flat.wire.polygons_buffer_size, 4);
        assert_eq!(flat.wire.vertices_buffer_size, 0);
        assert_eq!(flat.wire.number_of_point_pixels, 3);
        assert_eq!(flat.wire.number_of_cell_pixels, 0);
        assert_eq!(flat.wire.poly_data_type.point_pixel_component_type, "float64");
        assert_eq!(flat.wire.poly_data_type.point_pixel_type, "VariableLengthVector");
        assert_eq!(flat.wire.poly_data_type.point_pixel_components, 3);
        assert_eq!(flat.bytes(PolyDataArray::Points).len(), 36);
        assert!(flat.bytes(PolyDataArray::Lines).is_empty());
    }

    #[test]
    fn test_unflatten_rebuilds_the_tree() {
        let poly_data = resolved_triangle();
        let flat = flatten(&poly_data).unwrap();
        let wire = WirePolyData::parse(&serde_json::to_vec(&flat.wire).unwrap()).unwrap();

        let mut fetched = Vec::new();
        let rebuilt = unflatten(&wire, |array| {
            fetched.push(array);
            Ok(flat.bytes(array).to_vec())
        })
        .unwrap();

        assert_eq!(
            fetched,
            vec![PolyDataArray::Points, PolyDataArray::Polygons, PolyDataArray::PointData]
        );
        assert!(rebuilt.is_resolved());
        assert_eq!(rebuilt.extra.get("name"), Some(&json!("triangle")));
        for (sent, received) in [
            (&poly_data.points, &rebuilt.points),
            (&poly_data.polys, &rebuilt.polys),
        ] {
            assert_eq!(
                sent.as_ref().and_then(DataArray::typed),
                received.as_ref().and_then(DataArray::typed)
            );
        }
        assert_eq!(
            rebuilt.lines.as_ref().and_then(DataArray::typed),
            Some(&TypedArray::UInt32(Vec::new()))
        );
        let normals = &rebuilt.point_data.as_ref().unwrap().arrays[0].data;
        assert_eq!(normals.data_type.as_deref(), Some("Float64Array"));
        assert_eq!(normals.typed(), poly_data.point_data.as_ref().unwrap().arrays[0].data.typed());
        assert!(rebuilt.cell_data.as_ref().unwrap().arrays.is_empty());
    }

    #[test]
    fn test_unresolved_leaf_is_missing_buffer() {
        let poly_data = PolyData::from_json(&json!({
            "points": {"dataType": "Float32Array", "ref": {"id": "pts"}}
        }))
        .unwrap();
        assert!(matches!(flatten(&poly_data), Err(BridgeError::MissingBuffer(_))));
    }

    #[test]
    fn test_points_must_be_float32() {
        let mut poly_data = resolved_triangle();
        poly_data.points.as_mut().unwrap().values = ArrayValues::Resolved(TypedArray::Float64(vec![0.0; 3]));
        assert!(matches!(
            flatten(&poly_data),
            Err(BridgeError::ComponentTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_partial_point_is_malformed() {
        let mut poly_data = resolved_triangle();
        poly_data.points.as_mut().unwrap().values = ArrayValues::Resolved(TypedArray::Float32(vec![0.0; 4]));
        assert!(matches!(flatten(&poly_data), Err(BridgeError::MalformedDescriptor(_))));
    }

    #[test]
    fn test_second_point_data_array_is_unsupported() {
        let mut poly_data = resolved_triangle();
        let attributes = poly_data.point_data.as_mut().unwrap();
        attributes.arrays.push(attributes.arrays[0].clone());
        assert!(matches!(flatten(&poly_data), Err(BridgeError::UnsupportedKind(_))));
    }

    #[test]
    fn test_short_buffer_is_malformed() {
        let mut wire = WirePolyData::empty("short".to_string());
        wire.number_of_points = 2;
        let result = unflatten(&wire, |_| Ok(vec![0; 12]));
        assert!(matches!(result, Err(BridgeError::MalformedDescriptor(_))));
    }
}
