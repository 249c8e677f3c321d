// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Memory transport: arrays are copied into module memory slot by slot and
//! the descriptor JSON refers to them by encoded address.
//!
//! Slots are numbered `(index, sub_index)`. Images use sub-index 0 for
//! pixels and 1 for the direction matrix; meshes use 0 points, 1 cells,
//! 2 point data and 3 cell data; polydata uses 0 points, 1 to 4 for
//! vertices, lines, polygons and triangle strips, 5 point data and 6 cell
//! data; text and binary use 0.

use super::polydata::{flatten, unflatten, PolyDataArray, WirePolyData};
use super::wire::{image_data_bytes, load_mesh_arrays, mesh_array_bytes, MeshArray, WireImage, WireMesh};
use crate::codec::{ComponentType, TypedArray};
use crate::errors::{BridgeError, Result};
use crate::interface::{Image, IoData, IoKind, Mesh, PolyData};
use crate::transfer::MemoryAddress;
use serde_json::{json, Value};

const IMAGE_DATA: u32 = 0;
const IMAGE_DIRECTION: u32 = 1;
const STREAM_DATA: u32 = 0;

/// Where encoded inputs are staged.
pub trait MemoryInputSink {
    /// Copy `bytes` into the slot and return its address.
    fn input_array(&mut self, index: u32, sub_index: u32, bytes: &[u8]) -> Result<MemoryAddress>;

    fn input_json(&mut self, index: u32, json: &[u8]) -> Result<()>;
}

/// Where produced outputs are read from.
pub trait MemoryOutputSource {
    fn output_json(&mut self, index: u32) -> Result<Vec<u8>>;

    fn output_array(&mut self, index: u32, sub_index: u32) -> Result<Vec<u8>>;
}

/// Refuse an input that cannot be laid out on this transport, before
/// anything is staged.
pub fn check_input(data: &IoData) -> Result<()> {
    match data {
        IoData::PolyData(poly_data) => flatten(poly_data).map(|_| ()),
        _ => Ok(()),
    }
}

/// Stage one input in `sink`.
pub fn write_input<S: MemoryInputSink + ?Sized>(sink: &mut S, index: u32, data: &IoData) -> Result<()> {
    let descriptor = match data {
        IoData::Text(text) => stream_descriptor(sink, index, text.as_bytes())?,
        IoData::Binary(bytes) => stream_descriptor(sink, index, bytes)?,
        IoData::Image(image) => image_descriptor(sink, index, image)?,
        IoData::Mesh(mesh) => mesh_descriptor(sink, index, mesh)?,
        IoData::PolyData(poly_data) => polydata_descriptor(sink, index, poly_data)?,
    };
    sink.input_json(index, &serde_json::to_vec(&descriptor)?)
}

fn stream_descriptor<S: MemoryInputSink + ?Sized>(sink: &mut S, index: u32, bytes: &[u8]) -> Result<Value> {
    let address = sink.input_array(index, STREAM_DATA, bytes)?;
    Ok(json!({ "size": bytes.len(), "data": address.encode() }))
}

fn image_descriptor<S: MemoryInputSink + ?Sized>(sink: &mut S, index: u32, image: &Image) -> Result<Value> {
    let data = sink.input_array(index, IMAGE_DATA, image_data_bytes(image)?)?;
    let direction = sink.input_array(index, IMAGE_DIRECTION, bytemuck::cast_slice(&image.direction))?;
    let wire = WireImage::describe(
        image,
        Value::String(direction.encode()),
        Value::String(data.encode()),
    );
    Ok(serde_json::to_value(wire)?)
}

fn mesh_descriptor<S: MemoryInputSink + ?Sized>(sink: &mut S, index: u32, mesh: &Mesh) -> Result<Value> {
    let mut wire = WireMesh::describe(mesh, |_| Value::Null);
    for array in MeshArray::ALL {
        let bytes = mesh_array_bytes(mesh, array)?.unwrap_or(&[]);
        let address = sink.input_array(index, array.sub_index(), bytes)?;
        *wire.location_mut(array) = Value::String(address.encode());
    }
    Ok(serde_json::to_value(wire)?)
}

fn polydata_descriptor<S: MemoryInputSink + ?Sized>(
    sink: &mut S,
    index: u32,
    poly_data: &PolyData,
) -> Result<Value> {
    let mut flat = flatten(poly_data)?;
    for array in PolyDataArray::ALL {
        let address = sink.input_array(index, array.sub_index(), flat.bytes(array))?;
        *flat.wire.location_mut(array) = Value::String(address.encode());
    }
    Ok(serde_json::to_value(flat.wire)?)
}

/// Copy one produced output out of `source`.
pub fn read_output<S: MemoryOutputSource + ?Sized>(source: &mut S, index: u32, kind: IoKind) -> Result<IoData> {
    match kind {
        IoKind::Text => Ok(IoData::Text(String::from_utf8(
            source.output_array(index, STREAM_DATA)?,
        )?)),
        IoKind::Binary => Ok(IoData::Binary(source.output_array(index, STREAM_DATA)?)),
        IoKind::Image => read_image(source, index).map(IoData::Image),
        IoKind::Mesh => read_mesh(source, index).map(IoData::Mesh),
        IoKind::PolyData => read_polydata(source, index).map(IoData::PolyData),
    }
}

fn read_image<S: MemoryOutputSource + ?Sized>(source: &mut S, index: u32) -> Result<Image> {
    let wire = WireImage::parse(&source.output_json(index)?)?;
    let image_type = wire.image_type.to_image_type()?;
    let data = TypedArray::decode(image_type.component_type, &source.output_array(index, IMAGE_DATA)?)?;
    let direction = match TypedArray::decode(
        ComponentType::Float64,
        &source.output_array(index, IMAGE_DIRECTION)?,
    )? {
        Some(TypedArray::Float64(values)) => values,
        _ => Vec::new(),
    };
    wire.into_image(direction, data)
}

fn read_mesh<S: MemoryOutputSource + ?Sized>(source: &mut S, index: u32) -> Result<Mesh> {
    let wire = WireMesh::parse(&source.output_json(index)?)?;
    let mut mesh = wire.header()?;
    load_mesh_arrays(&mut mesh, |array| source.output_array(index, array.sub_index()))?;
    Ok(mesh)
}

fn read_polydata<S: MemoryOutputSource + ?Sized>(source: &mut S, index: u32) -> Result<PolyData> {
    let wire = WirePolyData::parse(&source.output_json(index)?)?;
    unflatten(&wire, |array| source.output_array(index, array.sub_index()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{ImageType, MeshType};
    use std::collections::BTreeMap;

    /// Flat byte heap standing in for module memory; outputs mirror inputs.
    #[derive(Default)]
    struct Heap {
        memory: Vec<u8>,
        arrays: BTreeMap<(u32, u32), (usize, usize)>,
        json: BTreeMap<u32, Vec<u8>>,
    }

    impl MemoryInputSink for Heap {
        fn input_array(&mut self, index: u32, sub_index: u32, bytes: &[u8]) -> Result<MemoryAddress> {
            let address = self.memory.len();
            self.memory.extend_from_slice(bytes);
            self.arrays.insert((index, sub_index), (address, bytes.len()));
            Ok(MemoryAddress(address))
        }

        fn input_json(&mut self, index: u32, json: &[u8]) -> Result<()> {
            self.json.insert(index, json.to_vec());
            Ok(())
        }
    }

    impl MemoryOutputSource for Heap {
        fn output_json(&mut self, index: u32) -> Result<Vec<u8>> {
            self.json
                .get(&index)
                .cloned()
                .ok_or_else(|| BridgeError::MissingBuffer(format!("json {}", index)))
        }

        fn output_array(&mut self, index: u32, sub_index: u32) -> Result<Vec<u8>> {
            let (address, len) = self
                .arrays
                .get(&(index, sub_index))
                .copied()
                .ok_or_else(|| BridgeError::MissingBuffer(format!("array {}/{}", index, sub_index)))?;
            Ok(self.memory[address..address + len].to_vec())
        }
    }

    #[test]
    fn test_image_descriptor_uses_addresses() {
        let mut image = Image::new(ImageType::default());
        image.size = vec![2, 2];
        image.data = Some(TypedArray::UInt8(vec![10, 20, 30, 40]));

        let mut heap = Heap::default();
        write_input(&mut heap, 0, &IoData::Image(image.clone())).unwrap();

        let descriptor: Value = serde_json::from_slice(&heap.json[&0]).unwrap();
        assert_eq!(descriptor["data"], json!("data:application/vnd.itk.address,0:0"));
        assert_eq!(descriptor["direction"], json!("data:application/vnd.itk.address,0:4"));

        assert_eq!(read_output(&mut heap, 0, IoKind::Image).unwrap(), IoData::Image(image));
    }

    #[test]
    fn test_text_descriptor_carries_size() {
        let mut heap = Heap::default();
        write_input(&mut heap, 1, &IoData::Text("hello".to_string())).unwrap();
        let descriptor: Value = serde_json::from_slice(&heap.json[&1]).unwrap();
        assert_eq!(descriptor["size"], json!(5));
        assert_eq!(
            read_output(&mut heap, 1, IoKind::Text).unwrap(),
            IoData::Text("hello".to_string())
        );
    }

    #[test]
    fn test_mesh_slots_follow_sub_indices() {
        let mut mesh = Mesh::new(MeshType::default());
        mesh.number_of_points = 1;
        mesh.points = Some(TypedArray::Float32(vec![1.0, 2.0, 3.0]));

        let mut heap = Heap::default();
        write_input(&mut heap, 0, &IoData::Mesh(mesh.clone())).unwrap();
        assert_eq!(heap.arrays[&(0, 0)], (0, 12));
        assert_eq!(heap.arrays[&(0, 1)].1, 0);
        assert_eq!(read_output(&mut heap, 0, IoKind::Mesh).unwrap(), IoData::Mesh(mesh));
    }

    fn resolved_lines() -> PolyData {
        let mut poly_data = PolyData::from_json(&json!({
            "points": {"numberOfComponents": 3, "dataType": "Float32Array", "ref": {"id": "pts"}},
            "lines": {"dataType": "Uint32Array", "ref": {"id": "lines"}},
            "cellData": {"arrays": [{"data": {"name": "ids", "dataType": "Int32Array", "ref": {"id": "ids"}}}]}
        }))
        .unwrap();
        poly_data
            .resolve_refs(|buffer_ref| match buffer_ref.id.as_str() {
                "pts" => Ok(bytemuck::cast_slice(&[0.0f32, 0.0, 0.0, 2.0, 0.0, 0.0]).to_vec()),
                "lines" => Ok(bytemuck::cast_slice(&[2u32, 0, 1]).to_vec()),
                _ => Ok(bytemuck::cast_slice(&[41i32]).to_vec()),
            })
            .unwrap();
        poly_data
    }

    #[test]
    fn test_polydata_slots_follow_sub_indices() {
        let poly_data = resolved_lines();
        let mut heap = Heap::default();
        write_input(&mut heap, 0, &IoData::PolyData(poly_data.clone())).unwrap();

        assert_eq!(heap.arrays[&(0, 0)].1, 24);
        assert_eq!(heap.arrays[&(0, 2)].1, 12);
        assert_eq!(heap.arrays[&(0, 6)].1, 4);
        for sub_index in [1, 3, 4, 5] {
            assert_eq!(heap.arrays[&(0, sub_index)].1, 0);
        }
        let descriptor: Value = serde_json::from_slice(&heap.json[&0]).unwrap();
        assert_eq!(descriptor["numberOfPoints"], json!(2));
        assert_eq!(descriptor["linesBufferSize"], json!(3));
        assert_eq!(descriptor["numberOfCellPixels"], json!(1));
        assert_eq!(descriptor["polyDataType"]["cellPixelComponentType"], json!("int32"));

        let IoData::PolyData(read) = read_output(&mut heap, 0, IoKind::PolyData).unwrap() else {
            panic!("Expected polydata");
        };
        assert_eq!(read.points.as_ref().and_then(|a| a.typed()), poly_data.points.as_ref().and_then(|a| a.typed()));
        assert_eq!(read.lines.as_ref().and_then(|a| a.typed()), Some(&TypedArray::UInt32(vec![2, 0, 1])));
        assert_eq!(
            read.cell_data.as_ref().unwrap().arrays[0].data.typed(),
            Some(&TypedArray::Int32(vec![41]))
        );
    }

    #[test]
    fn test_unloaded_polydata_is_refused_before_staging() {
        let poly_data = PolyData::from_json(&json!({
            "points": {"dataType": "Float32Array", "ref": {"id": "pts"}}
        }))
        .unwrap();
        let data = IoData::PolyData(poly_data);
        assert!(matches!(check_input(&data), Err(BridgeError::MissingBuffer(_))));

        let mut heap = Heap::default();
        assert!(write_input(&mut heap, 0, &data).is_err());
        assert!(heap.memory.is_empty() && heap.json.is_empty());
    }
}
