// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Filesystem transport: every value becomes one or more files under its
//! synthetic path.

use super::wire::{image_data_bytes, load_mesh_arrays, mesh_array_bytes, MeshArray, WireImage, WireMesh};
use crate::codec::TypedArray;
use crate::errors::{BridgeError, Result};
use crate::interface::{Image, IoData, IoKind, Mesh, PipelineInput, PipelineOutput, PolyData};
use crate::transfer::MemoryAddress;
use crate::vfs::VirtualFs;
use serde_json::Value;

/// The files one input turns into, built before anything is written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferPayload {
    files: Vec<(String, Vec<u8>)>,
}

impl TransferPayload {
    fn push(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.files.push((path.into(), contents));
    }

    pub fn files(&self) -> &[(String, Vec<u8>)] {
        &self.files
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(path, _)| path.as_str())
    }

    pub fn write_to(&self, fs: &mut dyn VirtualFs) -> Result<()> {
        for (path, contents) in &self.files {
            fs.write_file(path, contents)?;
        }
        Ok(())
    }
}

pub fn image_data_path(path: &str) -> String {
    format!("{}.data", path)
}

pub fn mesh_array_path(path: &str, array: MeshArray) -> String {
    format!("{}.{}.data", path, array.field())
}

pub fn polydata_index_path(path: &str) -> String {
    format!("{}/index.json", path.trim_end_matches('/'))
}

/// Lay out `input` as files.
///
/// # Errors
/// `UnsupportedKind` for kinds that cannot be written on this transport,
/// `MissingBuffer` when a declared array is absent.
pub fn build_payload(input: &PipelineInput) -> Result<TransferPayload> {
    let mut payload = TransferPayload::default();
    match &input.data {
        IoData::Text(text) => payload.push(&input.path, text.as_bytes().to_vec()),
        IoData::Binary(bytes) => payload.push(&input.path, bytes.clone()),
        IoData::Image(image) => image_payload(&mut payload, &input.path, image)?,
        IoData::Mesh(mesh) => mesh_payload(&mut payload, &input.path, mesh)?,
        IoData::PolyData(_) => {
            return Err(BridgeError::UnsupportedKind(format!(
                "{} input '{}'",
                IoKind::PolyData,
                input.path
            )))
        }
    }
    Ok(payload)
}

fn image_payload(payload: &mut TransferPayload, path: &str, image: &Image) -> Result<()> {
    let pixels = image_data_bytes(image)?;
    let data_path = image_data_path(path);
    let sidecar = WireImage::describe(
        image,
        Value::from(image.direction.clone()),
        Value::String(data_path.clone()),
    );
    payload.push(path, serde_json::to_vec(&sidecar)?);
    payload.push(data_path, pixels.to_vec());
    Ok(())
}

fn mesh_payload(payload: &mut TransferPayload, path: &str, mesh: &Mesh) -> Result<()> {
    let mut arrays = Vec::new();
    for array in MeshArray::ALL {
        if let Some(bytes) = mesh_array_bytes(mesh, array)? {
            arrays.push((mesh_array_path(path, array), bytes.to_vec()));
        }
    }
    let sidecar = WireMesh::describe(mesh, |array| Value::String(mesh_array_path(path, array)));
    payload.push(path, serde_json::to_vec(&sidecar)?);
    for (array_path, bytes) in arrays {
        payload.push(array_path, bytes);
    }
    Ok(())
}

/// Read a file the descriptor says must exist.
fn read_required(fs: &dyn VirtualFs, path: &str, what: &str) -> Result<Vec<u8>> {
    fs.read_file(path).map_err(|e| match e {
        BridgeError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            BridgeError::MissingBuffer(format!("{} at '{}'", what, path))
        }
        other => other,
    })
}

/// Transport key named by a sidecar location field, or `fallback` when absent.
fn located_path(location: &Value, fallback: String, field: &str) -> Result<String> {
    match location {
        Value::Null => Ok(fallback),
        Value::String(path) if !MemoryAddress::is_encoded(path) => Ok(path.clone()),
        other => Err(BridgeError::malformed(format!(
            "'{}' must be a path on this transport, found {}",
            field, other
        ))),
    }
}

/// Every key `output` may occupy: its conventional files, plus any buffer
/// location named by a sidecar already present at its path.
///
/// Polydata outputs are directories; the key is the directory itself.
pub fn output_keys(fs: &dyn VirtualFs, output: &PipelineOutput) -> Vec<String> {
    let path = output.path.as_str();
    let mut keys = vec![path.trim_end_matches('/').to_string()];
    match output.kind {
        IoKind::Text | IoKind::Binary | IoKind::PolyData => {}
        IoKind::Image => {
            keys.push(image_data_path(path));
            if let Some(sidecar) = fs.read_file(path).ok().and_then(|bytes| WireImage::parse(&bytes).ok()) {
                keys.extend(located_path(&sidecar.data, image_data_path(path), "data").ok());
            }
        }
        IoKind::Mesh => {
            let sidecar = fs.read_file(path).ok().and_then(|bytes| WireMesh::parse(&bytes).ok());
            for array in MeshArray::ALL {
                keys.push(mesh_array_path(path, array));
                if let Some(sidecar) = &sidecar {
                    let located = located_path(sidecar.location(array), mesh_array_path(path, array), array.field());
                    keys.extend(located.ok());
                }
            }
        }
    }
    keys.sort();
    keys.dedup();
    keys
}

/// Materialise the requested output from the files the module left behind.
pub fn read_output(fs: &dyn VirtualFs, output: &PipelineOutput) -> Result<IoData> {
    let path = output.path.as_str();
    match output.kind {
        IoKind::Text => Ok(IoData::Text(String::from_utf8(read_required(fs, path, "text output")?)?)),
        IoKind::Binary => Ok(IoData::Binary(read_required(fs, path, "binary output")?)),
        IoKind::Image => read_image(fs, path).map(IoData::Image),
        IoKind::Mesh => read_mesh(fs, path).map(IoData::Mesh),
        IoKind::PolyData => read_polydata(fs, path).map(IoData::PolyData),
    }
}

fn read_image(fs: &dyn VirtualFs, path: &str) -> Result<Image> {
    let sidecar = WireImage::parse(&read_required(fs, path, "image descriptor")?)?;
    let image_type = sidecar.image_type.to_image_type()?;
    sidecar.check_geometry(image_type.dimension)?;
    let direction = sidecar.flat_direction(image_type.dimension)?;

    let data = if image_type.component_type.is_null() {
        None
    } else if sidecar.number_of_pixels()? == 0 {
        TypedArray::empty(image_type.component_type)
    } else {
        let data_path = located_path(&sidecar.data, image_data_path(path), "data")?;
        let bytes = read_required(fs, &data_path, "image pixel buffer")?;
        TypedArray::decode(image_type.component_type, &bytes)?
    };
    sidecar.into_image(direction, data)
}

fn read_mesh(fs: &dyn VirtualFs, path: &str) -> Result<Mesh> {
    let sidecar = WireMesh::parse(&read_required(fs, path, "mesh descriptor")?)?;
    let mut mesh = sidecar.header()?;
    load_mesh_arrays(&mut mesh, |array| {
        let array_path = located_path(sidecar.location(array), mesh_array_path(path, array), array.field())?;
        read_required(fs, &array_path, array.field())
    })?;
    Ok(mesh)
}

fn read_polydata(fs: &dyn VirtualFs, path: &str) -> Result<PolyData> {
    let document: Value = serde_json::from_slice(&read_required(fs, &polydata_index_path(path), "polydata index")?)
        .map_err(|e| BridgeError::malformed(format!("polydata index: {}", e)))?;
    let mut poly_data = PolyData::from_json(&document)?;
    let root = path.trim_end_matches('/');
    poly_data.resolve_refs(|buffer_ref| {
        read_required(
            fs,
            &format!("{}/{}", root, buffer_ref.relative_path()),
            "polydata array",
        )
    })?;
    Ok(poly_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{ImageType, MeshType};
    use crate::vfs::MemFs;
    use serde_json::json;

    fn sample_image() -> Image {
        let mut image = Image::new(ImageType::default());
        image.size = vec![2, 2];
        image.data = Some(TypedArray::UInt8(vec![10, 20, 30, 40]));
        image
    }

    #[test]
    fn test_image_files_and_read_back() {
        let input = PipelineInput::new("in/0.json", IoData::Image(sample_image()));
        let payload = build_payload(&input).unwrap();
        let names: Vec<&str> = payload.files().iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(names, vec!["in/0.json", "in/0.json.data"]);

        let mut fs = MemFs::new();
        payload.write_to(&mut fs).unwrap();
        let read = read_output(&fs, &PipelineOutput::new(IoKind::Image, "in/0.json")).unwrap();
        assert_eq!(read, IoData::Image(sample_image()));
    }

    #[test]
    fn test_image_without_pixels_is_missing_buffer() {
        let mut image = sample_image();
        image.data = None;
        let input = PipelineInput::new("in/0.json", IoData::Image(image));
        assert!(matches!(build_payload(&input), Err(BridgeError::MissingBuffer(_))));
    }

    #[test]
    fn test_mesh_skips_zero_count_arrays() {
        let mut mesh = Mesh::new(MeshType::default());
        mesh.number_of_points = 2;
        mesh.points = Some(TypedArray::Float32(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]));

        let input = PipelineInput::new("mesh.json", IoData::Mesh(mesh.clone()));
        let payload = build_payload(&input).unwrap();
        let names: Vec<&str> = payload.files().iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(names, vec!["mesh.json", "mesh.json.points.data"]);

        let mut fs = MemFs::new();
        payload.write_to(&mut fs).unwrap();
        let read = read_output(&fs, &PipelineOutput::new(IoKind::Mesh, "mesh.json")).unwrap();
        assert_eq!(read, IoData::Mesh(mesh));
    }

    #[test]
    fn test_zero_point_mesh_reads_typed_empty_view() {
        let mut fs = MemFs::new();
        let sidecar = json!({
            "meshType": {
                "dimension": 3,
                "pointComponentType": "float64",
                "pointPixelComponentType": "float32",
                "pointPixelType": "Scalar",
                "pointPixelComponents": 1,
                "cellComponentType": "uint32",
                "cellPixelComponentType": "float32",
                "cellPixelType": "Scalar",
                "cellPixelComponents": 1
            },
            "numberOfPoints": 0,
            "points": "mesh.json.points.data",
            "numberOfCells": 0,
            "cells": "mesh.json.cells.data"
        });
        fs.write_file("mesh.json", sidecar.to_string().as_bytes()).unwrap();

        let IoData::Mesh(mesh) = read_output(&fs, &PipelineOutput::new(IoKind::Mesh, "mesh.json")).unwrap() else {
            panic!("Expected a mesh");
        };
        assert_eq!(mesh.points, Some(TypedArray::Float64(vec![])));
        assert_eq!(mesh.cells, Some(TypedArray::UInt32(vec![])));
    }

    #[test]
    fn test_declared_points_without_file_is_missing_buffer() {
        let mut mesh = Mesh::new(MeshType::default());
        mesh.number_of_points = 1;
        mesh.points = Some(TypedArray::Float32(vec![1.0, 2.0, 3.0]));
        let mut fs = MemFs::new();
        build_payload(&PipelineInput::new("m.json", IoData::Mesh(mesh)))
            .unwrap()
            .write_to(&mut fs)
            .unwrap();
        fs.remove_file("m.json.points.data").unwrap();

        let result = read_output(&fs, &PipelineOutput::new(IoKind::Mesh, "m.json"));
        assert!(matches!(result, Err(BridgeError::MissingBuffer(_))));
    }

    #[test]
    fn test_polydata_input_is_unsupported_kind() {
        let input = PipelineInput::new("poly", IoData::PolyData(PolyData::default()));
        assert!(matches!(build_payload(&input), Err(BridgeError::UnsupportedKind(_))));
    }

    #[test]
    fn test_polydata_output_resolves_refs() {
        let mut fs = MemFs::new();
        let index = json!({
            "points": {"dataType": "Float32Array", "numberOfComponents": 3, "ref": {"basepath": "data", "id": "p"}}
        });
        fs.write_file("out/poly/index.json", index.to_string().as_bytes()).unwrap();
        fs.write_file("out/poly/data/p", bytemuck::cast_slice(&[0.5f32, 1.5, 2.5])).unwrap();

        let IoData::PolyData(poly_data) =
            read_output(&fs, &PipelineOutput::new(IoKind::PolyData, "out/poly/")).unwrap()
        else {
            panic!("Expected polydata");
        };
        assert!(poly_data.is_resolved());
        assert_eq!(
            poly_data.points.unwrap().typed(),
            Some(&TypedArray::Float32(vec![0.5, 1.5, 2.5]))
        );
    }

    #[test]
    fn test_overflowing_size_is_malformed() {
        let mut fs = MemFs::new();
        let sidecar = json!({
            "imageType": {"dimension": 2, "componentType": "uint8", "pixelType": "Scalar", "components": 1},
            "origin": [0.0, 0.0],
            "spacing": [1.0, 1.0],
            "direction": [1.0, 0.0, 0.0, 1.0],
            "size": [4294967296u64, 4294967296u64],
            "data": "huge.data"
        });
        fs.write_file("huge", sidecar.to_string().as_bytes()).unwrap();
        fs.write_file("huge.data", &[0; 4]).unwrap();

        let result = read_output(&fs, &PipelineOutput::new(IoKind::Image, "huge"));
        assert!(matches!(result, Err(BridgeError::MalformedDescriptor(_))));
    }

    #[test]
    fn test_output_keys_cover_sidecar_locations() {
        let mut fs = MemFs::new();
        let sidecar = json!({
            "imageType": {"dimension": 1, "componentType": "uint8", "pixelType": "Scalar", "components": 1},
            "size": [2],
            "data": "pixels/elsewhere.bin"
        });
        fs.write_file("seg", &serde_json::to_vec(&sidecar).unwrap()).unwrap();

        let keys = output_keys(&fs, &PipelineOutput::new(IoKind::Image, "seg"));
        assert_eq!(keys, vec!["pixels/elsewhere.bin", "seg", "seg.data"]);

        let absent = output_keys(&fs, &PipelineOutput::new(IoKind::Image, "labels"));
        assert_eq!(absent, vec!["labels", "labels.data"]);

        let surface = output_keys(&fs, &PipelineOutput::new(IoKind::PolyData, "surface/"));
        assert_eq!(surface, vec!["surface"]);
    }

    #[test]
    fn test_missing_text_output_is_missing_buffer() {
        let fs = MemFs::new();
        let result = read_output(&fs, &PipelineOutput::new(IoKind::Text, "out.txt"));
        assert!(matches!(result, Err(BridgeError::MissingBuffer(_))));
    }
}
