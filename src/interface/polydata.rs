// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Polygonal datasets in the vtk.js JSON layout.
//!
//! Numeric leaves are stored out of line: the document carries a `ref` per
//! array and the bytes live in a separate buffer. A leaf moves from
//! [`ArrayValues::Unresolved`] to [`ArrayValues::Resolved`] exactly once; the
//! resolved variant no longer holds a reference, so a second resolution pass
//! has nothing to load.

use crate::codec::TypedArray;
use crate::errors::{BridgeError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Cell-topology keys whose values are single data arrays.
pub const TOPOLOGY_KEYS: [&str; 5] = ["points", "verts", "lines", "polys", "strips"];

/// Attribute keys whose values hold an `arrays` list.
pub const ATTRIBUTE_KEYS: [&str; 3] = ["pointData", "cellData", "fieldData"];

/// Location of an out-of-line buffer, relative to the dataset root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BufferRef {
    #[serde(default)]
    pub encode: Option<String>,
    #[serde(default)]
    pub basepath: String,
    pub id: String,
}

impl BufferRef {
    /// `{basepath}/{id}`, or just `id` when there is no base path.
    pub fn relative_path(&self) -> String {
        let base = self.basepath.trim_matches('/');
        if base.is_empty() {
            self.id.clone()
        } else {
            format!("{}/{}", base, self.id)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValues {
    Unresolved(BufferRef),
    /// The typed view owns its backing bytes.
    Resolved(TypedArray),
    /// Values written directly into the document.
    Inline(Value),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    /// Element tag, usually a JavaScript typed-array name.
    pub data_type: Option<String>,
    pub values: ArrayValues,
    /// Remaining fields such as `name`, `numberOfComponents` and `size`.
    pub attributes: Map<String, Value>,
}

impl DataArray {
    fn from_json(key: &str, value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| BridgeError::malformed(format!("'{}' must be an object", key)))?;

        let mut attributes = object.clone();
        let data_type = match attributes.remove("dataType") {
            Some(Value::String(tag)) => Some(tag),
            Some(other) => {
                return Err(BridgeError::malformed(format!(
                    "'{}.dataType' must be a string, found {}",
                    key, other
                )))
            }
            None => None,
        };

        let values = if let Some(reference) = attributes.remove("ref") {
            let buffer_ref: BufferRef = serde_json::from_value(reference)
                .map_err(|e| BridgeError::malformed(format!("'{}.ref': {}", key, e)))?;
            ArrayValues::Unresolved(buffer_ref)
        } else if let Some(inline) = attributes.remove("values") {
            ArrayValues::Inline(inline)
        } else {
            ArrayValues::Empty
        };

        Ok(Self {
            data_type,
            values,
            attributes,
        })
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self.values, ArrayValues::Unresolved(_))
    }

    /// The typed view, once resolved.
    pub fn typed(&self) -> Option<&TypedArray> {
        match &self.values {
            ArrayValues::Resolved(array) => Some(array),
            _ => None,
        }
    }

    fn resolve<F>(&mut self, loader: &mut F) -> Result<()>
    where
        F: FnMut(&BufferRef) -> Result<Vec<u8>>,
    {
        let ArrayValues::Unresolved(buffer_ref) = &self.values else {
            return Ok(());
        };
        let tag = self.data_type.as_deref().ok_or_else(|| {
            BridgeError::malformed(format!("array '{}' has a ref but no dataType", buffer_ref.id))
        })?;
        let bytes = loader(buffer_ref)?;
        self.values = match TypedArray::decode_tagged(tag, &bytes)? {
            Some(array) => ArrayValues::Resolved(array),
            None => ArrayValues::Empty,
        };
        Ok(())
    }
}

/// One entry of an attribute's `arrays` list.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeArray {
    pub data: DataArray,
    pub extra: Map<String, Value>,
}

/// `pointData`, `cellData` or `fieldData`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSetAttributes {
    pub arrays: Vec<AttributeArray>,
    /// Active-array indices and similar bookkeeping, kept verbatim.
    pub extra: Map<String, Value>,
}

impl DataSetAttributes {
    fn from_json(key: &str, value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| BridgeError::malformed(format!("'{}' must be an object", key)))?;
        let mut extra = object.clone();
        let arrays = match extra.remove("arrays") {
            Some(Value::Array(entries)) => entries
                .iter()
                .map(|entry| AttributeArray::from_json(key, entry))
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(BridgeError::malformed(format!(
                    "'{}.arrays' must be a list, found {}",
                    key, other
                )))
            }
            None => Vec::new(),
        };
        Ok(Self { arrays, extra })
    }
}

impl AttributeArray {
    fn from_json(key: &str, value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| BridgeError::malformed(format!("'{}.arrays' entries must be objects", key)))?;
        let mut extra = object.clone();
        let data = extra
            .remove("data")
            .ok_or_else(|| BridgeError::malformed(format!("'{}.arrays' entry without data", key)))?;
        Ok(Self {
            data: DataArray::from_json(key, &data)?,
            extra,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolyData {
    pub points: Option<DataArray>,
    pub verts: Option<DataArray>,
    pub lines: Option<DataArray>,
    pub polys: Option<DataArray>,
    pub strips: Option<DataArray>,
    pub point_data: Option<DataSetAttributes>,
    pub cell_data: Option<DataSetAttributes>,
    pub field_data: Option<DataSetAttributes>,
    /// Top-level fields outside the topology and attribute keys.
    pub extra: Map<String, Value>,
}

impl PolyData {
    /// Parse an `index.json` document. References are left unresolved.
    pub fn from_json(document: &Value) -> Result<Self> {
        let object = document
            .as_object()
            .ok_or_else(|| BridgeError::malformed("polydata document must be an object"))?;
        let mut extra = object.clone();
        let mut poly_data = PolyData::default();

        for key in TOPOLOGY_KEYS {
            if let Some(value) = extra.remove(key) {
                let array = DataArray::from_json(key, &value)?;
                *poly_data.topology_slot(key) = Some(array);
            }
        }
        for key in ATTRIBUTE_KEYS {
            if let Some(value) = extra.remove(key) {
                let attributes = DataSetAttributes::from_json(key, &value)?;
                *poly_data.attribute_slot(key) = Some(attributes);
            }
        }

        poly_data.extra = extra;
        Ok(poly_data)
    }

    fn topology_slot(&mut self, key: &str) -> &mut Option<DataArray> {
        match key {
            "points" => &mut self.points,
            "verts" => &mut self.verts,
            "lines" => &mut self.lines,
            "polys" => &mut self.polys,
            _ => &mut self.strips,
        }
    }

    fn attribute_slot(&mut self, key: &str) -> &mut Option<DataSetAttributes> {
        match key {
            "pointData" => &mut self.point_data,
            "cellData" => &mut self.cell_data,
            _ => &mut self.field_data,
        }
    }

    fn arrays_mut(&mut self) -> impl Iterator<Item = &mut DataArray> {
        let topology = [
            &mut self.points,
            &mut self.verts,
            &mut self.lines,
            &mut self.polys,
            &mut self.strips,
        ]
        .into_iter()
        .flatten();
        let attributes = [&mut self.point_data, &mut self.cell_data, &mut self.field_data]
            .into_iter()
            .flatten()
            .flat_map(|attributes| attributes.arrays.iter_mut().map(|entry| &mut entry.data));
        topology.chain(attributes)
    }

    /// Every data array in the dataset, topology first.
    pub fn arrays(&self) -> impl Iterator<Item = &DataArray> {
        let topology = [&self.points, &self.verts, &self.lines, &self.polys, &self.strips]
            .into_iter()
            .flatten();
        let attributes = [&self.point_data, &self.cell_data, &self.field_data]
            .into_iter()
            .flatten()
            .flat_map(|attributes| attributes.arrays.iter().map(|entry| &entry.data));
        topology.chain(attributes)
    }

    /// Load every unresolved leaf through `loader` and replace it with its typed view.
    ///
    /// Already-resolved leaves are skipped without calling `loader`.
    pub fn resolve_refs<F>(&mut self, mut loader: F) -> Result<()>
    where
        F: FnMut(&BufferRef) -> Result<Vec<u8>>,
    {
        for array in self.arrays_mut() {
            array.resolve(&mut loader)?;
        }
        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        self.arrays().all(DataArray::is_resolved)
    }
}
