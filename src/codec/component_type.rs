// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::BridgeError;
use std::fmt;
use std::str::FromStr;

/// Element type of a numeric buffer.
///
/// `Null` is the explicit "absent" tag: a logical array that legitimately has
/// no storage, such as mesh cells on a point cloud.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ComponentType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
    Null,
}

impl ComponentType {
    /// Canonical wire tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            ComponentType::UInt8 => "uint8",
            ComponentType::Int8 => "int8",
            ComponentType::UInt16 => "uint16",
            ComponentType::Int16 => "int16",
            ComponentType::UInt32 => "uint32",
            ComponentType::Int32 => "int32",
            ComponentType::UInt64 => "uint64",
            ComponentType::Int64 => "int64",
            ComponentType::Float32 => "float32",
            ComponentType::Float64 => "float64",
            ComponentType::Null => "null",
        }
    }

    /// JavaScript typed-array name used as a vtk.js `dataType`; `None` for `Null`.
    pub const fn typed_array_name(self) -> Option<&'static str> {
        match self {
            ComponentType::UInt8 => Some("Uint8Array"),
            ComponentType::Int8 => Some("Int8Array"),
            ComponentType::UInt16 => Some("Uint16Array"),
            ComponentType::Int16 => Some("Int16Array"),
            ComponentType::UInt32 => Some("Uint32Array"),
            ComponentType::Int32 => Some("Int32Array"),
            ComponentType::UInt64 => Some("BigUint64Array"),
            ComponentType::Int64 => Some("BigInt64Array"),
            ComponentType::Float32 => Some("Float32Array"),
            ComponentType::Float64 => Some("Float64Array"),
            ComponentType::Null => None,
        }
    }

    /// Width of one element in bytes; zero for `Null`.
    pub const fn element_size(self) -> usize {
        match self {
            ComponentType::UInt8 | ComponentType::Int8 => 1,
            ComponentType::UInt16 | ComponentType::Int16 => 2,
            ComponentType::UInt32 | ComponentType::Int32 | ComponentType::Float32 => 4,
            ComponentType::UInt64 | ComponentType::Int64 | ComponentType::Float64 => 8,
            ComponentType::Null => 0,
        }
    }

    #[inline]
    pub fn is_null(self) -> bool {
        matches!(self, Self::Null)
    }
}

impl FromStr for ComponentType {
    type Err = BridgeError;

    /// Accepts the canonical tags and the JavaScript typed-array names used by
    /// `vtkPolyData` documents for their `dataType` field.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let component_type = match tag {
            "uint8" | "Uint8Array" => ComponentType::UInt8,
            "int8" | "Int8Array" => ComponentType::Int8,
            "uint16" | "Uint16Array" => ComponentType::UInt16,
            "int16" | "Int16Array" => ComponentType::Int16,
            "uint32" | "Uint32Array" => ComponentType::UInt32,
            "int32" | "Int32Array" => ComponentType::Int32,
            "uint64" | "BigUint64Array" => ComponentType::UInt64,
            "int64" | "BigInt64Array" => ComponentType::Int64,
            "float32" | "Float32Array" => ComponentType::Float32,
            "float64" | "Float64Array" => ComponentType::Float64,
            "null" => ComponentType::Null,
            other => return Err(BridgeError::UnsupportedType(other.to_string())),
        };
        Ok(component_type)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_tags_round_trip_through_from_str() {
        let all = [
            ComponentType::UInt8,
            ComponentType::Int8,
            ComponentType::UInt16,
            ComponentType::Int16,
            ComponentType::UInt32,
            ComponentType::Int32,
            ComponentType::UInt64,
            ComponentType::Int64,
            ComponentType::Float32,
            ComponentType::Float64,
            ComponentType::Null,
        ];
        for component_type in all {
            let parsed: ComponentType = component_type.as_str().parse().unwrap();
            assert_eq!(parsed, component_type);
        }
    }

    #[test]
    fn test_typed_array_aliases() {
        assert_eq!("Float32Array".parse::<ComponentType>().unwrap(), ComponentType::Float32);
        assert_eq!("Uint32Array".parse::<ComponentType>().unwrap(), ComponentType::UInt32);
        assert_eq!("BigInt64Array".parse::<ComponentType>().unwrap(), ComponentType::Int64);
    }

    #[test]
    fn test_typed_array_names_parse_back() {
        for tag in ["uint8", "int16", "uint32", "uint64", "int64", "float32", "float64"] {
            let component_type: ComponentType = tag.parse().unwrap();
            let name = component_type.typed_array_name().unwrap();
            assert_eq!(name.parse::<ComponentType>().unwrap(), component_type);
        }
        assert_eq!(ComponentType::Null.typed_array_name(), None);
    }

    #[test]
    fn test_unknown_tag_is_unsupported() {
        let result = "float16".parse::<ComponentType>();
        match result {
            Err(BridgeError::UnsupportedType(tag)) => assert_eq!(tag, "float16"),
            other => panic!("Expected UnsupportedType, got {:?}", other),
        }
        assert!("UInt8".parse::<ComponentType>().is_err(), "tags are case-sensitive");
    }

    #[test]
    fn test_element_sizes() {
        assert_eq!(ComponentType::UInt8.element_size(), 1);
        assert_eq!(ComponentType::Int16.element_size(), 2);
        assert_eq!(ComponentType::Float32.element_size(), 4);
        assert_eq!(ComponentType::UInt64.element_size(), 8);
        assert_eq!(ComponentType::Null.element_size(), 0);
        assert!(ComponentType::Null.is_null());
    }
}
