// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::BridgeError;
use std::fmt;
use std::str::FromStr;

/// Logical kind of a pipeline input or output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IoKind {
    Text,
    Binary,
    Image,
    Mesh,
    PolyData,
}

impl IoKind {
    /// Wire name, as used by pipeline descriptions.
    pub const fn as_str(self) -> &'static str {
        match self {
            IoKind::Text => "Text",
            IoKind::Binary => "Binary",
            IoKind::Image => "Image",
            IoKind::Mesh => "Mesh",
            IoKind::PolyData => "vtkPolyData",
        }
    }
}

impl FromStr for IoKind {
    type Err = BridgeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "Text" => Ok(IoKind::Text),
            "Binary" => Ok(IoKind::Binary),
            "Image" => Ok(IoKind::Image),
            "Mesh" => Ok(IoKind::Mesh),
            "vtkPolyData" => Ok(IoKind::PolyData),
            other => Err(BridgeError::UnsupportedKind(other.to_string())),
        }
    }
}

impl fmt::Display for IoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
