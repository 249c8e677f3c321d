// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::interface::{Image, IoKind, Mesh, PolyData};

/// A logical value together with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum IoData {
    Text(String),
    Binary(Vec<u8>),
    Image(Image),
    Mesh(Mesh),
    PolyData(PolyData),
}

impl IoData {
    pub fn kind(&self) -> IoKind {
        match self {
            IoData::Text(_) => IoKind::Text,
            IoData::Binary(_) => IoKind::Binary,
            IoData::Image(_) => IoKind::Image,
            IoData::Mesh(_) => IoKind::Mesh,
            IoData::PolyData(_) => IoKind::PolyData,
        }
    }
}

/// An input written under a synthetic path before the call.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineInput {
    pub path: String,
    pub data: IoData,
}

impl PipelineInput {
    pub fn new(path: impl Into<String>, data: IoData) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }
}

/// An output the module is expected to produce under `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub kind: IoKind,
    pub path: String,
}

impl PipelineOutput {
    pub fn new(kind: IoKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// A requested output after the call, with its kind carried through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedOutput {
    pub kind: IoKind,
    pub path: String,
    pub data: IoData,
}
