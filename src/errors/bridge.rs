// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The error taxonomy for data crossing the module boundary.
//!
//! Every variant is fatal to the call that raised it. Nothing is retried
//! internally; callers decide whether to run a whole invocation again.

use crate::codec::ComponentType;
use crate::errors::ModuleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// Numeric type tag outside the supported vocabulary.
    #[error("Unsupported component type: {0}")]
    UnsupportedType(String),

    /// Logical transfer kind with no case on this path.
    #[error("Unsupported interface kind: {0}")]
    UnsupportedKind(String),

    /// A descriptor declares a nonzero count but the buffer is absent.
    #[error("Missing buffer: {0}")]
    MissingBuffer(String),

    /// The module entry point trapped or exited abnormally.
    #[error("Pipeline invocation fault: {diagnostic}")]
    InvocationFault {
        stdout: String,
        stderr: String,
        diagnostic: String,
    },

    /// Sidecar JSON failed to parse or lacks a required field.
    #[error("Malformed descriptor: {0}")]
    MalformedDescriptor(String),

    #[error("Unexpected dimension: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: i64 },

    #[error("Unexpected component type: expected {expected}, found {found}")]
    ComponentTypeMismatch { expected: String, found: String },

    #[error("Unexpected pixel type: expected {expected}, found {found}")]
    PixelTypeMismatch { expected: String, found: String },

    #[error("Unexpected number of components: expected {expected}, found {found}")]
    ComponentCountMismatch { expected: usize, found: i64 },

    /// Byte length is not a whole number of elements, or bytes were given under the `null` tag.
    #[error("Buffer of {len} bytes is not a whole number of {component_type} elements")]
    BufferLength {
        component_type: ComponentType,
        len: usize,
    },

    /// An encoded address does not name a readable region of the address space.
    #[error("Address {address} does not resolve to {len} readable bytes")]
    UnresolvedAddress { address: usize, len: usize },

    /// Caller-level policy: nonzero return code with diagnostics on stderr.
    #[error("Pipeline failed with return code {return_code}: {stderr}")]
    PipelineFailed { return_code: i32, stderr: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Worker task failed: {0}")]
    Worker(String),

    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        BridgeError::MalformedDescriptor(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_fault_display_uses_diagnostic() {
        let err = BridgeError::InvocationFault {
            stdout: "partial".to_string(),
            stderr: "boom".to_string(),
            diagnostic: "wasm trap: unreachable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Pipeline invocation fault: wasm trap: unreachable"
        );
    }

    #[test]
    fn test_module_error_is_transparent() {
        let err = BridgeError::from(ModuleError::ValidationError("too large".to_string()));
        assert_eq!(err.to_string(), "Invalid module: too large");
    }

    #[test]
    fn test_buffer_length_names_component_type() {
        let err = BridgeError::BufferLength {
            component_type: ComponentType::Float32,
            len: 6,
        };
        assert!(err.to_string().contains("float32"));
    }
}
