// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for loading and instantiating pipeline modules.
//!
//! These cover everything that can go wrong before the module's entry point
//! runs: reading the binary, validating its size and encoding, configuring the
//! engine, compiling, linking and locating exports. Faults raised *while* the
//! entry point runs are not module errors; the bridge reports those as
//! [`BridgeError::InvocationFault`](super::BridgeError::InvocationFault).

use thiserror::Error;

/// Error message for binaries that use the Component Model encoding.
///
/// Pipelines are WASI preview 1 core modules. Component binaries (and the
/// legacy preview 1 "component" custom section) are rejected up front.
pub const WASM_UNSUPPORTED_ENCODING: &str = "Unsupported WASM binary: pipeline modules must be \
classic core WASM modules targeting WASI preview 1, not Component Model binaries.";

#[derive(Error, Debug)]
pub enum ModuleError {
    /// Invalid or malformed WASM binary format.
    #[error("Invalid WASM binary: {0}")]
    InvalidWasmBinary(String),

    /// Binary uses an encoding the bridge cannot run.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Size limits and other pre-compilation checks.
    #[error("Invalid module: {0}")]
    ValidationError(String),

    /// Module compilation error.
    #[error("WASM module error: {0}")]
    CompileError(String),

    /// Wasmtime engine creation or configuration error.
    #[error("Engine creation error: {0}")]
    EngineError(String),

    /// Linking or instantiation failed before the entry point was reached.
    #[error("Instantiation failed: {0}")]
    InstantiationError(String),

    /// A required export is missing or has the wrong signature.
    #[error("Missing export '{name}': {reason}")]
    MissingExport { name: String, reason: String },

    /// Guest linear memory could not be read or written.
    #[error("Memory error: {0}")]
    MemoryError(String),

    /// File I/O error during module loading.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// WASM binary parsing error from wasmparser.
    #[error("WASM parser error: {0}")]
    ParserError(#[from] wasmparser::BinaryReaderError),
}

pub type ModuleResult<T> = Result<T, ModuleError>;
