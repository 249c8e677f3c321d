// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! WASM binary inspection.
//!
//! Uses `wasmparser` to check the encoding and to find which calling
//! conventions a pipeline binary supports, before anything is compiled.

use crate::errors::{ModuleError, ModuleResult, WASM_UNSUPPORTED_ENCODING};
use wasmparser::{Encoding, ExternalKind, Parser, Payload};

pub(crate) const COMMAND_ENTRY: &str = "_start";
pub(crate) const REACTOR_INIT: &str = "_initialize";
pub(crate) const MEMORY_EXPORT: &str = "memory";

/// Exports the memory transport needs besides `_initialize`.
pub(crate) const MEMORY_IO_EXPORTS: [&str; 8] = [
    "itk_wasm_input_array_alloc",
    "itk_wasm_input_json_alloc",
    "itk_wasm_delayed_start",
    "itk_wasm_delayed_exit",
    "itk_wasm_output_json_address",
    "itk_wasm_output_json_size",
    "itk_wasm_output_array_address",
    "itk_wasm_output_array_size",
];

/// Calling conventions a module supports.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EntryPoints {
    /// Exports `_start`: arguments in, files and exit code out.
    pub command: bool,
    /// Exports `_initialize` and the memory transport functions.
    pub memory_io: bool,
}

impl EntryPoints {
    pub fn describe(self) -> &'static str {
        match (self.command, self.memory_io) {
            (true, true) => "command+memory-io",
            (true, false) => "command",
            (false, true) => "memory-io",
            (false, false) => "none",
        }
    }
}

/// Inspect `bytes` and report the supported entry points.
///
/// # Errors
/// * `InvalidWasmBinary` - empty, truncated or otherwise invalid input
/// * `UnsupportedEncoding` - Component Model binaries, including legacy
///   preview 1 components
/// * `MissingExport` - no linear memory export, or neither convention present
pub fn detect_entry_points(bytes: &[u8]) -> ModuleResult<EntryPoints> {
    let mut encoding = None;
    let mut has_component_section = false;
    let mut functions: Vec<String> = Vec::new();
    let mut exports_memory = false;

    for payload in Parser::new(0).parse_all(bytes) {
        match payload? {
            Payload::Version { encoding: enc, .. } => {
                if enc == Encoding::Component {
                    return Err(ModuleError::UnsupportedEncoding(WASM_UNSUPPORTED_ENCODING.to_string()));
                }
                encoding = Some(enc);
            }
            Payload::CustomSection(reader) if reader.name() == "component" => {
                has_component_section = true;
            }
            Payload::ExportSection(reader) => {
                for export in reader {
                    let export = export?;
                    match export.kind {
                        ExternalKind::Func => functions.push(export.name.to_string()),
                        ExternalKind::Memory if export.name == MEMORY_EXPORT => exports_memory = true,
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    if encoding.is_none() {
        return Err(ModuleError::InvalidWasmBinary("Invalid WASM binary".to_string()));
    }
    if has_component_section {
        return Err(ModuleError::UnsupportedEncoding(WASM_UNSUPPORTED_ENCODING.to_string()));
    }
    if !exports_memory {
        return Err(ModuleError::MissingExport {
            name: MEMORY_EXPORT.to_string(),
            reason: "pipeline modules must export their linear memory".to_string(),
        });
    }

    let exports = |name: &str| functions.iter().any(|f| f == name);
    let entry_points = EntryPoints {
        command: exports(COMMAND_ENTRY),
        memory_io: exports(REACTOR_INIT) && MEMORY_IO_EXPORTS.iter().all(|name| exports(name)),
    };

    if !entry_points.command && !entry_points.memory_io {
        let missing = std::iter::once(REACTOR_INIT)
            .chain(MEMORY_IO_EXPORTS)
            .find(|name| !exports(name))
            .unwrap_or(REACTOR_INIT);
        return Err(ModuleError::MissingExport {
            name: COMMAND_ENTRY.to_string(),
            reason: format!("no command entry point, and memory transport export '{}' is absent", missing),
        });
    }

    Ok(entry_points)
}
