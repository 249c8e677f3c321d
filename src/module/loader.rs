// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline binary loading and size validation.
//!
//! Reads the binary from disk and checks it against the configured size
//! limit. Format inspection is the detector's job.

use crate::errors::{ModuleError, ModuleResult};
use crate::observability::messages::module::{ModuleLoadFailed, ModuleLoaded};
use std::path::Path;

/// Reject binaries larger than `max_bytes`.
pub(crate) fn check_size(bytes: &[u8], max_bytes: usize) -> ModuleResult<()> {
    if bytes.len() > max_bytes {
        return Err(ModuleError::ValidationError(format!(
            "WASM file too large: {} bytes (max: {} bytes)",
            bytes.len(),
            max_bytes
        )));
    }
    Ok(())
}

/// Loads a pipeline binary and validates its size.
///
/// # Returns
/// * `Ok(Vec<u8>)` - The WASM binary bytes
/// * `Err(ModuleError)` - If the file cannot be read or exceeds `max_bytes`
pub fn load_wasm_bytes<P: AsRef<Path>>(path: P, max_bytes: usize) -> ModuleResult<Vec<u8>> {
    let path = path.as_ref();
    let module_path = path.display().to_string();

    let result = std::fs::read(path)
        .map_err(ModuleError::IoError)
        .and_then(|bytes| check_size(&bytes, max_bytes).map(|_| bytes));

    match &result {
        Ok(bytes) => tracing::info!(
            "{}",
            ModuleLoaded {
                module_path: &module_path,
                size_bytes: bytes.len(),
            }
        ),
        Err(error) => tracing::error!(
            "{}",
            ModuleLoadFailed {
                module_path: &module_path,
                error,
            }
        ),
    }
    result
}
