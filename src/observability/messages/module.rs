// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline module events.
//!
//! This module contains message types for logging events related to:
//! * WASM binary loading and validation
//! * Engine creation and module compilation
//! * Entry point execution and traps

use std::fmt::{Display, Formatter};

/// WASM binary loaded successfully.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use wasm_interface_bridge::observability::messages::module::ModuleLoaded;
///
/// let msg = ModuleLoaded {
///     module_path: "pipelines/median-filter.wasm",
///     size_bytes: 4096,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ModuleLoaded<'a> {
    pub module_path: &'a str,
    pub size_bytes: usize,
}

impl Display for ModuleLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded WASM module: {} ({} bytes)",
            self.module_path, self.size_bytes
        )
    }
}

/// WASM binary loading failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ModuleLoadFailed<'a> {
    pub module_path: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ModuleLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load WASM module '{}': {}",
            self.module_path, self.error
        )
    }
}

/// Module compiled and its calling convention detected.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ModuleCompiled<'a> {
    pub module_name: &'a str,
    pub convention: &'a str,
    pub fuel: u64,
}

impl Display for ModuleCompiled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compiled pipeline module '{}' ({} convention, fuel: {})",
            self.module_name, self.convention, self.fuel
        )
    }
}

/// Entry point returned or exited with a code.
///
/// # Log Level
/// `debug!` - Detailed execution trace
pub struct EntryPointReturned<'a> {
    pub entry_point: &'a str,
    pub return_code: i32,
}

impl Display for EntryPointReturned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Entry point '{}' finished with return code {}",
            self.entry_point, self.return_code
        )
    }
}

/// Engine created for a module.
///
/// # Log Level
/// `debug!` - Setup detail
pub struct EngineCreated {
    pub fuel: u64,
    pub max_memory_bytes: Option<usize>,
}

impl Display for EngineCreated {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Creating engine (fuel: {}, memory cap: ", self.fuel)?;
        match self.max_memory_bytes {
            Some(bytes) => write!(f, "{} bytes)", bytes),
            None => write!(f, "none)"),
        }
    }
}

/// Entry point trapped instead of returning.
///
/// # Log Level
/// `warn!` - Reported to the caller as an invocation fault
pub struct EntryPointTrapped<'a> {
    pub entry_point: &'a str,
    pub trap: &'a str,
}

impl Display for EntryPointTrapped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Entry point '{}' trapped: {}", self.entry_point, self.trap)
    }
}
