// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wasmtime engine configuration for pipeline modules.

use crate::config::WasmConfig;
use crate::errors::{ModuleError, ModuleResult};
use crate::observability::messages::module::EngineCreated;
use wasmtime::{Config, Engine};

/// Creates a Wasmtime engine for core WASI preview 1 modules.
///
/// **All engines:**
/// - `consume_fuel(true)` - Every store gets the configured fuel budget
/// - `wasm_component_model(false)` - Pipelines are core modules
/// - Disabled features: threads, multi-memory, memory64
///
/// SIMD stays enabled; imaging pipelines are routinely built with it.
pub fn create_engine(wasm: &WasmConfig) -> ModuleResult<Engine> {
    let mut config = Config::new();

    config.wasm_component_model(false);
    config.wasm_threads(false); // No threading support
    config.wasm_multi_memory(false); // Single memory instance only
    config.wasm_memory64(false); // 32-bit addresses, matching the transport's address strings
    config.consume_fuel(true); // Enable fuel for execution limits
    config.epoch_interruption(false);

    tracing::debug!(
        "{}",
        EngineCreated {
            fuel: wasm.fuel.effective(),
            max_memory_bytes: wasm.max_memory_bytes,
        }
    );

    Engine::new(&config).map_err(|e| ModuleError::EngineError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_engine() {
        let engine = create_engine(&WasmConfig::default());
        assert!(engine.is_ok(), "Should create pipeline engine");
    }

    #[test]
    fn test_engine_compiles_core_modules() {
        let engine = create_engine(&WasmConfig::default()).unwrap();
        let wasm = wat::parse_str(r#"(module (func (export "_start")))"#).unwrap();
        assert!(wasmtime::Module::new(&engine, &wasm).is_ok());
    }
}
